//! Error types for the validation pipeline

use std::time::Duration;

use shared_types::AssetId;
use thiserror::Error;

/// Implemented by collaborator errors so the retry helper can tell
/// transient failures from permanent ones.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Failure reading from the asset store. A missing record is not an
/// error; lookups return `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Stored record {id} is corrupt: {reason}")]
    Corrupt { id: AssetId, reason: String },
}

/// Failure from the grading call. Always absorbed by the scorer.
#[derive(Debug, Error)]
pub enum GradingError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Grading timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Invalid grading response: {0}")]
    InvalidResponse(String),
}

impl Retryable for GradingError {
    fn is_retryable(&self) -> bool {
        match self {
            GradingError::Transport(_)
            | GradingError::Timeout(_)
            | GradingError::InvalidResponse(_) => true,
            GradingError::Provider { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// Failure regenerating content. Never absorbed: it ends the request.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Persona not found: {0}")]
    PersonaNotFound(AssetId),

    #[error("Messaging not found: {0}")]
    MessagingNotFound(AssetId),

    #[error("Generator call failed: {0}")]
    Provider(String),

    #[error("Generator returned invalid content: {0}")]
    InvalidOutput(String),

    #[error("Failed to persist generated content: {0}")]
    Storage(String),
}

impl Retryable for GenerationError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::Provider(_) | GenerationError::InvalidOutput(_)
        )
    }
}

/// Errors that escape the coordinator or orchestrator.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Asset lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Regeneration failed: {0}")]
    Regeneration(#[from] GenerationError),
}
