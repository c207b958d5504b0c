//! Validation Core - global validation and auto-fix over persona assets
//!
//! A validation pass resolves the requested assets, runs the deterministic
//! hard checks from `check-engine`, and only when those pass asks an LLM
//! grader to score cross-asset consistency. Auto-fix builds on one pass:
//! when the grade falls below a threshold it regenerates messaging and/or
//! script and reports a fresh pass over the new ids.
//!
//! Storage, content generation and the grading call are traits in
//! [`collaborators`]; the app wires concrete implementations at startup.

pub mod collaborators;
pub mod coordinator;
pub mod error;
pub mod orchestrator;
pub mod retry;
pub mod scorer;

#[cfg(test)]
pub(crate) mod testing;

pub use collaborators::{AssetLookup, ContentGenerator, GradingClient};
pub use coordinator::{ValidationCoordinator, ValidationPass};
pub use error::{GenerationError, GradingError, LookupError, PipelineError, Retryable};
pub use orchestrator::{AutoFixOptions, RegenerationOrchestrator, DEFAULT_PLATFORM, DEFAULT_THRESHOLD};
pub use retry::RetryPolicy;
pub use scorer::{AiConsistencyScorer, DEFAULT_GRADING_TIMEOUT};
