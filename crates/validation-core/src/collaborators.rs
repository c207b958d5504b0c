//! Seams to the rest of the platform: asset storage, content generation
//! and the LLM grading call. Implementations are constructed once at
//! startup and injected.

use async_trait::async_trait;
use shared_types::{AssetId, BlogOutline, Messaging, Persona, Script};

use crate::error::{GenerationError, GradingError, LookupError};

/// Read-only access to stored assets.
#[async_trait]
pub trait AssetLookup: Send + Sync {
    async fn persona(&self, id: AssetId) -> Result<Option<Persona>, LookupError>;

    async fn messaging(&self, id: AssetId) -> Result<Option<Messaging>, LookupError>;

    async fn script(&self, id: AssetId) -> Result<Option<Script>, LookupError>;

    async fn blog_outline(&self, id: AssetId) -> Result<Option<BlogOutline>, LookupError>;
}

/// Produces and persists fresh assets. Returned records carry new ids;
/// existing rows are never modified.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn regenerate_messaging(&self, persona_id: AssetId) -> Result<Messaging, GenerationError>;

    async fn regenerate_script(
        &self,
        persona_id: AssetId,
        messaging_id: AssetId,
        platform_hint: &str,
    ) -> Result<Script, GenerationError>;
}

/// Chat-completion call that must answer with a single JSON object.
#[async_trait]
pub trait GradingClient: Send + Sync {
    /// Returns the raw message content; parsing is the caller's job.
    async fn complete_json(&self, system: &str, user: &str) -> Result<String, GradingError>;
}
