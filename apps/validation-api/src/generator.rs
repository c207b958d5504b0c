//! LLM-backed regeneration of messaging and scripts
//!
//! Each call produces a brand new row; the records it replaces are left
//! untouched so earlier validations stay reproducible.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize};
use shared_types::{AssetId, Messaging, Persona, Script, ScriptSections};
use tracing::debug;
use uuid::Uuid;
use validation_core::scorer::strip_fence;
use validation_core::{AssetLookup, ContentGenerator, GenerationError, GradingClient, LookupError};

use crate::store::SqliteAssetStore;

pub const MESSAGING_INSTRUCTION: &str = "You are a senior direct-response copywriter. \
Write core messaging for the persona: a headline, an elevator pitch and at least three \
short viral taglines. Stay on the persona's product and audience. Respond ONLY in JSON.";

pub const SCRIPT_INSTRUCTION: &str = "You are a short-form video scriptwriter. \
Write a 60-150 word script in three parts (hook, body, call to action) that delivers \
the given messaging to the persona on the target platform. Respond ONLY in JSON.";

const MESSAGING_SHAPE: &str = r#"{
  "headline": "<string>",
  "elevator_pitch": "<string>",
  "viral_taglines": ["<string>", "<string>", "<string>"]
}"#;

const SCRIPT_SHAPE: &str = r#"{
  "hook": "<string>",
  "body": "<string>",
  "cta": "<string>"
}"#;

#[derive(Deserialize)]
struct MessagingDraft {
    headline: String,
    elevator_pitch: String,
    viral_taglines: Vec<String>,
}

#[derive(Deserialize)]
struct ScriptDraft {
    hook: String,
    body: String,
    cta: String,
}

pub struct LlmContentGenerator {
    llm: Arc<dyn GradingClient>,
    store: Arc<SqliteAssetStore>,
}

fn lookup_failed(err: LookupError) -> GenerationError {
    GenerationError::Storage(err.to_string())
}

fn parse_draft<T: DeserializeOwned>(raw: &str) -> Result<T, GenerationError> {
    serde_json::from_str(strip_fence(raw)).map_err(|e| GenerationError::InvalidOutput(e.to_string()))
}

fn persona_context(persona: &Persona) -> String {
    format!(
        "Persona: {}\nProduct: {}\nAudience: {}\nAttributes: {}",
        persona.name, persona.product, persona.audience, persona.attributes
    )
}

impl LlmContentGenerator {
    pub fn new(llm: Arc<dyn GradingClient>, store: Arc<SqliteAssetStore>) -> Self {
        Self { llm, store }
    }

    async fn load_persona(&self, persona_id: AssetId) -> Result<Persona, GenerationError> {
        self.store
            .persona(persona_id)
            .await
            .map_err(lookup_failed)?
            .ok_or(GenerationError::PersonaNotFound(persona_id))
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        debug!("Generation prompt: {} chars", user.len());
        self.llm
            .complete_json(system, user)
            .await
            .map_err(|e| GenerationError::Provider(e.to_string()))
    }
}

#[async_trait]
impl ContentGenerator for LlmContentGenerator {
    async fn regenerate_messaging(&self, persona_id: AssetId) -> Result<Messaging, GenerationError> {
        let persona = self.load_persona(persona_id).await?;
        let prompt = format!(
            "{}\n\nRespond with exactly this JSON shape:\n{}",
            persona_context(&persona),
            MESSAGING_SHAPE
        );

        let raw = self.complete(MESSAGING_INSTRUCTION, &prompt).await?;
        let draft: MessagingDraft = parse_draft(&raw)?;

        let messaging = Messaging {
            id: Uuid::new_v4(),
            persona_id,
            headline: draft.headline,
            elevator_pitch: draft.elevator_pitch,
            viral_taglines: draft.viral_taglines,
            created_at: Utc::now(),
        };
        self.store
            .insert_messaging(&messaging)
            .await
            .map_err(|e| GenerationError::Storage(e.to_string()))?;

        Ok(messaging)
    }

    async fn regenerate_script(
        &self,
        persona_id: AssetId,
        messaging_id: AssetId,
        platform_hint: &str,
    ) -> Result<Script, GenerationError> {
        let (persona, messaging) = tokio::join!(
            self.load_persona(persona_id),
            self.store.messaging(messaging_id)
        );
        let persona = persona?;
        let messaging = messaging
            .map_err(lookup_failed)?
            .ok_or(GenerationError::MessagingNotFound(messaging_id))?;

        let prompt = format!(
            "{}\n\nPlatform: {}\nHeadline: {}\nElevator pitch: {}\nTaglines: {}\n\n\
             Respond with exactly this JSON shape:\n{}",
            persona_context(&persona),
            platform_hint,
            messaging.headline,
            messaging.elevator_pitch,
            messaging.viral_taglines.join(" | "),
            SCRIPT_SHAPE
        );

        let raw = self.complete(SCRIPT_INSTRUCTION, &prompt).await?;
        let draft: ScriptDraft = parse_draft(&raw)?;

        let script = Script {
            id: Uuid::new_v4(),
            persona_id,
            messaging_id: Some(messaging_id),
            platform: platform_hint.to_string(),
            sections: ScriptSections::new(draft.hook, draft.body, draft.cta),
            created_at: Utc::now(),
        };
        self.store
            .insert_script(&script)
            .await
            .map_err(|e| GenerationError::Storage(e.to_string()))?;

        Ok(script)
    }
}
