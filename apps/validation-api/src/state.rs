//! Application state for the validation API

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use validation_core::{
    AiConsistencyScorer, AssetLookup, ContentGenerator, GradingClient, RegenerationOrchestrator,
    RetryPolicy, ValidationCoordinator,
};

use crate::generator::LlmContentGenerator;
use crate::llm::{ChatClient, ChatClientConfig};
use crate::store::SqliteAssetStore;

/// Tunables shared by grading and regeneration.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub grading_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            grading_timeout: validation_core::DEFAULT_GRADING_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

pub struct AppState {
    pub coordinator: Arc<ValidationCoordinator>,
    pub orchestrator: Arc<RegenerationOrchestrator>,
}

impl AppState {
    /// Wire the pipeline from its collaborators.
    pub fn from_parts(
        lookup: Arc<dyn AssetLookup>,
        grader: Arc<dyn GradingClient>,
        generator: Arc<dyn ContentGenerator>,
        settings: PipelineSettings,
    ) -> Self {
        let scorer = AiConsistencyScorer::new(grader)
            .with_timeout(settings.grading_timeout)
            .with_retry(settings.retry);
        let coordinator = Arc::new(ValidationCoordinator::new(lookup, scorer));
        let orchestrator = Arc::new(
            RegenerationOrchestrator::new(coordinator.clone(), generator)
                .with_retry(settings.retry),
        );

        Self {
            coordinator,
            orchestrator,
        }
    }

    /// Open the database and build the LLM-backed collaborators.
    pub async fn connect(
        database_url: &str,
        llm: ChatClientConfig,
        settings: PipelineSettings,
    ) -> Result<Self> {
        let store = Arc::new(SqliteAssetStore::connect(database_url).await?);
        let llm: Arc<dyn GradingClient> = Arc::new(ChatClient::new(llm));
        let generator = Arc::new(LlmContentGenerator::new(llm.clone(), store.clone()));

        Ok(Self::from_parts(store, llm, generator, settings))
    }
}
