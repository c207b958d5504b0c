//! Hard checks first, AI grading only when they pass.

use std::future::Future;
use std::sync::Arc;

use check_engine::HardCheckEngine;
use shared_types::{AssetBundle, AssetId, GlobalValidationResult, ValidationRequest};
use tracing::info;

use crate::collaborators::AssetLookup;
use crate::error::LookupError;
use crate::scorer::AiConsistencyScorer;

/// One validation pass together with the assets it was computed from.
#[derive(Debug, Clone)]
pub struct ValidationPass {
    pub result: GlobalValidationResult,
    pub assets: AssetBundle,
}

pub struct ValidationCoordinator {
    lookup: Arc<dyn AssetLookup>,
    engine: HardCheckEngine,
    scorer: AiConsistencyScorer,
}

async fn fetch_optional<T, F, Fut>(id: Option<AssetId>, fetch: F) -> Result<Option<T>, LookupError>
where
    F: FnOnce(AssetId) -> Fut,
    Fut: Future<Output = Result<Option<T>, LookupError>>,
{
    match id {
        Some(id) => fetch(id).await,
        None => Ok(None),
    }
}

impl ValidationCoordinator {
    pub fn new(lookup: Arc<dyn AssetLookup>, scorer: AiConsistencyScorer) -> Self {
        Self {
            lookup,
            engine: HardCheckEngine::new(),
            scorer,
        }
    }

    /// Resolve every requested asset once. Lookups are independent and run
    /// concurrently.
    pub async fn resolve(&self, request: &ValidationRequest) -> Result<AssetBundle, LookupError> {
        let lookup = &self.lookup;
        let (persona, messaging, script, blog_outline) = tokio::join!(
            lookup.persona(request.persona_id),
            fetch_optional(request.messaging_id, |id| lookup.messaging(id)),
            fetch_optional(request.script_id, |id| lookup.script(id)),
            fetch_optional(request.blog_outline_id, |id| lookup.blog_outline(id)),
        );

        Ok(AssetBundle {
            persona: persona?,
            messaging: messaging?,
            script: script?,
            blog_outline: blog_outline?,
        })
    }

    pub async fn run(&self, request: &ValidationRequest) -> Result<ValidationPass, LookupError> {
        let assets = self.resolve(request).await?;
        let hard_checks = self.engine.check(request, &assets);

        let ai_checks = if hard_checks.pass {
            self.scorer.score(&assets).await
        } else {
            info!(
                "Hard checks failed for persona {} ({} errors); skipping AI grading",
                request.persona_id,
                hard_checks.errors.len()
            );
            None
        };

        Ok(ValidationPass {
            result: GlobalValidationResult {
                hard_checks,
                ai_checks,
            },
            assets,
        })
    }

    pub async fn validate(
        &self,
        request: &ValidationRequest,
    ) -> Result<GlobalValidationResult, LookupError> {
        Ok(self.run(request).await?.result)
    }
}
