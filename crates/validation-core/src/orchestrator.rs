//! Auto-fix: regenerate messaging and/or script when the consistency grade
//! is below threshold, then validate again.
//!
//! Single pass by construction: each asset type is regenerated at most once
//! per call, and the reported result always comes from a fresh validation
//! of whatever ids ended up active.

use std::sync::Arc;

use shared_types::{AutoFixOutcome, AutoFixResult, UpdatedIds, ValidationRequest};
use tracing::info;

use crate::collaborators::ContentGenerator;
use crate::coordinator::ValidationCoordinator;
use crate::error::PipelineError;
use crate::retry::RetryPolicy;

pub const DEFAULT_THRESHOLD: f64 = 0.75;

/// Platform used for script regeneration when no existing script hints one.
pub const DEFAULT_PLATFORM: &str = "tiktok";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoFixOptions {
    /// Minimum acceptable overall score in `[0, 1]`
    pub threshold: f64,
    pub fix_messaging: bool,
    pub fix_script: bool,
}

impl Default for AutoFixOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            fix_messaging: true,
            fix_script: true,
        }
    }
}

pub struct RegenerationOrchestrator {
    coordinator: Arc<ValidationCoordinator>,
    generator: Arc<dyn ContentGenerator>,
    retry: RetryPolicy,
}

impl RegenerationOrchestrator {
    pub fn new(coordinator: Arc<ValidationCoordinator>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            coordinator,
            generator,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Regeneration failures are returned as errors rather than folded into
    /// an unchanged result: by then new rows may already exist.
    pub async fn auto_fix(
        &self,
        request: &ValidationRequest,
        options: &AutoFixOptions,
    ) -> Result<AutoFixResult, PipelineError> {
        let initial = self.coordinator.run(request).await?;

        if !initial.result.hard_checks.pass {
            info!(
                "Auto-fix blocked for persona {}: hard checks failed",
                request.persona_id
            );
            return Ok(AutoFixResult::unchanged(
                initial.result,
                AutoFixOutcome::HardChecksFailed,
            ));
        }

        let overall = match &initial.result.ai_checks {
            Some(ai) => ai.scores.overall_ratio(),
            None => {
                info!(
                    "Auto-fix skipped for persona {}: grader unavailable",
                    request.persona_id
                );
                return Ok(AutoFixResult::unchanged(
                    initial.result,
                    AutoFixOutcome::GraderUnavailable,
                ));
            }
        };

        if overall >= options.threshold {
            info!(
                "Auto-fix not needed for persona {}: score {:.2} >= threshold {:.2}",
                request.persona_id, overall, options.threshold
            );
            return Ok(AutoFixResult::unchanged(
                initial.result,
                AutoFixOutcome::AboveThreshold,
            ));
        }

        info!(
            "Auto-fixing persona {}: score {:.2} < threshold {:.2} (messaging={}, script={})",
            request.persona_id, overall, options.threshold, options.fix_messaging, options.fix_script
        );

        let persona_id = request.persona_id;
        let generator = &self.generator;
        let mut active = request.clone();
        let mut updated = UpdatedIds::default();

        if options.fix_messaging {
            let messaging = self
                .retry
                .run("messaging regeneration", move || {
                    generator.regenerate_messaging(persona_id)
                })
                .await?;
            info!("Regenerated messaging {} for persona {}", messaging.id, persona_id);
            active.messaging_id = Some(messaging.id);
            updated.messaging_id = Some(messaging.id);
        }

        if options.fix_script {
            match active.messaging_id {
                Some(messaging_id) => {
                    let platform = initial
                        .assets
                        .script
                        .as_ref()
                        .map(|script| script.platform.as_str())
                        .filter(|platform| !platform.trim().is_empty())
                        .unwrap_or(DEFAULT_PLATFORM);
                    let script = self
                        .retry
                        .run("script regeneration", move || {
                            generator.regenerate_script(persona_id, messaging_id, platform)
                        })
                        .await?;
                    info!("Regenerated script {} for persona {}", script.id, persona_id);
                    active.script_id = Some(script.id);
                    updated.script_id = Some(script.id);
                }
                None => info!(
                    "Script regeneration skipped for persona {}: no messaging id",
                    persona_id
                ),
            }
        }

        if updated == UpdatedIds::default() {
            return Ok(AutoFixResult::unchanged(
                initial.result,
                AutoFixOutcome::NothingRegenerated,
            ));
        }

        let revalidated = self.coordinator.validate(&active).await?;
        Ok(AutoFixResult::fixed(revalidated, updated))
    }
}
