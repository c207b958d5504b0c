//! Request and result types for global validation and auto-fix.
//!
//! All of these are request-scoped values: computed, returned and dropped.

use serde::{Deserialize, Serialize};

use crate::assets::AssetId;

/// Ids of the assets to validate together. Only the persona is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    pub persona_id: AssetId,
    #[serde(default)]
    pub messaging_id: Option<AssetId>,
    #[serde(default)]
    pub script_id: Option<AssetId>,
    #[serde(default)]
    pub blog_outline_id: Option<AssetId>,
}

impl ValidationRequest {
    pub fn for_persona(persona_id: AssetId) -> Self {
        Self {
            persona_id,
            messaging_id: None,
            script_id: None,
            blog_outline_id: None,
        }
    }

    pub fn with_messaging(mut self, id: AssetId) -> Self {
        self.messaging_id = Some(id);
        self
    }

    pub fn with_script(mut self, id: AssetId) -> Self {
        self.script_id = Some(id);
        self
    }

    pub fn with_blog_outline(mut self, id: AssetId) -> Self {
        self.blog_outline_id = Some(id);
        self
    }
}

/// Outcome of the deterministic checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardCheckResult {
    pub pass: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl HardCheckResult {
    /// `pass` is derived from `errors`; warnings never affect it.
    pub fn from_findings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            pass: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn persona_not_found() -> Self {
        Self::from_findings(vec!["Persona not found.".to_string()], Vec::new())
    }
}

/// Grader scores, each an integer in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiCheckScores {
    pub overall_consistency_score: u8,
    pub product_alignment_score: u8,
    pub audience_alignment_score: u8,
    pub tone_consistency_score: u8,
    pub feature_mention_consistency_score: u8,
}

impl AiCheckScores {
    /// Overall score scaled to `[0, 1]` for threshold comparison.
    pub fn overall_ratio(&self) -> f64 {
        f64::from(self.overall_consistency_score) / 100.0
    }

    pub fn sub_score_mean(&self) -> f64 {
        let sum = u32::from(self.product_alignment_score)
            + u32::from(self.audience_alignment_score)
            + u32::from(self.tone_consistency_score)
            + u32::from(self.feature_mention_consistency_score);
        f64::from(sum) / 4.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiCheckResult {
    pub scores: AiCheckScores,
    pub issues: Vec<String>,
    pub suggested_fixes: Vec<String>,
}

/// One validation pass. `ai_checks` is `None` when hard checks failed or
/// the grader was unavailable; an empty-but-present result means the grader
/// answered and found nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalValidationResult {
    pub hard_checks: HardCheckResult,
    pub ai_checks: Option<AiCheckResult>,
}

/// Why an auto-fix run ended where it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoFixOutcome {
    HardChecksFailed,
    GraderUnavailable,
    AboveThreshold,
    /// Below threshold, but the flags left nothing to regenerate
    NothingRegenerated,
    Fixed,
}

/// Ids of records created during an auto-fix run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_id: Option<AssetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_id: Option<AssetId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoFixResult {
    pub hard_checks: HardCheckResult,
    pub ai_checks: Option<AiCheckResult>,
    pub auto_fix_applied: bool,
    pub outcome: AutoFixOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_ids: Option<UpdatedIds>,
}

impl AutoFixResult {
    /// Report a run that stopped before regenerating anything.
    pub fn unchanged(validation: GlobalValidationResult, outcome: AutoFixOutcome) -> Self {
        Self {
            hard_checks: validation.hard_checks,
            ai_checks: validation.ai_checks,
            auto_fix_applied: false,
            outcome,
            updated_ids: None,
        }
    }

    /// Report a run that regenerated content; `validation` must be the
    /// post-regeneration pass.
    pub fn fixed(validation: GlobalValidationResult, updated_ids: UpdatedIds) -> Self {
        Self {
            hard_checks: validation.hard_checks,
            ai_checks: validation.ai_checks,
            auto_fix_applied: true,
            outcome: AutoFixOutcome::Fixed,
            updated_ids: Some(updated_ids),
        }
    }
}
