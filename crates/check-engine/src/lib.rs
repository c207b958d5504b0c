//! Check Engine - deterministic consistency gate over resolved assets
//!
//! Runs before any LLM grading: referential integrity between the persona
//! and its messaging/script/blog outline (errors), plus size and shape
//! heuristics on each asset (warnings). All findings are collected so the
//! caller sees every problem at once.

pub mod rules;

use shared_types::{AssetBundle, HardCheckResult, ValidationRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Blocks the pass
    Error,
    /// Reported, never blocks
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// HardCheckEngine entry point
pub struct HardCheckEngine;

impl HardCheckEngine {
    pub fn new() -> Self {
        Self
    }

    /// Check the assets resolved for `request`. Only a missing persona
    /// short-circuits; everything else accumulates.
    pub fn check(&self, request: &ValidationRequest, assets: &AssetBundle) -> HardCheckResult {
        if assets.persona.is_none() {
            return HardCheckResult::persona_not_found();
        }

        let findings = self.collect_findings(request, assets);

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for finding in findings {
            match finding.severity {
                Severity::Error => errors.push(finding.message),
                Severity::Warning => warnings.push(finding.message),
            }
        }

        HardCheckResult::from_findings(errors, warnings)
    }

    fn collect_findings(&self, request: &ValidationRequest, assets: &AssetBundle) -> Vec<Finding> {
        let mut findings = Vec::new();

        findings.extend(rules::referential::check_references(request, assets));
        findings.extend(rules::referential::check_unresolved(request, assets));

        if let Some(messaging) = &assets.messaging {
            findings.extend(rules::messaging::check_messaging(messaging));
        }
        if let Some(script) = &assets.script {
            findings.extend(rules::script::check_script(script));
        }
        if let Some(outline) = &assets.blog_outline {
            findings.extend(rules::blog_outline::check_blog_outline(outline));
        }

        findings
    }
}

impl Default for HardCheckEngine {
    fn default() -> Self {
        Self::new()
    }
}
