// Referential integrity between the requested persona/messaging and the
// resolved assets.
use shared_types::{AssetBundle, ValidationRequest};

use crate::Finding;

/// Every resolved asset must point back at the requested persona, and
/// scripts/outlines at the requested messaging when one was supplied.
pub fn check_references(request: &ValidationRequest, assets: &AssetBundle) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Some(messaging) = &assets.messaging {
        if messaging.persona_id != request.persona_id {
            findings.push(Finding::error(
                "Messaging does not belong to the selected persona.",
            ));
        }
    }

    if let Some(script) = &assets.script {
        if script.persona_id != request.persona_id {
            findings.push(Finding::error(
                "Script does not belong to the selected persona.",
            ));
        }
        if let Some(messaging_id) = request.messaging_id {
            if script.messaging_id != Some(messaging_id) {
                findings.push(Finding::error(
                    "Script is not linked to the selected messaging.",
                ));
            }
        }
    }

    if let Some(outline) = &assets.blog_outline {
        if outline.persona_id != request.persona_id {
            findings.push(Finding::error(
                "Blog outline does not belong to the selected persona.",
            ));
        }
        if let Some(messaging_id) = request.messaging_id {
            if outline.messaging_id != Some(messaging_id) {
                findings.push(Finding::error(
                    "Blog outline is not linked to the selected messaging.",
                ));
            }
        }
    }

    findings
}

/// Ids that were supplied but resolved to nothing. Their checks are skipped,
/// so this only records the skip.
pub fn check_unresolved(request: &ValidationRequest, assets: &AssetBundle) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let (Some(id), None) = (request.messaging_id, &assets.messaging) {
        findings.push(Finding::warning(format!(
            "Messaging {} not found; its checks were skipped.",
            id
        )));
    }
    if let (Some(id), None) = (request.script_id, &assets.script) {
        findings.push(Finding::warning(format!(
            "Script {} not found; its checks were skipped.",
            id
        )));
    }
    if let (Some(id), None) = (request.blog_outline_id, &assets.blog_outline) {
        findings.push(Finding::warning(format!(
            "Blog outline {} not found; its checks were skipped.",
            id
        )));
    }

    findings
}
