// Shape checks for blog outlines
use shared_types::BlogOutline;

use super::{trimmed_len, MIN_TEXT_CHARS};
use crate::Finding;

pub const MIN_SECTIONS: usize = 6;
pub const MAX_SECTIONS: usize = 12;
pub const MIN_SEO_KEYWORDS: usize = 6;
pub const MAX_SEO_KEYWORDS: usize = 15;

pub fn check_blog_outline(outline: &BlogOutline) -> Vec<Finding> {
    let mut findings = Vec::new();

    let title = trimmed_len(&outline.title);
    if title < MIN_TEXT_CHARS {
        findings.push(Finding::warning(format!(
            "Blog outline title is too short ({} chars); minimum {}.",
            title, MIN_TEXT_CHARS
        )));
    }

    let meta = outline
        .outline
        .meta_description
        .as_deref()
        .map(trimmed_len)
        .unwrap_or(0);
    if meta < MIN_TEXT_CHARS {
        findings.push(Finding::warning(format!(
            "Blog outline meta_description is missing or too short ({} chars); minimum {}.",
            meta, MIN_TEXT_CHARS
        )));
    }

    findings.extend(check_count(
        "sections",
        outline.outline.sections.len(),
        MIN_SECTIONS,
        MAX_SECTIONS,
    ));
    findings.extend(check_count(
        "SEO keywords",
        outline.outline.seo_keywords.len(),
        MIN_SEO_KEYWORDS,
        MAX_SEO_KEYWORDS,
    ));

    findings
}

fn check_count(what: &str, count: usize, min: usize, max: usize) -> Option<Finding> {
    if count < min {
        Some(Finding::warning(format!(
            "Blog outline has too few {} ({}); expected {}-{}.",
            what, count, min, max
        )))
    } else if count > max {
        Some(Finding::warning(format!(
            "Blog outline has too many {} ({}); expected {}-{}.",
            what, count, min, max
        )))
    } else {
        None
    }
}
