// Content-quality heuristics for short-form video scripts
use shared_types::Script;

use super::{trimmed_len, MIN_TEXT_CHARS};
use crate::Finding;

/// Word range for a 30-45 second read (target is roughly 80-120 words).
pub const MIN_SCRIPT_WORDS: usize = 60;
pub const MAX_SCRIPT_WORDS: usize = 150;

pub fn check_script(script: &Script) -> Vec<Finding> {
    let mut findings = Vec::new();
    let sections = &script.sections;

    for (name, text) in [
        ("hook", &sections.hook),
        ("body", &sections.body),
        ("cta", &sections.cta),
    ] {
        let len = trimmed_len(text);
        if len < MIN_TEXT_CHARS {
            findings.push(Finding::warning(format!(
                "Script {} section is missing or too short ({} chars); minimum {}.",
                name, len, MIN_TEXT_CHARS
            )));
        }
    }

    let words = sections.word_count();
    if words < MIN_SCRIPT_WORDS {
        findings.push(Finding::warning(format!(
            "Script is too short ({} words); expected {}-{}.",
            words, MIN_SCRIPT_WORDS, MAX_SCRIPT_WORDS
        )));
    } else if words > MAX_SCRIPT_WORDS {
        findings.push(Finding::warning(format!(
            "Script is too long ({} words); expected {}-{}.",
            words, MIN_SCRIPT_WORDS, MAX_SCRIPT_WORDS
        )));
    }

    findings
}
