// Content-quality heuristics for messaging
use shared_types::Messaging;

use super::{trimmed_len, MIN_TEXT_CHARS};
use crate::Finding;

pub const MIN_VIRAL_TAGLINES: usize = 3;

/// Flags thin headlines, pitches and taglines. Never produces errors.
pub fn check_messaging(messaging: &Messaging) -> Vec<Finding> {
    let mut findings = Vec::new();

    let headline = trimmed_len(&messaging.headline);
    if headline < MIN_TEXT_CHARS {
        findings.push(Finding::warning(format!(
            "Messaging headline is too short ({} chars); minimum {}.",
            headline, MIN_TEXT_CHARS
        )));
    }

    let pitch = trimmed_len(&messaging.elevator_pitch);
    if pitch < MIN_TEXT_CHARS {
        findings.push(Finding::warning(format!(
            "Messaging elevator pitch is too short ({} chars); minimum {}.",
            pitch, MIN_TEXT_CHARS
        )));
    }

    let taglines = messaging.viral_taglines.len();
    if taglines < MIN_VIRAL_TAGLINES {
        findings.push(Finding::warning(format!(
            "Messaging has too few viral taglines ({}); minimum {}.",
            taglines, MIN_VIRAL_TAGLINES
        )));
    }

    for (index, tagline) in messaging.viral_taglines.iter().enumerate() {
        let len = trimmed_len(tagline);
        if len < MIN_TEXT_CHARS {
            findings.push(Finding::warning(format!(
                "Viral tagline {} is too short ({} chars); minimum {}.",
                index + 1,
                len,
                MIN_TEXT_CHARS
            )));
        }
    }

    findings
}
