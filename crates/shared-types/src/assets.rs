//! Content records validated together by the consistency pipeline.
//!
//! Records are produced by the generators and read back through the asset
//! store; the pipeline never mutates them, it only creates new rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AssetId = Uuid;

/// Target customer profile that every other asset is written for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: AssetId,
    pub name: String,
    /// Product or offer the persona is being marketed
    pub product: String,
    /// Audience description (demographics, pains, goals)
    pub audience: String,
    /// Free-form generator output kept for prompts
    #[serde(default)]
    pub attributes: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Core messaging: headline, pitch and short taglines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Messaging {
    pub id: AssetId,
    pub persona_id: AssetId,
    pub headline: String,
    #[serde(rename = "elevator_pitch")]
    pub elevator_pitch: String,
    #[serde(rename = "viral_taglines", default)]
    pub viral_taglines: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Short-form video script, stored as three explicit sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub id: AssetId,
    pub persona_id: AssetId,
    pub messaging_id: Option<AssetId>,
    /// Target platform, e.g. "tiktok" or "reels"
    pub platform: String,
    pub sections: ScriptSections,
    pub created_at: DateTime<Utc>,
}

impl Script {
    /// Labeled text rendering used in prompts and by the UI.
    pub fn content(&self) -> String {
        self.sections.to_labeled()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Hook,
    Body,
    Cta,
}

impl Section {
    fn from_label(line: &str) -> Option<Self> {
        if !line.starts_with('[') || !line.contains(']') {
            return None;
        }
        let upper = line.to_uppercase();
        if upper.starts_with("[HOOK") {
            Some(Section::Hook)
        } else if upper.starts_with("[BODY") {
            Some(Section::Body)
        } else if upper.starts_with("[CTA") {
            Some(Section::Cta)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSections {
    pub hook: String,
    pub body: String,
    pub cta: String,
}

impl ScriptSections {
    pub fn new(
        hook: impl Into<String>,
        body: impl Into<String>,
        cta: impl Into<String>,
    ) -> Self {
        Self {
            hook: hook.into(),
            body: body.into(),
            cta: cta.into(),
        }
    }

    /// Reads the legacy flattened format: a `[HOOK...]`, `[BODY...]` or
    /// `[CTA...]` label line followed by its text up to the next blank line.
    /// Missing sections stay empty.
    pub fn parse_labeled(text: &str) -> Self {
        let mut sections = Self::default();
        let mut active: Option<Section> = None;

        for line in text.lines() {
            let trimmed = line.trim();

            if let Some(section) = Section::from_label(trimmed) {
                active = Some(section);
                let rest = trimmed
                    .split_once(']')
                    .map(|(_, rest)| rest.trim())
                    .unwrap_or("");
                if !rest.is_empty() {
                    sections.append(section, rest);
                }
                continue;
            }

            let Some(section) = active else {
                continue;
            };

            if trimmed.is_empty() {
                // Blank lines before the first text line belong to the label
                if !sections.slot(section).is_empty() {
                    active = None;
                }
            } else {
                sections.append(section, trimmed);
            }
        }

        sections
    }

    pub fn to_labeled(&self) -> String {
        format!(
            "[HOOK]\n{}\n\n[BODY]\n{}\n\n[CTA]\n{}\n",
            self.hook.trim(),
            self.body.trim(),
            self.cta.trim()
        )
    }

    /// Total whitespace-separated words across all three sections.
    pub fn word_count(&self) -> usize {
        [&self.hook, &self.body, &self.cta]
            .iter()
            .map(|s| s.split_whitespace().count())
            .sum()
    }

    fn slot(&self, section: Section) -> &String {
        match section {
            Section::Hook => &self.hook,
            Section::Body => &self.body,
            Section::Cta => &self.cta,
        }
    }

    fn append(&mut self, section: Section, text: &str) {
        let slot = match section {
            Section::Hook => &mut self.hook,
            Section::Body => &mut self.body,
            Section::Cta => &mut self.cta,
        };
        if !slot.is_empty() {
            slot.push('\n');
        }
        slot.push_str(text);
    }
}

/// Long-form blog plan tied to a persona and (usually) a messaging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogOutline {
    pub id: AssetId,
    pub persona_id: AssetId,
    pub messaging_id: Option<AssetId>,
    pub title: String,
    pub outline: BlogOutlineBody,
    pub created_at: DateTime<Utc>,
}

/// Structured outline as emitted by the blog generator. Fields the
/// generator left out deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogOutlineBody {
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub sections: Vec<serde_json::Value>,
    #[serde(default)]
    pub seo_keywords: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Assets resolved for one validation request. `None` means the id was
/// not supplied or did not resolve to a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBundle {
    pub persona: Option<Persona>,
    pub messaging: Option<Messaging>,
    pub script: Option<Script>,
    pub blog_outline: Option<BlogOutline>,
}
