//! LLM-graded cross-asset consistency scoring.
//!
//! Grading is advisory: every failure (transport, timeout, provider error,
//! unparsable or malformed payload) ends in `None`, never in an error.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_types::{
    AiCheckResult, AiCheckScores, AssetBundle, BlogOutline, Messaging, Persona, Script,
};
use tracing::{debug, info, warn};

use crate::collaborators::GradingClient;
use crate::error::GradingError;
use crate::retry::RetryPolicy;

pub const DEFAULT_GRADING_TIMEOUT: Duration = Duration::from_secs(30);

/// Sub-score mean vs overall gap above which the grade is logged as loose.
const DIVERGENCE_LOG_THRESHOLD: f64 = 25.0;

pub const SYSTEM_INSTRUCTION: &str = "You are a strict marketing quality auditor. \
You check that a persona and the marketing assets written for it are consistent \
in product, audience, tone and feature mentions. Respond ONLY in JSON.";

const RESPONSE_SHAPE: &str = r#"{
  "scores": {
    "overallConsistencyScore": <integer 0-100>,
    "productAlignmentScore": <integer 0-100>,
    "audienceAlignmentScore": <integer 0-100>,
    "toneConsistencyScore": <integer 0-100>,
    "featureMentionConsistencyScore": <integer 0-100>
  },
  "issues": ["<string>"],
  "suggestedFixes": ["<string>"]
}"#;

/// Result of reading a grader payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeParse {
    Valid(AiCheckResult),
    Invalid(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradeWire {
    scores: ScoresWire,
    issues: Vec<String>,
    suggested_fixes: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoresWire {
    overall_consistency_score: u64,
    product_alignment_score: u64,
    audience_alignment_score: u64,
    tone_consistency_score: u64,
    feature_mention_consistency_score: u64,
}

fn score(name: &str, value: u64) -> Result<u8, String> {
    match u8::try_from(value) {
        Ok(v) if v <= 100 => Ok(v),
        _ => Err(format!("{} out of range: {}", name, value)),
    }
}

impl ScoresWire {
    fn validate(self) -> Result<AiCheckScores, String> {
        Ok(AiCheckScores {
            overall_consistency_score: score(
                "overallConsistencyScore",
                self.overall_consistency_score,
            )?,
            product_alignment_score: score("productAlignmentScore", self.product_alignment_score)?,
            audience_alignment_score: score(
                "audienceAlignmentScore",
                self.audience_alignment_score,
            )?,
            tone_consistency_score: score("toneConsistencyScore", self.tone_consistency_score)?,
            feature_mention_consistency_score: score(
                "featureMentionConsistencyScore",
                self.feature_mention_consistency_score,
            )?,
        })
    }
}

/// Strip a surrounding markdown code fence, which some models add even
/// when asked for a bare object.
pub fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parse and validate a grader payload. Anything that does not match the
/// required shape exactly is `Invalid`.
pub fn parse_grade(raw: &str) -> GradeParse {
    let body = strip_fence(raw);
    if body.is_empty() {
        return GradeParse::Invalid("empty response".to_string());
    }

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => return GradeParse::Invalid(format!("not JSON: {}", e)),
    };
    if !value.is_object() {
        return GradeParse::Invalid("response is not a JSON object".to_string());
    }

    let wire: GradeWire = match serde_json::from_value(value) {
        Ok(wire) => wire,
        Err(e) => return GradeParse::Invalid(format!("unexpected shape: {}", e)),
    };

    match wire.scores.validate() {
        Ok(scores) => GradeParse::Valid(AiCheckResult {
            scores,
            issues: wire.issues,
            suggested_fixes: wire.suggested_fixes,
        }),
        Err(reason) => GradeParse::Invalid(reason),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScriptContext<'a> {
    #[serde(flatten)]
    script: &'a Script,
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GradingContext<'a> {
    persona: &'a Persona,
    #[serde(skip_serializing_if = "Option::is_none")]
    messaging: Option<&'a Messaging>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<ScriptContext<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blog_outline: Option<&'a BlogOutline>,
}

/// Build the user prompt: product/audience context, every asset as compact
/// JSON, and the required response shape.
pub fn build_user_prompt(persona: &Persona, assets: &AssetBundle) -> String {
    let context = GradingContext {
        persona,
        messaging: assets.messaging.as_ref(),
        script: assets.script.as_ref().map(|script| ScriptContext {
            script,
            content: script.content(),
        }),
        blog_outline: assets.blog_outline.as_ref(),
    };
    let assets_json = serde_json::to_string(&context).unwrap_or_else(|_| "{}".to_string());

    format!(
        "Product: {product}\nAudience: {audience}\n\n\
         Grade how consistently the following assets describe the same product \
         to the same audience with the same tone and feature set.\n\n\
         ASSETS (JSON):\n{assets_json}\n\n\
         Respond with exactly this JSON shape:\n{RESPONSE_SHAPE}",
        product = persona.product,
        audience = persona.audience,
    )
}

pub struct AiConsistencyScorer {
    client: Arc<dyn GradingClient>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl AiConsistencyScorer {
    pub fn new(client: Arc<dyn GradingClient>) -> Self {
        Self {
            client,
            timeout: DEFAULT_GRADING_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Grade the bundle. `None` when the persona is missing or the grader
    /// could not produce a valid answer within the retry budget.
    pub async fn score(&self, assets: &AssetBundle) -> Option<AiCheckResult> {
        let persona = assets.persona.as_ref()?;
        let prompt = build_user_prompt(persona, assets);
        debug!("Grading prompt: {} chars", prompt.len());

        let client = &self.client;
        let timeout = self.timeout;
        let prompt = prompt.as_str();

        let outcome = self
            .retry
            .run("consistency grading", move || async move {
                let call = client.complete_json(SYSTEM_INSTRUCTION, prompt);
                let raw = match tokio::time::timeout(timeout, call).await {
                    Ok(Ok(raw)) => raw,
                    Ok(Err(e)) => return Err(e),
                    Err(_) => return Err(GradingError::Timeout(timeout)),
                };
                match parse_grade(&raw) {
                    GradeParse::Valid(result) => Ok(result),
                    GradeParse::Invalid(reason) => Err(GradingError::InvalidResponse(reason)),
                }
            })
            .await;

        match outcome {
            Ok(result) => {
                let scores = &result.scores;
                let mean = scores.sub_score_mean();
                if (f64::from(scores.overall_consistency_score) - mean).abs()
                    > DIVERGENCE_LOG_THRESHOLD
                {
                    debug!(
                        "Overall score {} diverges from sub-score mean {:.1}",
                        scores.overall_consistency_score, mean
                    );
                }
                info!(
                    "Consistency grade for persona {}: {}",
                    persona.id, scores.overall_consistency_score
                );
                Some(result)
            }
            Err(e) => {
                warn!("Consistency grading unavailable for persona {}: {}", persona.id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, ScriptedGrader};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn grade_json(overall: u64) -> String {
        json!({
            "scores": {
                "overallConsistencyScore": overall,
                "productAlignmentScore": 80,
                "audienceAlignmentScore": 75,
                "toneConsistencyScore": 90,
                "featureMentionConsistencyScore": 70
            },
            "issues": ["Tagline 2 mentions a feature the product lacks"],
            "suggestedFixes": ["Drop the offline-mode claim"]
        })
        .to_string()
    }

    fn fast_scorer(grader: Arc<ScriptedGrader>) -> AiConsistencyScorer {
        AiConsistencyScorer::new(grader).with_retry(
            RetryPolicy::default()
                .with_attempts(2)
                .with_initial_backoff(Duration::ZERO),
        )
    }

    #[test]
    fn test_parse_valid_grade() {
        let GradeParse::Valid(result) = parse_grade(&grade_json(82)) else {
            panic!("expected valid grade");
        };
        assert_eq!(result.scores.overall_consistency_score, 82);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.suggested_fixes, vec!["Drop the offline-mode claim".to_string()]);
    }

    #[test]
    fn test_parse_accepts_fenced_json() {
        let fenced = format!("```json\n{}\n```", grade_json(70));
        assert!(matches!(parse_grade(&fenced), GradeParse::Valid(_)));
    }

    #[test]
    fn test_parse_rejects_missing_keys() {
        let raw = json!({ "scores": { "overallConsistencyScore": 90 } }).to_string();
        assert!(matches!(parse_grade(&raw), GradeParse::Invalid(_)));
    }

    #[test]
    fn test_parse_rejects_out_of_range_and_fractional_scores() {
        assert!(matches!(parse_grade(&grade_json(101)), GradeParse::Invalid(_)));

        let fractional = grade_json(50).replace(
            "\"overallConsistencyScore\":50",
            "\"overallConsistencyScore\":50.5",
        );
        assert!(matches!(parse_grade(&fractional), GradeParse::Invalid(_)));
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(parse_grade("[1,2,3]"), GradeParse::Invalid(_)));
        assert!(matches!(parse_grade("Sure! Here is the JSON"), GradeParse::Invalid(_)));
        assert!(matches!(parse_grade("   "), GradeParse::Invalid(_)));
    }

    #[test]
    fn test_prompt_embeds_context_and_shape() {
        let bundle = fixtures::consistent_bundle();
        let persona = bundle.persona.as_ref().unwrap();
        let prompt = build_user_prompt(persona, &bundle);

        assert!(prompt.contains(&format!("Product: {}", persona.product)));
        assert!(prompt.contains(&format!("Audience: {}", persona.audience)));
        assert!(prompt.contains("viral_taglines"));
        assert!(prompt.contains("[HOOK]"));
        assert!(prompt.contains("seo_keywords"));
        assert!(prompt.contains("featureMentionConsistencyScore"));
    }

    #[tokio::test]
    async fn test_score_returns_valid_grade() {
        let grader = Arc::new(ScriptedGrader::new(vec![Ok(grade_json(64))]));
        let result = fast_scorer(grader.clone())
            .score(&fixtures::consistent_bundle())
            .await
            .expect("grade");

        assert_eq!(result.scores.overall_consistency_score, 64);
        assert_eq!(grader.calls(), 1);
    }

    #[tokio::test]
    async fn test_score_absorbs_provider_failure() {
        let grader = Arc::new(ScriptedGrader::new(vec![
            Err(GradingError::Transport("connection refused".into())),
            Err(GradingError::Transport("connection refused".into())),
        ]));
        let result = fast_scorer(grader.clone())
            .score(&fixtures::consistent_bundle())
            .await;

        assert!(result.is_none());
        assert_eq!(grader.calls(), 2);
    }

    #[tokio::test]
    async fn test_score_retries_malformed_payload_once() {
        let grader = Arc::new(ScriptedGrader::new(vec![
            Ok("{\"scores\": {}}".to_string()),
            Ok(grade_json(88)),
        ]));
        let result = fast_scorer(grader.clone())
            .score(&fixtures::consistent_bundle())
            .await;

        assert_eq!(result.map(|r| r.scores.overall_consistency_score), Some(88));
    }

    #[tokio::test]
    async fn test_score_times_out_into_none() {
        let grader = Arc::new(
            ScriptedGrader::new(vec![Ok(grade_json(90))]).with_delay(Duration::from_millis(200)),
        );
        let scorer = AiConsistencyScorer::new(grader)
            .with_timeout(Duration::from_millis(10))
            .with_retry(RetryPolicy::none());

        assert!(scorer.score(&fixtures::consistent_bundle()).await.is_none());
    }

    #[tokio::test]
    async fn test_score_without_persona_skips_call() {
        let grader = Arc::new(ScriptedGrader::new(vec![Ok(grade_json(90))]));
        let result = fast_scorer(grader.clone()).score(&AssetBundle::default()).await;

        assert!(result.is_none());
        assert_eq!(grader.calls(), 0);
    }
}
