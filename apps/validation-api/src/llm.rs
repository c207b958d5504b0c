//! OpenAI-compatible chat-completions client
//!
//! Used for grading and for content regeneration. Every call asks for a
//! JSON object response and returns the raw message content.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::debug;
use validation_core::{GradingClient, GradingError};

#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Per-request HTTP timeout; the grading deadline is applied on top
    pub request_timeout: Duration,
}

pub struct ChatClient {
    client: Client,
    config: ChatClientConfig,
}

impl ChatClient {
    pub fn new(config: ChatClientConfig) -> Self {
        let client = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GradingClient for ChatClient {
    async fn complete_json(&self, system: &str, user: &str) -> Result<String, GradingError> {
        let payload = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": 0.2,
            "response_format": {"type": "json_object"},
        });

        let mut request = self.client.post(self.endpoint()).json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GradingError::Timeout(self.config.request_timeout)
            } else {
                GradingError::Transport(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(provider_error(status, body));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GradingError::InvalidResponse(format!("malformed completion: {}", e)))?;

        let content = message_content(&body)?;
        debug!("Completion from {}: {} chars", self.config.model, content.len());
        Ok(content)
    }
}

fn provider_error(status: StatusCode, body: String) -> GradingError {
    GradingError::Provider {
        status: status.as_u16(),
        message: if body.is_empty() {
            status.to_string()
        } else {
            body
        },
    }
}

fn message_content(body: &serde_json::Value) -> Result<String, GradingError> {
    body.pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| GradingError::InvalidResponse("completion has no message content".into()))
}
