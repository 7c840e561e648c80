//! Client for the external language-model judge.
//!
//! The judge is the one collaborator used twice: once to score candidate
//! events and once per follow-up question. Both uses go through the same
//! [`Judge::complete`] call — plain text in, plain text out. The judge is
//! never assumed to support structured output; recovering structure from
//! its replies is the pipeline crate's job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_TOKENS: u32 = 2000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Errors from a judge round-trip
#[derive(Error, Debug)]
pub enum JudgeError {
    /// Network failure or timeout before a response arrived
    #[error("judge unreachable: {0}")]
    Unreachable(String),

    /// The judge endpoint answered with a non-success status
    #[error("judge returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// A well-formed response with no usable message content
    #[error("judge reply missing content")]
    EmptyReply,
}

/// One message in a judge conversation
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// The judge collaborator boundary.
///
/// `system` carries the instructions (and any grounding context); `history`
/// carries the ordered message sequence ending with the newest user turn.
/// Implementations return the judge's raw text reply.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn complete(&self, system: &str, history: &[ChatMessage]) -> Result<String, JudgeError>;
}

/// HTTP judge speaking the chat-completions wire format.
pub struct ChatJudge {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatJudge {
    /// Build a judge with an explicit endpoint, model and credential.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Build a judge from `LLM_ENDPOINT`, `LLM_MODEL`, `LLM_API_KEY`,
    /// `LLM_TEMPERATURE` and `LLM_MAX_TOKENS`, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("LLM_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_key = std::env::var("LLM_API_KEY").ok();
        let temperature = std::env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse::<f32>().ok())
            .unwrap_or(DEFAULT_TEMPERATURE);
        let max_tokens = std::env::var("LLM_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let mut judge = Self::new(base_url, model, api_key);
        judge.temperature = temperature;
        judge.max_tokens = max_tokens;
        judge
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl Judge for ChatJudge {
    async fn complete(&self, system: &str, history: &[ChatMessage]) -> Result<String, JudgeError> {
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/chat/completions");

        let mut messages = vec![json!({ "role": "system", "content": system })];
        for msg in history {
            messages.push(json!({ "role": msg.role, "content": msg.content }));
        }

        let payload = json!({
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "messages": messages,
        });

        debug!("judge call: {} messages to {}", history.len() + 1, url);

        let mut request = self.client.post(url).timeout(REQUEST_TIMEOUT).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| JudgeError::Unreachable(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| JudgeError::Unreachable(err.to_string()))?;

        if !status.is_success() {
            return Err(JudgeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|err| JudgeError::Unreachable(err.to_string()))?;

        extract_content(&value).ok_or(JudgeError::EmptyReply)
    }
}

/// Pull the assistant text out of a chat-completions response body.
fn extract_content(value: &Value) -> Option<String> {
    value
        .get("choices")
        .and_then(|choices| choices.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content_happy_path() {
        let body = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  [{\"id\":\"a\"}]  " } }
            ]
        });
        assert_eq!(extract_content(&body).as_deref(), Some("[{\"id\":\"a\"}]"));
    }

    #[test]
    fn test_extract_content_missing_choices() {
        assert_eq!(extract_content(&json!({ "error": "rate limited" })), None);
        assert_eq!(extract_content(&json!({ "choices": [] })), None);
    }

    #[test]
    fn test_extract_content_empty_string_is_none() {
        let body = json!({
            "choices": [ { "message": { "content": "   " } } ]
        });
        assert_eq!(extract_content(&body), None);
    }

    #[test]
    fn test_chat_message_constructors() {
        assert_eq!(ChatMessage::user("hi").role, "user");
        assert_eq!(ChatMessage::assistant("hello").role, "assistant");
    }
}
