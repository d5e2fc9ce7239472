//! Minimal chat-completions client.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AgentConfig;
use crate::error::AgentError;

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Works against hosted APIs and local servers (Ollama, vLLM, etc.); the
/// bearer token is only attached when configured.
#[derive(Clone)]
pub struct ChatClient {
    inner: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatClient {
    /// Create a client from the agent configuration.
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            api_key: config.llm_api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Send a single-message completion request and return the first
    /// choice's trimmed content.
    pub async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %self.model, prompt_len = prompt.len(), "chat request");

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self.inner.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(AgentError::Endpoint(response.status()));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| AgentError::MalformedResponse("reply carried no choices".to_string()))
    }
}

/// Strip a surrounding markdown code fence, if any.
///
/// Models regularly wrap both JSON plans and whole-file rewrites in
/// ```lang fences even when told not to.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") up to the first newline.
    let Some(newline) = rest.find('\n') else {
        return trimmed;
    };
    let body = rest[newline + 1..].trim_end();
    match body.strip_suffix("```") {
        Some(inner) => inner.trim_end(),
        None => trimmed,
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shape() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":" hi there \n"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.trim(), "hi there");
    }

    #[test]
    fn test_strip_fenced_block() {
        let fenced = "```json\n[{\"a\": 1}]\n```";
        assert_eq!(strip_code_fence(fenced), "[{\"a\": 1}]");
    }

    #[test]
    fn test_strip_leaves_bare_text_alone() {
        assert_eq!(strip_code_fence("  plain reply  "), "plain reply");
    }

    #[test]
    fn test_unclosed_fence_is_left_alone() {
        let unclosed = "```json\n[1, 2";
        assert_eq!(strip_code_fence(unclosed), unclosed);
    }
}
