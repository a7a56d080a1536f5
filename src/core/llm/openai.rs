//! OpenAI chat-completions backend implementation.
//!
//! # API Reference
//!
//! - Endpoint: `POST {base_url}/v1/chat/completions`
//! - Auth: `Authorization: Bearer <api key>`
//! - Request: model, messages (system + user), max_completion_tokens
//!
//! The base URL is configurable so integration tests can stand up a local
//! mock server in place of `https://api.openai.com`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::base::{LlmError, LlmResult, TextGenerator};

/// Path of the chat-completions endpoint, joined onto the configured base URL
pub const OPENAI_CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Default request timeout. Generous for chat completions but bounded, so a
/// hung backend call cannot pin a connection task forever.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error body shape returned by the OpenAI API on non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// =============================================================================
// Client configuration
// =============================================================================

/// Configuration for the OpenAI chat client
#[derive(Debug, Clone)]
pub struct OpenAiChatConfig {
    /// API key (`Authorization: Bearer ...`)
    pub api_key: String,
    /// Base URL of the API, without the endpoint path
    pub base_url: String,
    /// Model identifier, e.g. "gpt-4o-mini"
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
}

impl OpenAiChatConfig {
    /// Create a config with the default timeout
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            api_key,
            base_url,
            model,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// OpenAI chat-completions client implementing the `TextGenerator` trait.
///
/// The inner `reqwest::Client` is reused across requests for connection
/// pooling; the client itself is cheap to clone and safe to share behind an
/// `Arc` across connection handlers.
pub struct OpenAiChat {
    config: OpenAiChatConfig,
    /// HTTP client, reused for connection pooling
    http_client: Client,
    /// Precomputed endpoint URL
    endpoint: String,
}

impl OpenAiChat {
    /// Create a new chat client.
    ///
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(config: OpenAiChatConfig) -> LlmResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let endpoint = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            OPENAI_CHAT_COMPLETIONS_PATH
        );

        Ok(Self {
            config,
            http_client,
            endpoint,
        })
    }

    /// The endpoint this client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for OpenAiChat {
    async fn generate(
        &self,
        system_instruction: &str,
        utterance: &str,
        max_tokens: u32,
    ) -> LlmResult<String> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: utterance,
                },
            ],
            max_completion_tokens: max_tokens,
        };

        debug!(model = %self.config.model, "Sending chat completion request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Backend rate limited the request");
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            // Pull the API error message out of the body when it parses,
            // otherwise fall back to the raw body text.
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> OpenAiChatConfig {
        OpenAiChatConfig::new(
            "sk-test".to_string(),
            "https://api.openai.com".to_string(),
            "gpt-4o-mini".to_string(),
        )
    }

    #[test]
    fn test_endpoint_construction() {
        let client = OpenAiChat::new(test_config()).expect("client should build");
        assert_eq!(
            client.endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let mut config = test_config();
        config.base_url = "http://127.0.0.1:9999/".to_string();
        let client = OpenAiChat::new(config).expect("client should build");
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:9999/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "Be brief.",
                },
                ChatMessage {
                    role: "user",
                    content: "Hello",
                },
            ],
            max_completion_tokens: 150,
        };

        let json = serde_json::to_value(&request).expect("should serialize");
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_completion_tokens"], 150);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Hello");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hi there!"},
                    "finish_reason": "stop"
                }
            ]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(body).expect("should parse");
        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some("Hi there!")
        );
    }

    #[test]
    fn test_response_without_choices_parses() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"id": "chatcmpl-123"}"#).expect("should parse");
        assert!(response.choices.is_empty());
    }
}
