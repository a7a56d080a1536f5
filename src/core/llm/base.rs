//! Base trait and error types for text-generation backends

use async_trait::async_trait;

use thiserror::Error;

/// Result type for backend operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors produced by a text-generation backend call
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network-level failure (DNS, connect, TLS, read)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Backend returned a non-success status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Backend signalled rate limiting (HTTP 429)
    #[error("Rate limited by backend")]
    RateLimited,

    /// Request did not complete within the client timeout
    #[error("Request timed out")]
    Timeout,

    /// Backend replied 2xx but carried no usable text
    #[error("Backend response contained no text")]
    EmptyResponse,

    /// Backend response body could not be parsed
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),
}

/// A text-generation backend.
///
/// One call per turn: a fixed system instruction plus the caller utterance,
/// capped at `max_tokens` of output. Implementations are stateless across
/// calls; no conversation history is threaded through.
///
/// The trait is object safe so the server can hold an `Arc<dyn TextGenerator>`
/// and tests can substitute a scripted backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply for a single caller utterance.
    async fn generate(
        &self,
        system_instruction: &str,
        utterance: &str,
        max_tokens: u32,
    ) -> LlmResult<String>;
}
