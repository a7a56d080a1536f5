//! Turn processing
//!
//! A turn is one caller utterance and the one reply generated for it. The
//! processor sends exactly two messages to the backend (the fixed system
//! instruction and the utterance, no history) and collapses every backend
//! failure into a fixed apology utterance so the transport layer never sees
//! an error.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::llm::TextGenerator;

/// Reply produced when the backend call fails for any reason
pub const APOLOGY_REPLY: &str = "I apologize, I encountered an error processing your request.";

/// Produces one reply utterance per caller utterance.
///
/// Constructed once per process from the server configuration and shared
/// across connection handlers. The backend client is injected, not ambient,
/// so tests can substitute a scripted `TextGenerator`.
#[derive(Clone)]
pub struct TurnProcessor {
    backend: Arc<dyn TextGenerator>,
    system_instruction: Arc<str>,
    max_reply_tokens: u32,
}

impl TurnProcessor {
    /// Create a turn processor with an injected backend
    pub fn new(
        backend: Arc<dyn TextGenerator>,
        system_instruction: String,
        max_reply_tokens: u32,
    ) -> Self {
        Self {
            backend,
            system_instruction: system_instruction.into(),
            max_reply_tokens,
        }
    }

    /// The system instruction sent with every turn
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Process one caller utterance into one reply utterance.
    ///
    /// Infallible from the caller's perspective: a backend failure of any
    /// kind (network, rate limit, timeout, malformed or empty response)
    /// yields the apology reply. No retry, no error propagation.
    pub async fn process(&self, utterance: &str) -> String {
        match self
            .backend
            .generate(&self.system_instruction, utterance, self.max_reply_tokens)
            .await
        {
            Ok(reply) => {
                debug!(reply_chars = reply.len(), "Turn completed");
                reply
            }
            Err(e) => {
                warn!(error = %e, "Backend call failed, returning apology reply");
                APOLOGY_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::llm::{LlmError, LlmResult};
    use async_trait::async_trait;

    struct FixedBackend {
        reply: Option<String>,
    }

    #[async_trait]
    impl TextGenerator for FixedBackend {
        async fn generate(
            &self,
            _system_instruction: &str,
            _utterance: &str,
            _max_tokens: u32,
        ) -> LlmResult<String> {
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(LlmError::Timeout),
            }
        }
    }

    /// Captures the arguments of the last generate call
    struct RecordingBackend {
        seen: std::sync::Mutex<Option<(String, String, u32)>>,
    }

    #[async_trait]
    impl TextGenerator for RecordingBackend {
        async fn generate(
            &self,
            system_instruction: &str,
            utterance: &str,
            max_tokens: u32,
        ) -> LlmResult<String> {
            *self.seen.lock().unwrap() = Some((
                system_instruction.to_string(),
                utterance.to_string(),
                max_tokens,
            ));
            Ok("ok".to_string())
        }
    }

    #[tokio::test]
    async fn test_success_returns_backend_text_verbatim() {
        let backend = Arc::new(FixedBackend {
            reply: Some("Great, tell me about your most recent project?".to_string()),
        });
        let processor = TurnProcessor::new(backend, "Be brief.".to_string(), 150);

        let reply = processor.process("I have five years of experience").await;
        assert_eq!(reply, "Great, tell me about your most recent project?");
    }

    #[tokio::test]
    async fn test_failure_returns_apology_verbatim() {
        let backend = Arc::new(FixedBackend { reply: None });
        let processor = TurnProcessor::new(backend, "Be brief.".to_string(), 150);

        let reply = processor.process("hello?").await;
        assert_eq!(reply, APOLOGY_REPLY);
    }

    #[tokio::test]
    async fn test_backend_receives_instruction_utterance_and_budget() {
        let backend = Arc::new(RecordingBackend {
            seen: std::sync::Mutex::new(None),
        });
        let processor =
            TurnProcessor::new(backend.clone(), "You are a recruiter.".to_string(), 64);

        processor.process("I know Rust").await;

        let (instruction, utterance, budget) =
            backend.seen.lock().unwrap().clone().expect("call recorded");
        assert_eq!(instruction, "You are a recruiter.");
        assert_eq!(utterance, "I know Rust");
        assert_eq!(budget, 64);
    }
}
