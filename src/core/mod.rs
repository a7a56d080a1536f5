pub mod llm;
pub mod turn;

// Re-export commonly used types for convenience
pub use llm::{LlmError, LlmResult, OpenAiChat, OpenAiChatConfig, TextGenerator};
pub use turn::{APOLOGY_REPLY, TurnProcessor};
