//! Text-generation backend abstraction
//!
//! The relay treats the language-model backend as a black box: one call in,
//! one reply (or an error) out. `base` defines the provider-agnostic trait
//! and error taxonomy, `openai` implements it against the OpenAI
//! chat-completions API.

mod base;
pub mod openai;

pub use base::{LlmError, LlmResult, TextGenerator};
pub use openai::{OPENAI_CHAT_COMPLETIONS_PATH, OpenAiChat, OpenAiChatConfig};
