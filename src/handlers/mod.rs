//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check endpoint
//! - `relay` - Relay WebSocket (voice-transport peer <-> LLM backend)

pub mod api;
pub mod relay;

// Re-export commonly used handlers for convenient access
pub use relay::relay_handler;
