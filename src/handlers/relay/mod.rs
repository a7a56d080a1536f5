//! Relay WebSocket handling
//!
//! - `handler` - WebSocket upgrade and per-connection dispatch loop
//! - `messages` - inbound/outbound frame types
//! - `session` - per-connection call metadata
//! - `hooks` - extension points for dtmf/interrupt events

pub mod handler;
pub mod hooks;
pub mod messages;
pub mod session;

pub use handler::relay_handler;
pub use hooks::{NoopHooks, RelayHooks};
pub use messages::{InboundFrame, OutboundFrame};
pub use session::SessionInfo;
