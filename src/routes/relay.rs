//! Relay WebSocket route configuration

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::relay::relay_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the relay WebSocket router
///
/// # Endpoint
///
/// `GET /relay` - WebSocket upgrade for one active call
///
/// # Protocol
///
/// After the upgrade, the peer sends JSON frames dispatched on `type`:
///
/// ```json
/// {"type": "setup", "sessionId": "...", "callSid": "...", "from": "+1555", "to": "+1666", "direction": "inbound"}
/// {"type": "prompt", "voicePrompt": "I have five years of experience", "lang": "en-US", "last": true}
/// ```
///
/// The server answers each prompt with exactly one frame:
///
/// ```json
/// {"type": "text", "token": "Great, can you tell me more?", "last": true}
/// ```
///
/// `dtmf` and `interrupt` frames are accepted and routed to extension hooks.
pub fn create_relay_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/relay", get(relay_handler))
        .layer(TraceLayer::new_for_http())
}
