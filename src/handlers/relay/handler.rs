//! Relay WebSocket handler
//!
//! One duplex connection per active call. The peer sends a `setup` frame
//! with call metadata, then a `prompt` frame per completed caller utterance;
//! each prompt produces exactly one outbound `text` frame carrying the
//! generated reply. `dtmf` and `interrupt` route to the extension hooks.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::middleware::ClientIp;
use crate::state::AppState;

use super::hooks::{NoopHooks, RelayHooks};
use super::messages::{InboundFrame, OutboundFrame};
use super::session::SessionInfo;

/// Outbound channel depth. Replies are small and infrequent relative to
/// audio workloads, so a shallow buffer is plenty.
const CHANNEL_BUFFER_SIZE: usize = 64;

/// Relay WebSocket handler
///
/// Upgrades the HTTP connection to WebSocket and runs the per-connection
/// dispatch loop until either side closes.
///
/// # Arguments
/// * `ws` - The WebSocket upgrade request from Axum
/// * `state` - Application state containing config and the turn processor
/// * `client_ip` - Injected by the connection-limit middleware; used to
///   release the connection slot on teardown
pub async fn relay_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    client_ip: Option<Extension<ClientIp>>,
) -> Response {
    let client_ip = client_ip.map(|Extension(ClientIp(ip))| ip);
    info!(client_ip = ?client_ip, "Relay WebSocket connection upgrade requested");

    ws.on_upgrade(move |socket| handle_relay_socket(socket, state, client_ip))
}

/// Handle one relay connection for its whole lifetime
async fn handle_relay_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    client_ip: Option<std::net::IpAddr>,
) {
    let connection_id = uuid::Uuid::new_v4();
    info!(%connection_id, "Relay WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let (frame_tx, mut frame_rx) = mpsc::channel::<OutboundFrame>(CHANNEL_BUFFER_SIZE);

    // Sender task for outgoing frames
    let sender_task = tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            let json = match serde_json::to_string(&frame) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize outbound frame: {}", e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(json.into())).await {
                error!("Failed to send WebSocket message: {}", e);
                break;
            }
        }
    });

    let hooks: Arc<dyn RelayHooks> = Arc::new(NoopHooks);

    // Session metadata arrives in the setup frame and is immutable after that
    let mut session: Option<SessionInfo> = None;

    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(msg) => {
                let continue_processing =
                    process_message(msg, connection_id, &mut session, &state, &frame_tx, &hooks)
                        .await;
                if !continue_processing {
                    break;
                }
            }
            Err(e) => {
                warn!(%connection_id, "Relay WebSocket error: {}", e);
                break;
            }
        }
    }

    // Cleanup
    sender_task.abort();
    if let Some(ip) = client_ip {
        state.release_connection(ip);
    }

    info!(%connection_id, "Relay WebSocket connection terminated");
}

/// Process one incoming WebSocket message
///
/// Returns false when the connection should close.
async fn process_message(
    msg: Message,
    connection_id: uuid::Uuid,
    session: &mut Option<SessionInfo>,
    state: &Arc<AppState>,
    frame_tx: &mpsc::Sender<OutboundFrame>,
    hooks: &Arc<dyn RelayHooks>,
) -> bool {
    match msg {
        Message::Text(text) => {
            let frame: InboundFrame = match serde_json::from_str(&text) {
                Ok(frame) => frame,
                Err(e) => {
                    // Malformed frames are dropped; the connection continues
                    warn!(%connection_id, "Failed to parse inbound frame: {}", e);
                    return true;
                }
            };
            handle_frame(frame, connection_id, session, state, frame_tx, hooks).await;
            true
        }
        Message::Binary(data) => {
            debug!(%connection_id, "Ignoring binary frame ({} bytes)", data.len());
            true
        }
        Message::Ping(_) | Message::Pong(_) => {
            debug!(%connection_id, "Received ping/pong");
            true
        }
        Message::Close(_) => {
            info!(%connection_id, "Relay WebSocket close received");
            false
        }
    }
}

/// Dispatch one parsed inbound frame
async fn handle_frame(
    frame: InboundFrame,
    connection_id: uuid::Uuid,
    session: &mut Option<SessionInfo>,
    state: &Arc<AppState>,
    frame_tx: &mpsc::Sender<OutboundFrame>,
    hooks: &Arc<dyn RelayHooks>,
) {
    match frame {
        InboundFrame::Setup(info) => {
            info!(
                %connection_id,
                session_id = %info.session_id,
                call_sid = %info.call_sid,
                from = ?info.from,
                to = ?info.to,
                direction = ?info.direction,
                "Call session established"
            );
            *session = Some(info);
        }
        InboundFrame::Prompt {
            voice_prompt,
            lang,
            last,
        } => {
            debug!(
                %connection_id,
                lang = ?lang,
                last,
                prompt_chars = voice_prompt.len(),
                "Prompt received"
            );

            // Each prompt runs as its own task. Turns are not serialized per
            // connection: if the peer sends another prompt before this reply
            // lands, the two backend calls overlap and their replies may be
            // written out of order. Interrupts do not cancel in-flight turns
            // either; the interrupted turn still completes and its frame is
            // still written.
            let processor = state.turn_processor.clone();
            let tx = frame_tx.clone();
            tokio::spawn(async move {
                let reply = processor.process(&voice_prompt).await;
                if tx.send(OutboundFrame::reply(reply)).await.is_err() {
                    debug!("Connection closed before reply could be sent");
                }
            });
        }
        InboundFrame::Dtmf { digit } => {
            hooks.on_dtmf(&digit).await;
        }
        InboundFrame::Interrupt {
            utterance_until_interrupt,
            duration_until_interrupt_ms,
        } => {
            hooks
                .on_interrupt(&utterance_until_interrupt, duration_until_interrupt_ms)
                .await;
        }
        InboundFrame::Unknown => {
            warn!(%connection_id, "Ignoring frame with unrecognized type tag");
        }
    }
}
