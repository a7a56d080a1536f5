//! Shared application state
//!
//! `AppState` is created once in `main` and shared across all connection
//! handlers. It owns the configuration, the turn processor (with its
//! injected backend client), and the WebSocket connection accounting used
//! by the connection-limit middleware.

use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::core::llm::TextGenerator;
use crate::core::turn::TurnProcessor;

/// Reasons a new WebSocket connection may be refused
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionLimitError {
    /// Global WebSocket connection limit reached
    #[error("maximum concurrent WebSocket connections reached")]
    GlobalLimitReached,

    /// Per-IP connection limit reached
    #[error("too many connections from this address")]
    PerIpLimitReached,
}

/// Application state shared across all handlers
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Turn processor with the injected backend client
    pub turn_processor: TurnProcessor,

    /// Count of currently open WebSocket connections
    active_connections: AtomicUsize,
    /// Open connection count per client IP
    connections_per_ip: DashMap<IpAddr, u32>,
}

impl AppState {
    /// Create application state with an injected backend client.
    ///
    /// The backend is handed in rather than constructed here so tests can
    /// substitute a scripted `TextGenerator`.
    pub fn new(config: ServerConfig, backend: Arc<dyn TextGenerator>) -> Arc<Self> {
        let turn_processor = TurnProcessor::new(
            backend,
            config.system_instruction.clone(),
            config.max_reply_tokens,
        );

        Arc::new(Self {
            config,
            turn_processor,
            active_connections: AtomicUsize::new(0),
            connections_per_ip: DashMap::new(),
        })
    }

    /// Number of currently open WebSocket connections
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Try to claim a connection slot for `ip`.
    ///
    /// On success the caller must pair this with `release_connection` when
    /// the connection closes.
    pub fn try_acquire_connection(&self, ip: IpAddr) -> Result<(), ConnectionLimitError> {
        if let Some(max) = self.config.max_websocket_connections {
            let current = self.active_connections.load(Ordering::Relaxed);
            if current >= max {
                return Err(ConnectionLimitError::GlobalLimitReached);
            }
        }

        let mut per_ip = self.connections_per_ip.entry(ip).or_insert(0);
        if *per_ip >= self.config.max_connections_per_ip {
            return Err(ConnectionLimitError::PerIpLimitReached);
        }
        *per_ip += 1;
        drop(per_ip);

        self.active_connections.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Release a connection slot previously claimed with
    /// `try_acquire_connection`.
    pub fn release_connection(&self, ip: IpAddr) {
        // checked_sub keeps a stray double-release from wrapping the counter
        let _ = self
            .active_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));

        if let Some(mut per_ip) = self.connections_per_ip.get_mut(&ip) {
            *per_ip = per_ip.saturating_sub(1);
            let empty = *per_ip == 0;
            drop(per_ip);
            if empty {
                self.connections_per_ip.remove_if(&ip, |_, count| *count == 0);
            }
        }
    }
}
