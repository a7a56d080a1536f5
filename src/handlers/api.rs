//! Health check endpoint

use axum::Json;
use serde_json::{Value, json};

/// Readiness probe. Static payload; no dependencies are checked.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "service": "relay-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
