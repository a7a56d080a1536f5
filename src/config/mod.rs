//! Configuration module for the relay gateway
//!
//! Configuration comes from environment variables, with `.env` values loaded
//! in `main.rs` before `ServerConfig::from_env` runs. Actual environment
//! variables override `.env` values.
//!
//! # Example
//! ```rust,no_run
//! use relay_gateway::config::ServerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Default system instruction used when neither `SYSTEM_INSTRUCTION` nor
/// `SYSTEM_INSTRUCTION_FILE` is provided.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful voice assistant on a phone call. \
     Keep your answers short, conversational, and free of markup, \
     since they will be read aloud to the caller.";

/// Default backend base URL (OpenAI)
pub const DEFAULT_BACKEND_BASE_URL: &str = "https://api.openai.com";

/// Default backend model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default reply token budget, tuned for speech-synthesis latency
pub const DEFAULT_MAX_REPLY_TOKENS: u32 = 150;

/// TLS configuration for HTTPS and WSS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    #[error("TLS requires both TLS_CERT_PATH and TLS_KEY_PATH to be set")]
    IncompleteTls,

    #[error("failed to read system instruction file {path}: {source}")]
    InstructionFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Server configuration
///
/// Contains everything needed to run the relay gateway:
/// - Server settings (host, port, TLS)
/// - Backend settings (API key, base URL, model, reply token budget)
/// - The system instruction sent with every turn
/// - Security settings (CORS, rate limiting, connection limits)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Backend settings
    /// API key for the text-generation backend. Optional at load time so the
    /// server can boot with an injected test backend; the OpenAI client
    /// constructor requires it.
    pub openai_api_key: Option<String>,
    /// Base URL of the backend API. Overridable so tests can point the
    /// client at a local mock server.
    pub backend_base_url: String,
    /// Model identifier passed to the backend
    pub model: String,
    /// Cap on generated reply length. Short replies keep the perceived
    /// synthesis delay low on a live call.
    pub max_reply_tokens: u32,

    /// System instruction sent as the first message of every turn.
    /// Resolved once at startup from `SYSTEM_INSTRUCTION_FILE` (preferred)
    /// or `SYSTEM_INSTRUCTION`.
    pub system_instruction: String,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,

    // Rate limiting configuration
    /// Maximum requests per second per IP address (default: 60)
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting (default: 10)
    pub rate_limit_burst_size: u32,

    // Connection limits
    /// Maximum concurrent WebSocket connections (default: unlimited)
    pub max_websocket_connections: Option<usize>,
    /// Maximum connections per IP address (default: 100)
    pub max_connections_per_ip: u32,
}

/// Zeroize the backend credential when the config is dropped so the secret
/// does not linger in memory.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.openai_api_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Missing optional variables fall back to defaults; a malformed numeric
    /// value or an incomplete TLS pair is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0");
        let port = parse_env("PORT", 8080u16)?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT",
                reason: "port must be non-zero".to_string(),
            });
        }

        let tls = load_tls()?;

        let openai_api_key = optional_env("OPENAI_API_KEY");
        let backend_base_url = env_or("OPENAI_BASE_URL", DEFAULT_BACKEND_BASE_URL);
        let model = env_or("OPENAI_MODEL", DEFAULT_MODEL);
        let max_reply_tokens = parse_env("MAX_REPLY_TOKENS", DEFAULT_MAX_REPLY_TOKENS)?;
        if max_reply_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                var: "MAX_REPLY_TOKENS",
                reason: "token budget must be positive".to_string(),
            });
        }

        let system_instruction = load_system_instruction()?;

        Ok(ServerConfig {
            host,
            port,
            tls,
            openai_api_key,
            backend_base_url,
            model,
            max_reply_tokens,
            system_instruction,
            cors_allowed_origins: optional_env("CORS_ALLOWED_ORIGINS"),
            rate_limit_requests_per_second: parse_env("RATE_LIMIT_RPS", 60u32)?,
            rate_limit_burst_size: parse_env("RATE_LIMIT_BURST", 10u32)?,
            max_websocket_connections: optional_env("MAX_WS_CONNECTIONS")
                .map(|v| {
                    v.parse::<usize>().map_err(|e| ConfigError::InvalidValue {
                        var: "MAX_WS_CONNECTIONS",
                        reason: e.to_string(),
                    })
                })
                .transpose()?,
            max_connections_per_ip: parse_env("MAX_CONNECTIONS_PER_IP", 100u32)?,
        })
    }

    /// Get the server address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }
}

/// Read an env var, falling back to a default when unset or empty
fn env_or(var: &str, default: &str) -> String {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

/// Read an optional env var, treating empty values as unset
fn optional_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a numeric env var, falling back to a default when unset
fn parse_env<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => {
            v.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue {
                    var,
                    reason: e.to_string(),
                })
        }
        _ => Ok(default),
    }
}

/// Load the optional TLS pair. Setting only one of the two paths is an error.
fn load_tls() -> Result<Option<TlsConfig>, ConfigError> {
    let cert = optional_env("TLS_CERT_PATH");
    let key = optional_env("TLS_KEY_PATH");
    match (cert, key) {
        (Some(cert_path), Some(key_path)) => Ok(Some(TlsConfig {
            cert_path: PathBuf::from(cert_path),
            key_path: PathBuf::from(key_path),
        })),
        (None, None) => Ok(None),
        _ => Err(ConfigError::IncompleteTls),
    }
}

/// Resolve the system instruction
///
/// Priority: SYSTEM_INSTRUCTION_FILE > SYSTEM_INSTRUCTION > built-in default.
fn load_system_instruction() -> Result<String, ConfigError> {
    if let Some(path) = optional_env("SYSTEM_INSTRUCTION_FILE") {
        let path = PathBuf::from(path);
        let contents =
            std::fs::read_to_string(&path).map_err(|source| ConfigError::InstructionFile {
                path: path.clone(),
                source,
            })?;
        let trimmed = contents.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }
    Ok(env_or("SYSTEM_INSTRUCTION", DEFAULT_SYSTEM_INSTRUCTION))
}
