//! Configuration and constants.
//!
//! The chaos distribution is fixed: probabilities, the delay bound and the
//! canned failure bodies live here as constants. `ServerConfig` holds the few
//! runtime knobs (listen address and logging) resolved from CLI and environment.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

// =============================================================================
// Chaos Distribution
// =============================================================================
// Rolls cascade: each check applies to whatever the previous checks let through.

/// Probability of answering with the generic 500 body
pub const SERVER_ERROR_PROBABILITY: f64 = 0.05;

/// Probability of answering with the generic 404 body (of requests past the 500 roll)
pub const NOT_FOUND_PROBABILITY: f64 = 0.10;

/// Probability of a known endpoint answering with one of its chaos variants
pub const CHAOS_PROBABILITY: f64 = 0.30;

/// Upper bound (exclusive) of the artificial per-request delay
pub const MAX_DELAY: Duration = Duration::from_millis(2000);

// =============================================================================
// Canned Bodies
// =============================================================================

/// `error` field of the generic 500 body
pub const SERVER_ERROR_MESSAGE: &str = "Something went wrong. Probably your fault.";

/// `message` field of the generic 404 body
pub const NOT_FOUND_MESSAGE: &str = "Not found (anymore)";

/// `error` field returned for paths missing from the registry
pub const UNKNOWN_ENDPOINT_MESSAGE: &str = "Endpoint moved to /v2, then /v3, then deprecated";

// =============================================================================
// HTTP Response Headers
// =============================================================================

/// Chaotic answers must never be served from an intermediate cache
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

// =============================================================================
// Defaults
// =============================================================================

/// Environment variable holding the listen port
pub const PORT_ENV: &str = "PORT";

/// Port used when `PORT` is unset or empty
pub const DEFAULT_PORT: u16 = 3000;

/// Listen on all interfaces by default
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "api_chaos=info";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Runtime settings for the listener and logging.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Resolve the address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|e| {
            ConfigError::Validation(format!("Invalid host '{}': {}", self.host, e))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Pick the listen port: CLI flag, then the `PORT` value, then [`DEFAULT_PORT`].
///
/// An empty or whitespace-only `PORT` counts as unset.
pub fn resolve_port(cli: Option<u16>, env: Option<&str>) -> Result<u16, ConfigError> {
    if let Some(port) = cli {
        return Ok(port);
    }
    match env.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value.parse().map_err(|e| {
            ConfigError::Validation(format!("Invalid {} '{}': {}", PORT_ENV, value, e))
        }),
        None => Ok(DEFAULT_PORT),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Validation(String),
}
