//! api-chaos: an API that answers the way real third-party APIs do.
//!
//! This is the application entry point. It initializes tracing, builds the
//! endpoint registry and the chaos responder, and serves every request through
//! the chaos handler until SIGTERM/SIGINT.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_chaos::chaos::{ChaosResponder, EndpointRegistry, ThreadRandom};
use api_chaos::config::{
    resolve_port, ConfigError, LogFormat, ServerConfig, DEFAULT_HOST, DEFAULT_LOG_FILTER,
    PORT_ENV,
};
use api_chaos::{create_router, http, AppState};

/// api-chaos: a mock API that is unreliable on purpose
#[derive(Parser, Debug)]
#[command(name = "api-chaos", version, about)]
struct Args {
    /// Port to listen on [default: $PORT, then 3000]
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Log level filter (e.g., "api_chaos=debug")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

/// Environment values the CLI falls back to.
#[derive(Debug, Default)]
struct EnvOverrides {
    port: Option<String>,
    rust_log: Option<String>,
}

impl EnvOverrides {
    fn from_process() -> Self {
        Self {
            port: std::env::var(PORT_ENV).ok(),
            rust_log: std::env::var("RUST_LOG").ok(),
        }
    }
}

impl Args {
    /// Priority for every setting: CLI > env > default.
    fn into_config(self, env: EnvOverrides) -> Result<ServerConfig, ConfigError> {
        let port = resolve_port(self.port, env.port.as_deref())?;
        let log_filter = self
            .log_level
            .or(env.rust_log)
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(ServerConfig {
            host: self.host,
            port,
            log_filter,
            log_format: self.log_format,
        })
    }
}

fn init_tracing(config: &ServerConfig) {
    let json = config.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse().into_config(EnvOverrides::from_process())?;
    init_tracing(&config);

    let registry = Arc::new(EndpointRegistry::builtin());
    tracing::info!(
        endpoints = ?registry.paths().collect::<Vec<_>>(),
        "Loaded endpoint registry"
    );

    let responder = ChaosResponder::new(registry, Arc::new(ThreadRandom));
    let app = create_router(AppState::new(responder));

    http::start_server(app, &config).await?;

    tracing::info!("Server stopped");
    Ok(())
}
