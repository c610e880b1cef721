//! HTTP server startup logic.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{ConfigError, ServerConfig};

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind server: {0}")]
    Bind(#[source] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),
}

/// Bind the configured address and serve until SIGTERM/SIGINT.
pub async fn start_server(app: Router, config: &ServerConfig) -> Result<(), ServerError> {
    let addr: SocketAddr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await.map_err(ServerError::Bind)?;

    tracing::info!("API Chaos Simulator running on port {}", config.port);
    tracing::info!("Try: curl http://localhost:{}/users", config.port);
    tracing::info!("(Results may vary. They definitely will.)");

    serve(listener, app, shutdown::shutdown_signal()).await
}

/// Serve on an already bound listener until `signal` resolves.
///
/// Each connection runs on its own task, so one request's delay never holds
/// up another.
pub async fn serve<F>(listener: TcpListener, app: Router, signal: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
        .map_err(ServerError::Server)
}
