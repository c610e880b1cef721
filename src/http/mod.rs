//! HTTP server module.
//!
//! Binds the listener, serves the router and drains in-flight requests on
//! SIGTERM/SIGINT.

mod server;
mod shutdown;

pub use server::{serve, start_server, ServerError};
pub use shutdown::shutdown_signal;
