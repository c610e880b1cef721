//! HTTP routing.
//!
//! There is a single logical endpoint: every request, whatever its method or
//! path, lands in the chaos handler through the router fallback. Responses are
//! marked `no-store` so a caching proxy never replays a lucky answer.

pub mod chaos;

use axum::{middleware, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_NO_STORE;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .fallback(chaos::respond)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
