//! The catch-all chaos handler.

use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Response},
    Extension,
};

use crate::middleware::RequestId;
use crate::state::AppState;

/// Answer any method on any path. The query string plays no part in routing.
pub async fn respond(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    uri: Uri,
) -> Response {
    let path = uri.path();
    let response = state.responder.handle(path).await;

    tracing::debug!(
        request_id = %request_id.0,
        path,
        delay_ms = response.delay.as_millis() as u64,
        status = response.status.as_u16(),
        kind = ?response.kind,
        "Chaos decided"
    );

    response.into_response()
}
