//! Request IDs for correlating logs with responses.
//!
//! Each request gets a UUID v4. It is stored in the request extensions for the
//! chaos handler, opens the `request` span that every log line of the request
//! inherits, and is echoed back in `x-request-id` so a client can quote it when
//! a response looked wrong.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use http::header::{HeaderName, HeaderValue};
use tracing::Instrument;
use uuid::Uuid;

/// Response header carrying the request ID.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID, read by handlers through `Extension<RequestId>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    fn header_value(&self) -> HeaderValue {
        let mut buf = Uuid::encode_buffer();
        // A hyphenated UUID is always a valid header value
        HeaderValue::from_str(self.0.hyphenated().encode_lower(&mut buf))
            .unwrap_or_else(|_| HeaderValue::from_static("invalid"))
    }
}

/// Outermost layer: the span covers the artificial delay as well as the handler.
pub async fn request_id_layer(mut request: Request, next: Next) -> Response {
    let request_id = RequestId(Uuid::new_v4());
    request.extensions_mut().insert(request_id);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id.0,
        method = %request.method(),
        path = %request.uri().path(),
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();
    async move {
        let mut response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        let status = response.status().as_u16();

        let span = tracing::Span::current();
        span.record("status", status);
        span.record("duration_ms", duration_ms);
        tracing::info!(status, duration_ms, "Request completed");

        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, request_id.header_value());
        response
    }
    .instrument(span)
    .await
}
