//! The Chaos Responder.
//!
//! Every request goes through the same cascade of independent rolls:
//!
//! 1. Delay, uniform in `[0, MAX_DELAY)`, awaited on a timer so other requests
//!    keep flowing.
//! 2. 500 roll: below [`SERVER_ERROR_PROBABILITY`] the request gets the generic 500 body.
//! 3. 404 roll: below [`NOT_FOUND_PROBABILITY`] it gets the generic 404 body.
//! 4. Body selection for the path, answered with 200.
//!
//! Body selection returns the moved-endpoint body for unknown paths. For known
//! paths a chaos roll below [`CHAOS_PROBABILITY`] picks one of the endpoint's
//! variants uniformly, anything else returns the canonical success value.
//!
//! Nothing here fails: every branch is a well-formed response.

pub mod random;
pub mod registry;

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::config::{
    CHAOS_PROBABILITY, MAX_DELAY, NOT_FOUND_MESSAGE, NOT_FOUND_PROBABILITY,
    SERVER_ERROR_MESSAGE, SERVER_ERROR_PROBABILITY, UNKNOWN_ENDPOINT_MESSAGE,
};

pub use random::{RandomSource, SequenceRandom, ThreadRandom};
pub use registry::{ChaosVariant, EndpointDefinition, EndpointRegistry};

/// Which branch of the cascade produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    ServerError,
    NotFound,
    UnknownEndpoint,
    /// Index into the endpoint's chaos variants
    Chaos(usize),
    Success,
}

/// A decided response. Success bodies borrow from the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ChaosResponse<'a> {
    pub status: StatusCode,
    pub body: Cow<'a, Value>,
    pub kind: ResponseKind,
    /// Time waited before the response was decided; zero when rolled directly
    pub delay: Duration,
}

impl IntoResponse for ChaosResponse<'_> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Decides every response: delay, status override and body.
///
/// Holds no mutable state, so one instance serves all requests concurrently.
pub struct ChaosResponder {
    registry: Arc<EndpointRegistry>,
    random: Arc<dyn RandomSource>,
    max_delay: Duration,
}

impl ChaosResponder {
    /// A responder over `registry`, drawing every roll from `random`.
    pub fn new(registry: Arc<EndpointRegistry>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            registry,
            random,
            max_delay: MAX_DELAY,
        }
    }

    /// Override the delay bound. Used by tests that cannot wait two seconds per request.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// The endpoint table this responder serves.
    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Handle one request: wait out the artificial delay, then roll the response.
    pub async fn handle(&self, path: &str) -> ChaosResponse<'_> {
        let delay = self.draw_delay();
        tokio::time::sleep(delay).await;

        ChaosResponse {
            delay,
            ..self.roll(path)
        }
    }

    /// Uniform delay in `[0, max_delay)`.
    pub fn draw_delay(&self) -> Duration {
        self.max_delay.mul_f64(self.random.next_f64())
    }

    /// The 500 and 404 rolls followed by body selection, without any delay.
    pub fn roll(&self, path: &str) -> ChaosResponse<'_> {
        if self.random.next_f64() < SERVER_ERROR_PROBABILITY {
            return ChaosResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: Cow::Owned(json!({ "error": SERVER_ERROR_MESSAGE })),
                kind: ResponseKind::ServerError,
                delay: Duration::ZERO,
            };
        }

        if self.random.next_f64() < NOT_FOUND_PROBABILITY {
            return ChaosResponse {
                status: StatusCode::NOT_FOUND,
                body: Cow::Owned(json!({ "message": NOT_FOUND_MESSAGE })),
                kind: ResponseKind::NotFound,
                delay: Duration::ZERO,
            };
        }

        let (body, kind) = self.select_body(path);
        ChaosResponse {
            status: StatusCode::OK,
            body,
            kind,
            delay: Duration::ZERO,
        }
    }

    /// Pick the 200 body for `path`.
    pub fn select_body(&self, path: &str) -> (Cow<'_, Value>, ResponseKind) {
        let Some(endpoint) = self.registry.get(path) else {
            return (
                Cow::Owned(json!({ "error": UNKNOWN_ENDPOINT_MESSAGE })),
                ResponseKind::UnknownEndpoint,
            );
        };

        if self.random.next_f64() < CHAOS_PROBABILITY && !endpoint.chaos.is_empty() {
            let index = pick_index(self.random.next_f64(), endpoint.chaos.len());
            return (
                Cow::Owned(endpoint.chaos[index].render()),
                ResponseKind::Chaos(index),
            );
        }

        (Cow::Borrowed(&endpoint.success), ResponseKind::Success)
    }
}

/// Map a uniform sample onto `0..len`.
fn pick_index(sample: f64, len: usize) -> usize {
    ((sample * len as f64) as usize).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responder(samples: &[f64]) -> ChaosResponder {
        ChaosResponder::new(
            Arc::new(EndpointRegistry::builtin()),
            Arc::new(SequenceRandom::new(samples.to_vec())),
        )
    }

    #[test]
    fn users_success_when_every_roll_misses() {
        let responder = responder(&[0.5, 0.5, 0.5]);
        let response = responder.roll("/users");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.kind, ResponseKind::Success);
        assert_eq!(
            serde_json::to_string(&response.body).unwrap(),
            r#"[{"id":1,"name":"Alice"},{"id":2,"name":"Bob"}]"#
        );
    }

    #[test]
    fn success_body_is_borrowed_from_registry() {
        let responder = responder(&[0.5, 0.5, 0.5]);
        let response = responder.roll("/products");
        assert!(matches!(response.body, Cow::Borrowed(_)));
        assert!(std::ptr::eq(
            response.body.as_ref(),
            &responder.registry().get("/products").unwrap().success
        ));
    }

    #[test]
    fn users_chaos_index_two_is_users_yes() {
        let responder = responder(&[0.5, 0.5, 0.1, 0.5]);
        let response = responder.roll("/users");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.kind, ResponseKind::Chaos(2));
        assert_eq!(
            serde_json::to_string(&response.body).unwrap(),
            r#"{"users":"yes"}"#
        );
    }

    #[test]
    fn server_error_ignores_path() {
        for path in ["/users", "/products", "/widgets"] {
            let responder = responder(&[0.01]);
            let response = responder.roll(path);
            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                *response.body,
                json!({ "error": "Something went wrong. Probably your fault." })
            );
        }
    }

    #[test]
    fn not_found_after_server_error_roll_misses() {
        let responder = responder(&[0.05, 0.09]);
        let response = responder.roll("/users");
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.kind, ResponseKind::NotFound);
        assert_eq!(*response.body, json!({ "message": "Not found (anymore)" }));
    }

    #[test]
    fn thresholds_are_exclusive() {
        // 0.10 is not below the 404 threshold, 0.30 is not below the chaos threshold
        let responder = responder(&[0.05, 0.10, 0.30]);
        let response = responder.roll("/users");
        assert_eq!(response.kind, ResponseKind::Success);
    }

    #[test]
    fn unknown_path_gets_moved_body() {
        let responder = responder(&[0.5, 0.5, 0.0]);
        let response = responder.roll("/widgets");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.kind, ResponseKind::UnknownEndpoint);
        assert_eq!(
            *response.body,
            json!({ "error": "Endpoint moved to /v2, then /v3, then deprecated" })
        );
    }

    #[test]
    fn products_chaos_variants_by_index() {
        let expected = [
            json!({ "products": [] }),
            json!({ "error": { "code": 500, "message": "Internal server oopsie" } }),
            json!("just a string, because why not"),
            json!({ "data": { "items": [{ "name": "Mystery Product" }] } }),
        ];
        for (i, index_roll) in [0.0, 0.25, 0.5, 0.99].into_iter().enumerate() {
            let responder = responder(&[0.2, index_roll]);
            let (body, kind) = responder.select_body("/products");
            assert_eq!(kind, ResponseKind::Chaos(i));
            assert_eq!(*body, expected[i]);
        }
    }

    #[test]
    fn endpoint_without_variants_falls_back_to_success() {
        let registry = EndpointRegistry::default().with_endpoint("/quiet", json!("ok"), vec![]);
        let responder = ChaosResponder::new(
            Arc::new(registry),
            Arc::new(SequenceRandom::new([0.0])),
        );
        let (body, kind) = responder.select_body("/quiet");
        assert_eq!(kind, ResponseKind::Success);
        assert_eq!(*body, json!("ok"));
    }

    #[test]
    fn delay_scales_sample_into_bound() {
        assert_eq!(responder(&[0.0]).draw_delay(), Duration::ZERO);
        assert_eq!(responder(&[0.25]).draw_delay(), Duration::from_millis(500));
        assert!(responder(&[0.999_999]).draw_delay() < MAX_DELAY);
    }

    #[test]
    fn pick_index_clamps_to_last() {
        assert_eq!(pick_index(0.0, 4), 0);
        assert_eq!(pick_index(0.5, 4), 2);
        assert_eq!(pick_index(1.0, 4), 3);
    }

    #[test]
    fn rates_converge_over_many_rolls() {
        const SAMPLES: usize = 100_000;
        const TOLERANCE: f64 = 0.015;

        let responder = ChaosResponder::new(
            Arc::new(EndpointRegistry::builtin()),
            Arc::new(ThreadRandom),
        );

        let (mut server_errors, mut not_found, mut chaos, mut success) = (0usize, 0, 0, 0);
        for _ in 0..SAMPLES {
            match responder.roll("/users").kind {
                ResponseKind::ServerError => server_errors += 1,
                ResponseKind::NotFound => not_found += 1,
                ResponseKind::Chaos(_) => chaos += 1,
                ResponseKind::Success => success += 1,
                ResponseKind::UnknownEndpoint => panic!("/users is registered"),
            }
        }

        let error_rate = server_errors as f64 / SAMPLES as f64;
        let not_found_rate = not_found as f64 / (SAMPLES - server_errors) as f64;
        let chaos_rate = chaos as f64 / (chaos + success) as f64;

        assert!((error_rate - SERVER_ERROR_PROBABILITY).abs() < TOLERANCE, "{error_rate}");
        assert!((not_found_rate - NOT_FOUND_PROBABILITY).abs() < TOLERANCE, "{not_found_rate}");
        assert!((chaos_rate - CHAOS_PROBABILITY).abs() < TOLERANCE, "{chaos_rate}");
    }

    #[tokio::test]
    async fn handle_runs_full_cascade() {
        let responder = responder(&[0.0, 0.5, 0.5, 0.5]);
        let response = responder.handle("/users").await;
        assert_eq!(response.kind, ResponseKind::Success);
        assert_eq!(response.delay, Duration::ZERO);
    }

    #[tokio::test]
    async fn handle_reports_the_delay_it_waited() {
        let responder = responder(&[0.0625]).with_max_delay(Duration::from_secs(1));
        let start = std::time::Instant::now();
        let response = responder.handle("/users").await;
        assert_eq!(response.delay, Duration::from_micros(62_500));
        assert!(start.elapsed() >= response.delay);
    }

    #[tokio::test]
    async fn into_response_serializes_bare_string_unwrapped() {
        let responder = responder(&[0.0, 0.5, 0.5, 0.2, 0.5]);
        let response = responder.handle("/products").await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], br#""just a string, because why not""#);
    }
}
