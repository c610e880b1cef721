//! api-chaos - an HTTP mock server that behaves like an unreliable upstream API.
//!
//! Every request is delayed by up to two seconds and may come back as a generic
//! 500, a generic 404, or a 200 whose body is either the endpoint's canonical
//! payload or one of its deliberately malformed variants.

pub mod chaos;
pub mod config;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;

pub use chaos::{ChaosResponder, EndpointRegistry, RandomSource};
pub use routes::create_router;
pub use state::AppState;
