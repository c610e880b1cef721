//! Shared application state for request handlers.

use std::sync::Arc;

use crate::chaos::ChaosResponder;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// The responder owns the read-only endpoint registry and the randomness
/// source, so handlers never coordinate with each other.
#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<ChaosResponder>,
}

impl AppState {
    /// Creates a new application state around the given responder.
    pub fn new(responder: ChaosResponder) -> Self {
        Self {
            responder: Arc::new(responder),
        }
    }
}
