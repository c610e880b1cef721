//! Endpoint Registry: the static table of known paths.
//!
//! Each path maps to one canonical success body and an ordered list of chaos
//! variants. The table is built once at startup and only ever read.

use std::collections::HashMap;

use serde_json::{json, Value};

/// One deliberately unexpected payload an endpoint may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaosVariant {
    /// `/users`: rate-limit error object
    RateLimited,
    /// `/users`: success message with null data
    NullData,
    /// `/users`: `{"users":"yes"}`
    UsersYes,
    /// `/users`: `{}`
    EmptyObject,
    /// `/products`: empty list wrapped in an object
    EmptyProducts,
    /// `/products`: structured 500-style error object
    NestedServerError,
    /// `/products`: a bare JSON string
    BareString,
    /// `/products`: payload nested under `data.items`
    NestedItems,
}

impl ChaosVariant {
    /// Build this variant's payload.
    pub fn render(self) -> Value {
        match self {
            Self::RateLimited => {
                json!({ "error": "Rate limited. Try again in 5... no, 10 minutes" })
            }
            Self::NullData => json!({ "data": null, "message": "Success!" }),
            Self::UsersYes => json!({ "users": "yes" }),
            Self::EmptyObject => json!({}),
            Self::EmptyProducts => json!({ "products": [] }),
            Self::NestedServerError => {
                json!({ "error": { "code": 500, "message": "Internal server oopsie" } })
            }
            Self::BareString => json!("just a string, because why not"),
            Self::NestedItems => json!({ "data": { "items": [{ "name": "Mystery Product" }] } }),
        }
    }
}

/// A registered path: what it should return, and what it may return instead.
#[derive(Debug, Clone)]
pub struct EndpointDefinition {
    pub success: Value,
    pub chaos: Vec<ChaosVariant>,
}

/// Immutable mapping from request path to its definition.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: HashMap<String, EndpointDefinition>,
}

impl EndpointRegistry {
    /// The built-in `/users` and `/products` table.
    pub fn builtin() -> Self {
        Self::default()
            .with_endpoint(
                "/users",
                json!([{ "id": 1, "name": "Alice" }, { "id": 2, "name": "Bob" }]),
                vec![
                    ChaosVariant::RateLimited,
                    ChaosVariant::NullData,
                    ChaosVariant::UsersYes,
                    ChaosVariant::EmptyObject,
                ],
            )
            .with_endpoint(
                "/products",
                json!([{ "id": 1, "name": "Widget" }]),
                vec![
                    ChaosVariant::EmptyProducts,
                    ChaosVariant::NestedServerError,
                    ChaosVariant::BareString,
                    ChaosVariant::NestedItems,
                ],
            )
    }

    /// Add a path while building the table. Later registrations replace earlier ones.
    pub fn with_endpoint(
        mut self,
        path: impl Into<String>,
        success: Value,
        chaos: Vec<ChaosVariant>,
    ) -> Self {
        self.endpoints
            .insert(path.into(), EndpointDefinition { success, chaos });
        self
    }

    pub fn get(&self, path: &str) -> Option<&EndpointDefinition> {
        self.endpoints.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
