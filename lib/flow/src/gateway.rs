//! Request and response records exchanged with the hosting gateway.
//!
//! The records follow the API gateway proxy event shape, so they can be built
//! by an HTTP server adapter or deserialized straight from a gateway event.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Header carrying the redirect target.
pub const LOCATION: &str = "Location";

/// Header describing the body encoding.
pub const CONTENT_TYPE: &str = "Content-Type";

/// An incoming invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    /// Request path, e.g. `/auth`.
    pub path: String,
    /// Decoded query string parameters. Gateways send `null` when there are none.
    #[serde(default, deserialize_with = "nullable_map")]
    pub query_string_parameters: HashMap<String, String>,
}

impl GatewayRequest {
    /// Creates a request for a path without query parameters.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query_string_parameters: HashMap::new(),
        }
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters.insert(name.into(), value.into());
        self
    }

    /// Returns a query parameter, treating an empty value as absent.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

fn nullable_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<HashMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The outcome of an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl GatewayResponse {
    /// A 302 redirect to `location` with no body.
    #[must_use]
    pub fn found(location: impl Into<String>) -> Self {
        Self {
            status_code: 302,
            headers: BTreeMap::from([(LOCATION.to_string(), location.into())]),
            body: None,
        }
    }

    /// A JSON error body of the form `{"error": message}`.
    #[must_use]
    pub fn error(status_code: u16, message: &str) -> Self {
        Self {
            status_code,
            headers: BTreeMap::from([(CONTENT_TYPE.to_string(), "application/json".to_string())]),
            body: Some(serde_json::json!({ "error": message }).to_string()),
        }
    }

    /// Returns the redirect target, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).map(String::as_str)
    }
}
