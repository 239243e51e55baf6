//! Error types for the redirect flow.
//!
//! Errors are layered:
//! - `StateError`: state codec failures
//! - `ExchangeError`: token exchange failures
//! - `ConfigError`: startup configuration failures, reported through rootcause
//! - `RelayError`: the router-level taxonomy, each variant mapping to one
//!   HTTP-style response

use crate::gateway::GatewayResponse;
use rootcause::Report;
use std::fmt;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

/// Errors from encoding or decoding the state parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The state payload could not be serialized.
    Encoding { reason: String },
    /// The state string is not valid base64url or not the expected JSON shape.
    Decoding { reason: String },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding { reason } | Self::Decoding { reason } => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for StateError {}

/// Errors from the authorization code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// The HTTP client could not be built.
    Client { reason: String },
    /// The token request failed in transport or was rejected by the provider.
    Request { reason: String },
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client { reason } => write!(f, "HTTP client error: {reason}"),
            Self::Request { reason } => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for ExchangeError {}

/// Errors from loading the provider configuration at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration source could not be read or deserialized.
    Load { details: String },
    /// A required value is empty.
    Missing { variable: &'static str },
    /// A configured URL is not a valid absolute URL.
    InvalidUrl { variable: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { details } => write!(f, "failed to load configuration: {details}"),
            Self::Missing { variable } => {
                write!(f, "missing required environment variable {variable}")
            }
            Self::InvalidUrl { variable, reason } => {
                write!(f, "invalid URL in {variable}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Request handling errors.
///
/// Every variant is converted into a JSON error response by the router; none
/// of them escape the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// A required query parameter is missing or empty.
    Validation { parameter: &'static str },
    /// The state parameter could not be decoded.
    Decoding(StateError),
    /// The state parameter could not be generated.
    Encoding(StateError),
    /// The authorization code could not be exchanged.
    Exchange(ExchangeError),
    /// The path is not routed.
    NotFound,
}

impl RelayError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } | Self::Decoding(_) => 400,
            Self::Encoding(_) | Self::Exchange(_) => 500,
            Self::NotFound => 404,
        }
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { parameter } => write!(f, "{parameter} parameter is required"),
            Self::Decoding(e) => write!(f, "invalid state parameter: {e}"),
            Self::Encoding(e) => write!(f, "failed to generate state: {e}"),
            Self::Exchange(e) => write!(f, "failed to exchange token: {e}"),
            Self::NotFound => write!(f, "not found"),
        }
    }
}

impl std::error::Error for RelayError {}

impl From<RelayError> for GatewayResponse {
    fn from(error: RelayError) -> Self {
        GatewayResponse::error(error.status_code(), &error.to_string())
    }
}
