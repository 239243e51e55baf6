//! Identity provider configuration.
//!
//! Loaded once at startup via the `config` crate from `OAUTH_*` environment
//! variables and passed explicitly to the [`ProviderClient`](crate::ProviderClient).

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::fmt;

/// Prefix of the environment variables holding the provider configuration.
pub const ENV_PREFIX: &str = "OAUTH";

/// Google's OAuth authorization URL.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google's OAuth token URL.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scopes requested on every authorization.
pub const SCOPES: &[&str] = &["openid", "profile", "email"];

/// Configuration for the single identity provider.
///
/// Required values default to empty during deserialization so that
/// [`validate`](Self::validate) can report exactly which variable is missing.
#[derive(Clone, Deserialize)]
pub struct ProviderConfig {
    /// OAuth2 client ID registered with the provider.
    #[serde(default)]
    client_id: String,
    /// OAuth2 client secret.
    #[serde(default)]
    client_secret: String,
    /// Callback URL registered with the provider.
    #[serde(default)]
    redirect_url: String,
    /// Consent screen endpoint.
    /// Default: Google
    #[serde(default = "default_auth_url")]
    auth_url: String,
    /// Token endpoint.
    /// Default: Google
    #[serde(default = "default_token_url")]
    token_url: String,
}

fn default_auth_url() -> String {
    GOOGLE_AUTH_URL.to_string()
}

fn default_token_url() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

impl ProviderConfig {
    /// Creates a configuration for Google's endpoints.
    #[must_use]
    pub fn new(client_id: String, client_secret: String, redirect_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_url,
            auth_url: default_auth_url(),
            token_url: default_token_url(),
        }
    }

    /// Overrides the provider endpoints.
    #[must_use]
    pub fn with_endpoint(mut self, auth_url: String, token_url: String) -> Self {
        self.auth_url = auth_url;
        self.token_url = token_url;
        self
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment cannot be read or a required
    /// value is missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads the configuration from the given environment source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be deserialized or a required
    /// value is missing or empty.
    pub fn from_source(source: config::Environment) -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(source)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::Load {
                details: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every required value is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming the first empty variable.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let required = [
            ("OAUTH_CLIENT_ID", &self.client_id),
            ("OAUTH_CLIENT_SECRET", &self.client_secret),
            ("OAUTH_REDIRECT_URL", &self.redirect_url),
            ("OAUTH_AUTH_URL", &self.auth_url),
            ("OAUTH_TOKEN_URL", &self.token_url),
        ];
        match required.iter().find(|(_, value)| value.is_empty()) {
            Some((variable, _)) => Err(ConfigError::Missing {
                variable: *variable,
            }),
            None => Ok(()),
        }
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the callback URL.
    #[must_use]
    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    /// Returns the consent screen endpoint.
    #[must_use]
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// Returns the token endpoint.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Returns the scopes to request.
    #[must_use]
    pub fn scopes(&self) -> &'static [&'static str] {
        SCOPES
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("redirect_url", &self.redirect_url)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}
