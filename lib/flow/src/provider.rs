//! Identity provider client built on the oauth2 crate.
//!
//! [`ProviderClient`] builds the consent screen URL and performs the
//! authorization code exchange. The exchange sits behind the [`TokenExchange`]
//! trait so the router can be exercised without network access.

use crate::config::ProviderConfig;
use crate::error::{ConfigError, ExchangeError, Result};
use async_trait::async_trait;
use oauth2::basic::{BasicClient, BasicTokenType};
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EmptyExtraTokenFields, RedirectUrl, Scope, StandardTokenResponse, TokenResponse, TokenUrl,
};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Type alias for the token response type.
type ProviderTokenResponse = StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>;

/// Fixed hints appended to every authorization request.
const AUTHORIZATION_HINTS: &[(&str, &str)] = &[
    ("prompt", "select_account"),
    ("access_type", "online"),
    ("include_granted_scopes", "true"),
];

/// Result of a successful token exchange.
///
/// Only used to build the final redirect; never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenResult {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: Option<Duration>,
    pub refresh_token: Option<String>,
    pub scopes: Option<Vec<String>>,
}

impl TokenResult {
    /// Creates a bearer token result with no optional fields.
    #[must_use]
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "bearer".to_string(),
            expires_in: None,
            refresh_token: None,
            scopes: None,
        }
    }
}

impl fmt::Debug for TokenResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResult")
            .field("access_token", &"[redacted]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl From<ProviderTokenResponse> for TokenResult {
    fn from(response: ProviderTokenResponse) -> Self {
        let token_type: &str = response.token_type().as_ref();
        Self {
            access_token: response.access_token().secret().clone(),
            token_type: token_type.to_string(),
            expires_in: response.expires_in(),
            refresh_token: response.refresh_token().map(|t| t.secret().clone()),
            scopes: response
                .scopes()
                .map(|scopes| scopes.iter().map(|s| s.as_str().to_string()).collect()),
        }
    }
}

/// Exchanges an authorization code for an access token.
///
/// A single attempt per call: no timeout, retry, or backoff.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Exchanges `code` at the provider's token endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error on any transport failure or provider rejection.
    async fn exchange_code(&self, code: &str) -> std::result::Result<TokenResult, ExchangeError>;
}

/// OAuth2 client for the configured identity provider.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    config: ProviderConfig,
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
}

impl ProviderClient {
    /// Creates a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured URL is not a valid absolute URL.
    pub fn new(config: ProviderConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let auth_url = AuthUrl::new(config.auth_url().to_string()).map_err(|e| {
            ConfigError::InvalidUrl {
                variable: "OAUTH_AUTH_URL",
                reason: e.to_string(),
            }
        })?;
        let token_url = TokenUrl::new(config.token_url().to_string()).map_err(|e| {
            ConfigError::InvalidUrl {
                variable: "OAUTH_TOKEN_URL",
                reason: e.to_string(),
            }
        })?;
        let redirect_url = RedirectUrl::new(config.redirect_url().to_string()).map_err(|e| {
            ConfigError::InvalidUrl {
                variable: "OAUTH_REDIRECT_URL",
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            client_id: ClientId::new(config.client_id().to_string()),
            client_secret: ClientSecret::new(config.client_secret().to_string()),
            auth_url,
            token_url,
            redirect_url,
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Builds the consent screen URL carrying `state` as the opaque
    /// round-trip value.
    ///
    /// The URL requests `response_type=code`, the configured scopes, and the
    /// fixed account-selection hints. No network call is made.
    pub fn authorization_url(&self, state: &str) -> String {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let state = state.to_string();
        let mut auth_request = client.authorize_url(move || CsrfToken::new(state));

        for scope in self.config.scopes() {
            auth_request = auth_request.add_scope(Scope::new((*scope).to_string()));
        }

        for (name, value) in AUTHORIZATION_HINTS {
            auth_request = auth_request.add_extra_param(*name, *value);
        }

        let (auth_url, _) = auth_request.url();
        auth_url.to_string()
    }
}

#[async_trait]
impl TokenExchange for ProviderClient {
    #[instrument(skip_all)]
    async fn exchange_code(&self, code: &str) -> std::result::Result<TokenResult, ExchangeError> {
        debug!(token_url = %self.config.token_url(), "exchanging authorization code");

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ExchangeError::Client {
                reason: e.to_string(),
            })?;

        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_type(AuthType::RequestBody)
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let token_response: ProviderTokenResponse = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&http_client)
            .await
            .map_err(|e| ExchangeError::Request {
                reason: error_chain(&e),
            })?;

        debug!("token exchange succeeded");
        Ok(token_response.into())
    }
}

/// Renders an error with its sources, e.g. `Request failed: connection refused`.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
