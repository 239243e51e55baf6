//! Request routing for the redirect flow.
//!
//! - `/auth?redirect_url=...` redirects to the provider's consent screen
//! - `/callback?state=...&code=...` exchanges the code and redirects to the
//!   original destination with the token in the URL fragment
//!
//! Every other path is a 404. Each request is classified independently and
//! handled to completion; errors are turned into JSON responses here and never
//! propagate to the host.

use crate::error::RelayError;
use crate::gateway::{GatewayRequest, GatewayResponse};
use crate::provider::{ProviderClient, TokenExchange};
use crate::state::{decode_state, encode_state};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Path that starts the flow.
pub const AUTH_PATH: &str = "/auth";

/// Path the provider redirects back to.
pub const CALLBACK_PATH: &str = "/callback";

/// The handler a request path maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Auth,
    Callback,
    NotFound,
}

impl Route {
    /// Classifies a request path by exact match.
    #[must_use]
    pub fn classify(path: &str) -> Self {
        match path {
            AUTH_PATH => Self::Auth,
            CALLBACK_PATH => Self::Callback,
            _ => Self::NotFound,
        }
    }
}

/// Stateless router over the provider client and token exchange.
///
/// Shared immutably between concurrent invocations.
#[derive(Clone)]
pub struct RequestRouter {
    provider: ProviderClient,
    exchange: Arc<dyn TokenExchange>,
}

impl RequestRouter {
    /// Creates a router that exchanges codes with the provider itself.
    #[must_use]
    pub fn new(provider: ProviderClient) -> Self {
        let exchange = Arc::new(provider.clone());
        Self { provider, exchange }
    }

    /// Creates a router with a substitute token exchange.
    #[must_use]
    pub fn with_exchange(provider: ProviderClient, exchange: Arc<dyn TokenExchange>) -> Self {
        Self { provider, exchange }
    }

    /// Handles one invocation.
    #[instrument(skip_all, fields(path = %request.path))]
    pub async fn handle(&self, request: &GatewayRequest) -> GatewayResponse {
        let route = Route::classify(&request.path);
        debug!(?route, "classified request");

        let result = match route {
            Route::Auth => self.start_authorization(request),
            Route::Callback => self.complete_authorization(request).await,
            Route::NotFound => Err(RelayError::NotFound),
        };

        match result {
            Ok(response) => response,
            Err(err) => {
                if err.status_code() >= 500 {
                    error!(error = %err, "request failed");
                } else {
                    warn!(error = %err, status = err.status_code(), "request rejected");
                }
                err.into()
            }
        }
    }

    fn start_authorization(&self, request: &GatewayRequest) -> Result<GatewayResponse, RelayError> {
        let redirect_url = request
            .param("redirect_url")
            .ok_or(RelayError::Validation {
                parameter: "redirect_url",
            })?;

        let state = encode_state(redirect_url).map_err(RelayError::Encoding)?;
        let auth_url = self.provider.authorization_url(&state);

        info!("redirecting to identity provider");
        Ok(GatewayResponse::found(auth_url))
    }

    async fn complete_authorization(
        &self,
        request: &GatewayRequest,
    ) -> Result<GatewayResponse, RelayError> {
        let state = request.param("state").ok_or(RelayError::Validation {
            parameter: "state",
        })?;

        let redirect_url = decode_state(state).map_err(RelayError::Decoding)?;

        let code = request.param("code").ok_or(RelayError::Validation {
            parameter: "code",
        })?;

        let token = self
            .exchange
            .exchange_code(code)
            .await
            .map_err(RelayError::Exchange)?;

        // Fragment, not query: browsers never send it to the destination server.
        let location = format!("{}#access_token={}", redirect_url, token.access_token);

        info!("authorization completed, redirecting to destination");
        Ok(GatewayResponse::found(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::error::ExchangeError;
    use crate::provider::TokenResult;
    use async_trait::async_trait;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE;
    use oauth2::url::Url;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory token exchange for testing.
    struct StubExchange {
        outcome: Result<TokenResult, ExchangeError>,
        codes: Mutex<Vec<String>>,
    }

    impl StubExchange {
        fn succeeding(access_token: &str) -> Arc<Self> {
            Arc::new(Self {
                outcome: Ok(TokenResult::bearer(access_token)),
                codes: Mutex::new(Vec::new()),
            })
        }

        fn failing(reason: &str) -> Arc<Self> {
            Arc::new(Self {
                outcome: Err(ExchangeError::Request {
                    reason: reason.to_string(),
                }),
                codes: Mutex::new(Vec::new()),
            })
        }

        fn codes(&self) -> Vec<String> {
            self.codes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TokenExchange for StubExchange {
        async fn exchange_code(&self, code: &str) -> Result<TokenResult, ExchangeError> {
            self.codes.lock().unwrap().push(code.to_string());
            self.outcome.clone()
        }
    }

    fn provider() -> ProviderClient {
        ProviderClient::new(ProviderConfig::new(
            "client-123".to_string(),
            "s3cret".to_string(),
            "https://relay.example/callback".to_string(),
        ))
        .expect("client")
    }

    fn router_with(exchange: Arc<StubExchange>) -> RequestRouter {
        RequestRouter::with_exchange(provider(), exchange)
    }

    fn error_of(response: &GatewayResponse) -> String {
        let body: serde_json::Value =
            serde_json::from_str(response.body.as_deref().expect("body")).expect("JSON body");
        body["error"].as_str().expect("error string").to_string()
    }

    fn valid_state() -> String {
        URL_SAFE.encode(r#"{"redirect_url":"https://app.example/done"}"#)
    }

    #[test]
    fn classify_matches_exact_paths() {
        assert_eq!(Route::classify("/auth"), Route::Auth);
        assert_eq!(Route::classify("/callback"), Route::Callback);
        assert_eq!(Route::classify("/health"), Route::NotFound);
        assert_eq!(Route::classify("/auth/"), Route::NotFound);
        assert_eq!(Route::classify(""), Route::NotFound);
    }

    #[tokio::test]
    async fn auth_requires_redirect_url() {
        let router = router_with(StubExchange::succeeding("abc123"));
        let response = router.handle(&GatewayRequest::new("/auth")).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(error_of(&response), "redirect_url parameter is required");
        assert_eq!(response.location(), None);
    }

    #[tokio::test]
    async fn auth_treats_empty_redirect_url_as_missing() {
        let router = router_with(StubExchange::succeeding("abc123"));
        let request = GatewayRequest::new("/auth").with_param("redirect_url", "");
        let response = router.handle(&request).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(error_of(&response), "redirect_url parameter is required");
    }

    #[tokio::test]
    async fn auth_redirects_to_provider_with_state() {
        let router = router_with(StubExchange::succeeding("abc123"));
        let request =
            GatewayRequest::new("/auth").with_param("redirect_url", "https://app.example/done");
        let response = router.handle(&request).await;

        assert_eq!(response.status_code, 302);
        assert_eq!(response.body, None);

        let location = Url::parse(response.location().expect("Location")).expect("valid URL");
        assert_eq!(location.host_str(), Some("accounts.google.com"));

        let query: HashMap<String, String> = location.query_pairs().into_owned().collect();
        assert_eq!(query["state"], valid_state());
        assert_eq!(query["prompt"], "select_account");
        assert_eq!(query["access_type"], "online");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["include_granted_scopes"], "true");
    }

    #[tokio::test]
    async fn callback_requires_state() {
        let exchange = StubExchange::succeeding("abc123");
        let router = router_with(exchange.clone());
        let response = router.handle(&GatewayRequest::new("/callback")).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(error_of(&response), "state parameter is required");
        assert!(exchange.codes().is_empty());
    }

    #[tokio::test]
    async fn callback_checks_state_before_code() {
        let router = router_with(StubExchange::succeeding("abc123"));
        let request = GatewayRequest::new("/callback").with_param("code", "4/0Ab");
        let response = router.handle(&request).await;

        assert_eq!(error_of(&response), "state parameter is required");
    }

    #[tokio::test]
    async fn callback_rejects_malformed_state() {
        let exchange = StubExchange::succeeding("abc123");
        let router = router_with(exchange.clone());
        let request = GatewayRequest::new("/callback")
            .with_param("state", "%%%not-base64%%%")
            .with_param("code", "4/0Ab");
        let response = router.handle(&request).await;

        assert_eq!(response.status_code, 400);
        assert!(error_of(&response).starts_with("invalid state parameter: "));
        assert!(exchange.codes().is_empty());
    }

    #[tokio::test]
    async fn callback_rejects_malformed_state_without_code() {
        let router = router_with(StubExchange::succeeding("abc123"));
        let request = GatewayRequest::new("/callback").with_param("state", "!!");
        let response = router.handle(&request).await;

        assert!(error_of(&response).starts_with("invalid state parameter: "));
    }

    #[tokio::test]
    async fn callback_requires_code() {
        let exchange = StubExchange::succeeding("abc123");
        let router = router_with(exchange.clone());
        let request = GatewayRequest::new("/callback").with_param("state", valid_state());
        let response = router.handle(&request).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(error_of(&response), "code parameter is required");
        assert!(exchange.codes().is_empty());
    }

    #[tokio::test]
    async fn callback_redirects_with_token_in_fragment() {
        let exchange = StubExchange::succeeding("abc123");
        let router = router_with(exchange.clone());
        let request = GatewayRequest::new("/callback")
            .with_param("state", valid_state())
            .with_param("code", "4/0Ab");
        let response = router.handle(&request).await;

        assert_eq!(response.status_code, 302);
        assert_eq!(
            response.location(),
            Some("https://app.example/done#access_token=abc123")
        );
        assert_eq!(response.body, None);
        assert_eq!(exchange.codes(), vec!["4/0Ab".to_string()]);
    }

    #[tokio::test]
    async fn callback_passes_empty_redirect_url_through() {
        let router = router_with(StubExchange::succeeding("abc123"));
        let request = GatewayRequest::new("/callback")
            .with_param("state", URL_SAFE.encode(r#"{"redirect_url":""}"#))
            .with_param("code", "4/0Ab");
        let response = router.handle(&request).await;

        assert_eq!(response.status_code, 302);
        assert_eq!(response.location(), Some("#access_token=abc123"));
    }

    #[tokio::test]
    async fn callback_reports_exchange_failure() {
        let router = router_with(StubExchange::failing("invalid_grant: Bad Request"));
        let request = GatewayRequest::new("/callback")
            .with_param("state", valid_state())
            .with_param("code", "expired");
        let response = router.handle(&request).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            error_of(&response),
            "failed to exchange token: invalid_grant: Bad Request"
        );
        assert_eq!(response.location(), None);
    }

    #[tokio::test]
    async fn auth_state_roundtrips_through_callback() {
        let router = router_with(StubExchange::succeeding("tok"));
        let destination = "https://app.example/done?tab=settings";
        let start = router
            .handle(&GatewayRequest::new("/auth").with_param("redirect_url", destination))
            .await;
        let location = Url::parse(start.location().expect("Location")).expect("valid URL");
        let state = location
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .expect("state");

        let finish = router
            .handle(
                &GatewayRequest::new("/callback")
                    .with_param("state", state)
                    .with_param("code", "c"),
            )
            .await;
        assert_eq!(
            finish.location(),
            Some("https://app.example/done?tab=settings#access_token=tok")
        );
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let router = router_with(StubExchange::succeeding("abc123"));
        for path in ["/health", "/", "/auth/extra"] {
            let response = router.handle(&GatewayRequest::new(path)).await;
            assert_eq!(response.status_code, 404);
            assert_eq!(error_of(&response), "not found");
        }
    }
}
