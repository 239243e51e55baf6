//! OAuth2 authorization code redirect flow for auth-relay.
//!
//! This crate provides:
//! - The state codec carrying the post-login destination through the provider
//! - The provider client (consent screen URL, code-for-token exchange)
//! - The request router mapping `/auth` and `/callback` to gateway responses
//!
//! # Example
//!
//! ```
//! use auth_relay_flow::{GatewayRequest, ProviderClient, ProviderConfig, RequestRouter};
//!
//! let config = ProviderConfig::new(
//!     "client-123".to_string(),
//!     "s3cret".to_string(),
//!     "https://relay.example/callback".to_string(),
//! );
//! let router = RequestRouter::new(ProviderClient::new(config).expect("valid config"));
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let request = GatewayRequest::new("/auth").with_param("redirect_url", "https://app.example/done");
//! let response = router.handle(&request).await;
//! assert_eq!(response.status_code, 302);
//! # });
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod provider;
pub mod router;
pub mod state;

pub use config::ProviderConfig;
pub use error::{ConfigError, ExchangeError, RelayError, Result, StateError};
pub use gateway::{GatewayRequest, GatewayResponse};
pub use provider::{ProviderClient, TokenExchange, TokenResult};
pub use router::{RequestRouter, Route};
pub use state::{decode_state, encode_state};
