//! HTTP adapter around the request router.
//!
//! Every path and method goes to a single fallback handler, which turns the
//! request into a [`GatewayRequest`] and writes the [`GatewayResponse`] back.

use auth_relay_flow::{GatewayRequest, GatewayResponse, RequestRouter};
use axum::{
    Router,
    body::Body,
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode, Uri},
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds the axum application.
pub fn app(relay: Arc<RequestRouter>) -> Router {
    Router::new().fallback(dispatch).with_state(relay)
}

async fn dispatch(
    State(relay): State<Arc<RequestRouter>>,
    uri: Uri,
    Query(query_string_parameters): Query<HashMap<String, String>>,
) -> Response {
    let request = GatewayRequest {
        path: uri.path().to_string(),
        query_string_parameters,
    };
    into_http_response(relay.handle(&request).await)
}

/// Converts a gateway response record into an HTTP response.
///
/// A header that is not valid HTTP turns the whole response into a 500.
fn into_http_response(response: GatewayResponse) -> Response {
    let Some(status) = StatusCode::from_u16(response.status_code).ok() else {
        tracing::error!(status = response.status_code, "invalid status code");
        return into_http_response(GatewayResponse::error(500, "invalid response status"));
    };

    let mut http = Response::new(Body::from(response.body.unwrap_or_default()));
    *http.status_mut() = status;

    for (name, value) in response.headers {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                http.headers_mut().insert(name, value);
            }
            _ => {
                tracing::error!("invalid response header");
                return into_http_response(GatewayResponse::error(500, "invalid response header"));
            }
        }
    }

    http
}
