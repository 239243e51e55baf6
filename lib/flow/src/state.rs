//! Encoding of the OAuth2 `state` parameter.
//!
//! The state carries the caller's post-login destination through the
//! provider's redirect. Nothing is stored server-side: the payload is JSON,
//! base64url-encoded, and comes back unmodified on the callback.

use crate::error::StateError;
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};

/// URL-safe alphabet, padded on encode, padding optional on decode.
const STATE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Payload round-tripped through the provider.
///
/// `redirect_url` is required when decoding: a foreign JSON object must not
/// quietly turn into an empty destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePayload {
    pub redirect_url: String,
}

/// Encodes a redirect target into an opaque state string.
///
/// The target is not validated as a URL.
///
/// # Errors
///
/// Returns `StateError::Encoding` if the payload cannot be serialized.
pub fn encode_state(redirect_url: &str) -> Result<String, StateError> {
    let payload = StatePayload {
        redirect_url: redirect_url.to_string(),
    };
    let json = serde_json::to_vec(&payload).map_err(|e| StateError::Encoding {
        reason: e.to_string(),
    })?;
    Ok(STATE_ENGINE.encode(json))
}

/// Decodes a state string back into the redirect target.
///
/// An empty `redirect_url` is returned as-is.
///
/// # Errors
///
/// Returns `StateError::Decoding` if the input is not base64url, or the
/// decoded bytes are not a JSON object with a string `redirect_url`.
pub fn decode_state(state: &str) -> Result<String, StateError> {
    let json = STATE_ENGINE
        .decode(state)
        .map_err(|e| StateError::Decoding {
            reason: e.to_string(),
        })?;
    let payload: StatePayload =
        serde_json::from_slice(&json).map_err(|e| StateError::Decoding {
            reason: e.to_string(),
        })?;
    Ok(payload.redirect_url)
}
