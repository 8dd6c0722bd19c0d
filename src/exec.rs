//! Common execution utilities for async and blocking clients.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, MAX_ERROR_BODY_CHARS, Result, truncate_str};

/// Basic credential for the authentication endpoint.
pub(crate) fn basic_credential(login: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{}:{}", login, password)))
}

/// Maps a signed collaborator-call response to a typed result.
///
/// A 401 means the short-lived token was revoked server-side and is
/// surfaced as its own error kind so callers can re-authenticate.
pub(crate) fn handle_response<T: DeserializeOwned>(
    status: reqwest::StatusCode,
    text: String,
) -> Result<T> {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ClientError::TokenRevoked);
    }
    if !status.is_success() {
        return Err(ClientError::Http(format!(
            "HTTP {} with body: {}",
            status,
            truncate_str(&text, MAX_ERROR_BODY_CHARS)
        )));
    }
    serde_json::from_str(&text).map_err(ClientError::from)
}

/// Maps an `/authenticate` failure. A 401 here means the long-lived
/// login/password pair was rejected, not that a token was revoked.
pub(crate) fn auth_failure(status: reqwest::StatusCode, text: &str) -> ClientError {
    ClientError::AuthRejected {
        status: status.as_u16(),
        message: truncate_str(text, MAX_ERROR_BODY_CHARS).to_string(),
    }
}
