use thiserror::Error;

/// Maximum characters to include in error message body for debugging.
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors that can occur when talking to the tracking service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP/network layer error on a signed collaborator call.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The authentication endpoint was unreachable.
    #[error("authentication request failed: {0}")]
    AuthTransport(#[source] reqwest::Error),

    /// The authentication endpoint rejected the login/password pair.
    #[error("authentication rejected (HTTP {status}): {message}")]
    AuthRejected { status: u16, message: String },

    /// A signed call came back 401: the short-lived token was revoked
    /// server-side and a fresh `authenticate` is required.
    #[error("token revoked, re-authentication required")]
    TokenRevoked,

    /// Signature computation error. Indicates an invalid internal state
    /// (an empty secret), not bad input from the remote peer.
    #[error("signing error: {0}")]
    Signing(String),

    /// No identity or token available for the requested operation.
    #[error("credential error: {0}")]
    Credential(String),

    /// Response deserialization error.
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// Unexpected HTTP response (non-2xx with an unhelpful body).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Client construction error.
    #[error("config error: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns `true` if recovering requires a fresh explicit
    /// authentication rather than repeating the failed call.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            ClientError::TokenRevoked | ClientError::AuthRejected { .. }
        )
    }
}

/// A specialized Result type for tracking-service operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Truncates a string to at most `max_chars` characters on a valid UTF-8 boundary.
pub(crate) fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
