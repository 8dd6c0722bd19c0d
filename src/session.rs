use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::error::{ClientError, Result};
use crate::response::AuthResponse;

/// Long-lived identity used to (re-)authenticate a session.
///
/// The `Debug` implementation redacts `password` to prevent accidental
/// leakage in logs.
#[derive(Clone)]
pub struct Identity {
    pub hostname: String,
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("hostname", &self.hostname)
            .field("login", &self.login)
            .field("password", &"****")
            .finish()
    }
}

/// Short-lived credential pair issued by the authentication endpoint.
///
/// `access_key_id` identifies the signature; `secret_access_key` keys the
/// HMAC. The `Debug` implementation redacts the secret.
#[derive(Clone)]
pub struct Token {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub expiry: DateTime<Utc>,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"****")
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Window before expiry within which a token is treated as unusable and
/// eagerly refreshed.
fn refresh_margin() -> Duration {
    Duration::hours(2)
}

impl Token {
    pub(crate) fn from_response(response: AuthResponse) -> Result<Self> {
        Ok(Self {
            access_key_id: response.id,
            secret_access_key: response.secret_access_key,
            expiry: parse_expiry(&response.expiry_date)?,
        })
    }

    /// Returns `true` if the token expires within the safety margin and
    /// must not be handed out without attempting a refresh first.
    pub fn expires_within_margin(&self, now: DateTime<Utc>) -> bool {
        now + refresh_margin() > self.expiry
    }
}

/// Parses an expiry timestamp, discarding any sub-second fraction and
/// interpreting the result as UTC.
pub(crate) fn parse_expiry(raw: &str) -> Result<DateTime<Utc>> {
    let seconds = raw.split('.').next().unwrap_or(raw);
    let seconds = seconds.strip_suffix('Z').unwrap_or(seconds);
    NaiveDateTime::parse_from_str(seconds, "%Y-%m-%dT%H:%M:%S")
        .map(|dt| dt.and_utc())
        .map_err(|e| ClientError::Credential(format!("invalid expiry_date '{}': {}", raw, e)))
}

/// Mutable per-session credential state, owned by a client and guarded
/// by its mutex. Identity and token are installed together by a
/// successful authentication; `reset` returns the session to its empty
/// state.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) identity: Option<Identity>,
    pub(crate) token: Option<Token>,
}

impl SessionState {
    pub(crate) fn install(&mut self, identity: Identity, token: Token) {
        self.identity = Some(identity);
        self.token = Some(token);
    }

    pub(crate) fn reset(&mut self) {
        self.identity = None;
        self.token = None;
    }
}
