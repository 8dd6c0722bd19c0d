use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use serde_json::Value;
use sha2::Sha256;

use crate::error::{ClientError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Authentication scheme name carried in the Authorization header.
pub const SCHEME: &str = "FNAUTH";

/// Request payload, tagged by kind. Each kind has its own fingerprint
/// rule; the kind is never inferred at runtime.
#[derive(Debug, Clone)]
pub enum Content {
    /// No payload (GET requests and empty bodies).
    Empty,
    /// Raw text payload.
    Text(String),
    /// Raw binary payload.
    Binary(Vec<u8>),
    /// JSON object payload.
    Json(Value),
}

impl Content {
    /// MD5 fingerprint of the payload as lowercase hex, or `None` when
    /// the payload signs as empty.
    ///
    /// Binary payloads are hex-encoded first and the digest is computed
    /// over that hex representation; the deployed verifier performs the
    /// same double transformation, so both sides must keep it. JSON
    /// payloads are fingerprinted only when they are a non-empty object;
    /// the verifier treats every other JSON value as empty content.
    pub(crate) fn fingerprint(&self) -> Option<String> {
        match self {
            Content::Empty => None,
            Content::Text(s) if s.is_empty() => None,
            Content::Text(s) => Some(hex::encode(Md5::digest(s.as_bytes()))),
            Content::Binary(b) if b.is_empty() => None,
            Content::Binary(b) => Some(hex::encode(Md5::digest(hex::encode(b).as_bytes()))),
            Content::Json(value) => match value {
                Value::Object(map) if !map.is_empty() => {
                    Some(hex::encode(Md5::digest(value.to_string().as_bytes())))
                }
                _ => None,
            },
        }
    }
}

/// Builds the canonical string for a request. Exact layout, in order:
///
/// 1. HTTP method uppercased, newline.
/// 2. With a payload: fingerprint, newline, content type, newline.
///    Without: two empty lines.
/// 3. Timestamp as whole seconds with a literal `Z` suffix, newline.
/// 4. The URL path with any query string stripped. No trailing newline.
pub(crate) fn canonical_string(
    http_method: &str,
    url: &str,
    content: &Content,
    content_type: &str,
    timestamp: DateTime<Utc>,
) -> String {
    let mut raw = String::new();
    raw.push_str(&http_method.to_uppercase());
    raw.push('\n');
    match content.fingerprint() {
        Some(fingerprint) => {
            raw.push_str(&fingerprint);
            raw.push('\n');
            raw.push_str(content_type);
            raw.push('\n');
        }
        None => raw.push_str("\n\n"),
    }
    raw.push_str(&timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string());
    raw.push('\n');
    raw.push_str(url.split('?').next().unwrap_or(url));
    raw
}

/// Computes the Authorization header value for a request.
///
/// The canonical string is HMAC-SHA256 signed with the UTF-8 bytes of
/// `secret_access_key`, the digest base64-encoded, and the result
/// prefixed with the scheme and access key id:
/// `FNAUTH {access_key_id}:{base64(signature)}`.
///
/// Fails with [`ClientError::Signing`] when `secret_access_key` is
/// empty; that means the token gate handed out an invalid token and
/// must never be silently tolerated.
pub(crate) fn sign_request(
    access_key_id: &str,
    secret_access_key: &str,
    url: &str,
    content: &Content,
    http_method: &str,
    content_type: &str,
    timestamp: DateTime<Utc>,
) -> Result<String> {
    if secret_access_key.is_empty() {
        return Err(ClientError::Signing(
            "secret access key is empty".to_string(),
        ));
    }

    let raw = canonical_string(http_method, url, content, content_type, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret_access_key.as_bytes())
        .map_err(|e| ClientError::Signing(format!("HMAC key error: {}", e)))?;
    mac.update(raw.as_bytes());
    let digest = mac.finalize().into_bytes();

    Ok(format!(
        "{} {}:{}",
        SCHEME,
        access_key_id,
        BASE64.encode(digest)
    ))
}
