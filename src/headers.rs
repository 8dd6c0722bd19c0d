//! Assembly of the signed header set for one outgoing request.

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, DATE, HeaderMap, HeaderValue};

use crate::error::{ClientError, Result};
use crate::session::Token;
use crate::sign::{Content, sign_request};

pub(crate) const CONTENT_TYPE_JSON: &str = "application/json";

/// Builds the Authorization/Content-Type/Date header set for a request.
///
/// The Date header carries the same instant that went into the
/// signature; callers capture `now` once and pass it here.
pub(crate) fn signed_headers(
    token: &Token,
    method: &str,
    url: &str,
    content: &Content,
    timestamp: DateTime<Utc>,
) -> Result<HeaderMap> {
    let signature = sign_request(
        &token.access_key_id,
        &token.secret_access_key,
        url,
        content,
        method,
        CONTENT_TYPE_JSON,
        timestamp,
    )?;

    let mut headers = HeaderMap::with_capacity(3);
    headers.insert(AUTHORIZATION, header_value(&signature)?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    headers.insert(DATE, header_value(&format_date(timestamp))?);
    Ok(headers)
}

/// Formats the Date header, RFC-1123 style.
pub(crate) fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ClientError::Signing(format!("invalid header value: {}", e)))
}
