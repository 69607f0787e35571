use axum::http::{HeaderMap, HeaderValue};
use tracing::warn;


/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the caller's clock, seconds since epoch
pub const TIMESTAMP_HEADER: &str = "x-timestamp";

/// Maximum allowed distance between caller and server clocks, in seconds.
/// Applies in both directions.
pub const TIME_TOLERANCE_SECS: u64 = 600;

/// Credentials as they arrived on the request, before any checking.
///
/// The API key is kept as raw header bytes so secrets outside visible ASCII
/// still compare exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestCredentials {
    pub api_key: Option<Vec<u8>>,
    pub timestamp: Option<String>,
}

/// Pull the API key and timestamp headers out of a request.
///
/// Missing headers come back as `None`, as does a timestamp that is not
/// visible ASCII; `verify_request` treats them like an empty value.
pub fn extract_credentials(headers: &HeaderMap) -> RequestCredentials {
    RequestCredentials {
        api_key: headers
            .get(API_KEY_HEADER)
            .map(|v| HeaderValue::as_bytes(v).to_vec()),
        timestamp: headers
            .get(TIMESTAMP_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string()),
    }
}

/// Check a request's credentials against the shared secret.
///
/// # Flow
/// 1. API key bytes must equal `secret` exactly, otherwise `Unauthorized`
/// 2. Timestamp must parse as a base-10 i64, otherwise `Unauthorized`
/// 3. `|now - timestamp|` must be at most `TIME_TOLERANCE_SECS`, otherwise `TimestampExpired`
///
/// Stateless: a captured request stays replayable while its timestamp is fresh.
pub fn verify_request(
    credentials: &RequestCredentials,
    secret: &str,
    now: i64,
) -> Result<(), AuthError> {
    let api_key = credentials.api_key.as_deref().unwrap_or_default();
    if api_key != secret.as_bytes() {
        warn!(key_len = api_key.len(), "Authentication failed: invalid API key");
        return Err(AuthError::Unauthorized);
    }

    let raw = credentials.timestamp.as_deref().unwrap_or("");
    let timestamp: i64 = raw.parse().map_err(|_| {
        warn!(timestamp = %raw, "Authentication failed: invalid timestamp format");
        AuthError::Unauthorized
    })?;

    let skew = now.abs_diff(timestamp);
    if skew > TIME_TOLERANCE_SECS {
        warn!(timestamp, now, skew, "Authentication failed: timestamp expired");
        return Err(AuthError::TimestampExpired);
    }

    Ok(())
}

/// Auth guard rejections
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum AuthError {
    /// Wrong API key or unparseable timestamp; the caller is not told which
    Unauthorized,
    /// Timestamp parsed but is outside the tolerance window
    TimestampExpired,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Unauthorized => write!(f, "authentication failed"),
            AuthError::TimestampExpired => write!(f, "timestamp expired"),
        }
    }
}

impl std::error::Error for AuthError {}
