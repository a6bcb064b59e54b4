//! Session token payload decoding.
//!
//! Tokens are JWTs, but only the payload segment is read. There is no
//! signature, issuer or audience check: the backend verifies tokens on every
//! API call, the client only needs the expiry to decide whether a session is
//! worth presenting.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(&'static str),

    #[error("Token payload is not valid base64: {0}")]
    Base64(String),

    #[error("Token payload is not a JSON object: {0}")]
    Json(String),
}

/// Claims the client cares about. Everything else in the payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenClaims {
    pub exp: Option<i64>,
    pub iat: Option<i64>,
    pub sub: Option<String>,
}

impl TokenClaims {
    /// True only when `exp` is present and strictly after `now`.
    pub fn is_fresh_at(&self, now: i64) -> bool {
        self.exp.map(|exp| exp > now).unwrap_or(false)
    }

    /// Seconds left before expiry, clamped to zero.
    pub fn seconds_remaining(&self, now: i64) -> Option<i64> {
        self.exp.map(|exp| (exp - now).max(0))
    }

    fn from_object(payload: &Map<String, Value>) -> Self {
        Self {
            exp: payload.get("exp").and_then(numeric_date),
            iat: payload.get("iat").and_then(numeric_date),
            sub: payload
                .get("sub")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// NumericDate claims are integers, but some issuers emit floats.
///
/// Fractional seconds are dropped. For any positive `exp` that only moves the
/// expiry earlier, so a token is never accepted past the instant it names.
fn numeric_date(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

/// Decode the payload segment of a JWT without verifying it.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or(TokenError::Malformed("missing payload segment"))?;
    if payload.is_empty() {
        return Err(TokenError::Malformed("empty payload segment"));
    }

    // Accept standard-alphabet and padded encodings as well as base64url
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| TokenError::Base64(e.to_string()))?;

    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Json(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(TokenClaims::from_object(&map)),
        Value::Null => Err(TokenError::Json("payload is null".to_string())),
        _ => Err(TokenError::Json("payload is not an object".to_string())),
    }
}
