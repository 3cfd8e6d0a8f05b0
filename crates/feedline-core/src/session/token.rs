//! Expiry checks for the opaque signed tokens issued by the backend.
//!
//! Tokens are three `.`-separated base64url segments; the middle one is a
//! JSON claim set with a numeric `exp` (seconds since the epoch). Signatures
//! are not verified here. Anything that cannot be decoded counts as expired.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde::Deserialize;

/// Access tokens are treated as expired this many seconds early.
pub const ACCESS_TOKEN_MARGIN_SECS: i64 = 600;

#[derive(Debug, Deserialize)]
struct Claims {
    exp: f64,
}

/// Returns the `exp` claim, or `None` if the token is malformed.
pub fn expiry_of(token: &str) -> Option<f64> {
    let mut segments = token.split('.');
    let (Some(_header), Some(claims), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let claims = claims.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(claims)
        .or_else(|_| STANDARD_NO_PAD.decode(claims))
        .ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    claims.exp.is_finite().then_some(claims.exp)
}

/// Access-token rule: expired once `exp <= now + margin_secs`.
pub fn is_expired_with_margin(token: &str, now: i64, margin_secs: i64) -> bool {
    match expiry_of(token) {
        Some(exp) => exp <= (now + margin_secs) as f64,
        None => true,
    }
}

/// Access-token check with the default ten-minute margin.
pub fn is_token_expired(token: &str, now: i64) -> bool {
    is_expired_with_margin(token, now, ACCESS_TOKEN_MARGIN_SECS)
}

/// Refresh-token rule: expired once `exp < now`, no margin.
pub fn is_refresh_token_expired(token: &str, now: i64) -> bool {
    match expiry_of(token) {
        Some(exp) => exp < now as f64,
        None => true,
    }
}
