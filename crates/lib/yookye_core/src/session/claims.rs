//! Presentational decode of a JWT payload.
//!
//! No signature verification happens here — the decoded claims are for
//! display only. Authorization decisions always go through the server
//! profile endpoint.

use base64::Engine;
use serde::Deserialize;

/// Claims the backend embeds in access tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Subject — user ID (standard JWT `sub` claim).
    pub sub: Option<String>,
    /// Email, when the backend embeds it.
    pub email: Option<String>,
    /// Expiry (unix timestamp).
    pub exp: Option<i64>,
    /// Issued at (unix timestamp).
    pub iat: Option<i64>,
}

/// Decode the payload segment of a JWT without verifying the signature.
///
/// Returns `None` for anything that is not a well-formed three-segment
/// token with a base64url JSON payload.
pub fn decode_unverified(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}
