//! Webhook subscription handshake.
//!
//! When the webhook is configured, the provider sends a GET request with
//! three query parameters:
//! - hub.mode: always "subscribe"
//! - hub.verify_token: the token entered in the app dashboard
//! - hub.challenge: an opaque string that must be echoed back as plain text

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Query parameters of the verification request.
///
/// All fields are optional so that a partial query is rejected by
/// [`verify_subscription`] instead of by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(default, rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(default, rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(default, rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Why a handshake was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("mode is not 'subscribe'")]
    InvalidMode,

    #[error("no verify token is configured")]
    NotConfigured,

    #[error("verify token does not match")]
    TokenMismatch,

    #[error("challenge is missing")]
    MissingChallenge,
}

/// Check a handshake and return the challenge to echo.
///
/// Succeeds iff mode is exactly "subscribe" and the supplied token equals
/// `expected_token`. A blank or unset `expected_token` rejects everything.
pub fn verify_subscription<'a>(
    query: &'a VerifyQuery,
    expected_token: Option<&str>,
) -> Result<&'a str, VerifyError> {
    let result = check(query, expected_token);

    match &result {
        Ok(challenge) => info!(challenge_length = challenge.len(), "webhook_verified"),
        Err(e) => warn!(
            mode = query.mode.as_deref().unwrap_or(""),
            has_token = query.verify_token.is_some(),
            has_challenge = query.challenge.is_some(),
            reason = %e,
            "webhook_verification_failed"
        ),
    }

    result
}

fn check<'a>(query: &'a VerifyQuery, expected_token: Option<&str>) -> Result<&'a str, VerifyError> {
    if query.mode.as_deref() != Some("subscribe") {
        return Err(VerifyError::InvalidMode);
    }

    let expected = expected_token
        .filter(|t| !t.trim().is_empty())
        .ok_or(VerifyError::NotConfigured)?;

    let provided = query.verify_token.as_deref().unwrap_or("");
    if !constant_time_compare(expected, provided) {
        return Err(VerifyError::TokenMismatch);
    }

    query
        .challenge
        .as_deref()
        .ok_or(VerifyError::MissingChallenge)
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
