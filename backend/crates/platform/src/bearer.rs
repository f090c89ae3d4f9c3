//! Bearer Credential Extraction
//!
//! Parses `Authorization: Bearer <token>` request headers.

use axum::http::{HeaderMap, header};
use thiserror::Error;

/// Authorization scheme accepted by [`extract_bearer_token`]
pub const BEARER_SCHEME: &str = "bearer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BearerError {
    #[error("authorization header is required")]
    Missing,

    #[error("invalid authorization header format")]
    Malformed,

    #[error("unsupported authorization type")]
    UnsupportedScheme,
}

/// Extract the bearer token from request headers
///
/// The header value is split on whitespace. The first field is the scheme,
/// compared case-insensitively; the second is the token.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?;

    let value = value.to_str().map_err(|_| BearerError::Malformed)?;
    if value.is_empty() {
        return Err(BearerError::Missing);
    }

    let mut fields = value.split_whitespace();
    let (Some(scheme), Some(token)) = (fields.next(), fields.next()) else {
        return Err(BearerError::Malformed);
    };

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(BearerError::UnsupportedScheme);
    }

    Ok(token)
}
