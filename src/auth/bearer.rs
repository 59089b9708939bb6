/// Bearer credential extraction from request headers.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

const BEARER_SCHEME: &str = "bearer";

/// Dedicated credential header; its whole value is the token
const BEARER_HEADER: &str = "bearer";

/// Extract the raw token from the request headers
///
/// The `Bearer` header is the designated field and its value, trimmed, is the
/// token. `Authorization: Bearer <token>` is accepted when that header is
/// absent. The token format is not inspected; it may be an access token or a
/// refresh token depending on the caller.
///
/// # Errors
/// Returns `AuthError::MissingCredential` if neither header carries a
/// non-empty token
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    let token = match headers.get(BEARER_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| AuthError::MissingCredential)?
            .trim(),
        None => from_authorization(headers)?,
    };

    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    Ok(token.to_string())
}

fn from_authorization(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingCredential)?
        .trim_start();

    // Scheme is case-insensitive; the token itself is returned untouched
    let (scheme, token) = value.split_at(value.find(char::is_whitespace).unwrap_or(value.len()));
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::MissingCredential);
    }

    Ok(token.trim())
}
