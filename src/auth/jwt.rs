/// JWT Token Generation and Validation
///
/// Access tokens are HMAC-signed and self-contained; nothing is stored
/// server-side. All validation failures collapse into
/// `AuthError::InvalidToken` so callers cannot tell an expired token from a
/// forged one. The real reason is only logged.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};
use crate::error::AuthError;

/// Issue a new access token for a user
///
/// # Errors
/// Returns `AuthError::Signing` if token encoding fails
pub fn issue_access_token(user_id: Uuid, secret: &[u8], ttl: Duration) -> Result<String, AuthError> {
    let claims = Claims::new(user_id, ttl);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Validate an access token and return the user it was issued to
///
/// # Errors
/// Returns `AuthError::InvalidToken` if the token is malformed, signed with
/// another key or a non-HMAC algorithm, expired, or has a bad subject
pub fn validate_access_token(token: &str, secret: &[u8]) -> Result<Uuid, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);

    let claims = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            AuthError::InvalidToken
        })?;

    // jsonwebtoken still accepts exp == now
    if claims.is_expired_at(Utc::now().timestamp()) {
        tracing::debug!(exp = claims.exp, "Access token rejected: expired");
        return Err(AuthError::InvalidToken);
    }

    claims.user_id().map_err(|e| {
        tracing::debug!(sub = %claims.sub, "Access token rejected: subject is not a user id");
        e
    })
}
