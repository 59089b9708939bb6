/// JWT Claims structure
///
/// Payload of an access token: registered claims only (RFC 7519).

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// Issuer stamped into every access token
pub const ISSUER: &str = "chirpy";

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `user_id` expiring `ttl` from now
    ///
    /// A negative `ttl` yields claims that are already expired.
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now().timestamp();
        Self {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl.num_seconds(),
        }
    }

    /// Extract user ID from claims
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::InvalidToken)
    }

    /// Expired the instant `now >= exp`; there is no grace window
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}
