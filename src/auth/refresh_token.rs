/// Refresh Token Management
///
/// Refresh tokens are:
/// - Cryptographically secure random 64-character strings
/// - Opaque: they carry no claims and are only meaningful as a lookup key
/// - Bound to one user for their whole life
/// - Dead once revoked or past their expiry horizon, whichever comes first
///
/// Persistence lives behind `crate::store::RefreshTokenStore`; this module
/// owns what a record means.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use uuid::Uuid;

const REFRESH_TOKEN_LENGTH: usize = 64;

/// Persisted state of one refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// Build the record for a freshly issued token
    pub fn new(token: String, user_id: Uuid, now: DateTime<Utc>, horizon: Duration) -> Self {
        Self {
            token,
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + horizon,
            revoked_at: None,
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// The only gate for exchanging this token for an access token
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && now < self.expires_at
    }
}

/// Generate a new cryptographically secure refresh token
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// SHA-256 hex digest of a refresh token, used as the at-rest lookup key
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
