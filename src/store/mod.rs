/// Persistence collaborators for the auth core
///
/// The session logic only talks to these traits. `postgres` is the production
/// backend; `memory` backs the test suite and local runs without a database.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::RefreshTokenRecord;
use crate::error::AppError;

pub use memory::{InMemoryAccountStore, InMemoryRefreshTokenStore};
pub use postgres::{PgAccountStore, PgRefreshTokenStore};

/// A user account as the auth core sees it
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create an account; fails with a unique violation on duplicate email
    async fn create(&self, email: &str, hashed_password: &str) -> Result<Account, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Account, AppError>;

    /// Remove every account. Returns the number removed.
    async fn delete_all(&self) -> Result<u64, AppError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError>;

    /// Mark a token revoked. A token that is already revoked keeps its
    /// first `revoked_at`, so concurrent calls both succeed.
    async fn mark_revoked(&self, token: &str, at: DateTime<Utc>) -> Result<(), AppError>;

    async fn delete_all(&self) -> Result<u64, AppError>;
}
