use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Account, AccountStore, RefreshTokenStore};
use crate::auth::RefreshTokenRecord;
use crate::error::{AppError, DatabaseError};

fn duplicate_email() -> AppError {
    DatabaseError::UniqueConstraintViolation("Email already registered".to_string()).into()
}

/// Account store held in process memory, keyed by id
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create(&self, email: &str, hashed_password: &str) -> Result<Account, AppError> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == email) {
            return Err(duplicate_email());
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            created_at: now,
            updated_at: now,
        };
        accounts.insert(account.id, account.clone());

        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Account, AppError> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == email && a.id != id) {
            return Err(duplicate_email());
        }

        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound("user".to_string()))?;
        account.email = email.to_string();
        account.hashed_password = hashed_password.to_string();
        account.updated_at = Utc::now();

        Ok(account.clone())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let mut accounts = self.accounts.write().await;
        let removed = accounts.len() as u64;
        accounts.clear();
        Ok(removed)
    }
}

/// Refresh token store held in process memory, keyed by raw token
#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    records: RwLock<HashMap<String, RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.token) {
            return Err(DatabaseError::UniqueConstraintViolation("refresh token".to_string()).into());
        }
        records.insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        Ok(self.records.read().await.get(token).cloned())
    }

    async fn mark_revoked(&self, token: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        if let Some(record) = records.get_mut(token) {
            record.revoked_at.get_or_insert(at);
            record.updated_at = at;
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}
