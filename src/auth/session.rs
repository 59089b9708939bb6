/// Session Orchestrator
///
/// Ties the hasher, bearer extractor, token codec and refresh-token records
/// into the user-facing flows. A session moves through
/// no-session -> active (login) -> revoked (revoke); refresh keeps it active.
///
/// The service holds no mutable state of its own. All writes go through the
/// store traits, which own consistency.

use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use chrono::Utc;
use lazy_static::lazy_static;
use uuid::Uuid;

use crate::auth::bearer::extract_bearer;
use crate::auth::jwt::{issue_access_token, validate_access_token};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh_token::{generate_refresh_token, RefreshTokenRecord};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};
use crate::store::{Account, AccountStore, RefreshTokenStore};
use crate::validators::is_valid_email;

lazy_static! {
    // Verified against when the email is unknown, so both login failures cost the same
    static ref DUMMY_HASH: Option<String> = hash_password("chirpy-login-timing-pad")
        .map_err(|e| {
            tracing::warn!(error = %e, "Login timing pad unavailable; unknown emails will answer faster")
        })
        .ok();
}

/// Result of a successful login
#[derive(Debug)]
pub struct LoginSession {
    pub account: Account,
    pub token: String,
    pub refresh_token: String,
}

pub struct SessionService {
    accounts: Arc<dyn AccountStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    settings: AuthSettings,
}

/// Argon2 is deliberately slow; keep it off the async workers
async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {}", e)))?;
    Ok(result?)
}

impl SessionService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            accounts,
            refresh_tokens,
            settings,
        }
    }

    fn secret(&self) -> &[u8] {
        self.settings.secret.as_bytes()
    }

    fn issue_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        issue_access_token(user_id, self.secret(), self.settings.access_token_ttl())
    }

    /// Create an account with a freshly hashed password
    pub async fn register(&self, email: &str, password: &str) -> Result<Account, AppError> {
        let email = is_valid_email(email)?;
        let password = password.to_string();
        let hashed_password = run_blocking(move || hash_password(&password)).await?;

        let account = self.accounts.create(&email, &hashed_password).await?;
        tracing::info!(user_id = %account.id, "Account created");

        Ok(account)
    }

    /// Verify credentials and open a session
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AppError> {
        let account = self.accounts.find_by_email(email.trim()).await?;
        let password = password.to_string();

        let Some(account) = account else {
            if let Some(dummy) = &*DUMMY_HASH {
                let dummy = dummy.clone();
                let _ = run_blocking(move || verify_password(&password, &dummy)).await;
            }
            return Err(AuthError::InvalidCredentials.into());
        };

        let stored_hash = account.hashed_password.clone();
        match run_blocking(move || verify_password(&password, &stored_hash)).await {
            Ok(true) => {}
            Ok(false) => return Err(AuthError::InvalidCredentials.into()),
            Err(AppError::Auth(e @ AuthError::Hashing(_))) => {
                tracing::error!(user_id = %account.id, error = %e, "Stored password hash unusable");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        }

        let token = self.issue_token(account.id)?;
        let refresh_token = generate_refresh_token();
        let record = RefreshTokenRecord::new(
            refresh_token.clone(),
            account.id,
            Utc::now(),
            self.settings.refresh_token_horizon(),
        );
        self.refresh_tokens.insert(&record).await?;

        tracing::info!(user_id = %account.id, "User logged in");

        Ok(LoginSession {
            account,
            token,
            refresh_token,
        })
    }

    /// Exchange a usable refresh token for a new access token
    ///
    /// The refresh token itself is neither rotated nor extended.
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AppError> {
        let raw_token = extract_bearer(headers)?;

        let record = self
            .refresh_tokens
            .find_by_token(&raw_token)
            .await?
            .ok_or(AuthError::UnknownToken)?;

        if !record.is_usable(Utc::now()) {
            tracing::warn!(
                user_id = %record.user_id,
                revoked = record.is_revoked(),
                "Attempt to use dead refresh token"
            );
            return Err(AuthError::RevokedOrExpired.into());
        }

        let account = self
            .accounts
            .find_by_id(record.user_id)
            .await?
            .ok_or(AuthError::UnknownToken)?;

        let token = self.issue_token(account.id)?;
        tracing::info!(user_id = %account.id, "Access token refreshed");

        Ok(token)
    }

    /// Revoke a refresh token. Revoking an already revoked token succeeds.
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let raw_token = extract_bearer(headers)?;

        let record = self
            .refresh_tokens
            .find_by_token(&raw_token)
            .await?
            .ok_or(AuthError::UnknownToken)?;

        if record.is_revoked() {
            tracing::debug!(user_id = %record.user_id, "Refresh token already revoked");
            return Ok(());
        }

        self.refresh_tokens.mark_revoked(&raw_token, Utc::now()).await?;
        tracing::info!(user_id = %record.user_id, "Refresh token revoked");

        Ok(())
    }

    /// Identify the caller from an access token in the bearer header
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Uuid, AppError> {
        let token = extract_bearer(headers)?;
        Ok(validate_access_token(&token, self.secret())?)
    }

    /// Change email and password of the account behind the access token
    pub async fn update_credentials(
        &self,
        headers: &HeaderMap,
        email: &str,
        password: &str,
    ) -> Result<Account, AppError> {
        let user_id = self.authenticate(headers)?;
        let email = is_valid_email(email)?;
        let password = password.to_string();
        let hashed_password = run_blocking(move || hash_password(&password)).await?;

        let account = self
            .accounts
            .update_credentials(user_id, &email, &hashed_password)
            .await?;
        tracing::info!(user_id = %account.id, "Account credentials updated");

        Ok(account)
    }

    /// Drop every account and refresh token
    pub async fn reset(&self) -> Result<u64, AppError> {
        self.refresh_tokens.delete_all().await?;
        let removed = self.accounts.delete_all().await?;
        tracing::warn!(removed = removed, "All accounts deleted");
        Ok(removed)
    }
}
