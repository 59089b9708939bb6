/// Account Routes

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::SessionService;
use crate::error::{AppError, ErrorContext};
use crate::store::Account;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account (never includes the password hash)
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
}

impl From<Account> for UserResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            created_at: account.created_at.to_rfc3339(),
            updated_at: account.updated_at.to_rfc3339(),
            email: account.email,
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: Invalid email
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let account = sessions.register(&form.email, &form.password).await?;

    Ok(HttpResponse::Created().json(UserResponse::from(account)))
}

/// PUT /api/users
///
/// **Requires a valid access token** in the `Bearer` header.
///
/// # Errors
/// - 400: Missing bearer token or invalid email
/// - 401: Invalid or expired access token
/// - 409: Email taken by another account
pub async fn update_user(
    req: HttpRequest,
    form: web::Json<CredentialsRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update");

    let account = sessions
        .update_credentials(req.headers(), &form.email, &form.password)
        .await
        .map_err(|e| {
            context.log_failure(&e);
            e
        })?;

    let context = context.with_user_id(account.id.to_string());
    tracing::debug!(
        request_id = %context.request_id,
        user_id = ?context.user_id,
        "Account update response sent"
    );

    Ok(HttpResponse::Ok().json(UserResponse::from(account)))
}
