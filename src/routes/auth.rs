/// Session Routes
///
/// Login, access-token refresh and refresh-token revocation. The refresh
/// token travels in the `Bearer` header for refresh and revoke.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::SessionService;
use crate::error::{AppError, ErrorContext};

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: account metadata plus both tokens
#[derive(Serialize)]
pub struct LoginResponse {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
}

/// Fresh access token
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Errors
/// - 401: Incorrect email or password (same response for both)
/// - 500: Internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let session = sessions
        .login(&form.email, &form.password)
        .await
        .map_err(|e| {
            context.log_failure(&e);
            e
        })?;

    tracing::debug!(
        request_id = %context.request_id,
        user_id = %session.account.id,
        "Login response sent"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: session.account.id.to_string(),
        created_at: session.account.created_at.to_rfc3339(),
        updated_at: session.account.updated_at.to_rfc3339(),
        email: session.account.email,
        token: session.token,
        refresh_token: session.refresh_token,
    }))
}

/// POST /api/refresh
///
/// # Errors
/// - 400: Missing bearer token
/// - 401: Unknown, revoked or expired refresh token
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let token = sessions.refresh(req.headers()).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/revoke
///
/// Responds 204 whether or not the token was already revoked.
///
/// # Errors
/// - 400: Missing bearer token
/// - 401: Unknown refresh token
pub async fn revoke(
    req: HttpRequest,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    sessions.revoke(req.headers()).await?;

    Ok(HttpResponse::NoContent().finish())
}
