use actix_web::{web, HttpResponse};

use crate::auth::SessionService;
use crate::configuration::ApplicationSettings;
use crate::error::{AppError, AuthError};

/// POST /admin/reset
///
/// Deletes all accounts. Only available on the dev platform.
pub async fn reset(
    sessions: web::Data<SessionService>,
    application: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    if !application.is_dev() {
        return Err(AuthError::Forbidden.into());
    }

    let removed = sessions.reset().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "deleted": removed })))
}
