use std::net::TcpListener;
use std::sync::Arc;

use chirpy::auth::SessionService;
use chirpy::configuration::get_configuration;
use chirpy::startup::run;
use chirpy::store::{PgAccountStore, PgRefreshTokenStore};
use chirpy::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry("info");

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    if configuration.auth.secret.is_empty() {
        tracing::error!("auth.secret must be set");
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Missing signing secret",
        ));
    }

    tracing::info!("Attempting to connect to database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
        })?;

    let sessions = SessionService::new(
        Arc::new(PgAccountStore::new(pool.clone())),
        Arc::new(PgRefreshTokenStore::new(pool)),
        configuration.auth.clone(),
    );

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!(
        platform = %configuration.application.platform,
        "Server listening on: {}",
        address
    );

    run(listener, sessions, configuration.application)?.await
}
