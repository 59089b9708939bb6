#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use chirpy::auth::SessionService;
use chirpy::configuration::{get_configuration, ApplicationSettings, AuthSettings, DatabaseSettings};
use chirpy::startup::run;
use chirpy::store::{
    AccountStore, InMemoryAccountStore, InMemoryRefreshTokenStore, PgAccountStore,
    PgRefreshTokenStore, RefreshTokenStore,
};
use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

pub fn test_auth_settings() -> AuthSettings {
    AuthSettings {
        secret: TEST_SECRET.to_string(),
        access_token_expiry_seconds: 3600,
        refresh_token_expiry_days: 60,
    }
}

/// Serves the app with in-memory stores
pub fn spawn_app(platform: &str) -> TestApp {
    spawn_app_with(
        platform,
        Arc::new(InMemoryAccountStore::new()),
        Arc::new(InMemoryRefreshTokenStore::new()),
    )
}

/// Serves the app against a freshly migrated Postgres database
pub async fn spawn_app_with_postgres(platform: &str) -> (TestApp, PgPool) {
    let pool = configure_test_database().await;
    let app = spawn_app_with(
        platform,
        Arc::new(PgAccountStore::new(pool.clone())),
        Arc::new(PgRefreshTokenStore::new(pool.clone())),
    );
    (app, pool)
}

pub fn spawn_app_with(
    platform: &str,
    accounts: Arc<dyn AccountStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let sessions = SessionService::new(accounts, refresh_tokens, test_auth_settings());
    let application = ApplicationSettings {
        host: "127.0.0.1".to_string(),
        port,
        platform: platform.to_string(),
    };

    let server = run(listener, sessions, application).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

/// Creates a database with a random name and runs the migrations on it
pub async fn configure_test_database() -> PgPool {
    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    configure_database(&configuration.database).await
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

impl TestApp {
    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Sends the token in the dedicated `Bearer` header
    pub async fn post_bearer_header(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", self.address, path))
            .header("Bearer", token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_user(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json("/api/users", &json!({"email": email, "password": password}))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json("/api/login", &json!({"email": email, "password": password}))
            .await
    }

    /// Registers and logs in, returning the login body
    pub async fn logged_in_user(&self, email: &str, password: &str) -> Value {
        assert_eq!(201, self.create_user(email, password).await.status().as_u16());
        let response = self.login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }
}
