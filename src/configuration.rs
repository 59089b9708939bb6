use chrono::Duration;
use config::ConfigError;

/// Upper bound and fallback for access-token lifetimes
const ACCESS_TOKEN_MAX_SECONDS: i64 = 3600;

/// Longest accepted refresh-token horizon, ten years
const REFRESH_TOKEN_MAX_DAYS: i64 = 3650;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Deployment platform; admin endpoints only work on "dev"
    #[serde(default = "default_platform")]
    pub platform: String,
}

impl ApplicationSettings {
    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Token signing and lifetime settings
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_seconds: i64,
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_days: i64,
}

impl AuthSettings {
    /// Lifetime of issued access tokens.
    ///
    /// Unset, non-positive or over-long values fall back to one hour.
    pub fn access_token_ttl(&self) -> Duration {
        Duration::seconds(clamp_access_token_seconds(self.access_token_expiry_seconds))
    }

    /// Fixed horizon after which a refresh token is dead
    pub fn refresh_token_horizon(&self) -> Duration {
        Duration::days(self.refresh_token_expiry_days)
    }

    /// Rejects lifetimes that would mint dead refresh tokens or overflow
    /// date arithmetic on login
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_token_expiry_days <= 0
            || self.refresh_token_expiry_days > REFRESH_TOKEN_MAX_DAYS
        {
            return Err(ConfigError::Message(format!(
                "auth.refresh_token_expiry_days must be between 1 and {}, got {}",
                REFRESH_TOKEN_MAX_DAYS, self.refresh_token_expiry_days
            )));
        }
        Ok(())
    }
}

fn clamp_access_token_seconds(seconds: i64) -> i64 {
    if seconds <= 0 || seconds >= ACCESS_TOKEN_MAX_SECONDS {
        ACCESS_TOKEN_MAX_SECONDS
    } else {
        seconds
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_platform() -> String {
    "production".to_string()
}

fn default_access_token_expiry() -> i64 {
    ACCESS_TOKEN_MAX_SECONDS
}

fn default_refresh_token_expiry() -> i64 {
    60
}

/// Loads `configuration.yaml` (optional) overlaid with `APP_*` environment
/// variables, e.g. `APP_AUTH__SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.auth.validate()?;
    Ok(settings)
}
