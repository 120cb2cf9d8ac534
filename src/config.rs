use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEV_DEFAULT_JWT_SECRET: &str =
    "this_is_a_development_secret_key_do_not_use_it_anywhere_near_production";

/// Application configuration, loaded from `config/*.toml` files layered with
/// `APP__*` environment variables.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL (Postgres in deployment, SQLite in tests)
    pub database_url: String,

    /// Secret used to verify bearer tokens issued by the identity provider
    #[validate(length(min = 32))]
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Expected `iss` claim on incoming tokens
    #[serde(default = "default_auth_issuer")]
    pub auth_issuer: String,

    /// Expected `aud` claim on incoming tokens
    #[serde(default = "default_auth_audience")]
    pub auth_audience: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment (development/production)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Comma-separated list of allowed CORS origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,

    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
}

fn default_jwt_secret() -> String {
    DEV_DEFAULT_JWT_SECRET.to_string()
}
fn default_auth_issuer() -> String {
    "washline-auth".to_string()
}
fn default_auth_audience() -> String {
    "washline-api".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Load configuration from files and environment.
///
/// Layering (later wins): `config/default.toml`, `config/{environment}.toml`,
/// then `APP__*` environment variables (e.g. `APP__DATABASE_URL`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let environment = env::var("APP_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let cfg = Config::builder()
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{environment}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;

    app_config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;

    if !app_config.is_development() && app_config.jwt_secret == DEV_DEFAULT_JWT_SECRET {
        return Err(ConfigError::Message(
            "refusing to start outside development with the default jwt_secret".to_string(),
        ));
    }

    Ok(app_config)
}

/// Initialise the global tracing subscriber.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("washline_api={level},tower_http=info");
    let filter = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let registry = tracing_subscriber::registry().with(EnvFilter::new(filter));

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: default_jwt_secret(),
            auth_issuer: default_auth_issuer(),
            auth_audience: default_auth_audience(),
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: true,
            cors_allowed_origins: None,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
        }
    }

    #[test]
    fn short_jwt_secret_fails_validation() {
        let mut cfg = base_config();
        cfg.jwt_secret = "short".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn default_environment_is_development() {
        let cfg = base_config();
        assert!(cfg.is_development());
    }
}
