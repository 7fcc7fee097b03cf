//! Application configuration loaded from environment variables.

use std::env;

use quill_infra::{DatabaseConfig, GoogleConfig, JwtConfig};

const DEV_JWT_SECRET: &str = "quill-development-secret-change-me";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in production")]
    MissingJwtSecret,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Application configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub client_url: String,
    pub jwt: JwtConfig,
    /// `None` disables federated login.
    pub google: Option<GoogleConfig>,
    /// `None` runs on the in-memory repositories.
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let production = matches!(environment.as_str(), "production" | "prod");

        let secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if production => return Err(ConfigError::MissingJwtSecret),
            _ => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let jwt = JwtConfig {
            secret,
            expiration_days: parse_var("JWT_EXPIRATION_DAYS", JwtConfig::DEFAULT_EXPIRATION_DAYS)?,
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| JwtConfig::DEFAULT_ISSUER.to_string()),
        };

        let database = match env::var("DATABASE_URL") {
            Ok(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_var(
                    "DB_MAX_CONNECTIONS",
                    DatabaseConfig::DEFAULT_MAX_CONNECTIONS,
                )?,
                min_connections: parse_var(
                    "DB_MIN_CONNECTIONS",
                    DatabaseConfig::DEFAULT_MIN_CONNECTIONS,
                )?,
            }),
            Err(_) => None,
        };

        let google = match (
            env::var("GOOGLE_CLIENT_ID"),
            env::var("GOOGLE_CLIENT_SECRET"),
            env::var("GOOGLE_CALLBACK_URL"),
        ) {
            (Ok(client_id), Ok(client_secret), Ok(callback_url)) => Some(GoogleConfig {
                client_id,
                client_secret,
                callback_url,
            }),
            _ => {
                tracing::warn!("Google OAuth credentials not configured, Google login disabled");
                None
            }
        };

        let client_url = env::var("CLIENT_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 5000)?,
            environment,
            client_url,
            jwt,
            google,
            database,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}
