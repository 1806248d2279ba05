// src/config.rs

use std::{env, fmt};

use dotenvy::dotenv;
use url::Url;

/// One week, the lifetime of a login.
const DEFAULT_JWT_EXPIRATION: u64 = 7 * 24 * 60 * 60;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, reason } => write!(f, "{} is invalid: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Credentials for the administrator created on first boot.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub admin_id: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        let jwt_expiration = match env::var("JWT_EXPIRATION") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: "JWT_EXPIRATION",
                reason: e.to_string(),
            })?,
            Err(_) => DEFAULT_JWT_EXPIRATION,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = match env::var("SERVER_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "SERVER_PORT",
                reason: e.to_string(),
            })?,
            Err(_) => 3000,
        };

        let cors_origins = parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
        )?;

        let admin_seed = match (
            env::var("ADMIN_ID"),
            env::var("ADMIN_EMAIL"),
            env::var("ADMIN_PASSWORD"),
        ) {
            (Ok(admin_id), Ok(email), Ok(password)) => Some(AdminSeed {
                admin_id,
                email,
                password,
                first_name: env::var("ADMIN_FIRST_NAME").unwrap_or_else(|_| "System".to_string()),
                last_name: env::var("ADMIN_LAST_NAME")
                    .unwrap_or_else(|_| "Administrator".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            server_host,
            server_port,
            cors_origins,
            admin_seed,
        })
    }
}

/// Splits a comma-separated origin list, rejecting anything that is not an
/// absolute http(s) origin.
pub fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            let url = Url::parse(origin).map_err(|e| ConfigError::Invalid {
                key: "CORS_ORIGINS",
                reason: format!("{}: {}", origin, e),
            })?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ConfigError::Invalid {
                    key: "CORS_ORIGINS",
                    reason: format!("{}: unsupported scheme", origin),
                });
            }
            // Browsers send the origin without a trailing slash.
            Ok(url.origin().ascii_serialization())
        })
        .collect()
}
