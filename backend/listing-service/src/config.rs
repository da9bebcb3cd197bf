/// Configuration management for Listing Service
///
/// Everything is read from environment variables; `main` loads `.env` first.
use db_pool::env_utils::{first_env, parse_env_with_default};
use serde::{Deserialize, Serialize};
use std::fmt;

const DEV_JWT_SECRET: &str = "landsure-dev-access-secret";
const DEV_REFRESH_SECRET: &str = "landsure-dev-refresh-secret";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
    pub workers: usize,
    /// Emit JSON logs instead of the human-readable format
    pub json_logs: bool,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("STORE_BACKEND must be 'postgres' or 'memory', got '{}'", other)),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub refresh_secret: String,
    /// Mark the refresh cookie `Secure`
    pub cookie_secure: bool,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("refresh_secret", &"[REDACTED]")
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: String,
    pub max_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let port = match first_env(&["LISTING_SERVICE_PORT", "PORT"]) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| format!("Invalid port '{}': {}", raw, e))?,
            None => 5000,
        };

        let backend = match std::env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Postgres,
        };

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("LISTING_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
                workers: parse_env_with_default("HTTP_WORKERS", 4usize).max(1),
                json_logs: json_logs_from_env(),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                backend,
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/landsure".to_string()),
                max_connections: parse_env_with_default("DB_MAX_CONNECTIONS", 20),
            },
            auth: {
                let jwt_secret = secret_from_env("JWT_SECRET", DEV_JWT_SECRET, production)?;
                let refresh_secret =
                    secret_from_env("REFRESH_TOKEN_SECRET", DEV_REFRESH_SECRET, production)?;
                AuthConfig {
                    jwt_secret,
                    refresh_secret,
                    cookie_secure: parse_env_with_default("COOKIE_SECURE", production),
                }
            },
            uploads: UploadConfig {
                dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
                max_bytes: parse_env_with_default("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            },
        })
    }
}

/// `LOG_FORMAT=json` switches the subscriber to JSON lines.
pub fn json_logs_from_env() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn secret_from_env(key: &str, dev_default: &str, production: bool) -> Result<String, String> {
    match std::env::var(key) {
        Ok(value) if production && (value.trim().is_empty() || value == dev_default) => Err(
            format!("{} must be set to a non-default value in production", key),
        ),
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ if production => Err(format!("{} must be set in production", key)),
        _ => {
            tracing::warn!("{} not set; using development default", key);
            Ok(dev_default.to_string())
        }
    }
}
