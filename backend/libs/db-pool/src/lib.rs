//! PostgreSQL pool setup for LandSure services.
//!
//! `DbConfig` carries the sizing and timeout knobs (overridable through
//! `DB_*` variables); `create_pool` connects, proves the database answers,
//! and starts a background task publishing pool gauges.

pub mod env_utils;
mod metrics;

use env_utils::parse_env_with_default;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info};

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/landsure";

/// How often pool gauges are refreshed.
const METRICS_INTERVAL: Duration = Duration::from_secs(30);

/// Timeouts applied to the pool, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolTimeouts {
    /// Budget for the startup `SELECT 1` probe
    pub connect_secs: u64,
    /// Wait for a free connection before failing a query
    pub acquire_secs: u64,
    pub idle_secs: u64,
    pub max_lifetime_secs: u64,
}

impl Default for PoolTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            acquire_secs: 10,
            idle_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

impl PoolTimeouts {
    fn from_env_or(self) -> Self {
        Self {
            connect_secs: parse_env_with_default("DB_CONNECT_TIMEOUT_SECS", self.connect_secs),
            acquire_secs: parse_env_with_default("DB_ACQUIRE_TIMEOUT_SECS", self.acquire_secs),
            idle_secs: parse_env_with_default("DB_IDLE_TIMEOUT_SECS", self.idle_secs),
            max_lifetime_secs: parse_env_with_default(
                "DB_MAX_LIFETIME_SECS",
                self.max_lifetime_secs,
            ),
        }
    }
}

#[derive(Clone)]
pub struct DbConfig {
    /// Label on the pool gauges
    pub service_name: String,
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub timeouts: PoolTimeouts,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("service_name", &self.service_name)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            database_url: String::new(),
            max_connections: 20,
            min_connections: 5,
            timeouts: PoolTimeouts::default(),
        }
    }
}

impl DbConfig {
    /// Default sizing with a mandatory `DATABASE_URL`.
    pub fn from_env(service_name: &str) -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable not set".to_string())?;

        Ok(Self {
            service_name: service_name.to_string(),
            database_url,
            ..Self::default()
        }
        .with_env_overrides())
    }

    /// Sizing for a known service; anything else gets a small pool.
    ///
    /// The marketplace API is the only heavy PostgreSQL client. Seed scripts
    /// and one-off tools stay at two connections.
    pub fn for_service(service_name: &str) -> Self {
        let (max_connections, min_connections) = match service_name {
            "listing-service" => (20, 4),
            _ => (2, 1),
        };

        Self {
            service_name: service_name.to_string(),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections,
            min_connections,
            timeouts: PoolTimeouts::default(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(self) -> Self {
        Self {
            max_connections: parse_env_with_default("DB_MAX_CONNECTIONS", self.max_connections),
            min_connections: parse_env_with_default("DB_MIN_CONNECTIONS", self.min_connections),
            timeouts: self.timeouts.from_env_or(),
            ..self
        }
    }

    pub fn log_config(&self) {
        info!(
            service = %self.service_name,
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            connect_timeout_secs = self.timeouts.connect_secs,
            acquire_timeout_secs = self.timeouts.acquire_secs,
            idle_timeout_secs = self.timeouts.idle_secs,
            max_lifetime_secs = self.timeouts.max_lifetime_secs,
            "database pool configuration"
        );
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
            .acquire_timeout(Duration::from_secs(self.timeouts.acquire_secs))
            .idle_timeout(Duration::from_secs(self.timeouts.idle_secs))
            .max_lifetime(Duration::from_secs(self.timeouts.max_lifetime_secs))
            .test_before_acquire(true)
    }
}

/// Connect, verify with `SELECT 1`, and start publishing pool gauges.
pub async fn create_pool(config: DbConfig) -> Result<PgPool, sqlx::Error> {
    debug!(?config, "creating database pool");

    let pool = config.pool_options().connect(&config.database_url).await?;
    verify(&pool, &config).await?;

    info!(service = %config.service_name, "database pool ready");
    spawn_pool_monitor(pool.clone(), config.service_name);
    Ok(pool)
}

async fn verify(pool: &PgPool, config: &DbConfig) -> Result<(), sqlx::Error> {
    let budget = Duration::from_secs(config.timeouts.connect_secs);
    match tokio::time::timeout(budget, sqlx::query("SELECT 1").execute(pool)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => {
            error!(service = %config.service_name, error = %e, "database probe failed");
            Err(e)
        }
        Err(_) => {
            error!(
                service = %config.service_name,
                timeout_secs = config.timeouts.connect_secs,
                "database probe timed out"
            );
            Err(sqlx::Error::PoolTimedOut)
        }
    }
}

fn spawn_pool_monitor(pool: PgPool, service: String) {
    metrics::record_pool_state(&pool, &service);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(METRICS_INTERVAL);
        loop {
            ticker.tick().await;
            if pool.is_closed() {
                debug!(service = %service, "pool closed, stopping gauge updates");
                break;
            }
            metrics::record_pool_state(&pool, &service);
        }
    });
}
