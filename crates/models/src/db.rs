use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use once_cell::sync::Lazy;
use std::{env, time::Duration};
use tracing::{debug, info};

pub static DATABASE_URL: Lazy<String> = Lazy::new(|| {
    // Load .env if present
    let _ = dotenvy::dotenv();
    env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://instance/blog.sqlite?mode=rwc".to_string())
});

pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Pool settings resolved to concrete durations.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::from_app(&configs::DatabaseConfig::default())
    }
}

impl DatabaseConfig {
    pub fn from_app(cfg: &configs::DatabaseConfig) -> Self {
        Self {
            url: cfg.url.clone(),
            max_connections: cfg.max_connections,
            min_connections: cfg.min_connections,
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.acquire_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.idle_timeout_secs),
            max_lifetime: Duration::from_secs(cfg.max_lifetime_secs),
            sqlx_logging: cfg.sqlx_logging,
        }
    }

    /// Settings from `config.toml` (or `CONFIG_PATH`) after env overrides.
    pub fn from_file() -> anyhow::Result<Self> {
        let app = configs::AppConfig::load_and_validate()?;
        Ok(Self::from_app(&app.database))
    }

    pub fn from_env() -> Self {
        Self { url: DATABASE_URL.clone(), ..Self::default() }
    }

    pub fn in_memory() -> Self {
        Self { url: IN_MEMORY_URL.to_string(), ..Self::default() }
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("sqlite:") && self.url.contains(":memory:")
    }
}

pub async fn connect() -> anyhow::Result<DatabaseConnection> {
    let cfg = DatabaseConfig::from_file().unwrap_or_else(|_| DatabaseConfig::from_env());
    connect_with_config(&cfg).await
}

pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.connect_timeout(cfg.connect_timeout)
        .acquire_timeout(cfg.acquire_timeout)
        .sqlx_logging(cfg.sqlx_logging);

    if cfg.is_in_memory() {
        // every sqlite connection gets its own private in-memory database
        opts.max_connections(1).min_connections(1);
    } else {
        opts.max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .idle_timeout(cfg.idle_timeout)
            .max_lifetime(cfg.max_lifetime);
    }

    debug!(in_memory = cfg.is_in_memory(), max = cfg.max_connections, "opening database pool");
    let db = Database::connect(opts).await?;
    info!(backend = ?db.get_database_backend(), "database connected");
    Ok(db)
}
