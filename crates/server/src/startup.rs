use std::future::Future;
use std::time::Duration;

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use service::auth::AuthConfig;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Connect, migrate and seed; everything the router needs.
pub async fn build_state(cfg: &AppConfig) -> Result<auth::ServerState, StartupError> {
    if cfg.auth.jwt_secret.trim().is_empty() {
        return Err(StartupError::InvalidConfig("auth.jwt_secret is empty".into()));
    }
    common::env::ensure_instance_dir(&cfg.database.url).await?;

    let db = models::db::connect_with_config(&models::db::DatabaseConfig::from_app(&cfg.database)).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Migration(e.to_string()))?;
        info!(event = "migrations_applied", "database schema up to date");
    } else {
        warn!("database.run_migrations is off; assuming schema is current");
    }

    if let Some((username, password)) = cfg.bootstrap.admin() {
        service::bootstrap::ensure_admin(&db, username, password).await?;
    }

    let mut auth_cfg = AuthConfig::new(cfg.auth.jwt_secret.clone());
    auth_cfg.token_ttl = Duration::from_secs(cfg.auth.token_ttl_secs);
    Ok(auth::ServerState { db, auth: auth_cfg })
}

pub fn build_app(state: auth::ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Run until the process is killed.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    run_with_shutdown(cfg, std::future::pending()).await
}

/// Run until `shutdown` resolves, then drain in-flight requests.
pub async fn run_with_shutdown<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind((cfg.server.host.as_str(), cfg.server.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, environment = ?cfg.environment, "blog api listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("http server drained");
    Ok(())
}
