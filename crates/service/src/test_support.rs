#![cfg(test)]
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use models::{role, user};

/// Fresh in-memory database per test, schema applied.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_with_config(&DatabaseConfig::in_memory()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn seed_role(db: &DatabaseConnection, name: &str) -> Result<role::Model, anyhow::Error> {
    Ok(role::create(db, name).await?)
}

/// Insert a user directly, skipping password hashing.
pub async fn seed_user(db: &DatabaseConnection, username: &str, role_id: i32) -> Result<user::Model, anyhow::Error> {
    Ok(user::create(db, username, "unhashed-test-value".into(), role_id).await?)
}
