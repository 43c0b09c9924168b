//! First-administrator seeding.
//!
//! `POST /users` is admin-only, so a fresh database needs one admin created
//! out of band.

use tracing::{info, warn};
use sea_orm::DatabaseConnection;

use models::{role, user};
use crate::{errors::ServiceError, roles, users};

/// Ensure the `admin` role and an admin account named `username` exist.
/// An existing account is left untouched (its password is not reset).
pub async fn ensure_admin(db: &DatabaseConnection, username: &str, password: &str) -> Result<user::Model, ServiceError> {
    let admin = roles::ensure_role(db, role::ADMIN).await?;
    if let Some(existing) = user::find_by_username(db, username).await? {
        if existing.role_id != admin.id {
            warn!(user_id = existing.id, "bootstrap user exists without admin role; leaving it unchanged");
        }
        return Ok(existing);
    }
    let created = users::create_user(
        db,
        users::NewUser { username: username.to_string(), password: password.to_string(), role_id: admin.id },
    )
    .await?;
    info!(user_id = created.id, event = "admin_bootstrapped", "created initial administrator");
    Ok(created)
}
