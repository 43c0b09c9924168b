use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::info;

use models::role;
use crate::errors::ServiceError;

/// Create a role. Names are unique.
pub async fn create_role(db: &DatabaseConnection, name: &str) -> Result<role::Model, ServiceError> {
    let name = role::validate_name(name).map_err(ServiceError::invalid_field("name"))?;
    let created = role::create(db, &name).await.map_err(|e| match ServiceError::from(e) {
        ServiceError::Conflict(_) => ServiceError::Conflict(format!("role `{name}` already exists")),
        other => other,
    })?;
    info!(role_id = created.id, name = %created.name, "role_created");
    Ok(created)
}

pub async fn list_roles(db: &DatabaseConnection) -> Result<Vec<role::Model>, ServiceError> {
    Ok(role::list(db).await?)
}

pub async fn get_role(db: &DatabaseConnection, id: i32) -> Result<Option<role::Model>, ServiceError> {
    Ok(role::Entity::find_by_id(id).one(db).await?)
}

/// Find a role by name, creating it when missing.
pub async fn ensure_role(db: &DatabaseConnection, name: &str) -> Result<role::Model, ServiceError> {
    if let Some(existing) = role::find_by_name(db, name).await? {
        return Ok(existing);
    }
    create_role(db, name).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn create_list_get() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let admin = create_role(&db, "admin").await?;
        create_role(&db, "editor").await?;
        assert_eq!(list_roles(&db).await?.len(), 2);
        assert_eq!(get_role(&db, admin.id).await?.unwrap().name, "admin");
        assert!(get_role(&db, 999).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn duplicates_and_blanks_are_rejected() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        create_role(&db, "admin").await?;
        assert!(matches!(create_role(&db, "admin").await, Err(ServiceError::Conflict(_))));
        assert!(matches!(create_role(&db, " ").await, Err(ServiceError::Invalid { field: "name", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn ensure_role_is_idempotent() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let a = ensure_role(&db, "admin").await?;
        let b = ensure_role(&db, "admin").await?;
        assert_eq!(a.id, b.id);
        assert_eq!(list_roles(&db).await?.len(), 1);
        Ok(())
    }
}
