use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::Deserialize;
use tracing::{info, instrument};

use models::{role, user};
use crate::{auth::password::hash_password, errors::ServiceError, pagination::{Page, Pagination}};

/// Validated input for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role_id: i32,
}

/// Partial update: each present field is applied, absent ones are kept.
/// Unknown JSON keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role_id: Option<i32>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none() && self.role_id.is_none()
    }
}

async fn ensure_role_exists(db: &DatabaseConnection, role_id: i32) -> Result<(), ServiceError> {
    if role::Entity::find_by_id(role_id).one(db).await?.is_none() {
        return Err(ServiceError::invalid("role_id", "Role does not exist."));
    }
    Ok(())
}

fn conflict_as_username_taken(e: ServiceError) -> ServiceError {
    match e {
        ServiceError::Conflict(_) => ServiceError::Conflict("username already taken".into()),
        other => other,
    }
}

/// Create a user with a freshly hashed password.
#[instrument(skip(db, input), fields(username = %input.username, role_id = input.role_id))]
pub async fn create_user(db: &DatabaseConnection, input: NewUser) -> Result<user::Model, ServiceError> {
    let username = user::validate_username(&input.username).map_err(ServiceError::invalid_field("username"))?;
    if input.password.is_empty() {
        return Err(ServiceError::invalid("password", "Field may not be empty."));
    }
    ensure_role_exists(db, input.role_id).await?;

    let hash = hash_password(&input.password)?;
    let created = user::create(db, &username, hash, input.role_id)
        .await
        .map_err(|e| conflict_as_username_taken(e.into()))?;
    info!(user_id = created.id, "user_created");
    Ok(created)
}

/// Get a user by id.
pub async fn get_user(db: &DatabaseConnection, id: i32) -> Result<Option<user::Model>, ServiceError> {
    Ok(user::Entity::find_by_id(id).one(db).await?)
}

/// All users, oldest first.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>, ServiceError> {
    Ok(user::Entity::find().order_by_asc(user::Column::Id).all(db).await?)
}

/// List users with pagination.
pub async fn list_users_paginated(db: &DatabaseConnection, opts: Pagination) -> Result<Page<user::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let paginator = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page { items, page: page_idx + 1, per_page, total })
}

/// Apply a partial update to a user.
#[instrument(skip(db, patch))]
pub async fn update_user(db: &DatabaseConnection, id: i32, patch: UserPatch) -> Result<user::Model, ServiceError> {
    let found = user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))?;
    if patch.is_empty() {
        return Ok(found);
    }

    let mut am: user::ActiveModel = found.into();
    if let Some(username) = patch.username.as_deref() {
        let username = user::validate_username(username).map_err(ServiceError::invalid_field("username"))?;
        am.username = Set(username);
    }
    if let Some(password) = patch.password.as_deref() {
        if password.is_empty() {
            return Err(ServiceError::invalid("password", "Field may not be empty."));
        }
        am.password_hash = Set(hash_password(password)?);
    }
    if let Some(role_id) = patch.role_id {
        ensure_role_exists(db, role_id).await?;
        am.role_id = Set(role_id);
    }
    am.updated_at = Set(Utc::now().into());

    let updated = am.update(db).await.map_err(|e| conflict_as_username_taken(e.into()))?;
    info!(user_id = updated.id, "user_updated");
    Ok(updated)
}

/// Remove a user and their posts. Returns false if there was no such user.
pub async fn delete_user(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let deleted = user::hard_delete(db, id).await?;
    if deleted {
        info!(user_id = id, "user_deleted");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::test_support::{get_db, seed_role};

    fn new_user(name: &str, role_id: i32) -> NewUser {
        NewUser { username: name.into(), password: "s3cret!".into(), role_id }
    }

    #[tokio::test]
    async fn user_crud_service() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let r = seed_role(&db, "reader").await?;

        let u = create_user(&db, new_user("gina", r.id)).await?;
        assert_eq!(u.username, "gina");
        assert!(verify_password("s3cret!", &u.password_hash));

        let found = get_user(&db, u.id).await?.unwrap();
        assert_eq!(found.id, u.id);

        let updated = update_user(&db, u.id, UserPatch { username: Some("gigi".into()), ..Default::default() }).await?;
        assert_eq!(updated.username, "gigi");
        assert_eq!(updated.password_hash, u.password_hash);

        assert!(delete_user(&db, u.id).await?);
        assert!(get_user(&db, u.id).await?.is_none());
        assert!(!delete_user(&db, u.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_unknown_role_and_blank_fields() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let err = create_user(&db, new_user("hank", 42)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "role_id", .. }));

        let r = seed_role(&db, "reader").await?;
        let err = create_user(&db, new_user("  ", r.id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "username", .. }));

        let err = create_user(&db, NewUser { password: String::new(), ..new_user("ivy", r.id) }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "password", .. }));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let r = seed_role(&db, "reader").await?;
        create_user(&db, new_user("jack", r.id)).await?;
        let err = create_user(&db, new_user("jack", r.id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let other = create_user(&db, new_user("jill", r.id)).await?;
        let err = update_user(&db, other.id, UserPatch { username: Some("jack".into()), ..Default::default() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        Ok(())
    }

    #[tokio::test]
    async fn patch_rehashes_password_and_checks_role() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let r = seed_role(&db, "reader").await?;
        let admin = seed_role(&db, "admin").await?;
        let u = create_user(&db, new_user("kate", r.id)).await?;

        let patch: UserPatch = serde_json::from_str(r#"{"password": "n3w-pass", "id": 99, "bogus": true}"#)?;
        let updated = update_user(&db, u.id, patch).await?;
        assert_eq!(updated.id, u.id);
        assert!(verify_password("n3w-pass", &updated.password_hash));

        let err = update_user(&db, u.id, UserPatch { role_id: Some(777), ..Default::default() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "role_id", .. }));

        let promoted = update_user(&db, u.id, UserPatch { role_id: Some(admin.id), ..Default::default() }).await?;
        assert_eq!(promoted.role_id, admin.id);

        let err = update_user(&db, 12345, UserPatch::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn pagination_reports_totals() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let r = seed_role(&db, "reader").await?;
        for i in 0..5 {
            user::create(&db, &format!("user{i}"), "hash".into(), r.id).await?;
        }
        let page = list_users_paginated(&db, Pagination { page: 2, per_page: 2 }).await?;
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 2);
        assert_eq!(page.items.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(), vec!["user2", "user3"]);
        assert_eq!(list_users(&db).await?.len(), 5);
        Ok(())
    }
}
