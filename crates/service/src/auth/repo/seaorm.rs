use sea_orm::{DatabaseConnection, EntityTrait};

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

#[derive(Clone)]
pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_username(&self.db, username).await?;
        Ok(res.map(AuthUser::from))
    }

    async fn find_user_with_role(&self, id: i32) -> Result<Option<(AuthUser, Option<String>)>, AuthError> {
        let res = models::user::find_with_role(&self.db, id).await?;
        Ok(res.map(|(u, r)| (AuthUser::from(u), r.map(|r| r.name))))
    }

    async fn create_user(&self, username: &str, password_hash: String, role_id: i32) -> Result<AuthUser, AuthError> {
        let created = models::user::create(&self.db, username, password_hash, role_id)
            .await
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        Ok(AuthUser::from(created))
    }

    async fn get_credentials(&self, user_id: i32) -> Result<Option<Credentials>, AuthError> {
        let res = models::user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|u| Credentials { user_id: u.id, password_hash: u.password_hash }))
    }

    async fn role_name(&self, role_id: i32) -> Result<Option<String>, AuthError> {
        let res = models::role::Entity::find_by_id(role_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|r| r.name))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::service::{AuthConfig, AuthService};
    use crate::test_support::{get_db, seed_role, seed_user};

    #[tokio::test]
    async fn current_user_reads_user_and_role_together() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let editor = seed_role(&db, "editor").await?;
        let u = seed_user(&db, "ivy", editor.id).await?;
        let svc = AuthService::new(Arc::new(SeaOrmAuthRepository::new(db.clone())), AuthConfig::new("k"));

        let (user, role) = svc.current_user(u.id).await?;
        assert_eq!(user.username, "ivy");
        assert_eq!(role, "editor");
        assert!(matches!(svc.current_user(u.id + 100).await, Err(AuthError::Unauthorized)));
        Ok(())
    }
}
