/// Database connection and configuration tests
pub mod db_tests;

/// CRUD operations tests for all models
pub mod crud_tests;

use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

use crate::db::{connect_with_config, DatabaseConfig};

/// Fresh in-memory database with the schema applied.
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let db = connect_with_config(&DatabaseConfig::in_memory()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Integration tests combining multiple components
pub mod integration_tests {
    use super::setup_test_db;
    use crate::{post, role, user};
    use sea_orm::{EntityTrait, ModelTrait};
    use anyhow::Result;

    /// role -> user -> posts, then deleting the user takes the posts along
    #[tokio::test]
    async fn test_complete_workflow() -> Result<()> {
        let db = setup_test_db().await?;

        let admin = role::create(&db, "admin").await?;
        let alice = user::create(&db, "alice", "$argon2id$stub".into(), admin.id).await?;
        let p1 = post::create(&db, alice.id, "First", "hello").await?;
        let p2 = post::create(&db, alice.id, "Second", "world").await?;

        let posts = alice.find_related(post::Entity).all(&db).await?;
        assert_eq!(posts.len(), 2);

        let (found, found_role) = user::find_with_role(&db, alice.id).await?.unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found_role.unwrap().name, "admin");

        assert!(user::hard_delete(&db, alice.id).await?);
        assert!(post::Entity::find_by_id(p1.id).one(&db).await?.is_none());
        assert!(post::Entity::find_by_id(p2.id).one(&db).await?.is_none());
        assert!(!user::hard_delete(&db, alice.id).await?);
        Ok(())
    }
}
