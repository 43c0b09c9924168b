use super::setup_test_db;
use crate::errors::ModelError;
use crate::{post, role, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use anyhow::Result;

/// Test role CRUD operations
#[tokio::test]
async fn test_role_crud() -> Result<()> {
    let db = setup_test_db().await?;

    let created = role::create(&db, "  editor ").await?;
    assert_eq!(created.name, "editor");

    let found = role::find_by_name(&db, "editor").await?.expect("role by name");
    assert_eq!(found.id, created.id);

    role::create(&db, "admin").await?;
    let all = role::list(&db).await?;
    assert_eq!(all.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["editor", "admin"]);

    role::Entity::delete_by_id(created.id).exec(&db).await?;
    assert!(role::find_by_name(&db, "editor").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_role_name_is_unique() -> Result<()> {
    let db = setup_test_db().await?;
    role::create(&db, "admin").await?;
    let err = role::create(&db, "admin").await.unwrap_err();
    assert!(matches!(err, ModelError::Conflict(_)), "got {err:?}");
    Ok(())
}

#[test]
fn role_name_validation() {
    assert!(role::validate_name("   ").is_err());
    assert!(role::validate_name(&"r".repeat(65)).is_err());
    assert_eq!(role::validate_name(" admin ").unwrap(), "admin");
}

/// Test user CRUD operations
#[tokio::test]
async fn test_user_crud() -> Result<()> {
    let db = setup_test_db().await?;
    let reader = role::create(&db, "reader").await?;

    let u = user::create(&db, "bob", "hash".into(), reader.id).await?;
    assert_eq!(u.username, "bob");
    assert_eq!(u.role_id, reader.id);

    let found = user::find_by_username(&db, "bob").await?.expect("user by name");
    assert_eq!(found.id, u.id);

    let mut am: user::ActiveModel = found.into();
    am.username = Set("robert".into());
    let updated = am.update(&db).await?;
    assert_eq!(updated.username, "robert");
    assert!(user::find_by_username(&db, "bob").await?.is_none());

    assert!(user::hard_delete(&db, u.id).await?);
    assert!(user::Entity::find_by_id(u.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_username_is_unique() -> Result<()> {
    let db = setup_test_db().await?;
    let r = role::create(&db, "reader").await?;
    user::create(&db, "carol", "hash".into(), r.id).await?;
    let err = user::create(&db, "carol", "hash".into(), r.id).await.unwrap_err();
    assert!(matches!(err, ModelError::Conflict(_)), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn test_user_requires_existing_role() -> Result<()> {
    let db = setup_test_db().await?;
    let err = user::create(&db, "dave", "hash".into(), 999).await.unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)), "got {err:?}");
    Ok(())
}

#[test]
fn username_validation() {
    assert!(user::validate_username("").is_err());
    assert_eq!(user::validate_username("two words").unwrap(), "two words");
    assert!(user::validate_username(&"u".repeat(129)).is_err());
    assert_eq!(user::validate_username(" eve ").unwrap(), "eve");
}

#[test]
fn password_hash_is_never_serialized() {
    let now = chrono::Utc::now().into();
    let u = user::Model { id: 1, username: "x".into(), password_hash: "secret".into(), role_id: 1, created_at: now, updated_at: now };
    let v = serde_json::to_value(&u).unwrap();
    assert!(v.get("password_hash").is_none());
    assert_eq!(v["username"], "x");
}

/// Test post CRUD operations
#[tokio::test]
async fn test_post_crud() -> Result<()> {
    let db = setup_test_db().await?;
    let r = role::create(&db, "writer").await?;
    let author = user::create(&db, "frank", "hash".into(), r.id).await?;

    let p = post::create(&db, author.id, " Title ", "Body text").await?;
    assert_eq!(p.title, "Title");
    assert_eq!(p.author_id, author.id);

    let second = post::create(&db, author.id, "Later", "More").await?;
    assert!(second.id > p.id);

    assert!(post::create(&db, author.id, "", "body").await.is_err());
    assert!(post::create(&db, author.id, "title", "   ").await.is_err());

    post::Entity::delete_by_id(p.id).exec(&db).await?;
    let left = post::Entity::find().filter(post::Column::AuthorId.eq(author.id)).all(&db).await?;
    assert_eq!(left.iter().map(|p| p.id).collect::<Vec<_>>(), vec![second.id]);
    Ok(())
}

/// Rolled-back writes leave no trace
#[tokio::test]
async fn test_transaction_rollback() -> Result<()> {
    let db = setup_test_db().await?;
    let txn = db.begin().await?;
    let am = role::ActiveModel {
        name: Set("temp".into()),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };
    am.insert(&txn).await?;
    txn.rollback().await?;
    assert!(role::find_by_name(&db, "temp").await?.is_none());
    Ok(())
}
