use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{post, role};

pub const USERNAME_MAX_LEN: usize = 128;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role_id: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Role,
    Post,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Role => Entity::belongs_to(role::Entity).from(Column::RoleId).to(role::Column::Id).into(),
            Relation::Post => Entity::has_many(post::Entity).into(),
        }
    }
}

impl Related<role::Entity> for Entity {
    fn to() -> RelationDef { Relation::Role.def() }
}

impl Related<post::Entity> for Entity {
    fn to() -> RelationDef { Relation::Post.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<String, ModelError> {
    let username = username.trim();
    if username.is_empty() { return Err(ModelError::Validation("username required".into())); }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(ModelError::Validation(format!("username longer than {USERNAME_MAX_LEN} chars")));
    }
    Ok(username.to_string())
}

/// Insert a user whose password has already been hashed.
pub async fn create(db: &DatabaseConnection, username: &str, password_hash: String, role_id: i32) -> Result<Model, ModelError> {
    let username = validate_username(username)?;
    if password_hash.trim().is_empty() { return Err(ModelError::Validation("password hash required".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        username: Set(username),
        password_hash: Set(password_hash),
        role_id: Set(role_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    am.insert(db).await.map_err(ModelError::from_db)
}

pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Username.eq(username.trim()))
        .one(db)
        .await
        .map_err(ModelError::from_db)
}

/// Load the user together with its role in one query.
pub async fn find_with_role(db: &DatabaseConnection, id: i32) -> Result<Option<(Model, Option<role::Model>)>, ModelError> {
    Entity::find_by_id(id)
        .find_also_related(role::Entity)
        .one(db)
        .await
        .map_err(ModelError::from_db)
}

/// Remove the user (and, through the FK, their posts). Returns false if absent.
pub async fn hard_delete(db: &DatabaseConnection, id: i32) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await.map_err(ModelError::from_db)?;
    Ok(res.rows_affected > 0)
}
