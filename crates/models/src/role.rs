use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryOrder};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::user;

pub const ADMIN: &str = "admin";
pub const NAME_MAX_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "role")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::User => Entity::has_many(user::Entity).into() }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Trimmed, non-empty, at most 64 chars.
pub fn validate_name(name: &str) -> Result<String, ModelError> {
    let name = name.trim();
    if name.is_empty() { return Err(ModelError::Validation("role name required".into())); }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(ModelError::Validation(format!("role name longer than {NAME_MAX_LEN} chars")));
    }
    Ok(name.to_string())
}

pub async fn create(db: &DatabaseConnection, name: &str) -> Result<Model, ModelError> {
    let name = validate_name(name)?;
    let am = ActiveModel {
        name: Set(name),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    am.insert(db).await.map_err(ModelError::from_db)
}

pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(ModelError::from_db)
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, ModelError> {
    Entity::find().order_by_asc(Column::Id).all(db).await.map_err(ModelError::from_db)
}
