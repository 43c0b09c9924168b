use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::user;

pub const TITLE_MAX_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created: DateTimeWithTimeZone,
    pub author_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::AuthorId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<String, ModelError> {
    let title = title.trim();
    if title.is_empty() { return Err(ModelError::Validation("title required".into())); }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(ModelError::Validation(format!("title longer than {TITLE_MAX_LEN} chars")));
    }
    Ok(title.to_string())
}

pub fn validate_body(body: &str) -> Result<(), ModelError> {
    if body.trim().is_empty() { return Err(ModelError::Validation("body required".into())); }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, author_id: i32, title: &str, body: &str) -> Result<Model, ModelError> {
    let title = validate_title(title)?;
    validate_body(body)?;
    let am = ActiveModel {
        title: Set(title),
        body: Set(body.to_string()),
        created: Set(Utc::now().into()),
        author_id: Set(author_id),
        ..Default::default()
    };
    am.insert(db).await.map_err(ModelError::from_db)
}
