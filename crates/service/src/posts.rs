//! Blog posts. Anyone may read; authors (or admins) may change their own.

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set, TryIntoModel};
use serde::Deserialize;
use tracing::{info, instrument};

use models::{post, role};
use crate::{errors::ServiceError, pagination::{Page, Pagination}};

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// The author and admins may modify a post.
pub fn can_modify(post: &post::Model, actor_id: i32, actor_role: &str) -> bool {
    post.author_id == actor_id || actor_role == role::ADMIN
}

#[instrument(skip(db, input))]
pub async fn create_post(db: &DatabaseConnection, author_id: i32, input: NewPost) -> Result<post::Model, ServiceError> {
    let title = post::validate_title(&input.title).map_err(ServiceError::invalid_field("title"))?;
    post::validate_body(&input.body).map_err(ServiceError::invalid_field("body"))?;
    let created = post::create(db, author_id, &title, &input.body).await?;
    info!(post_id = created.id, author_id, "post_created");
    Ok(created)
}

/// Newest first.
pub async fn list_posts(db: &DatabaseConnection, opts: Pagination) -> Result<Page<post::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let paginator = post::Entity::find()
        .order_by_desc(post::Column::Created)
        .order_by_desc(post::Column::Id)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page { items, page: page_idx + 1, per_page, total })
}

pub async fn get_post(db: &DatabaseConnection, id: i32) -> Result<Option<post::Model>, ServiceError> {
    Ok(post::Entity::find_by_id(id).one(db).await?)
}

/// Load a post and check that the actor may modify it.
pub async fn get_post_for_edit(db: &DatabaseConnection, id: i32, actor_id: i32, actor_role: &str) -> Result<post::Model, ServiceError> {
    let found = get_post(db, id).await?.ok_or_else(|| ServiceError::not_found("post"))?;
    if !can_modify(&found, actor_id, actor_role) {
        return Err(ServiceError::Forbidden("only the author may change this post".into()));
    }
    Ok(found)
}

pub async fn update_post(db: &DatabaseConnection, current: post::Model, patch: PostPatch) -> Result<post::Model, ServiceError> {
    let mut am: post::ActiveModel = current.into();
    if let Some(title) = patch.title.as_deref() {
        am.title = Set(post::validate_title(title).map_err(ServiceError::invalid_field("title"))?);
    }
    if let Some(body) = patch.body {
        post::validate_body(&body).map_err(ServiceError::invalid_field("body"))?;
        am.body = Set(body);
    }
    if !am.is_changed() {
        return Ok(am.try_into_model()?);
    }
    let updated = am.update(db).await?;
    info!(post_id = updated.id, "post_updated");
    Ok(updated)
}

pub async fn delete_post(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = post::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
