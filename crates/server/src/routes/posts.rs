use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use models::post;
use service::pagination::Pagination;
use service::posts::{self, NewPost, PostPatch};

use super::auth::{CurrentUser, ServerState};
use crate::errors::ApiError;
use crate::extract::{BodyFields, IdPath};

#[derive(Debug, Serialize)]
pub struct PostList {
    pub posts: Vec<post::Model>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

#[utoipa::path(
    get, path = "/posts", tag = "posts",
    params(
        ("page" = Option<u32>, Query, description = "1-based page"),
        ("per_page" = Option<u32>, Query, description = "page size, at most 100")
    ),
    responses((status = 200, description = "Newest posts first", body = crate::openapi::PostListResponse))
)]
pub async fn list(State(state): State<ServerState>, Query(opts): Query<Pagination>) -> Result<Json<PostList>, ApiError> {
    let page = posts::list_posts(&state.db, opts).await?;
    Ok(Json(PostList { posts: page.items, page: page.page, per_page: page.per_page, total: page.total }))
}

#[utoipa::path(
    get, path = "/posts/{id}", tag = "posts",
    params(("id" = i32, Path, description = "post id")),
    responses(
        (status = 200, description = "The post", body = crate::openapi::PostResponse),
        (status = 404, description = "No such post")
    )
)]
pub async fn get(State(state): State<ServerState>, IdPath(id): IdPath) -> Result<Json<post::Model>, ApiError> {
    let found = posts::get_post(&state.db, id).await?.ok_or_else(ApiError::not_found)?;
    Ok(Json(found))
}

#[utoipa::path(
    post, path = "/posts", tag = "posts",
    request_body = crate::openapi::CreatePostRequest,
    responses(
        (status = 201, description = "Created post", body = crate::openapi::PostResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Bad title or body")
    ),
    security(("bearer" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    mut body: BodyFields,
) -> Result<(StatusCode, Json<post::Model>), ApiError> {
    let title = body.required_str("title");
    let text = body.required_str("body");
    let input = body.finish(title.zip(text).map(|(title, body)| NewPost { title, body }))?;
    let created = posts::create_post(&state.db, current.id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    patch, path = "/posts/{id}", tag = "posts",
    params(("id" = i32, Path, description = "post id")),
    request_body = crate::openapi::UpdatePostRequest,
    responses(
        (status = 200, description = "Updated post", body = crate::openapi::PostResponse),
        (status = 403, description = "Not the author and not an admin"),
        (status = 404, description = "No such post"),
        (status = 422, description = "Per-field validation messages")
    ),
    security(("bearer" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    IdPath(id): IdPath,
    mut body: BodyFields,
) -> Result<Json<post::Model>, ApiError> {
    let patch = PostPatch { title: body.optional_str("title"), body: body.optional_str("body") };
    let patch = body.finish(Some(patch))?;
    let role = current.current_role(&state).await?;
    let found = posts::get_post_for_edit(&state.db, id, current.id, &role).await?;
    Ok(Json(posts::update_post(&state.db, found, patch).await?))
}

#[utoipa::path(
    delete, path = "/posts/{id}", tag = "posts",
    params(("id" = i32, Path, description = "post id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author and not an admin"),
        (status = 404, description = "No such post")
    ),
    security(("bearer" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let role = current.current_role(&state).await?;
    let found = posts::get_post_for_edit(&state.db, id, current.id, &role).await?;
    posts::delete_post(&state.db, found.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
