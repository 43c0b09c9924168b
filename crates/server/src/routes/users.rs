use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use common::types::Message;
use models::user;
use service::pagination::Pagination;
use service::users::{self, NewUser, UserPatch};

use super::auth::{CurrentUser, ServerState};
use crate::errors::ApiError;
use crate::extract::{BodyFields, IdPath};

/// Listing view: never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub role_id: i32,
}

impl From<user::Model> for UserSummary {
    fn from(u: user::Model) -> Self {
        Self { id: u.id, username: u.username, role_id: u.role_id }
    }
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub username: String,
}

impl From<user::Model> for PublicUser {
    fn from(u: user::Model) -> Self {
        Self { id: u.id, username: u.username }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[utoipa::path(
    get, path = "/users", tag = "users",
    params(
        ("page" = Option<u32>, Query, description = "1-based page; omit both to list everyone"),
        ("per_page" = Option<u32>, Query, description = "page size, at most 100")
    ),
    responses(
        (status = 200, description = "All users", body = crate::openapi::UserListResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer" = []))
)]
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<UserList>, ApiError> {
    current.require_admin(&state).await?;
    if q.page.is_none() && q.per_page.is_none() {
        let all = users::list_users(&state.db).await?;
        return Ok(Json(UserList { users: all.into_iter().map(UserSummary::from).collect(), total: None }));
    }
    let defaults = Pagination::default();
    let opts = Pagination { page: q.page.unwrap_or(defaults.page), per_page: q.per_page.unwrap_or(defaults.per_page) };
    let page = users::list_users_paginated(&state.db, opts).await?;
    Ok(Json(UserList { users: page.items.into_iter().map(UserSummary::from).collect(), total: Some(page.total) }))
}

#[utoipa::path(
    post, path = "/users", tag = "users",
    request_body = crate::openapi::CreateUserRequest,
    responses(
        (status = 201, description = "User created!", body = crate::openapi::MessageResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Username taken"),
        (status = 422, description = "Per-field validation messages")
    ),
    security(("bearer" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    mut body: BodyFields,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    current.require_admin(&state).await?;
    let username = body.required_str("username");
    let password = body.required_str("password");
    let role_id = body.required_int("role_id");
    let input = body.finish(
        username.zip(password).zip(role_id).map(|((username, password), role_id)| NewUser { username, password, role_id }),
    )?;
    let created = users::create_user(&state.db, input).await?;
    info!(user_id = created.id, by = current.id, "user created via api");
    Ok((StatusCode::CREATED, Json(Message::new("User created!"))))
}

#[utoipa::path(
    get, path = "/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "user id")),
    responses(
        (status = 200, description = "Public profile", body = crate::openapi::PublicUserResponse),
        (status = 404, description = "No such user")
    )
)]
pub async fn get(State(state): State<ServerState>, IdPath(id): IdPath) -> Result<Json<PublicUser>, ApiError> {
    let found = users::get_user(&state.db, id).await?.ok_or_else(ApiError::not_found)?;
    Ok(Json(PublicUser::from(found)))
}

/// Self-service or admin; only admins may move a user to another role.
async fn ensure_may_modify(state: &ServerState, current: &CurrentUser, target: i32, patch: Option<&UserPatch>) -> Result<(), ApiError> {
    let is_admin = current.is_admin(state).await?;
    if is_admin {
        return Ok(());
    }
    if current.id != target || patch.map(|p| p.role_id.is_some()).unwrap_or(false) {
        return Err(ApiError::forbidden());
    }
    Ok(())
}

#[utoipa::path(
    patch, path = "/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "user id")),
    request_body = crate::openapi::UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = crate::openapi::PublicUserResponse),
        (status = 403, description = "Not this user and not an admin"),
        (status = 404, description = "No such user"),
        (status = 422, description = "Per-field validation messages")
    ),
    security(("bearer" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    IdPath(id): IdPath,
    mut body: BodyFields,
) -> Result<Json<PublicUser>, ApiError> {
    let patch = UserPatch {
        username: body.optional_str("username"),
        password: body.optional_str("password"),
        role_id: body.optional_int("role_id"),
    };
    let patch = body.finish(Some(patch))?;
    ensure_may_modify(&state, &current, id, Some(&patch)).await?;
    let updated = users::update_user(&state.db, id, patch).await?;
    Ok(Json(PublicUser::from(updated)))
}

#[utoipa::path(
    delete, path = "/users/{id}", tag = "users",
    params(("id" = i32, Path, description = "user id")),
    responses(
        (status = 204, description = "Deleted, along with the user's posts"),
        (status = 403, description = "Not this user and not an admin"),
        (status = 404, description = "No such user")
    ),
    security(("bearer" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    ensure_may_modify(&state, &current, id, None).await?;
    if users::delete_user(&state.db, id).await? {
        info!(user_id = id, by = current.id, "user deleted via api");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found())
    }
}
