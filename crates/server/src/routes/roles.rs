use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;

use common::types::Message;
use models::role;
use service::roles;

use super::auth::{CurrentUser, ServerState};
use crate::errors::ApiError;
use crate::extract::BodyFields;

#[derive(Debug, Serialize)]
pub struct RoleView {
    pub id: i32,
    pub name: String,
}

impl From<role::Model> for RoleView {
    fn from(r: role::Model) -> Self {
        Self { id: r.id, name: r.name }
    }
}

#[derive(Debug, Serialize)]
pub struct RoleList {
    pub roles: Vec<RoleView>,
}

#[utoipa::path(
    post, path = "/roles", tag = "roles",
    request_body = crate::openapi::CreateRoleRequest,
    responses(
        (status = 201, description = "Role created!", body = crate::openapi::MessageResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Role name taken"),
        (status = 422, description = "Bad or missing name")
    ),
    security(("bearer" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    mut body: BodyFields,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    current.require_admin(&state).await?;
    let name = body.required_str("name");
    let name = body.finish(name)?;
    roles::create_role(&state.db, &name).await?;
    Ok((StatusCode::CREATED, Json(Message::new("Role created!"))))
}

#[utoipa::path(
    get, path = "/roles", tag = "roles",
    responses(
        (status = 200, description = "All roles", body = crate::openapi::RoleListResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
pub async fn list(State(state): State<ServerState>, _current: CurrentUser) -> Result<Json<RoleList>, ApiError> {
    let all = roles::list_roles(&state.db).await?;
    Ok(Json(RoleList { roles: all.into_iter().map(RoleView::from).collect() }))
}
