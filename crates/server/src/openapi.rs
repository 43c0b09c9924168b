//! OpenAPI document, served as JSON at `/api-docs/openapi.json`.
//!
//! The schema structs here only describe wire shapes; handlers use their own
//! types.

use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct MessageResponse { pub message: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct TokenResponse { pub access_token: String }

#[derive(ToSchema)]
pub struct CreateRoleRequest { pub name: String }

#[derive(ToSchema)]
pub struct RoleDoc { pub id: i32, pub name: String }

#[derive(ToSchema)]
pub struct RoleListResponse { pub roles: Vec<RoleDoc> }

#[derive(ToSchema)]
pub struct CreateUserRequest { pub username: String, pub password: String, pub role_id: i32 }

/// Any subset of fields; unknown keys are ignored.
#[derive(ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<i32>,
}

#[derive(ToSchema)]
pub struct UserSummaryDoc { pub id: i32, pub username: String, pub role_id: i32 }

#[derive(ToSchema)]
pub struct UserListResponse { pub users: Vec<UserSummaryDoc>, pub total: Option<u64> }

#[derive(ToSchema)]
pub struct PublicUserResponse { pub id: i32, pub username: String }

#[derive(ToSchema)]
pub struct CreatePostRequest { pub title: String, pub body: String }

#[derive(ToSchema)]
pub struct UpdatePostRequest { pub title: Option<String>, pub body: Option<String> }

#[derive(ToSchema)]
pub struct PostResponse {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub created: chrono::DateTime<chrono::FixedOffset>,
    pub author_id: i32,
}

#[derive(ToSchema)]
pub struct PostListResponse { pub posts: Vec<PostResponse>, pub page: u64, pub per_page: u64, pub total: u64 }

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::roles::create,
        crate::routes::roles::list,
        crate::routes::users::list,
        crate::routes::users::create,
        crate::routes::users::get,
        crate::routes::users::update,
        crate::routes::users::delete,
        crate::routes::posts::list,
        crate::routes::posts::get,
        crate::routes::posts::create,
        crate::routes::posts::update,
        crate::routes::posts::delete,
    ),
    components(
        schemas(
            HealthResponse,
            MessageResponse,
            LoginRequest,
            TokenResponse,
            CreateRoleRequest,
            RoleDoc,
            RoleListResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UserSummaryDoc,
            UserListResponse,
            PublicUserResponse,
            CreatePostRequest,
            UpdatePostRequest,
            PostResponse,
            PostListResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "roles"),
        (name = "users"),
        (name = "posts")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
