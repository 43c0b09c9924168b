pub mod auth;
pub mod posts;
pub mod roles;
pub mod users;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::errors::{json_error_pages, ApiError};
use crate::openapi;
use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

/// Build the full application router. Collection routes answer with and
/// without a trailing slash.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let user_routes = get(users::list).post(users::create);
    let role_routes = get(roles::list).post(roles::create);
    let post_routes = get(posts::list).post(posts::create);

    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/roles", role_routes.clone())
        .route("/roles/", role_routes)
        .route("/users", user_routes.clone())
        .route("/users/", user_routes)
        .route("/users/:id", get(users::get).patch(users::update).delete(users::delete))
        .route("/posts", post_routes.clone())
        .route("/posts/", post_routes)
        .route("/posts/:id", get(posts::get).patch(posts::update).delete(posts::delete))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth::authenticate))
        .layer(middleware::map_response(json_error_pages))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request, without headers (tokens live there)
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
