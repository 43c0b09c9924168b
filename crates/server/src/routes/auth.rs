use std::sync::Arc;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{debug, warn};

use models::role;
use service::auth::domain::LoginInput;
use service::auth::errors::AuthError;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};

use crate::errors::{ApiError, BAD_LOGIN_MESSAGE};

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: AuthConfig,
}

impl ServerState {
    pub fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        let repo = Arc::new(SeaOrmAuthRepository::new(self.db.clone()));
        AuthService::new(repo, self.auth.clone())
    }
}

/// Identity of a request carrying a valid access token.
///
/// Only the user id is taken from the token. Role checks read the role from
/// storage (see [`CurrentUser::require_admin`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
}

impl CurrentUser {
    pub async fn require_admin(&self, state: &ServerState) -> Result<(), ApiError> {
        state.auth_service().authorize(self.id, role::ADMIN).await.map_err(guard_error)?;
        Ok(())
    }

    /// True when the user currently holds the `admin` role.
    pub async fn is_admin(&self, state: &ServerState) -> Result<bool, ApiError> {
        Ok(self.current_role(state).await? == role::ADMIN)
    }

    pub async fn current_role(&self, state: &ServerState) -> Result<String, ApiError> {
        let (_, role) = state.auth_service().current_user(self.id).await.map_err(guard_error)?;
        Ok(role)
    }
}

/// A user that vanished after the token was issued is an authentication
/// failure, not a bad login.
fn guard_error(e: AuthError) -> ApiError {
    match e {
        AuthError::Unauthorized => ApiError::message(StatusCode::UNAUTHORIZED, "User no longer exists"),
        other => other.into(),
    }
}

/// Why a presented token was not accepted. Stored in request extensions so
/// that only routes which need a user reject the request.
#[derive(Debug, Clone)]
struct AuthFailure(&'static str);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(*user);
        }
        let reason = parts
            .extensions
            .get::<AuthFailure>()
            .map(|f| f.0)
            .unwrap_or("Missing Authorization Header");
        Err(ApiError::message(StatusCode::UNAUTHORIZED, reason))
    }
}

enum TokenSource {
    Found(String),
    Malformed,
    Missing,
}

/// Bearer header first, then the `auth_token` cookie.
fn token_from_request(req: &Request) -> TokenSource {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        return match value.to_str().ok().and_then(|v| v.strip_prefix("Bearer ")) {
            Some(token) if !token.trim().is_empty() => TokenSource::Found(token.trim().to_string()),
            _ => TokenSource::Malformed,
        };
    }
    match CookieJar::from_headers(req.headers()).get(AUTH_COOKIE) {
        Some(c) if !c.value().is_empty() => TokenSource::Found(c.value().to_string()),
        _ => TokenSource::Missing,
    }
}

/// Global middleware: verify any presented token and attach [`CurrentUser`].
/// Requests without a token pass through untouched; public routes never look.
pub async fn authenticate(State(state): State<ServerState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    match token_from_request(&req) {
        TokenSource::Missing => {}
        TokenSource::Malformed => {
            warn!(path = %path, "invalid Authorization format (expect Bearer)");
            req.extensions_mut().insert(AuthFailure("Bad Authorization header. Expected 'Authorization: Bearer <JWT>'"));
        }
        TokenSource::Found(token) => {
            let svc = state.auth_service();
            match svc.verify_token(&token).and_then(|c| c.user_id()) {
                Ok(id) => {
                    debug!(user_id = id, "token accepted");
                    req.extensions_mut().insert(CurrentUser { id });
                }
                Err(AuthError::TokenExpired) => {
                    req.extensions_mut().insert(AuthFailure("Token has expired"));
                }
                Err(e) => {
                    warn!(path = %path, err = %e, "token validation failed");
                    req.extensions_mut().insert(AuthFailure("Invalid token"));
                }
            }
        }
    }
    next.run(req).await
}

#[derive(Debug, Serialize)]
pub struct LoginOutput {
    pub access_token: String,
}

#[utoipa::path(
    post, path = "/auth/login", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = crate::openapi::TokenResponse),
        (status = 401, description = "Bad username or password", body = crate::openapi::MessageResponse)
    )
)]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginOutput>), ApiError> {
    let Json(input) = payload?;
    let session = state.auth_service().login(input).await.map_err(|e| match e {
        AuthError::Unauthorized => ApiError::message(StatusCode::UNAUTHORIZED, BAD_LOGIN_MESSAGE),
        other => other.into(),
    })?;

    let mut cookie = Cookie::new(AUTH_COOKIE, session.access_token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    Ok((jar.add(cookie), Json(LoginOutput { access_token: session.access_token })))
}
