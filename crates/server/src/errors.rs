use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use service::auth::errors::AuthError;
use service::errors::ServiceError;

pub const FORBIDDEN_MESSAGE: &str = "User does not have access";
pub const BAD_LOGIN_MESSAGE: &str = "Bad username or password";

/// Body of every generic HTTP error: `{"code", "name", "description"}`.
#[derive(Debug, Serialize)]
pub struct HttpErrorBody {
    pub code: u16,
    pub name: String,
    pub description: String,
}

impl HttpErrorBody {
    pub fn new(status: StatusCode, description: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            name: status.canonical_reason().unwrap_or("Unknown").to_string(),
            description: description.into(),
        }
    }
}

/// Per-field validation messages, rendered as `{"field": ["message", ...]}`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug)]
pub enum ApiError {
    Http { status: StatusCode, description: String },
    /// `{"message": ...}` bodies used by the auth endpoints and role guard.
    Message { status: StatusCode, message: String },
    /// 422 with a field map.
    Fields(FieldErrors),
}

impl ApiError {
    pub fn http(status: StatusCode, description: impl Into<String>) -> Self {
        Self::Http { status, description: description.into() }
    }

    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Message { status, message: message.into() }
    }

    pub fn not_found() -> Self {
        Self::http(StatusCode::NOT_FOUND, "The requested URL was not found on the server.")
    }

    pub fn forbidden() -> Self {
        Self::message(StatusCode::FORBIDDEN, FORBIDDEN_MESSAGE)
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut map = FieldErrors::new();
        map.insert(field.to_string(), vec![message.into()]);
        Self::Fields(map)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Http { status, .. } | ApiError::Message { status, .. } => *status,
            ApiError::Fields(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Http { status, description } => {
                (status, Json(HttpErrorBody::new(status, description))).into_response()
            }
            ApiError::Message { status, message } => {
                (status, Json(serde_json::json!({ "message": message }))).into_response()
            }
            ApiError::Fields(fields) => (StatusCode::UNPROCESSABLE_ENTITY, Json(fields)).into_response(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Invalid { field, message } => ApiError::field(field, message),
            ServiceError::Validation(m) => ApiError::http(StatusCode::BAD_REQUEST, m),
            ServiceError::Conflict(m) => ApiError::http(StatusCode::CONFLICT, m),
            ServiceError::NotFound(m) => ApiError::http(StatusCode::NOT_FOUND, m),
            ServiceError::Forbidden(m) => {
                warn!(reason = %m, "forbidden");
                ApiError::forbidden()
            }
            ServiceError::Db(m) | ServiceError::Internal(m) => {
                error!(error = %m, "request failed");
                ApiError::http(StatusCode::INTERNAL_SERVER_ERROR, "The server encountered an internal error.")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthorized => ApiError::message(StatusCode::UNAUTHORIZED, BAD_LOGIN_MESSAGE),
            AuthError::TokenExpired => ApiError::message(StatusCode::UNAUTHORIZED, "Token has expired"),
            AuthError::TokenError(_) => ApiError::message(StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::Forbidden => ApiError::forbidden(),
            AuthError::NotFound => ApiError::not_found(),
            AuthError::Validation(m) => ApiError::http(StatusCode::BAD_REQUEST, m),
            AuthError::HashError(_) | AuthError::Repository(_) => {
                error!(code = e.code(), error = %e, "auth failure");
                ApiError::http(StatusCode::INTERNAL_SERVER_ERROR, "The server encountered an internal error.")
            }
        }
    }
}

/// Well-formed JSON of the wrong shape is a 422 like any schema error;
/// anything that is not JSON at all stays a 400.
impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        match r {
            JsonRejection::JsonDataError(e) => ApiError::field("_schema", e.body_text()),
            other => ApiError::http(StatusCode::BAD_REQUEST, other.body_text()),
        }
    }
}

/// Give bodyless framework errors (405, path rejections) the same JSON shape
/// as handler errors.
pub async fn json_error_pages(res: Response) -> Response {
    let status = res.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return res;
    }
    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);
    if is_json {
        return res;
    }
    let description = match status {
        StatusCode::METHOD_NOT_ALLOWED => "The method is not allowed for the requested URL.",
        StatusCode::NOT_FOUND => "The requested URL was not found on the server.",
        _ => "The browser (or proxy) sent a request that this server could not understand.",
    };
    ApiError::http(status, description).into_response()
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("admin bootstrap failed: {0}")]
    Bootstrap(#[from] ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
