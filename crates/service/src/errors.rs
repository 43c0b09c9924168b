use models::errors::ModelError;
use thiserror::Error;

use crate::auth::errors::AuthError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    /// Input rejected for a single named field.
    #[error("{field}: {message}")]
    Invalid { field: &'static str, message: String },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid { field, message: message.into() }
    }

    /// Attach a model validation failure to the input field it came from.
    pub fn invalid_field(field: &'static str) -> impl FnOnce(ModelError) -> Self {
        move |e| match e {
            ModelError::Validation(m) => Self::invalid(field, m),
            other => other.into(),
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(m) => Self::Validation(m),
            ModelError::Conflict(m) => Self::Conflict(m),
            ModelError::NotFound(what) => Self::not_found(what),
            ModelError::Db(m) => Self::Db(m),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { ModelError::from_db(e).into() }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(m) => Self::Validation(m),
            AuthError::NotFound => Self::not_found("user"),
            AuthError::Forbidden => Self::Forbidden("insufficient role".into()),
            AuthError::Repository(m) => Self::Db(m),
            other => Self::Internal(other.to_string()),
        }
    }
}
