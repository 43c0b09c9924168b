//! Request extractors whose failures use the API's error shapes.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{ApiError, FieldErrors};

pub const MISSING: &str = "Missing data for required field.";

/// Integer id from the path. Anything else is a 404, like an unmatched route.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i32>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(IdPath(id)),
            Err(e) => {
                debug!(path = %parts.uri.path(), err = %e, "non-integer id");
                Err(ApiError::not_found())
            }
        }
    }
}

/// A JSON object body read one field at a time.
///
/// Each accessor records a message for its field instead of failing, so a
/// single 422 lists every problem. Unknown keys are ignored.
#[derive(Debug)]
pub struct BodyFields {
    map: Map<String, Value>,
    errors: FieldErrors,
}

#[async_trait]
impl<S> FromRequest<S> for BodyFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;
        Self::from_value(value)
    }
}

impl BodyFields {
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Object(map) => Ok(Self { map, errors: FieldErrors::new() }),
            _ => Err(ApiError::field("_schema", "Invalid input type.")),
        }
    }

    fn reject(&mut self, field: &str, message: &str) {
        self.errors.entry(field.to_string()).or_default().push(message.to_string());
    }

    /// Present, non-null string that is not blank.
    pub fn required_str(&mut self, field: &str) -> Option<String> {
        match self.map.remove(field) {
            None | Some(Value::Null) => {
                self.reject(field, MISSING);
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.reject(field, "Field may not be blank.");
                None
            }
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                self.reject(field, "Not a valid string.");
                None
            }
        }
    }

    /// Absent is fine; present must be a string.
    pub fn optional_str(&mut self, field: &str) -> Option<String> {
        match self.map.remove(field) {
            None => None,
            Some(Value::String(s)) => Some(s),
            Some(Value::Null) => {
                self.reject(field, "Field may not be null.");
                None
            }
            Some(_) => {
                self.reject(field, "Not a valid string.");
                None
            }
        }
    }

    pub fn required_int(&mut self, field: &str) -> Option<i32> {
        match self.map.remove(field) {
            None | Some(Value::Null) => {
                self.reject(field, MISSING);
                None
            }
            Some(v) => self.int_value(field, v),
        }
    }

    pub fn optional_int(&mut self, field: &str) -> Option<i32> {
        match self.map.remove(field) {
            None => None,
            Some(Value::Null) => {
                self.reject(field, "Field may not be null.");
                None
            }
            Some(v) => self.int_value(field, v),
        }
    }

    fn int_value(&mut self, field: &str, v: Value) -> Option<i32> {
        let n = v.as_i64().and_then(|n| i32::try_from(n).ok());
        if n.is_none() {
            self.reject(field, "Not a valid integer.");
        }
        n
    }

    /// `value` once every field read so far was acceptable, else the 422.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, ApiError> {
        match value {
            Some(v) if self.errors.is_empty() => Ok(v),
            _ => Err(ApiError::Fields(self.errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: Value) -> BodyFields {
        BodyFields::from_value(v).unwrap()
    }

    #[test]
    fn reports_every_bad_field() {
        let mut f = fields(json!({"username": " ", "password": 5}));
        assert!(f.required_str("username").is_none());
        assert!(f.required_str("password").is_none());
        assert!(f.required_int("role_id").is_none());
        let ApiError::Fields(map) = f.finish(Some(())).unwrap_err() else { panic!("expected field errors") };
        assert_eq!(map["username"], vec!["Field may not be blank.".to_string()]);
        assert_eq!(map["password"], vec!["Not a valid string.".to_string()]);
        assert_eq!(map["role_id"], vec![MISSING.to_string()]);
    }

    #[test]
    fn optional_fields_may_be_absent_but_not_wrong() {
        let mut f = fields(json!({"role_id": "x", "title": null, "colour": "blue"}));
        assert_eq!(f.optional_str("username"), None);
        assert_eq!(f.optional_int("role_id"), None);
        assert_eq!(f.optional_str("title"), None);
        let ApiError::Fields(map) = f.finish(Some(())).unwrap_err() else { panic!("expected field errors") };
        assert_eq!(map.len(), 2);
        assert_eq!(map["role_id"], vec!["Not a valid integer.".to_string()]);
        assert_eq!(map["title"], vec!["Field may not be null.".to_string()]);
    }

    #[test]
    fn accepts_valid_values_and_rejects_non_objects() {
        let mut f = fields(json!({"username": "ann", "role_id": 2}));
        let name = f.required_str("username");
        let role = f.required_int("role_id");
        assert_eq!(f.finish(name.zip(role)).unwrap(), ("ann".to_string(), 2));
        assert!(matches!(BodyFields::from_value(json!([1, 2])), Err(ApiError::Fields(_))));
    }
}
