//! # Custom Extractors & Validation
//!
//! Helpers that turn axum extractor rejections into [`AppError::BadRequest`]
//! so malformed input never reaches the store.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::Json;
use usersvc_core::{User, UserId, ValidationError};

use crate::error::AppError;

/// Trait for request types that carry business rules beyond what serde
/// deserialization checks.
pub trait Validate {
    /// Error raised when a rule fails.
    type Error: Into<AppError>;

    /// Validate business rules.
    fn validate(&self) -> Result<(), Self::Error>;
}

impl Validate for User {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), ValidationError> {
        User::validate(self)
    }
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(Into::<AppError>::into)?;
    Ok(value)
}

/// Extract a user identity from the path.
///
/// Non-integer segments are rejected with [`AppError::BadRequest`]. A negative
/// integer is well formed but can never name a stored user, so it maps to
/// [`AppError::NotFound`].
pub fn extract_user_id(result: Result<Path<i64>, PathRejection>) -> Result<UserId, AppError> {
    let Path(raw) = result.map_err(|_| AppError::BadRequest("invalid user ID".to_string()))?;
    u64::try_from(raw)
        .map(UserId::new)
        .map_err(|_| AppError::NotFound(format!("user {raw} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_user_id_accepts_non_negative() {
        assert_eq!(extract_user_id(Ok(Path(7))).unwrap(), UserId::new(7));
        assert_eq!(extract_user_id(Ok(Path(0))).unwrap(), UserId::new(0));
    }

    #[test]
    fn extract_user_id_negative_is_not_found() {
        let err = extract_user_id(Ok(Path(-1))).unwrap_err();
        assert!(matches!(&err, AppError::NotFound(msg) if msg == "user -1 not found"));
    }
}
