use axum::extract::{FromRequest, FromRequestParts};
use uuid::Uuid;

use crate::error::AppError;

/// `Json` whose rejections are reported as 400 with a message
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` with the same `{"message"}` rejection body
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// `Path` with the same `{"message"}` rejection body
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Trims a required text field, rejecting blank values
pub fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

/// Trims an optional text field; blank becomes `None`
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an id sent as a JSON string; missing or malformed ids are a 400
pub fn required_id(value: Option<&str>, field: &str) -> Result<Uuid, AppError> {
    value
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or_else(|| AppError::Validation(format!("Invalid {}", field)))
}

/// Parses an optional query value; blank counts as absent
pub fn optional_param<T>(value: Option<String>, field: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
{
    optional(value)
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| AppError::Validation(format!("Invalid {}", field)))
        })
        .transpose()
}
