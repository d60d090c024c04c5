//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. It centralizes error management, providing a consistent way to
//! translate every failure a handler can produce into an HTTP response with a
//! JSON body of the form `{"error": "..."}`.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can
//! simply return `Result<_, AppError>`. `From` implementations exist for
//! `sqlx::Error`, `validator::ValidationErrors`, `jsonwebtoken::errors::Error`,
//! and `bcrypt::BcryptError`, allowing conversion via the `?` operator.
//!
//! Two deliberate policies live here:
//! - `Unauthorized` always surfaces one fixed generic message, so callers get
//!   no oracle for whether a token was missing, malformed, expired, or
//!   revoked. The internal message is logged only.
//! - `DatabaseError` and `InternalServerError` never leak details to the
//!   client; specifics go to the server log.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failure on a protected route (HTTP 401).
    /// The carried message is for logs; clients see a generic body.
    Unauthorized(String),
    /// A malformed or out-of-constraint request (HTTP 400).
    BadRequest(String),
    /// A missing resource, or one owned by someone else (HTTP 404).
    NotFound(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// An error originating from database operations (HTTP 500).
    DatabaseError(String),
    /// Failed input validation (HTTP 400).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => {
                log::debug!("authentication failure: {}", msg);
                HttpResponse::Unauthorized().json(json!({
                    "error": "Please authenticate"
                }))
            }
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::InternalServerError(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal server error"
                }))
            }
            AppError::DatabaseError(msg) => {
                log::error!("database error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal server error"
                }))
            }
            AppError::ValidationError(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`; everything else
/// becomes `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// JWT processing failures (bad signature, expired, malformed) are all
/// authentication failures.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

/// JSON body deserialization failures (including unknown patch keys rejected
/// by `deny_unknown_fields`) become a 400 with the standard error body.
/// Install via `web::JsonConfig::default().error_handler(json_error_handler)`.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let error = AppError::Unauthorized("token revoked".into());
        let response = error.error_response();
        assert_eq!(response.status(), 401);

        let error = AppError::BadRequest("Invalid updates".into());
        let response = error.error_response();
        assert_eq!(response.status(), 400);

        let error = AppError::ValidationError("email is invalid".into());
        let response = error.error_response();
        assert_eq!(response.status(), 400);

        let error = AppError::NotFound("Task not found".into());
        let response = error.error_response();
        assert_eq!(response.status(), 404);

        let error = AppError::InternalServerError("boom".into());
        let response = error.error_response();
        assert_eq!(response.status(), 500);

        let error = AppError::DatabaseError("connection reset".into());
        let response = error.error_response();
        assert_eq!(response.status(), 500);
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        let response = error.error_response();
        assert_eq!(response.status(), 404);
    }
}
