//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a handler, extractor or middleware can produce ends up here and is
//! rendered as the standard envelope with `success: false` and `data: null`.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can simply return
//! `Result<HttpResponse, AppError>`. `From` implementations for `sqlx::Error`,
//! `validator::ValidationErrors`, `jsonwebtoken::errors::Error` and `bcrypt::BcryptError`
//! allow the `?` operator everywhere.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::fmt;
use validator::ValidationErrors;

use crate::response::ApiResponse;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, invalid or expired credentials (HTTP 401).
    Unauthorized(String),
    /// Authenticated, but not allowed to act on the resource (HTTP 403).
    Forbidden(String),
    /// Malformed request or a rule violated by the request itself (HTTP 400).
    BadRequest(String),
    /// The addressed entity has no row (HTTP 404).
    NotFound(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// Error surfaced by `sqlx` (HTTP 500). The detail is logged, never returned.
    DatabaseError(String),
    /// Input rejected by `validator` before any handler logic ran (HTTP 400).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::ValidationError(msg) => format!("Validation error: {}", msg),
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                log::error!("{}", msg);
                "Internal server error".to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(ApiResponse::error(message))
    }
}

/// `RowNotFound` becomes a 404; everything else is an opaque 500.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Maps a UNIQUE constraint failure to a 400 carrying `message`, for inserts
/// whose pre-check can lose a race against a concurrent insert.
pub fn unique_violation(message: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |error| {
        let duplicate =
            matches!(&error, sqlx::Error::Database(db_error) if db_error.is_unique_violation());
        if duplicate {
            AppError::BadRequest(message.to_string())
        } else {
            AppError::from(error)
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(format!("Migration failed: {}", error))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::InternalServerError(format!("Failed to generate token: {}", error))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
