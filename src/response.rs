//! The JSON envelope every endpoint answers with.

use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};

/// `{ "data": T | null, "success": bool, "message": string }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub success: bool,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            success: true,
            message: message.into(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            success: false,
            message: message.into(),
        }
    }

    /// A successful response that carries no payload, e.g. after a delete.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            data: None,
            success: true,
            message: message.into(),
        }
    }
}

/// 200 with `data` set.
pub fn success<T: Serialize>(data: T, message: &str) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(data, message))
}

/// 201 with `data` set.
pub fn created<T: Serialize>(data: T, message: &str) -> HttpResponse {
    HttpResponse::build(StatusCode::CREATED).json(ApiResponse::ok(data, message))
}

/// 200 with `data: null`.
pub fn message(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::empty(message))
}
