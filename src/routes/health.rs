use actix_web::{get, Responder};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::response;

#[derive(Debug, Serialize)]
struct ServiceStatus {
    name: &'static str,
    version: &'static str,
    status: &'static str,
    timestamp: DateTime<Utc>,
}

fn status() -> ServiceStatus {
    ServiceStatus {
        name: "Mini Jira API",
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
        timestamp: Utc::now(),
    }
}

#[get("/")]
pub async fn index() -> impl Responder {
    response::success(status(), "Mini Jira API")
}

/// Health check endpoint
///
/// Returns the current status of the API and timestamp.
#[get("/health")]
pub async fn health() -> impl Responder {
    response::success(status(), "Healthy")
}
