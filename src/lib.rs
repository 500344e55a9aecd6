#![doc = "The `mini_jira` library crate."]
#![doc = ""]
#![doc = "Projects, boards, columns, tasks, labels and comments behind a JSON REST API,"]
#![doc = "with JWT authentication and per-project roles. The binary (`main.rs`) wires"]
#![doc = "these modules into an actix-web server; the integration tests do the same"]
#![doc = "against an in-memory database."]

pub mod access;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod response;
pub mod routes;
