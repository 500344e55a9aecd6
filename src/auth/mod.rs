pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::PublicUser;

pub use extractors::AuthenticatedUser;
pub use middleware::{AuthMiddleware, RequireAdmin};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Must be a valid email format and not already registered.
    #[validate(email)]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
    /// Display name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Payload of `POST /auth/refresh`. Accepts `refreshToken` as well.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
}

/// Response structure after successful authentication (login or registration).
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    /// Access token for the `Authorization: Bearer` header.
    pub token: String,
    /// Longer-lived token accepted only by `/auth/refresh`.
    pub refresh_token: String,
}

/// Response of `POST /auth/refresh`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
}
