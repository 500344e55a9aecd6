use std::env;
use std::str::FromStr;

use crate::error::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/mini-jira.db";
const DEFAULT_ISSUER: &str = "mini-jira";
const DEFAULT_AUDIENCE: &str = "mini-jira-api";
const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60 * 24 * 7;
const DEFAULT_REFRESH_TTL_SECS: i64 = 60 * 60 * 24 * 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::InternalServerError("JWT_SECRET must be set".into()))?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            server_port: parse_var("SERVER_PORT", 3000)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string()),
            jwt_audience: env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| DEFAULT_AUDIENCE.to_string()),
            access_token_ttl_secs: parse_var("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TTL_SECS)?,
            refresh_token_ttl_secs: parse_var("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TTL_SECS)?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }

    /// Settings for tests and embedders that do not read the environment.
    pub fn for_secret(jwt_secret: &str) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            server_port: 3000,
            server_host: "127.0.0.1".to_string(),
            jwt_secret: jwt_secret.to_string(),
            jwt_issuer: DEFAULT_ISSUER.to_string(),
            jwt_audience: DEFAULT_AUDIENCE.to_string(),
            access_token_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_token_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("{} must be a number", name))),
        Err(_) => Ok(default),
    }
}
