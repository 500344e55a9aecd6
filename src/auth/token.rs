use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Role, User};

const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user id, as a string.
    pub sub: String,
    pub email: String,
    /// Global role at the time the token was issued.
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    /// `Some("refresh")` on refresh tokens, absent on access tokens.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    pub fn is_refresh(&self) -> bool {
        self.token_type.as_deref() == Some(REFRESH_TOKEN_TYPE)
    }
}

/// Issues and verifies the HS256 tokens handed out by `/auth`.
///
/// Built once from [`Config`] and shared through `web::Data`.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            access_ttl_secs: config.access_token_ttl_secs,
            refresh_ttl_secs: config.refresh_token_ttl_secs,
        }
    }

    pub fn issue_access(&self, user: &User) -> Result<String, AppError> {
        self.issue(user, self.access_ttl_secs, None)
    }

    pub fn issue_refresh(&self, user: &User) -> Result<String, AppError> {
        self.issue(user, self.refresh_ttl_secs, Some(REFRESH_TOKEN_TYPE))
    }

    /// Claims of a valid access token. Refresh tokens are rejected.
    pub fn verify_access(&self, token: &str) -> Option<Claims> {
        self.verify(token).filter(|claims| !claims.is_refresh())
    }

    /// Claims of a valid refresh token. Access tokens are rejected.
    pub fn verify_refresh(&self, token: &str) -> Option<Claims> {
        self.verify(token).filter(Claims::is_refresh)
    }

    fn issue(&self, user: &User, ttl_secs: i64, token_type: Option<&str>) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: now,
            exp: now + ttl_secs,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            token_type: token_type.map(str::to_string),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                log::debug!("Rejected token: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: 42,
            email: "a@x.com".to_string(),
            password_hash: String::new(),
            name: "A".to_string(),
            role: Role::Member,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = TokenService::new(&Config::for_secret("test_secret_for_gen_verify"));
        let token = tokens.issue_access(&user()).unwrap();

        let claims = tokens.verify_access(&token).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, Role::Member);
        assert_eq!(claims.iss, "mini-jira");
        assert_eq!(claims.aud, "mini-jira-api");
        assert!(!claims.is_refresh());
    }

    #[test]
    fn test_access_and_refresh_are_not_interchangeable() {
        let tokens = TokenService::new(&Config::for_secret("secret"));
        let access = tokens.issue_access(&user()).unwrap();
        let refresh = tokens.issue_refresh(&user()).unwrap();

        assert!(tokens.verify_refresh(&refresh).is_some());
        assert!(tokens.verify_access(&refresh).is_none());
        assert!(tokens.verify_refresh(&access).is_none());
    }

    #[test]
    fn test_token_expiration() {
        let mut config = Config::for_secret("test_secret_for_expiration");
        config.access_token_ttl_secs = -2 * 60 * 60;
        let tokens = TokenService::new(&config);

        let expired = tokens.issue_access(&user()).unwrap();
        assert!(tokens.verify_access(&expired).is_none());
    }

    #[test]
    fn test_invalid_token_signature() {
        let signer = TokenService::new(&Config::for_secret("one_secret"));
        let verifier = TokenService::new(&Config::for_secret("a_completely_different_secret"));
        let token = signer.issue_access(&user()).unwrap();

        assert!(verifier.verify_access(&token).is_none());
        assert!(verifier.verify_access("not.a.jwt").is_none());
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let mut other = Config::for_secret("secret");
        other.jwt_audience = "someone-else".to_string();
        let token = TokenService::new(&other).issue_access(&user()).unwrap();

        let tokens = TokenService::new(&Config::for_secret("secret"));
        assert!(tokens.verify_access(&token).is_none());
    }
}
