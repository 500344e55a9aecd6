use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::SqlitePool;

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::User;
use crate::repositories::UserRepo;

/// The user behind the request's access token, loaded from the database.
///
/// Relies on `AuthMiddleware` having put the token's [`Claims`] into the
/// request extensions. A token whose user no longer exists is rejected with
/// 401, like a missing one.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user_id = req.extensions().get::<Claims>().and_then(Claims::user_id);
        let pool = req.app_data::<web::Data<SqlitePool>>().cloned();

        Box::pin(async move {
            let user_id = user_id.ok_or_else(|| {
                AppError::Unauthorized("User not found in request. Ensure AuthMiddleware is active.".into())
            })?;
            let pool = pool.ok_or_else(|| {
                AppError::InternalServerError("Database pool is not registered".into())
            })?;

            match UserRepo::new(&pool).find_by_id(user_id).await {
                Ok(Some(user)) => Ok(AuthenticatedUser(user)),
                Ok(None) => Err(AppError::Unauthorized("User not found".into()).into()),
                Err(e) => Err(AppError::from(e).into()),
            }
        })
    }
}
