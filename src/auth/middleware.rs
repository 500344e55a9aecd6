use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{Claims, TokenService};
use crate::error::AppError;

/// Paths reachable without a bearer token.
const PUBLIC_PATHS: [&str; 5] = ["/", "/health", "/auth/login", "/auth/register", "/auth/refresh"];

/// Verifies the `Authorization: Bearer` access token of every non-public
/// request and stores its [`Claims`] in the request extensions.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.contains(&req.path()) {
            return Box::pin(self.service.call(req));
        }

        let Some(tokens) = req.app_data::<web::Data<TokenService>>() else {
            let app_err = AppError::InternalServerError("TokenService is not registered".into());
            return Box::pin(async move { Err(app_err.into()) });
        };

        let claims = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| tokens.verify_access(token));

        match claims {
            Some(claims) => {
                req.extensions_mut().insert(claims);
                Box::pin(self.service.call(req))
            }
            None => {
                let app_err = AppError::Unauthorized("Invalid or missing token".into());
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}

/// Lets a request through only when its token carries the global admin role.
/// Must run inside [`AuthMiddleware`].
pub struct RequireAdmin;

impl<S, B> Transform<S, ServiceRequest> for RequireAdmin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequireAdminService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAdminService { service }))
    }
}

pub struct RequireAdminService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequireAdminService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let is_admin = req
            .extensions()
            .get::<Claims>()
            .map(|claims| claims.role.is_admin());

        match is_admin {
            Some(true) => Box::pin(self.service.call(req)),
            Some(false) => {
                let app_err = AppError::Forbidden("Admin access required".into());
                Box::pin(async move { Err(app_err.into()) })
            }
            None => {
                let app_err = AppError::Unauthorized("Invalid or missing token".into());
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}
