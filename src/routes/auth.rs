use crate::{
    auth::{
        hash_password, verify_password, AuthResponse, AuthenticatedUser, LoginRequest,
        RefreshRequest, RefreshResponse, RegisterRequest, TokenService,
    },
    config::Config,
    error::{unique_violation, AppError},
    models::{PublicUser, Role, User},
    repositories::UserRepo,
    response,
};
use actix_web::{get, post, web, HttpResponse};
use sqlx::SqlitePool;
use validator::Validate;

const DUPLICATE_EMAIL: &str = "Email already registered";

fn auth_response(tokens: &TokenService, user: User) -> Result<AuthResponse, AppError> {
    Ok(AuthResponse {
        token: tokens.issue_access(&user)?,
        refresh_token: tokens.issue_refresh(&user)?,
        user: user.into(),
    })
}

/// Register a new user
///
/// Creates a member account and returns it with a fresh token pair.
///
/// ## Responses:
/// - `201 Created`: `{ user, token, refresh_token }`.
/// - `400 Bad Request`: invalid input or email already registered.
#[post("/register")]
pub async fn register(
    pool: web::Data<SqlitePool>,
    tokens: web::Data<TokenService>,
    config: web::Data<Config>,
    register_data: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    register_data.validate()?;

    let repo = UserRepo::new(&pool);
    if repo.find_by_email(&register_data.email).await?.is_some() {
        return Err(AppError::BadRequest(DUPLICATE_EMAIL.into()));
    }

    let password_hash = hash_password(&register_data.password, config.bcrypt_cost)?;
    let user = repo
        .create(
            &register_data.email,
            &password_hash,
            &register_data.name,
            Role::Member,
        )
        .await
        .map_err(unique_violation(DUPLICATE_EMAIL))?;
    log::info!("Registered user {} ({})", user.id, user.email);

    Ok(response::created(
        auth_response(&tokens, user)?,
        "User registered successfully",
    ))
}

/// Login user
///
/// Unknown email and wrong password answer the same 401.
#[post("/login")]
pub async fn login(
    pool: web::Data<SqlitePool>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    login_data.validate()?;

    let user = UserRepo::new(&pool)
        .find_by_email(&login_data.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

    if !verify_password(&login_data.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    Ok(response::success(
        auth_response(&tokens, user)?,
        "Login successful",
    ))
}

/// Exchanges a refresh token for a new access token. The access token
/// carries the user's current email and role.
#[post("/refresh")]
pub async fn refresh(
    pool: web::Data<SqlitePool>,
    tokens: web::Data<TokenService>,
    body: web::Json<RefreshRequest>,
) -> Result<HttpResponse, AppError> {
    let invalid = || AppError::Unauthorized("Invalid refresh token".into());

    let user_id = tokens
        .verify_refresh(&body.refresh_token)
        .and_then(|claims| claims.user_id())
        .ok_or_else(invalid)?;
    let user = UserRepo::new(&pool)
        .find_by_id(user_id)
        .await?
        .ok_or_else(invalid)?;

    Ok(response::success(
        RefreshResponse {
            token: tokens.issue_access(&user)?,
        },
        "Token refreshed",
    ))
}

#[get("/me")]
pub async fn me(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    Ok(response::success(PublicUser::from(user.0), "Success"))
}

/// Every registered user, for member pickers.
#[get("/users")]
pub async fn users(
    pool: web::Data<SqlitePool>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let all = UserRepo::new(&pool).find_all().await?;
    Ok(response::success(all, "Success"))
}
