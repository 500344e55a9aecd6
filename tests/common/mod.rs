#![allow(dead_code)]

use actix_cors::Cors;
use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, web, App, Error};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use mini_jira::auth::{AuthMiddleware, TokenService};
use mini_jira::config::Config;
use mini_jira::{db, routes};

pub const PASSWORD: &str = "Password123!";

pub struct TestUser {
    pub id: i64,
    pub token: String,
    pub refresh_token: String,
}

pub fn test_config() -> Config {
    let mut config = Config::for_secret("integration-test-secret");
    config.bcrypt_cost = 4;
    config
}

pub async fn test_pool() -> SqlitePool {
    db::init("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database")
}

/// The full application, wired the way `main` wires it.
pub async fn init_app(
    pool: &SqlitePool,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    let config = test_config();
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(TokenService::new(&config)))
            .app_data(web::Data::new(config))
            .wrap(AuthMiddleware)
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

/// Sends `req` and returns the status with the parsed envelope. Errors raised
/// by middleware are rendered the way the server would render them.
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            let body = test::read_body(resp).await;
            (status, parse(&body))
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let body = actix_web::body::to_bytes(resp.into_body())
                .await
                .expect("Failed to read error body");
            (status, parse(&body))
        }
    }
}

fn parse(body: &[u8]) -> Value {
    if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(body).unwrap_or_else(|_| {
            panic!("Body is not JSON: {:?}", String::from_utf8_lossy(body))
        })
    }
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub fn get(uri: &str, token: &str) -> Request {
    test::TestRequest::get()
        .uri(uri)
        .append_header(bearer(token))
        .to_request()
}

pub fn post(uri: &str, token: &str, body: Value) -> Request {
    test::TestRequest::post()
        .uri(uri)
        .append_header(bearer(token))
        .set_json(body)
        .to_request()
}

pub fn patch(uri: &str, token: &str, body: Value) -> Request {
    test::TestRequest::patch()
        .uri(uri)
        .append_header(bearer(token))
        .set_json(body)
        .to_request()
}

pub fn delete(uri: &str, token: &str) -> Request {
    test::TestRequest::delete()
        .uri(uri)
        .append_header(bearer(token))
        .to_request()
}

pub async fn register_user<S, B>(app: &S, email: &str, name: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "email": email, "password": PASSWORD, "name": name }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "Registration failed: {}", body);

    TestUser {
        id: body["data"]["user"]["id"].as_i64().unwrap(),
        token: body["data"]["token"].as_str().unwrap().to_string(),
        refresh_token: body["data"]["refresh_token"].as_str().unwrap().to_string(),
    }
}

pub async fn login_user<S, B>(app: &S, email: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "Login failed: {}", body);

    TestUser {
        id: body["data"]["user"]["id"].as_i64().unwrap(),
        token: body["data"]["token"].as_str().unwrap().to_string(),
        refresh_token: body["data"]["refresh_token"].as_str().unwrap().to_string(),
    }
}

/// Creates a project as `user` and returns the `data` of the response:
/// the project fields plus `default_board`.
pub async fn create_project<S, B>(app: &S, user: &TestUser, key: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        post(
            "/projects",
            &user.token,
            json!({ "name": format!("Project {}", key), "key": key }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Project creation failed: {}", body);
    body["data"].clone()
}

pub async fn add_member<S, B>(app: &S, admin: &TestUser, project_id: i64, user_id: i64, role: &str)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        post(
            &format!("/projects/{}/members", project_id),
            &admin.token,
            json!({ "user_id": user_id, "role": role }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Adding member failed: {}", body);
}

pub async fn create_task<S, B>(app: &S, user: &TestUser, board_id: i64, title: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let (status, body) = send(
        app,
        post(
            &format!("/boards/{}/tasks", board_id),
            &user.token,
            json!({ "type": "issue", "title": title }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Task creation failed: {}", body);
    body["data"].clone()
}
