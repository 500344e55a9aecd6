mod common;

use actix_web::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{add_member, create_project, delete, get, patch, post, register_user, send};

#[test_log::test(actix_rt::test)]
async fn test_create_project_sets_up_owner_and_default_board() {
    let pool = common::test_pool().await;
    let app = common::init_app(&pool).await;
    let alice = register_user(&app, "alice@example.com", "Alice").await;

    let project = create_project(&app, &alice, "abc").await;
    assert_eq!(project["key"], "ABC");
    assert_eq!(project["owner_id"], alice.id);
    assert_eq!(project["default_board"]["name"], "Main Board");
    let project_id = project["id"].as_i64().unwrap();
    let board_id = project["default_board"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, get(&format!("/projects/{}", project_id), &alice.token)).await;
    assert_eq!(status, StatusCode::OK);
    let members = body["data"]["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["user_id"], alice.id);
    assert_eq!(members[0]["role"], "admin");
    assert_eq!(body["data"]["boards"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["labels"], json!([]));

    let (status, body) = send(&app, get(&format!("/boards/{}", board_id), &alice.token)).await;
    assert_eq!(status, StatusCode::OK);
    let columns: Vec<(String, String, i64)> = body["data"]["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| {
            (
                c["name"].as_str().unwrap().to_string(),
                c["color"].as_str().unwrap().to_string(),
                c["position"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        columns,
        vec![
            ("To Do".to_string(), "#6b7280".to_string(), 0),
            ("In Progress".to_string(), "#f59e0b".to_string(), 1),
            ("Done".to_string(), "#10b981".to_string(), 2),
        ]
    );

    let (status, body) = send(&app, get("/projects", &alice.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_project_key_rules() {
    let pool = common::test_pool().await;
    let app = common::init_app(&pool).await;
    let alice = register_user(&app, "alice@example.com", "Alice").await;
    create_project(&app, &alice, "ABC").await;

    // Keys are unique regardless of case.
    let (status, body) = send(
        &app,
        post("/projects", &alice.token, json!({ "name": "Again", "key": "abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Project key already exists");

    for key in ["A", "ABCDEFGHIJK", "AB-C"] {
        let (status, _) = send(
            &app,
            post("/projects", &alice.token, json!({ "name": "Bad", "key": key })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "key {}", key);
    }
}

#[actix_rt::test]
async fn test_membership_management() {
    let pool = common::test_pool().await;
    let app = common::init_app(&pool).await;
    let alice = register_user(&app, "alice@example.com", "Alice").await;
    let bob = register_user(&app, "bob@example.com", "Bob").await;
    let carol = register_user(&app, "carol@example.com", "Carol").await;
    let project_id = create_project(&app, &alice, "ABC").await["id"].as_i64().unwrap();
    let project_uri = format!("/projects/{}", project_id);
    let members_uri = format!("/projects/{}/members", project_id);

    let (status, body) = send(&app, get(&project_uri, &bob.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not a member of this project");

    add_member(&app, &alice, project_id, bob.id, "member").await;
    let (status, _) = send(&app, get(&project_uri, &bob.token)).await;
    assert_eq!(status, StatusCode::OK);

    // A plain member cannot manage the project.
    let (status, body) = send(
        &app,
        post(&members_uri, &bob.token, json!({ "user_id": carol.id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Project admin access required");
    let (status, _) = send(&app, patch(&project_uri, &bob.token, json!({ "name": "Mine" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        post(&members_uri, &alice.token, json!({ "user_id": 9999 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        delete(&format!("{}/{}", members_uri, alice.id), &alice.token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot remove the project owner");

    let (status, _) = send(&app, delete(&format!("{}/{}", members_uri, bob.id), &alice.token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get(&project_uri, &bob.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, delete(&format!("{}/{}", members_uri, bob.id), &alice.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_promoted_member_can_administer() {
    let pool = common::test_pool().await;
    let app = common::init_app(&pool).await;
    let alice = register_user(&app, "alice@example.com", "Alice").await;
    let bob = register_user(&app, "bob@example.com", "Bob").await;
    let project_id = create_project(&app, &alice, "ABC").await["id"].as_i64().unwrap();

    add_member(&app, &alice, project_id, bob.id, "member").await;
    add_member(&app, &alice, project_id, bob.id, "admin").await;

    let (status, body) = send(
        &app,
        patch(
            &format!("/projects/{}", project_id),
            &bob.token,
            json!({ "description": "Run by Bob" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Run by Bob");
    assert_eq!(body["data"]["name"], "Project ABC");

    let (_, body) = send(&app, get(&format!("/projects/{}", project_id), &alice.token)).await;
    assert_eq!(body["data"]["members"].as_array().unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_membership_is_checked_before_existence() {
    let pool = common::test_pool().await;
    let app = common::init_app(&pool).await;
    let alice = register_user(&app, "alice@example.com", "Alice").await;

    let (status, _) = send(&app, get("/projects/9999", &alice.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, get("/projects/not-a-number", &alice.token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn test_delete_project_cascades() {
    let pool = common::test_pool().await;
    let app = common::init_app(&pool).await;
    let alice = register_user(&app, "alice@example.com", "Alice").await;
    let project = create_project(&app, &alice, "ABC").await;
    let project_id = project["id"].as_i64().unwrap();
    let board_id = project["default_board"]["id"].as_i64().unwrap();
    common::create_task(&app, &alice, board_id, "Doomed").await;

    let (status, _) = send(&app, delete(&format!("/projects/{}", project_id), &alice.token)).await;
    assert_eq!(status, StatusCode::OK);

    for table in ["boards", "board_columns", "tasks", "project_members"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "rows left in {}", table);
    }

    let (status, _) = send(&app, get(&format!("/boards/{}", board_id), &alice.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
