use pretty_assertions::assert_eq;
use sqlx::SqlitePool;
use tempfile::TempDir;

use mini_jira::db;
use mini_jira::models::{NewTask, Role, TaskPriority, TaskType};
use mini_jira::repositories::{ColumnRepo, ProjectRepo, TaskRepo, UserRepo};

const WRITERS: i64 = 24;

/// A file-backed pool, so writers really use separate connections, with one
/// user owning one project. Returns the pool, the owner id and the default
/// board id.
async fn seeded_pool() -> (TempDir, SqlitePool, i64, i64) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("positions.db").display());
    let pool = db::init(&url).await.unwrap();

    let owner = UserRepo::new(&pool)
        .create("alice@example.com", "hash", "Alice", Role::Member)
        .await
        .unwrap();
    let (_, board) = ProjectRepo::new(&pool)
        .create("Project ABC", "ABC", None, owner.id)
        .await
        .unwrap();
    (dir, pool, owner.id, board.id)
}

fn new_task(board_id: i64, reporter_id: i64, title: String) -> NewTask {
    NewTask {
        board_id,
        task_type: TaskType::Issue,
        title,
        description: None,
        status: "todo".to_string(),
        priority: TaskPriority::Medium,
        assignee_id: None,
        reporter_id,
        parent_id: None,
        deadline: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_task_creation_gets_distinct_positions() {
    let (_dir, pool, owner, board_id) = seeded_pool().await;

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let pool = pool.clone();
            let task = new_task(board_id, owner, format!("Task {}", i));
            tokio::spawn(async move { TaskRepo::new(&pool).create(&task).await })
        })
        .collect();

    let mut positions = Vec::new();
    for handle in handles {
        positions.push(handle.await.unwrap().unwrap().position);
    }
    positions.sort_unstable();

    assert_eq!(positions, (0..WRITERS).collect::<Vec<_>>());
    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_column_creation_appends_after_defaults() {
    let (_dir, pool, _, board_id) = seeded_pool().await;

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let pool = pool.clone();
            tokio::spawn(async move {
                ColumnRepo::new(&pool)
                    .create(board_id, &format!("Column {}", i), None)
                    .await
            })
        })
        .collect();

    let mut positions = Vec::new();
    for handle in handles {
        positions.push(handle.await.unwrap().unwrap().position);
    }
    positions.sort_unstable();

    // The default board already holds To Do, In Progress and Done.
    assert_eq!(positions, (3..3 + WRITERS).collect::<Vec<_>>());
    pool.close().await;
}
