//! Connection pool construction and schema migrations.

use std::str::FromStr;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::AppError;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens a pool for `database_url`, creating the database file if needed.
///
/// Foreign keys are switched on for every connection; the cascading deletes of
/// boards, tasks and subtasks depend on it.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // An in-memory database lives and dies with its connection.
    let in_memory = database_url.contains(":memory:");
    if !in_memory {
        let filename = options.clone().get_filename();
        if let Some(dir) = filename.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| {
                AppError::InternalServerError(format!("Cannot create {}: {}", dir.display(), e))
            })?;
        }
    }
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(10)
    };

    Ok(pool_options.connect_with(options).await?)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;
    log::info!("Database schema is up to date");
    Ok(())
}

/// `connect` followed by `migrate`.
pub async fn init(database_url: &str) -> Result<SqlitePool, AppError> {
    let pool = connect(database_url).await?;
    migrate(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_in_memory_schema() {
        let pool = init("sqlite::memory:").await.unwrap();
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' AND name != 'sqlite_sequence' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec![
                "board_columns",
                "boards",
                "comments",
                "labels",
                "project_members",
                "projects",
                "task_labels",
                "tasks",
                "users"
            ]
        );

        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }

    #[actix_rt::test]
    async fn test_file_database_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mini-jira.db");
        let url = format!("sqlite://{}", path.display());

        let pool = init(&url).await.unwrap();
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 0);
        assert!(path.exists());
        pool.close().await;

        // Reopening an existing database finds the schema already applied.
        let pool = init(&url).await.unwrap();
        pool.close().await;
    }
}
