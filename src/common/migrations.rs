// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::companies::models::AccessLevel;

/// Run all database migrations
///
/// Every statement is `IF NOT EXISTS`, so this runs on each startup.
/// With `reset` (`RESET_DB=true`) the schema is dropped and recreated first.
pub async fn run_migrations(pool: &SqlitePool, reset: bool) -> Result<(), sqlx::Error> {
    if reset {
        warn!("RESET_DB=true - dropping all tables and recreating schema");
        drop_all_tables(pool).await?;
    }

    create_directory_tables(pool).await?;
    seed_access_levels(pool).await?;
    create_feedback_tables(pool).await?;
    create_indexes(pool).await?;

    info!("Database migration completed successfully");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Drop tables in reverse dependency order
    let tables = [
        "claps",
        "comments",
        "feedback",
        "user_companies",
        "access_levels",
        "companies",
        "users",
    ];

    for table in tables {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }

    Ok(())
}

async fn create_directory_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            firstname TEXT NOT NULL,
            lastname TEXT NOT NULL,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            birthday TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS access_levels (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_companies (
            company_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            access_id INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            UNIQUE(company_id, user_id),
            FOREIGN KEY(company_id) REFERENCES companies(id),
            FOREIGN KEY(user_id) REFERENCES users(id),
            FOREIGN KEY(access_id) REFERENCES access_levels(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn seed_access_levels(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for level in AccessLevel::ALL {
        sqlx::query("INSERT OR IGNORE INTO access_levels (id, name) VALUES (?, ?)")
            .bind(level.id())
            .bind(level.as_str())
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_feedback_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            company_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            updated_at TEXT,
            deleted_at TEXT,
            FOREIGN KEY(user_id) REFERENCES users(id),
            FOREIGN KEY(company_id) REFERENCES companies(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            feedback_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            comment TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            updated_at TEXT,
            FOREIGN KEY(feedback_id) REFERENCES feedback(id),
            FOREIGN KEY(user_id) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS claps (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            feedback_id TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            deleted_at TEXT,
            FOREIGN KEY(user_id) REFERENCES users(id),
            FOREIGN KEY(feedback_id) REFERENCES feedback(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_user_companies_user ON user_companies(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_feedback_company ON feedback(company_id) WHERE deleted_at IS NULL",
        "CREATE INDEX IF NOT EXISTS idx_feedback_user ON feedback(user_id) WHERE deleted_at IS NULL",
        "CREATE INDEX IF NOT EXISTS idx_comments_feedback ON comments(feedback_id)",
        // At most one active clap per (user, feedback).
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_claps_active ON claps(user_id, feedback_id) WHERE deleted_at IS NULL",
        "CREATE INDEX IF NOT EXISTS idx_companies_name ON companies(name)",
    ];

    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{insert_user, test_pool};

    async fn user_count(pool: &SqlitePool) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    #[tokio::test]
    async fn test_rerun_keeps_data_and_reset_clears_it() {
        let pool = test_pool().await;
        insert_user(&pool, "Kris", "ok@ok.com").await;

        run_migrations(&pool, false).await.unwrap();
        assert_eq!(user_count(&pool).await, 1);

        run_migrations(&pool, true).await.unwrap();
        assert_eq!(user_count(&pool).await, 0);

        let (levels,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM access_levels")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(levels, 3);
    }
}
