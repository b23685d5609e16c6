//! Database initialization
//!
//! Creates the database on first run and applies the schema idempotently, so
//! callers never need a separate migration step for a fresh library.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_and_migrate(&pool).await?;

    Ok(pool)
}

/// Initialize an in-memory database with the full schema (used by tests)
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    configure_and_migrate(&pool).await?;

    Ok(pool)
}

async fn configure_and_migrate(pool: &SqlitePool) -> Result<()> {
    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    // Schema creation is idempotent, safe to call on every startup
    create_categories_table(pool).await?;
    create_entries_table(pool).await?;
    create_references_table(pool).await?;

    Ok(())
}

async fn create_categories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            parent_id TEXT REFERENCES categories(guid) ON DELETE SET NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_entries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category_id TEXT REFERENCES categories(guid) ON DELETE SET NULL,
            is_favorite INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            last_used INTEGER,
            used_count INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Entry names are unique case-insensitively; the import pipeline resolves
    // collisions before insert, this index is the backstop
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_entries_name_nocase
         ON entries(name COLLATE NOCASE)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_references_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vibe_references (
            guid TEXT PRIMARY KEY,
            entry_id TEXT NOT NULL REFERENCES entries(guid) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            display_name TEXT NOT NULL,
            encoding TEXT NOT NULL,
            encoding_digest TEXT NOT NULL,
            strength REAL NOT NULL,
            info_extracted REAL NOT NULL,
            source_type TEXT NOT NULL,
            thumbnail BLOB,
            raw_image BLOB
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_references_entry
         ON vibe_references(entry_id, position)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_memory_database() {
        let pool = init_memory_database().await.unwrap();

        // Schema should exist
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
             AND name IN ('categories', 'entries', 'vibe_references')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let pool = init_memory_database().await.unwrap();
        // Re-running migration against an initialized pool must not fail
        configure_and_migrate(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_init_creates_file_and_parents() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("library.db");

        let pool = init_database(&db_path).await.unwrap();
        drop(pool);

        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_entry_name_unique_nocase() {
        let pool = init_memory_database().await.unwrap();

        sqlx::query("INSERT INTO entries (guid, name, created_at) VALUES ('a', 'Red Hair', 0)")
            .execute(&pool)
            .await
            .unwrap();

        let dup = sqlx::query(
            "INSERT INTO entries (guid, name, created_at) VALUES ('b', 'red hair', 0)",
        )
        .execute(&pool)
        .await;

        assert!(dup.is_err());
    }
}
