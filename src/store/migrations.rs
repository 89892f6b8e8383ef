//! Schema versioning and migrations for the query definition store.
//!
//! Forward-only migrations, tracked in a `schema_versions` table.

use sqlx::sqlite::SqlitePool;
use tracing::info;

use crate::error::StoreError;

const CURRENT_VERSION: i32 = 1;

/// Runs all pending migrations on the database.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
    ensure_schema_versions_table(pool).await?;

    let current = get_current_version(pool).await?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Backend(format!(
            "store schema version ({current}) is newer than supported version ({CURRENT_VERSION})"
        )));
    }

    for version in (current + 1)..=CURRENT_VERSION {
        run_migration(pool, version).await?;
        record_version(pool, version).await?;
        info!("Applied store migration v{version}");
    }

    Ok(())
}

async fn ensure_schema_versions_table(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_versions (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("failed to create schema_versions table: {e}")))?;

    Ok(())
}

async fn get_current_version(pool: &SqlitePool) -> Result<i32, StoreError> {
    let row: Option<(Option<i32>,)> = sqlx::query_as("SELECT MAX(version) FROM schema_versions")
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::Backend(format!("failed to get schema version: {e}")))?;

    Ok(row.and_then(|(v,)| v).unwrap_or(0))
}

async fn record_version(pool: &SqlitePool, version: i32) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO schema_versions (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await
        .map_err(|e| StoreError::Backend(format!("failed to record schema version: {e}")))?;

    Ok(())
}

async fn run_migration(pool: &SqlitePool, version: i32) -> Result<(), StoreError> {
    match version {
        1 => migrate_v1(pool).await,
        _ => Err(StoreError::Backend(format!(
            "unknown migration version: {version}"
        ))),
    }
}

/// v1: the queries table.
async fn migrate_v1(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS queries (
            query_id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            template TEXT NOT NULL,
            default_params TEXT NOT NULL DEFAULT '{}',
            product_id TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("failed to create queries table: {e}")))?;

    Ok(())
}
