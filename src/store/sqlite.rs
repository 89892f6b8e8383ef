//! SQLite-backed query definition store.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::path::Path;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{migrations, QueryDefinition, QueryStore};

/// SQLite-backed store for query definitions.
pub struct SqliteStore {
    pool: SqlitePool,
}

/// Raw database row; uuids and the parameter JSON are stored as text.
#[derive(Debug, FromRow)]
struct DefinitionRow {
    query_id: String,
    name: String,
    description: String,
    template: String,
    default_params: String,
    product_id: String,
}

impl DefinitionRow {
    fn into_definition(self) -> Result<QueryDefinition, StoreError> {
        Ok(QueryDefinition {
            query_id: parse_uuid(&self.query_id)?,
            name: self.name,
            description: self.description,
            template: self.template,
            default_params: serde_json::from_str(&self.default_params)
                .map_err(|e| StoreError::Backend(format!("corrupt default_params: {e}")))?,
            product_id: parse_uuid(&self.product_id)?,
        })
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(s).map_err(|e| StoreError::Backend(format!("corrupt uuid '{s}': {e}")))
}

const SELECT_COLUMNS: &str =
    "query_id, name, description, template, default_params, product_id";

impl SqliteStore {
    /// Opens or creates the store database at the given path, running any
    /// pending migrations.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Backend(format!("failed to create store directory: {e}")))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Backend(format!("failed to open store: {e}")))?;

        migrations::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Opens an in-memory store, for tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Backend(format!("failed to open in-memory store: {e}")))?;

        migrations::run_migrations(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl QueryStore for SqliteStore {
    async fn fetch(&self, id: Uuid) -> Result<QueryDefinition, StoreError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM queries WHERE query_id = ?");
        let row: Option<DefinitionRow> = sqlx::query_as(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("failed to fetch query: {e}")))?;

        match row {
            Some(row) => row.into_definition(),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn fetch_all(&self) -> Result<Vec<QueryDefinition>, StoreError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM queries ORDER BY name");
        let rows: Vec<DefinitionRow> = sqlx::query_as(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("failed to list queries: {e}")))?;

        rows.into_iter().map(DefinitionRow::into_definition).collect()
    }

    async fn insert(&self, definition: &QueryDefinition) -> Result<(), StoreError> {
        let default_params = serde_json::to_string(&definition.default_params)
            .map_err(|e| StoreError::Backend(format!("failed to encode default_params: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO queries (query_id, name, description, template, default_params, product_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(definition.query_id.to_string())
        .bind(&definition.name)
        .bind(&definition.description)
        .bind(&definition.template)
        .bind(default_params)
        .bind(definition.product_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                StoreError::Conflict(definition.name.clone())
            } else {
                StoreError::Backend(format!("failed to insert query: {e}"))
            }
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_definition(name: &str) -> QueryDefinition {
        let params = json!({"cutoff": "now()-30d"})
            .as_object()
            .unwrap()
            .clone();
        QueryDefinition::new(
            name,
            "row count freshness",
            "select count(*) from t where d > $cutoff",
            params,
            Uuid::new_v4(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_fetch_round_trip() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let definition = sample_definition("freshness");

        store.insert(&definition).await.unwrap();

        let fetched = store.fetch(definition.query_id).await.unwrap();
        assert_eq!(fetched.name, "freshness");
        assert_eq!(fetched.template, definition.template);
        assert_eq!(fetched.default_params, definition.default_params);
        assert_eq!(fetched.product_id, definition.product_id);
    }

    #[tokio::test]
    async fn test_fetch_missing_is_not_found() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let id = Uuid::new_v4();

        let err = store.fetch(id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(found) if found == id));
    }

    #[tokio::test]
    async fn test_fetch_all_ordered_by_name() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.insert(&sample_definition("zeta")).await.unwrap();
        store.insert(&sample_definition("alpha")).await.unwrap();

        let all = store.fetch_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "alpha");
        assert_eq!(all[1].name, "zeta");
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.insert(&sample_definition("dup")).await.unwrap();

        let err = store.insert(&sample_definition("dup")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(name) if name == "dup"));
    }

    #[tokio::test]
    async fn test_open_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.db");

        let store = SqliteStore::open(&path).await.unwrap();
        store.insert(&sample_definition("persisted")).await.unwrap();

        assert!(path.exists());
    }
}
