//! Query definition store.
//!
//! Stored query definitions are owned by the store; the pipeline only reads
//! them. A trait-based interface allows the SQLite-backed store and the
//! in-memory test store to be used interchangeably.

mod migrations;
mod mock;
mod sqlite;

pub use mock::InMemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::StoreError;

/// A stored, named query template with its default parameters.
///
/// Immutable once fetched for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryDefinition {
    pub query_id: Uuid,
    pub name: String,
    pub description: String,
    /// Raw query template containing `$name` placeholders.
    pub template: String,
    /// Default parameter set, applied when a run supplies none.
    pub default_params: Map<String, Value>,
    /// Owning product/tenant identifier.
    pub product_id: Uuid,
}

impl QueryDefinition {
    /// Creates a definition with a fresh id.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        template: impl Into<String>,
        default_params: Map<String, Value>,
        product_id: Uuid,
    ) -> Self {
        Self {
            query_id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            template: template.into(),
            default_params,
            product_id,
        }
    }
}

/// Trait defining the interface for query definition stores.
#[async_trait]
pub trait QueryStore: Send + Sync {
    /// Fetches a single definition by id.
    async fn fetch(&self, id: Uuid) -> Result<QueryDefinition, StoreError>;

    /// Fetches all stored definitions.
    async fn fetch_all(&self) -> Result<Vec<QueryDefinition>, StoreError>;

    /// Inserts a new definition. Names are unique.
    async fn insert(&self, definition: &QueryDefinition) -> Result<(), StoreError>;
}
