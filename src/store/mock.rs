//! In-memory query definition store for testing.

use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{QueryDefinition, QueryStore};

/// An in-memory store holding definitions in insertion order.
#[derive(Default)]
pub struct InMemoryStore {
    definitions: Mutex<Vec<QueryDefinition>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given definitions.
    pub fn with_definitions(definitions: Vec<QueryDefinition>) -> Self {
        Self {
            definitions: Mutex::new(definitions),
        }
    }
}

#[async_trait]
impl QueryStore for InMemoryStore {
    async fn fetch(&self, id: Uuid) -> Result<QueryDefinition, StoreError> {
        self.definitions
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .find(|d| d.query_id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn fetch_all(&self) -> Result<Vec<QueryDefinition>, StoreError> {
        Ok(self
            .definitions
            .lock()
            .expect("store mutex poisoned")
            .clone())
    }

    async fn insert(&self, definition: &QueryDefinition) -> Result<(), StoreError> {
        let mut definitions = self.definitions.lock().expect("store mutex poisoned");
        if definitions.iter().any(|d| d.name == definition.name) {
            return Err(StoreError::Conflict(definition.name.clone()));
        }
        definitions.push(definition.clone());
        Ok(())
    }
}
