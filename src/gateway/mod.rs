//! Data gateway abstraction.
//!
//! Provides a trait-based interface for executing formatted queries against
//! the remote query-execution service, so the pipeline can run against the
//! real HTTP gateway or a mock interchangeably.

mod http;
mod mock;

pub use http::{GatewayClient, GatewayConfig};
pub use mock::{FailingExecutor, MockExecutor};

use async_trait::async_trait;

use crate::error::ExecutionError;

/// One result row: a mapping of column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Trait for executing a formatted query against the data gateway.
///
/// Implementations must be thread-safe (Send + Sync) to support async
/// pipeline runs.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes the formatted query string and returns the result rows.
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, ExecutionError>;
}
