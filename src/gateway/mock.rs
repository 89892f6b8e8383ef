//! Mock query executors for testing.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::ExecutionError;
use crate::gateway::{QueryExecutor, Row};

/// A mock executor that returns predefined rows and records the queries it
/// receives.
pub struct MockExecutor {
    rows: Vec<Row>,
    executed: Mutex<Vec<String>>,
}

impl MockExecutor {
    /// Creates a mock executor that answers every query with the given rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock executor answering with a single-row, single-column
    /// result containing `value`.
    pub fn scalar(column: &str, value: f64) -> Self {
        let mut row = Row::new();
        row.insert(column.to_string(), serde_json::json!(value));
        Self::new(vec![row])
    }

    /// Returns the queries executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().expect("executor mutex poisoned").clone()
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, ExecutionError> {
        self.executed
            .lock()
            .expect("executor mutex poisoned")
            .push(sql.to_string());
        Ok(self.rows.clone())
    }
}

/// A mock executor that fails every query, simulating a gateway outage.
pub struct FailingExecutor;

#[async_trait]
impl QueryExecutor for FailingExecutor {
    async fn execute(&self, _sql: &str) -> Result<Vec<Row>, ExecutionError> {
        Err(ExecutionError::Transport("connection refused".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_rows_and_records_query() {
        let executor = MockExecutor::scalar("count", 42.0);
        let rows = executor.execute("SELECT count(*) FROM t").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(executor.executed(), vec!["SELECT count(*) FROM t"]);
    }

    #[tokio::test]
    async fn test_failing_executor() {
        let executor = FailingExecutor;
        let err = executor.execute("SELECT 1").await.unwrap_err();
        assert!(matches!(err, ExecutionError::Transport(_)));
    }
}
