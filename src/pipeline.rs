//! The metric pipeline: format, execute, extract, publish.
//!
//! One pipeline instance serves both ad-hoc runs (first failure aborts and
//! is returned to the caller) and scheduled batch runs over every stored
//! definition (per-query failures are logged and skipped, never fatal to
//! the batch).

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{PulseError, Result};
use crate::extract::extract_scalar;
use crate::format::format_query;
use crate::gateway::QueryExecutor;
use crate::metrics::MetricsSink;
use crate::store::{QueryDefinition, QueryStore};

/// The pipeline stage at which a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Format,
    Execute,
    Extract,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Format => "format",
            Self::Execute => "execute",
            Self::Extract => "extract",
        };
        write!(f, "{name}")
    }
}

/// A per-query failure, tagged with the stage that produced it.
#[derive(Debug)]
pub struct RunFailure {
    pub stage: Stage,
    pub cause: PulseError,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.cause)
    }
}

/// Outcome of running one stored definition within a batch.
#[derive(Debug)]
pub struct RunOutcome {
    pub query_id: Uuid,
    pub name: String,
    pub product_id: Uuid,
    pub result: std::result::Result<f64, RunFailure>,
}

/// Aggregate result of one batch pass. Never carries a fatal error; the
/// only failure `run_all` itself can return is the initial store read.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<RunOutcome>,
}

impl BatchSummary {
    /// Number of definitions that published a value.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of definitions that failed at some stage.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// The four-stage metric pipeline over injected collaborators.
pub struct Pipeline {
    store: Arc<dyn QueryStore>,
    executor: Arc<dyn QueryExecutor>,
    sink: Arc<dyn MetricsSink>,
}

impl Pipeline {
    /// Creates a pipeline over the given store, executor, and sink.
    pub fn new(
        store: Arc<dyn QueryStore>,
        executor: Arc<dyn QueryExecutor>,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            store,
            executor,
            sink,
        }
    }

    /// Runs format → execute → extract for a caller-supplied template.
    ///
    /// The first failing stage aborts and its error is returned verbatim.
    /// Nothing is published: an ad-hoc template has no stored name or
    /// tenant to label a gauge with.
    pub async fn run_once(
        &self,
        template: &str,
        params: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<f64> {
        let sql = format_query(template, params, Utc::now().naive_utc())?;
        let rows = self.executor.execute(&sql).await?;
        let value = extract_scalar(&rows)?;
        Ok(value)
    }

    /// Runs a stored definition with its default parameters and publishes
    /// the result.
    pub async fn run_stored(&self, id: Uuid) -> Result<f64> {
        let definition = self.store.fetch(id).await?;
        let value = self
            .run_once(&definition.template, &definition.default_params)
            .await?;
        self.publish(&definition, value);
        Ok(value)
    }

    /// Runs every stored definition, isolating failures per query.
    ///
    /// Each definition is formatted with its default parameters, executed,
    /// extracted, and published. A failure at any stage is logged with the
    /// query name and failing stage, then the batch moves on. Only a
    /// failure to read the definition list itself propagates.
    pub async fn run_all(&self) -> Result<BatchSummary> {
        let definitions = self.store.fetch_all().await?;
        info!(count = definitions.len(), "Starting batch run");

        let mut summary = BatchSummary::default();
        for definition in &definitions {
            summary.outcomes.push(self.run_definition(definition).await);
        }

        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "Batch run finished"
        );
        Ok(summary)
    }

    async fn run_definition(&self, definition: &QueryDefinition) -> RunOutcome {
        let result = self.run_stages(definition).await;

        match &result {
            Ok(value) => {
                self.publish(definition, *value);
                info!(
                    query = %definition.name,
                    product_id = %definition.product_id,
                    value = *value,
                    "Query published"
                );
            }
            Err(failure) => {
                error!(
                    query = %definition.name,
                    product_id = %definition.product_id,
                    stage = %failure.stage,
                    cause = %failure.cause,
                    "Query run failed"
                );
            }
        }

        RunOutcome {
            query_id: definition.query_id,
            name: definition.name.clone(),
            product_id: definition.product_id,
            result,
        }
    }

    async fn run_stages(
        &self,
        definition: &QueryDefinition,
    ) -> std::result::Result<f64, RunFailure> {
        let sql = format_query(
            &definition.template,
            &definition.default_params,
            Utc::now().naive_utc(),
        )
        .map_err(|e| RunFailure {
            stage: Stage::Format,
            cause: e.into(),
        })?;

        let rows = self.executor.execute(&sql).await.map_err(|e| RunFailure {
            stage: Stage::Execute,
            cause: e.into(),
        })?;

        extract_scalar(&rows).map_err(|e| RunFailure {
            stage: Stage::Extract,
            cause: e.into(),
        })
    }

    /// Best-effort publish; the sink cannot fail the pipeline.
    fn publish(&self, definition: &QueryDefinition, value: f64) {
        self.sink
            .set_value(&definition.name, &definition.product_id.to_string(), value);
    }
}
