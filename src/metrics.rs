//! Metrics sink for published query results.
//!
//! Each successful query run sets one gauge sample labeled by query name
//! and product id; last write wins, no history. The registry is injected
//! and owned by the process entry point; nothing here is global.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::sync::Mutex;

use crate::error::{PulseError, Result};

/// Trait for publishing scalar query results.
pub trait MetricsSink: Send + Sync {
    /// Sets the gauge for (query name, product id) to `value`.
    fn set_value(&self, query_name: &str, product_id: &str, value: f64);
}

/// Prometheus-backed sink over a `query_output` gauge vector.
#[derive(Debug)]
pub struct PrometheusSink {
    gauge: GaugeVec,
}

impl PrometheusSink {
    /// Creates the sink and registers its gauge on the given registry.
    pub fn new(registry: &Registry) -> Result<Self> {
        let gauge = GaugeVec::new(
            Opts::new("query_output", "Sets the result for every query."),
            &["name", "data_product_id"],
        )
        .map_err(|e| PulseError::metrics(e.to_string()))?;

        registry
            .register(Box::new(gauge.clone()))
            .map_err(|e| PulseError::metrics(e.to_string()))?;

        Ok(Self { gauge })
    }
}

impl MetricsSink for PrometheusSink {
    fn set_value(&self, query_name: &str, product_id: &str, value: f64) {
        self.gauge
            .with_label_values(&[query_name, product_id])
            .set(value);
    }
}

/// Renders a registry in the prometheus text exposition format.
pub fn encode_text(registry: &Registry) -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .map_err(|e| PulseError::metrics(e.to_string()))?;

    String::from_utf8(buffer).map_err(|e| PulseError::metrics(e.to_string()))
}

/// A sink that records samples in memory, for tests.
#[derive(Default)]
pub struct RecordingSink {
    samples: Mutex<Vec<(String, String, f64)>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded (name, product_id, value) samples in order.
    pub fn samples(&self) -> Vec<(String, String, f64)> {
        self.samples.lock().expect("sink mutex poisoned").clone()
    }
}

impl MetricsSink for RecordingSink {
    fn set_value(&self, query_name: &str, product_id: &str, value: f64) {
        self.samples
            .lock()
            .expect("sink mutex poisoned")
            .push((query_name.to_string(), product_id.to_string(), value));
    }
}
