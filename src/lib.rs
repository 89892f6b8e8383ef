//! dq-pulse — data-quality metrics runner.
//!
//! Evaluates stored, parameterized SQL-like query templates against a
//! remote data gateway and publishes each result as a single gauge sample
//! keyed by query name and product id.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod gateway;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod store;
pub mod timestamp;
