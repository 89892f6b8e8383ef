//! HTTP data gateway client.
//!
//! Implements the QueryExecutor trait against the remote query-execution
//! endpoint: POST `{"sql": ...}`, read `results[0].rows` from the response
//! envelope.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ExecutionError;
use crate::gateway::{QueryExecutor, Row};

/// Default timeout for gateway requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gateway client configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Full URL of the query-execution endpoint.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl GatewayConfig {
    /// Creates a new config for the given endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// HTTP client for the data gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    config: GatewayConfig,
    client: Client,
}

impl GatewayClient {
    /// Creates a new gateway client with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ExecutionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ExecutionError::Transport(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self { config, client })
    }

    /// Parses a response body into result rows.
    ///
    /// Only the first element of `results` is read; an empty `results`
    /// array is a malformed envelope, not an empty result set.
    fn parse_envelope(body: &str) -> Result<Vec<Row>, ExecutionError> {
        let envelope: GatewayEnvelope = serde_json::from_str(body)
            .map_err(|e| ExecutionError::Envelope(e.to_string()))?;

        envelope
            .results
            .into_iter()
            .next()
            .map(|set| set.rows)
            .ok_or_else(|| ExecutionError::Envelope("empty results array".into()))
    }
}

#[async_trait]
impl QueryExecutor for GatewayClient {
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, ExecutionError> {
        let response = self
            .client
            .post(&self.config.url)
            .json(&GatewayRequest { sql })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExecutionError::Timeout
                } else {
                    ExecutionError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExecutionError::Transport(format!("failed to read response: {e}")))?;

        // The gateway contract treats anything below 300 as success.
        if status.as_u16() >= 300 {
            return Err(ExecutionError::Status {
                code: status.as_u16(),
                body,
            });
        }

        Self::parse_envelope(&body)
    }
}

// Gateway wire types

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    sql: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayEnvelope {
    results: Vec<GatewayResultSet>,
}

#[derive(Debug, Deserialize)]
struct GatewayResultSet {
    rows: Vec<Row>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = GatewayConfig::new("http://localhost:8080/query");
        assert_eq!(config.url, "http://localhost:8080/query");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_config_with_timeout() {
        let config = GatewayConfig::new("http://localhost:8080/query").with_timeout(5);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_request_serialization() {
        let body = serde_json::to_string(&GatewayRequest {
            sql: "select count(*) from t",
        })
        .unwrap();
        assert_eq!(body, r#"{"sql":"select count(*) from t"}"#);
    }

    #[test]
    fn test_parse_envelope() {
        let body = r#"{"results":[{"rows":[{"count": 42}]}]}"#;
        let rows = GatewayClient::parse_envelope(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("count"), Some(&serde_json::json!(42)));
    }

    #[test]
    fn test_parse_envelope_reads_first_result_set_only() {
        let body = r#"{"results":[{"rows":[{"a": 1}]},{"rows":[{"b": 2}]}]}"#;
        let rows = GatewayClient::parse_envelope(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains_key("a"));
    }

    #[test]
    fn test_parse_envelope_empty_rows() {
        let body = r#"{"results":[{"rows":[]}]}"#;
        let rows = GatewayClient::parse_envelope(body).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_envelope_empty_results_is_error() {
        let err = GatewayClient::parse_envelope(r#"{"results":[]}"#).unwrap_err();
        assert!(matches!(err, ExecutionError::Envelope(_)));
    }

    #[test]
    fn test_parse_envelope_malformed_body() {
        let err = GatewayClient::parse_envelope("not json").unwrap_err();
        assert!(matches!(err, ExecutionError::Envelope(_)));
    }
}
