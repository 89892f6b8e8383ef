//! Error types for dq-pulse.
//!
//! Each pipeline stage has its own small error enum so that batch runs can
//! report which stage a query failed at, and ad-hoc callers can tell bad
//! input apart from gateway-side failures. The top-level [`PulseError`]
//! composes them.

use thiserror::Error;
use uuid::Uuid;

/// Failure to resolve a relative timestamp expression.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimestampError {
    /// The expression did not match `now()` / `now()-<duration>`, or the
    /// magnitude was not numeric.
    #[error("invalid timestamp expression: {expr:?}")]
    InvalidExpression { expr: String },
}

/// Failure to substitute a parameter into a query template.
#[derive(Error, Debug)]
pub enum FormatError {
    /// A timestamp-like string parameter could not be resolved.
    #[error("invalid timestamp for parameter '{key}': {source}")]
    InvalidTimestamp {
        key: String,
        #[source]
        source: TimestampError,
    },

    /// The parameter value is not a string, number, or boolean.
    #[error("unsupported parameter type for '{key}'")]
    UnsupportedType { key: String },
}

/// Failure to execute a formatted query against the data gateway.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The request could not be sent or the response not read.
    #[error("gateway request failed: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("gateway request timed out")]
    Timeout,

    /// The gateway answered with a non-success status.
    #[error("gateway returned status {code}: {body}")]
    Status { code: u16, body: String },

    /// The response body did not match the expected envelope.
    #[error("malformed gateway response: {0}")]
    Envelope(String),
}

/// Failure to reduce an execution result to a single scalar.
#[derive(Error, Debug, PartialEq)]
pub enum ExtractError {
    /// The result was not exactly one row with exactly one column.
    #[error("expected exactly one row with one column, got {rows} row(s) and {columns} column(s)")]
    Shape { rows: usize, columns: usize },

    /// The lone value was not numeric.
    #[error("query returned a non-numeric value: {value}")]
    NonNumeric { value: String },
}

/// Failure at the query definition store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("query {0} not found")]
    NotFound(Uuid),

    /// A definition with the same name already exists.
    #[error("query '{0}' already exists")]
    Conflict(String),

    #[error("store error: {0}")]
    Backend(String),
}

/// Main error type for dq-pulse operations.
#[derive(Error, Debug)]
pub enum PulseError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration errors (invalid config file, bad CLI input, etc.)
    #[error("configuration error: {0}")]
    Config(String),

    /// Metrics registry errors (duplicate registration, etc.)
    #[error("metrics error: {0}")]
    Metrics(String),
}

impl PulseError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a metrics error with the given message.
    pub fn metrics(msg: impl Into<String>) -> Self {
        Self::Metrics(msg.into())
    }

    /// Returns true if the error is caused by the caller's input or the
    /// stored query itself (as opposed to a gateway-side condition a retry
    /// might fix).
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Format(_) | Self::Extract(_) | Self::Config(_) => true,
            Self::Store(StoreError::NotFound(_)) | Self::Store(StoreError::Conflict(_)) => true,
            Self::Store(StoreError::Backend(_)) | Self::Execution(_) | Self::Metrics(_) => false,
        }
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Format(_) => "Format Error",
            Self::Execution(_) => "Execution Error",
            Self::Extract(_) => "Extraction Error",
            Self::Store(_) => "Store Error",
            Self::Config(_) => "Configuration Error",
            Self::Metrics(_) => "Metrics Error",
        }
    }
}

/// Result type alias using PulseError.
pub type Result<T> = std::result::Result<T, PulseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_carries_key() {
        let err = FormatError::UnsupportedType { key: "limit".into() };
        assert_eq!(err.to_string(), "unsupported parameter type for 'limit'");
    }

    #[test]
    fn test_timestamp_error_carries_expression() {
        let err = TimestampError::InvalidExpression {
            expr: "now()-Xd".into(),
        };
        assert!(err.to_string().contains("now()-Xd"));
    }

    #[test]
    fn test_execution_status_display() {
        let err = ExecutionError::Status {
            code: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "gateway returned status 502: bad gateway");
    }

    #[test]
    fn test_client_error_classification() {
        let format: PulseError = FormatError::UnsupportedType { key: "t".into() }.into();
        assert!(format.is_client_error());

        let shape: PulseError = ExtractError::Shape { rows: 2, columns: 1 }.into();
        assert!(shape.is_client_error());

        let timeout: PulseError = ExecutionError::Timeout.into();
        assert!(!timeout.is_client_error());

        let backend: PulseError = StoreError::Backend("disk full".into()).into();
        assert!(!backend.is_client_error());
    }

    #[test]
    fn test_category() {
        let err: PulseError = ExecutionError::Timeout.into();
        assert_eq!(err.category(), "Execution Error");
        assert_eq!(PulseError::config("bad").category(), "Configuration Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PulseError>();
    }
}
