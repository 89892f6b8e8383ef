//! Scalar extraction from execution results.
//!
//! Every data-quality query is expected to reduce to exactly one value
//! (a count, ratio, or aggregate) that feeds a gauge.

use serde_json::Value;

use crate::error::ExtractError;
use crate::gateway::Row;

/// Reduces an execution result to a single floating-point value.
///
/// Accepts only a result with exactly one row containing exactly one
/// column. Integer-like values widen to `f64`; anything non-numeric fails
/// with the offending value for diagnostics.
pub fn extract_scalar(rows: &[Row]) -> Result<f64, ExtractError> {
    let row = match rows {
        [row] => row,
        _ => {
            return Err(ExtractError::Shape {
                rows: rows.len(),
                columns: rows.first().map(Row::len).unwrap_or(0),
            })
        }
    };

    if row.len() != 1 {
        return Err(ExtractError::Shape {
            rows: 1,
            columns: row.len(),
        });
    }

    let Some(value) = row.values().next() else {
        return Err(ExtractError::Shape { rows: 1, columns: 0 });
    };

    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| non_numeric(value)),
        _ => Err(non_numeric(value)),
    }
}

fn non_numeric(value: &Value) -> ExtractError {
    ExtractError::NonNumeric {
        value: value.to_string(),
    }
}
