//! Relative timestamp expression resolution.
//!
//! Query parameters may carry expressions like `now()` or `now()-30d` that
//! are resolved against the wall clock at format time and inserted into the
//! query as quoted `'YYYY-MM-DD HH:MM:SS'` literals.

use chrono::{Duration, NaiveDateTime};

use crate::error::TimestampError;

/// Literal format expected by the data gateway.
const LITERAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Resolves a relative timestamp expression against `now`.
///
/// Supported forms:
/// - `now()` — the current time.
/// - `now()-<n>d` — `n` calendar days back.
/// - `now()-<n>w` — `7*n` days back.
/// - `now()-<n>y` — `365*n` days back. Years are fixed-length with no
///   leap-year correction; existing stored queries depend on this.
/// - `now()-<duration>` — any other suffix is parsed as a free-form
///   signed duration (e.g. `90m`, `1h 30m`, `-90m`) and subtracted.
///
/// The result is always wrapped in single quotes, ready for direct textual
/// insertion into a query.
pub fn resolve(expr: &str, now: NaiveDateTime) -> Result<String, TimestampError> {
    if expr == "now()" {
        return Ok(quote(now));
    }

    let Some(spec) = expr.strip_prefix("now()-") else {
        return Err(invalid(expr));
    };

    let delta = parse_duration_spec(spec, expr)?;
    let shifted = now.checked_sub_signed(delta).ok_or_else(|| invalid(expr))?;

    Ok(quote(shifted))
}

/// Parses the duration part after `now()-` into a signed offset.
fn parse_duration_spec(spec: &str, expr: &str) -> Result<Duration, TimestampError> {
    if let Some(magnitude) = spec.strip_suffix('d') {
        return days_back(parse_magnitude(magnitude, expr)?, 1, expr);
    }
    if let Some(magnitude) = spec.strip_suffix('w') {
        return days_back(parse_magnitude(magnitude, expr)?, 7, expr);
    }
    if let Some(magnitude) = spec.strip_suffix('y') {
        return days_back(parse_magnitude(magnitude, expr)?, 365, expr);
    }

    // Free-form durations, with whitespace stripped first ("1h 30m" == "1h30m").
    // The duration is signed, like the d/w/y magnitudes.
    let normalized = spec.replace(' ', "");
    let (magnitude, negate) = match normalized.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (normalized.as_str(), false),
    };

    let duration = humantime::parse_duration(magnitude).map_err(|_| invalid(expr))?;
    let delta = Duration::from_std(duration).map_err(|_| invalid(expr))?;

    Ok(if negate { -delta } else { delta })
}

fn parse_magnitude(s: &str, expr: &str) -> Result<i64, TimestampError> {
    s.parse::<i64>().map_err(|_| invalid(expr))
}

fn days_back(n: i64, factor: i64, expr: &str) -> Result<Duration, TimestampError> {
    n.checked_mul(factor)
        .and_then(Duration::try_days)
        .ok_or_else(|| invalid(expr))
}

fn invalid(expr: &str) -> TimestampError {
    TimestampError::InvalidExpression {
        expr: expr.to_string(),
    }
}

fn quote(timestamp: NaiveDateTime) -> String {
    format!("'{}'", timestamp.format(LITERAL_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_resolve_now() {
        let literal = resolve("now()", fixed_now()).unwrap();
        assert_eq!(literal, "'2024-03-15 10:30:00'");
    }

    #[test]
    fn test_resolve_days() {
        let literal = resolve("now()-1d", fixed_now()).unwrap();
        assert_eq!(literal, "'2024-03-14 10:30:00'");
    }

    #[test]
    fn test_resolve_weeks_equals_days() {
        let now = fixed_now();
        assert_eq!(
            resolve("now()-4w", now).unwrap(),
            resolve("now()-28d", now).unwrap()
        );
    }

    #[test]
    fn test_resolve_year_is_365_days() {
        let now = fixed_now();
        // 2024 is a leap year; the fixed 365-day year skips Feb 29.
        assert_eq!(
            resolve("now()-1y", now).unwrap(),
            resolve("now()-365d", now).unwrap()
        );
        assert_eq!(resolve("now()-1y", now).unwrap(), "'2023-03-16 10:30:00'");
    }

    #[test]
    fn test_resolve_free_form_duration() {
        let literal = resolve("now()-90m", fixed_now()).unwrap();
        assert_eq!(literal, "'2024-03-15 09:00:00'");
    }

    #[test]
    fn test_resolve_free_form_with_spaces() {
        let literal = resolve("now()-1h 30m", fixed_now()).unwrap();
        assert_eq!(literal, "'2024-03-15 09:00:00'");
    }

    #[test]
    fn test_resolve_bogus_expression() {
        let err = resolve("bogus", fixed_now()).unwrap_err();
        assert_eq!(
            err,
            TimestampError::InvalidExpression {
                expr: "bogus".into()
            }
        );
    }

    #[test]
    fn test_resolve_non_numeric_magnitude() {
        let err = resolve("now()-Xd", fixed_now()).unwrap_err();
        assert!(err.to_string().contains("now()-Xd"));
    }

    #[test]
    fn test_resolve_plain_timestamp_rejected() {
        assert!(resolve("2024-01-01 00:00:00", fixed_now()).is_err());
    }

    #[test]
    fn test_resolve_negative_magnitude_adds() {
        // The magnitude is signed; a negative count walks forward.
        let literal = resolve("now()--1d", fixed_now()).unwrap();
        assert_eq!(literal, "'2024-03-16 10:30:00'");
    }

    #[test]
    fn test_resolve_negative_free_form_adds() {
        let literal = resolve("now()--90m", fixed_now()).unwrap();
        assert_eq!(literal, "'2024-03-15 12:00:00'");
    }
}
