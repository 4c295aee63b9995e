//! Epoch-second helpers shared by the signing and verification paths

use chrono::{DateTime, Utc};
use serde_json::{Number, Value};

/// Largest integer a JSON number round-trips exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Current wall-clock time in whole epoch seconds
pub fn now() -> f64 {
    Utc::now().timestamp() as f64
}

/// Convert epoch seconds into a `DateTime<Utc>`
///
/// Sub-millisecond precision is truncated. Instants outside chrono's range
/// clamp to its bounds.
pub fn to_datetime(seconds: f64) -> DateTime<Utc> {
    let millis = (seconds * 1000.0).trunc();
    if millis.is_nan() {
        return DateTime::<Utc>::MIN_UTC;
    }
    if millis >= i64::MAX as f64 {
        return DateTime::<Utc>::MAX_UTC;
    }
    if millis <= i64::MIN as f64 {
        return DateTime::<Utc>::MIN_UTC;
    }

    let millis = millis as i64;
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or(if millis < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// Encode epoch seconds as a JSON number
///
/// Whole values are written as integers. Non-finite values have no JSON
/// representation and yield `None`.
pub fn to_json_number(seconds: f64) -> Option<Value> {
    if !seconds.is_finite() {
        return None;
    }
    if seconds.fract() == 0.0 && seconds.abs() <= MAX_SAFE_INTEGER {
        return Some(Value::from(seconds as i64));
    }
    Number::from_f64(seconds).map(Value::Number)
}
