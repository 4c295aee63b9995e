//! Duration expressions resolved against a reference instant
//!
//! Used for `expiresIn`, `notBefore`, `maxAge` and `maxExpiration`. An
//! expression is either a signed number of seconds or a human duration
//! such as `"10s"`, `"2d"`, `"36h"` or `"1.5 hours"`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_EXPRESSION_LENGTH: usize = 100;

const SECOND: f64 = 1.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const WEEK: f64 = 7.0 * DAY;
const YEAR: f64 = 365.25 * DAY;

/// A relative time expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timespan {
    /// Signed offset in seconds
    Seconds(f64),

    /// Human duration string
    Text(String),
}

impl Timespan {
    /// Read an expression from an arbitrary JSON value
    ///
    /// Only numbers and strings are expressions.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Timespan::Seconds),
            Value::String(s) => Some(Timespan::Text(s.clone())),
            _ => None,
        }
    }

    /// Resolve against `reference` (epoch seconds)
    pub fn resolve(&self, reference: f64) -> Option<f64> {
        resolve(self, reference)
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timespan::Seconds(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{}", *n as i64),
            Timespan::Seconds(n) => write!(f, "{n}"),
            Timespan::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Timespan {
    fn from(seconds: i64) -> Self {
        Timespan::Seconds(seconds as f64)
    }
}

impl From<i32> for Timespan {
    fn from(seconds: i32) -> Self {
        Timespan::Seconds(f64::from(seconds))
    }
}

impl From<u32> for Timespan {
    fn from(seconds: u32) -> Self {
        Timespan::Seconds(f64::from(seconds))
    }
}

impl From<f64> for Timespan {
    fn from(seconds: f64) -> Self {
        Timespan::Seconds(seconds)
    }
}

impl From<&str> for Timespan {
    fn from(text: &str) -> Self {
        Timespan::Text(text.to_string())
    }
}

impl From<String> for Timespan {
    fn from(text: String) -> Self {
        Timespan::Text(text)
    }
}

/// Resolve an expression into absolute epoch seconds
///
/// Numbers are added to `reference` as-is. Strings are parsed as a duration
/// and the sum is floored. Returns `None` when the expression cannot be
/// parsed or the result is not finite.
pub fn resolve(expression: &Timespan, reference: f64) -> Option<f64> {
    let resolved = match expression {
        Timespan::Seconds(seconds) => reference + seconds,
        Timespan::Text(text) => (reference + parse_duration(text)?).floor(),
    };

    resolved.is_finite().then_some(resolved)
}

/// Parse a duration string into seconds
pub fn parse_duration(text: &str) -> Option<f64> {
    if text.is_empty() || text.len() > MAX_EXPRESSION_LENGTH {
        return None;
    }

    let captures = DURATION_PATTERN.captures(text)?;
    let amount: f64 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures
        .get(2)
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_default();

    let multiplier = match unit.as_str() {
        "years" | "year" | "yrs" | "yr" | "y" => YEAR,
        "weeks" | "week" | "w" => WEEK,
        "days" | "day" | "d" => DAY,
        "hours" | "hour" | "hrs" | "hr" | "h" => HOUR,
        "minutes" | "minute" | "mins" | "min" | "m" => MINUTE,
        "" | "seconds" | "second" | "secs" | "sec" | "s" => SECOND,
        "milliseconds" | "millisecond" | "msecs" | "msec" | "ms" => SECOND / 1000.0,
        _ => return None,
    };

    Some(amount * multiplier)
}

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(-?(?:\d+)?\.?\d+) *",
        r"(milliseconds?|msecs?|ms|seconds?|secs?|s|minutes?|mins?|m|",
        r"hours?|hrs?|h|days?|d|weeks?|w|years?|yrs?|y)?$",
    ))
    .expect("static regex")
});

/// Message for an option or claim that does not hold a usable expression
pub fn timespan_error(field: &str) -> String {
    format!(
        "\"{field}\" should be a number of seconds or string representing a timespan eg: \"1d\", \"20h\", 60"
    )
}
