use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Optional sign followed by the leading run of digits, after any whitespace
static LEADING_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?)(\d+)").expect("leading integer pattern is valid"));

/// An untrusted count field from a raw row.
///
/// Upstream datasets deliver counts as numbers, numeric strings, placeholder
/// strings like `"N/A"`, or not at all. The value is kept as-is and only ever
/// read through [`coerce_count`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCount(pub Option<Value>);

impl RawCount {
    pub fn coerce(&self) -> u64 {
        self.0.as_ref().map(coerce_count).unwrap_or(0)
    }

    /// Present and non-null, yet not readable as a number
    pub fn is_malformed(&self) -> bool {
        match &self.0 {
            None | Some(Value::Null) => false,
            Some(value) => parse_count(value).is_none(),
        }
    }
}

impl From<Value> for RawCount {
    fn from(value: Value) -> Self {
        Self(Some(value))
    }
}

/// Converts an untrusted value into a definite non-negative count.
///
/// Integers pass through, floats truncate, strings are read by their leading
/// integer (`"12abc"` is 12, `"3.7"` is 3). Negative values clamp to zero,
/// oversized values saturate, and everything else is zero.
pub fn coerce_count(value: &Value) -> u64 {
    parse_count(value).unwrap_or(0)
}

fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Some(v)
            } else if n.as_i64().is_some() {
                Some(0)
            } else {
                n.as_f64().filter(|f| f.is_finite()).map(clamp_float)
            }
        }
        Value::String(s) => parse_leading_integer(s),
        _ => None,
    }
}

fn clamp_float(f: f64) -> u64 {
    if f <= 0.0 {
        0
    } else if f >= u64::MAX as f64 {
        u64::MAX
    } else {
        f.trunc() as u64
    }
}

fn parse_leading_integer(s: &str) -> Option<u64> {
    let captures = LEADING_INTEGER.captures(s)?;
    let negative = captures.get(1).map(|m| m.as_str() == "-").unwrap_or(false);
    let digits = captures.get(2)?.as_str();

    if negative {
        return Some(0);
    }
    // Only overflow can fail here since the match is all digits
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}
