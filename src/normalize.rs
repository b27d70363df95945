//! Row value normalization.
//!
//! Turns the raw Y cells of a sheet into numbers. Cells that do not parse are
//! dropped together with their row; this is a filtering policy, not an error.

use crate::sheet::Row;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref NOISE_REGEX: Regex = Regex::new(r"[,$]").unwrap();
    static ref LEADING_FLOAT_REGEX: Regex =
        Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").unwrap();
}

/// One (label, value) pair of a normalized series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    /// Raw X cell, passed through unchanged
    pub label: Value,

    /// Parsed Y cell, always finite
    pub value: f64,
}

/// Filtered, numeric-parsed (label, value) pairs driving a chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSeries {
    points: Vec<SeriesPoint>,
}

impl NormalizedSeries {
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> Vec<Value> {
        self.points.iter().map(|p| p.label.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Largest value, or `None` for an empty series.
    pub fn max_value(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).reduce(f64::max)
    }
}

impl FromIterator<SeriesPoint> for NormalizedSeries {
    fn from_iter<I: IntoIterator<Item = SeriesPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Parse a raw cell value as a number.
///
/// The cell is stringified, every `,` and `$` is removed, surrounding
/// whitespace is trimmed and the longest leading decimal prefix is parsed,
/// so `"$1,200"` is 1200 and `"12kg"` is 12. Returns `None` for text with no
/// numeric prefix, for missing cells and for non-finite results.
///
/// # Examples
/// ```
/// use chartsheet::normalize::parse_numeric;
/// use serde_json::json;
///
/// assert_eq!(parse_numeric(&json!("$1,200")), Some(1200.0));
/// assert_eq!(parse_numeric(&json!(" 950 ")), Some(950.0));
/// assert_eq!(parse_numeric(&json!("abc")), None);
/// ```
pub fn parse_numeric(raw: &Value) -> Option<f64> {
    let text = match raw {
        Value::Number(n) => return n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.clone(),
        Value::Null => return None,
        other => other.to_string(),
    };

    let cleaned = NOISE_REGEX.replace_all(&text, "");
    let prefix = LEADING_FLOAT_REGEX.find(cleaned.trim())?;
    prefix
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
}

/// Build the normalized series for columns `x_axis` / `y_axis` of `rows`.
///
/// Row order is preserved. A missing X cell becomes a null label; a row
/// whose Y cell is missing or non-numeric is skipped.
pub fn normalize_series(rows: &[Row], x_axis: &str, y_axis: &str) -> NormalizedSeries {
    rows.iter()
        .filter_map(|row| {
            let label = row.get(x_axis).cloned().unwrap_or(Value::Null);
            let raw_y = row.get(y_axis).unwrap_or(&Value::Null);
            match parse_numeric(raw_y) {
                Some(value) => Some(SeriesPoint { label, value }),
                None => {
                    debug!("skipping row: x={} y={} is not numeric", label, raw_y);
                    None
                }
            }
        })
        .collect()
}
