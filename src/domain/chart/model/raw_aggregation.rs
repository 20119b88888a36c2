//! Aggregation payload produced by the query backend.
//!
//! Decoding is deliberately lenient: a bucket whose aggregate is missing, `null`,
//! non-numeric or non-finite decodes as "absent" instead of failing the whole response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawAggregationResponse {
    #[serde(default)]
    pub buckets: Vec<RawBucket>,
}

/// One backend cell: a scalar aggregate (overall series) or a breakdown keyed by
/// site/device name (stacked series).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawBucket {
    /// Bucket timestamp in epoch milliseconds.
    #[serde(default, deserialize_with = "lenient_key")]
    pub key: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_breakdown", skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<BTreeMap<String, Option<f64>>>,
}

impl RawBucket {
    pub fn scalar(key: i64, value: Option<f64>) -> Self {
        Self {
            key: Some(key),
            value,
            breakdown: None,
        }
    }

    pub fn with_breakdown<I, S>(key: i64, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<f64>)>,
        S: Into<String>,
    {
        Self {
            key: Some(key),
            value: None,
            breakdown: Some(entries.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.key.and_then(DateTime::from_timestamp_millis)
    }
}

impl RawAggregationResponse {
    pub fn new(buckets: Vec<RawBucket>) -> Self {
        Self { buckets }
    }

    /// True when any bucket carries a per-series breakdown.
    pub fn is_multi_series(&self) -> bool {
        self.buckets.iter().any(|b| b.breakdown.is_some())
    }
}

/// Accepts a number, a numeric string, or an `{ "value": n }` object.
fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Object(map) => map.get("value").and_then(number_from_value),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_key<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s.trim()).ok().map(|d| d.timestamp_millis())),
        _ => None,
    })
}

fn lenient_breakdown<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, Option<f64>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => Some(
            map.iter()
                .map(|(name, v)| (name.clone(), number_from_value(v)))
                .collect(),
        ),
        _ => None,
    })
}
