use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::engine::errors::StoreError;

/// Outcome for one resource: the requested aggregates, or a single error
/// message when the resource could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggregateResult {
    Values(AggregateValues),
    Error { error: String },
}

impl AggregateResult {
    pub fn failure(err: &StoreError) -> Self {
        AggregateResult::Error {
            error: err.result_message(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AggregateResult::Error { .. })
    }

    pub fn values(&self) -> Option<&AggregateValues> {
        match self {
            AggregateResult::Values(values) => Some(values),
            AggregateResult::Error { .. } => None,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Keys are emitted only for operations the descriptor requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateValues {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<IndexMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<IndexMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<Vec<Map<String, Value>>>,
}

/// Rounds half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
