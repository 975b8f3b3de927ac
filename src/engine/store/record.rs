use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::engine::store::schema::{CREATED_AT_FIELD, ID_FIELD};

/// One stored row: store-assigned core fields plus the declared payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub values: Map<String, Value>,
}

impl Record {
    pub fn new(id: u64, created_at: DateTime<Utc>, values: Map<String, Value>) -> Self {
        Self {
            id,
            created_at,
            values,
        }
    }

    pub fn get_field(&self, name: &str) -> Option<Value> {
        match name {
            ID_FIELD => Some(Value::Number(self.id.into())),
            CREATED_AT_FIELD => Some(Value::String(format_timestamp(&self.created_at))),
            _ => self.values.get(name).cloned(),
        }
    }

    /// Numeric view of a field; nulls and non-numbers yield `None`.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match name {
            ID_FIELD => Some(self.id as f64),
            _ => self.values.get(name).and_then(Value::as_f64),
        }
    }

    pub fn get_timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        match name {
            CREATED_AT_FIELD => Some(self.created_at),
            _ => self.values.get(name).and_then(parse_timestamp),
        }
    }

    /// Copies exactly the listed fields; absent fields render as null.
    pub fn project(&self, fields: &[String]) -> Map<String, Value> {
        fields
            .iter()
            .map(|field| (field.clone(), self.get_field(field).unwrap_or(Value::Null)))
            .collect()
    }
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Accepts RFC3339 strings, `YYYY-MM-DD` dates (midnight UTC) and integer
/// epoch seconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}
