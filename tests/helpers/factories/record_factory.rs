use crate::engine::store::Record;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub struct RecordFactory {
    id: u64,
    created_at: DateTime<Utc>,
    values: Map<String, Value>,
}

impl RecordFactory {
    pub fn new() -> Self {
        Self {
            id: 1,
            created_at: Utc::now(),
            values: Map::new(),
        }
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn create(self) -> Record {
        Record::new(self.id, self.created_at, self.values)
    }
}
