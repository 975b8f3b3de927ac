use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::engine::store::query::FilterCondition;
use crate::engine::store::schema::FieldType;

/// On-disk layout of a store data file.
///
/// ```json
/// {
///   "entities": [
///     {
///       "name": "Order",
///       "fields": { "total": "decimal", "status": "string", "user_id": "integer | null" },
///       "filters": { "paid": [ { "field": "status", "op": "eq", "value": "paid" } ] },
///       "records": [ { "id": 1, "created_at": "2026-01-01T10:00:00Z", "total": 10.5, "status": "paid", "user_id": 1 } ]
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreFixture {
    #[serde(default)]
    pub entities: Vec<EntityFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityFixture {
    pub name: String,
    #[serde(default)]
    pub fields: IndexMap<String, FieldType>,
    #[serde(default)]
    pub filters: IndexMap<String, Vec<FilterCondition>>,
    /// Rows may carry `id` and `created_at`; both are assigned when absent.
    #[serde(default)]
    pub records: Vec<Map<String, Value>>,
}
