pub mod evaluator;
pub mod fixture;
pub mod memory;
pub mod query;
pub mod record;
pub mod schema;

pub use fixture::{EntityFixture, StoreFixture};
pub use memory::MemoryStore;
pub use query::{EntityQuery, FilterCondition, FilterOp, OrderSpec, Predicate};
pub use record::Record;
pub use schema::{CREATED_AT_FIELD, EntitySchema, FieldType, ID_FIELD};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::engine::errors::StoreError;

/// Read-only capability the query runner executes against.
///
/// A backend resolves entity and filter names into an [`EntityQuery`] and
/// later interprets that query for aggregation and retrieval. `schema` doubles
/// as the catalog used to validate resource descriptors at startup.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn resolve_entity(&self, name: &str) -> Result<EntityQuery, StoreError>;

    async fn apply_named_filter(
        &self,
        query: EntityQuery,
        name: &str,
    ) -> Result<EntityQuery, StoreError>;

    fn filter_by_range(
        &self,
        query: EntityQuery,
        field: &str,
        lower: DateTime<Utc>,
        upper: Option<DateTime<Utc>>,
    ) -> EntityQuery {
        query.with_range(field, lower, upper)
    }

    async fn count(&self, query: &EntityQuery) -> Result<u64, StoreError>;

    /// `None` when no row carries a non-null value.
    async fn sum(&self, query: &EntityQuery, field: &str) -> Result<Option<f64>, StoreError>;

    /// `None` when no row carries a non-null value.
    async fn average(&self, query: &EntityQuery, field: &str)
    -> Result<Option<f64>, StoreError>;

    async fn fetch_ordered(
        &self,
        query: &EntityQuery,
        order: &OrderSpec,
        limit: usize,
    ) -> Result<Vec<Record>, StoreError>;

    fn project(&self, record: &Record, fields: &[String]) -> Map<String, Value> {
        record.project(fields)
    }

    fn schema(&self, entity: &str) -> Option<EntitySchema>;
}
