use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::engine::errors::StoreError;
use crate::engine::store::DataStore;
use crate::engine::store::evaluator::{RecordEvaluator, sort_records};
use crate::engine::store::fixture::StoreFixture;
use crate::engine::store::query::{EntityQuery, FilterCondition, FilterOp, MAX_WITHIN_DAYS, OrderSpec};
use crate::engine::store::record::{Record, parse_timestamp};
use crate::engine::store::schema::{CREATED_AT_FIELD, EntitySchema, FieldType, ID_FIELD, json_type_name};

#[derive(Debug, Clone)]
struct EntityTable {
    schema: EntitySchema,
    records: Vec<Record>,
    filters: HashMap<String, Vec<FilterCondition>>,
    next_id: u64,
}

impl EntityTable {
    fn new(schema: EntitySchema) -> Self {
        Self {
            schema,
            records: Vec::new(),
            filters: HashMap::new(),
            next_id: 1,
        }
    }

    fn numeric_field(&self, field: &str) -> Result<(), StoreError> {
        match self.schema.field_type(field) {
            Some(ft) if ft.is_numeric() => Ok(()),
            Some(ft) => Err(StoreError::TypeMismatch {
                entity: self.schema.name().to_string(),
                field: field.to_string(),
                expected: "a numeric field".to_string(),
                found: ft.to_string(),
            }),
            None => Err(self.unknown_field(field)),
        }
    }

    fn unknown_field(&self, field: &str) -> StoreError {
        StoreError::UnknownField {
            entity: self.schema.name().to_string(),
            field: field.to_string(),
        }
    }

    fn check_values(&self, values: &Map<String, Value>) -> Result<(), StoreError> {
        for key in values.keys() {
            if EntitySchema::is_core_field(key) {
                return Err(StoreError::ReservedField(key.clone()));
            }
            if !self.schema.has_field(key) {
                return Err(self.unknown_field(key));
            }
        }
        for (name, field_type) in self.schema.declared_fields() {
            let value = values.get(name).unwrap_or(&Value::Null);
            if !field_type.accepts(value) {
                return Err(StoreError::TypeMismatch {
                    entity: self.schema.name().to_string(),
                    field: name.clone(),
                    expected: field_type.to_string(),
                    found: json_type_name(value).to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Read-only in-memory backend. Populated once at startup (from a data file
/// or through the builder methods) and shared behind an `Arc` afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: HashMap<String, EntityTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let fixture: StoreFixture = serde_json::from_str(&raw)?;
        let store = Self::from_fixture(fixture)?;
        info!(
            target: "briefing::store",
            path = %path.display(),
            entities = store.tables.len(),
            "Loaded store data file"
        );
        Ok(store)
    }

    pub fn from_fixture(fixture: StoreFixture) -> Result<Self, StoreError> {
        let mut store = Self::new();
        let now = Utc::now();
        for entity in fixture.entities {
            store.define(EntitySchema::from_fields(&entity.name, entity.fields))?;
            for (name, conditions) in entity.filters {
                store.define_filter(&entity.name, &name, conditions)?;
            }
            for mut row in entity.records {
                let id = match row.remove(ID_FIELD) {
                    None | Some(Value::Null) => None,
                    Some(v) => Some(v.as_u64().ok_or_else(|| StoreError::TypeMismatch {
                        entity: entity.name.clone(),
                        field: ID_FIELD.to_string(),
                        expected: FieldType::Integer.to_string(),
                        found: json_type_name(&v).to_string(),
                    })?),
                };
                let created_at = match row.remove(CREATED_AT_FIELD) {
                    None | Some(Value::Null) => now,
                    Some(v) => parse_timestamp(&v).ok_or_else(|| StoreError::TypeMismatch {
                        entity: entity.name.clone(),
                        field: CREATED_AT_FIELD.to_string(),
                        expected: FieldType::Timestamp.to_string(),
                        found: json_type_name(&v).to_string(),
                    })?,
                };
                match id {
                    Some(id) => store.insert_with_id(&entity.name, id, created_at, row)?,
                    None => store.insert(&entity.name, created_at, row)?,
                };
            }
        }
        Ok(store)
    }

    pub fn define(&mut self, schema: EntitySchema) -> Result<(), StoreError> {
        if self.tables.contains_key(schema.name()) {
            return Err(StoreError::DuplicateEntity(schema.name().to_string()));
        }
        debug!(target: "briefing::store", entity = schema.name(), "Defined entity");
        self.tables
            .insert(schema.name().to_string(), EntityTable::new(schema));
        Ok(())
    }

    /// Declares a named filter; every condition must reference a known field
    /// and `within_days` must carry a day count in `0..=MAX_WITHIN_DAYS`.
    pub fn define_filter(
        &mut self,
        entity: &str,
        name: &str,
        conditions: Vec<FilterCondition>,
    ) -> Result<(), StoreError> {
        let table = self.table_mut(entity)?;
        if let Some(bad) = conditions.iter().find(|c| !table.schema.has_field(&c.field)) {
            return Err(table.unknown_field(&bad.field));
        }
        if let Some(bad) = conditions
            .iter()
            .find(|c| c.op == FilterOp::WithinDays && c.within_days_span().is_none())
        {
            return Err(StoreError::InvalidFilter {
                entity: entity.to_string(),
                filter: name.to_string(),
                reason: format!(
                    "within_days on '{}' expects a day count between 0 and {}, got {}",
                    bad.field, MAX_WITHIN_DAYS, bad.value
                ),
            });
        }
        table.filters.insert(name.to_string(), conditions);
        Ok(())
    }

    /// Inserts a row with the next free id and returns that id.
    pub fn insert(
        &mut self,
        entity: &str,
        created_at: DateTime<Utc>,
        values: Map<String, Value>,
    ) -> Result<u64, StoreError> {
        let id = self.table(entity)?.next_id;
        self.insert_with_id(entity, id, created_at, values)
    }

    pub fn insert_with_id(
        &mut self,
        entity: &str,
        id: u64,
        created_at: DateTime<Utc>,
        values: Map<String, Value>,
    ) -> Result<u64, StoreError> {
        let table = self.table_mut(entity)?;
        table.check_values(&values)?;
        if table.records.iter().any(|r| r.id == id) {
            return Err(StoreError::DuplicateId {
                entity: entity.to_string(),
                id,
            });
        }
        table.records.push(Record::new(id, created_at, values));
        table.next_id = table.next_id.max(id.saturating_add(1));
        Ok(id)
    }

    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn record_count(&self, entity: &str) -> usize {
        self.tables.get(entity).map_or(0, |t| t.records.len())
    }

    fn table(&self, entity: &str) -> Result<&EntityTable, StoreError> {
        self.tables
            .get(entity)
            .ok_or_else(|| StoreError::EntityNotFound(entity.to_string()))
    }

    fn table_mut(&mut self, entity: &str) -> Result<&mut EntityTable, StoreError> {
        self.tables
            .get_mut(entity)
            .ok_or_else(|| StoreError::EntityNotFound(entity.to_string()))
    }

    fn scan(&self, query: &EntityQuery) -> Result<(&EntityTable, Vec<&Record>), StoreError> {
        let table = self.table(query.entity())?;
        let now = query.as_of().unwrap_or_else(Utc::now);
        let evaluator = RecordEvaluator::new(&table.schema, now);
        let rows: Vec<&Record> = table
            .records
            .iter()
            .filter(|r| evaluator.matches_all(r, query.predicates()))
            .collect();
        debug!(target: "briefing::store", query = %query, rows = rows.len(), "Scanned entity");
        Ok((table, rows))
    }

    fn numeric_values(&self, query: &EntityQuery, field: &str) -> Result<Vec<f64>, StoreError> {
        let (table, rows) = self.scan(query)?;
        table.numeric_field(field)?;
        Ok(rows.iter().filter_map(|r| r.get_f64(field)).collect())
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn resolve_entity(&self, name: &str) -> Result<EntityQuery, StoreError> {
        self.table(name).map(|_| EntityQuery::new(name))
    }

    async fn apply_named_filter(
        &self,
        query: EntityQuery,
        name: &str,
    ) -> Result<EntityQuery, StoreError> {
        let table = self.table(query.entity())?;
        let conditions = table
            .filters
            .get(name)
            .ok_or_else(|| StoreError::FilterNotFound(name.to_string()))?;
        Ok(query.with_named_filter(name, conditions))
    }

    async fn count(&self, query: &EntityQuery) -> Result<u64, StoreError> {
        let (_, rows) = self.scan(query)?;
        Ok(rows.len() as u64)
    }

    async fn sum(&self, query: &EntityQuery, field: &str) -> Result<Option<f64>, StoreError> {
        let values = self.numeric_values(query, field)?;
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum()))
    }

    async fn average(
        &self,
        query: &EntityQuery,
        field: &str,
    ) -> Result<Option<f64>, StoreError> {
        let values = self.numeric_values(query, field)?;
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }

    async fn fetch_ordered(
        &self,
        query: &EntityQuery,
        order: &OrderSpec,
        limit: usize,
    ) -> Result<Vec<Record>, StoreError> {
        let (table, mut rows) = self.scan(query)?;
        if !table.schema.has_field(&order.field) {
            return Err(table.unknown_field(&order.field));
        }
        sort_records(&mut rows, &table.schema, order);
        Ok(rows.into_iter().take(limit).cloned().collect())
    }

    fn schema(&self, entity: &str) -> Option<EntitySchema> {
        self.tables.get(entity).map(|t| t.schema.clone())
    }
}
