use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

use crate::engine::store::query::{FilterCondition, FilterOp, OrderSpec, Predicate};
use crate::engine::store::record::{Record, parse_timestamp};
use crate::engine::store::schema::{EntitySchema, FieldType};

/// Evaluates query predicates against in-memory records of one entity.
///
/// Comparison follows SQL null semantics: a null or missing field never
/// satisfies a comparison, only `is_null`.
pub struct RecordEvaluator<'a> {
    schema: &'a EntitySchema,
    now: DateTime<Utc>,
}

impl<'a> RecordEvaluator<'a> {
    pub fn new(schema: &'a EntitySchema, now: DateTime<Utc>) -> Self {
        Self { schema, now }
    }

    pub fn matches_all(&self, record: &Record, predicates: &[Predicate]) -> bool {
        predicates.iter().all(|p| self.matches(record, p))
    }

    pub fn matches(&self, record: &Record, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::Condition(condition) => self.matches_condition(record, condition),
            Predicate::Range {
                field,
                lower,
                upper,
            } => match record.get_timestamp(field) {
                Some(ts) => ts >= *lower && upper.is_none_or(|u| ts <= u),
                None => false,
            },
        }
    }

    fn matches_condition(&self, record: &Record, condition: &FilterCondition) -> bool {
        let value = record.get_field(&condition.field).unwrap_or(Value::Null);
        match condition.op {
            FilterOp::IsNull => value.is_null(),
            FilterOp::NotNull => !value.is_null(),
            FilterOp::WithinDays => {
                let Some(lower) = condition
                    .within_days_span()
                    .and_then(|span| self.now.checked_sub_signed(span))
                else {
                    return false;
                };
                record
                    .get_timestamp(&condition.field)
                    .is_some_and(|ts| ts >= lower)
            }
            op => {
                if value.is_null() {
                    return false;
                }
                let field_type = self.schema.field_type(&condition.field);
                let Some(ordering) = compare_values(field_type.as_ref(), &value, &condition.value)
                else {
                    return false;
                };
                match op {
                    FilterOp::Eq => ordering == Ordering::Equal,
                    FilterOp::Neq => ordering != Ordering::Equal,
                    FilterOp::Gt => ordering == Ordering::Greater,
                    FilterOp::Gte => ordering != Ordering::Less,
                    FilterOp::Lt => ordering == Ordering::Less,
                    FilterOp::Lte => ordering != Ordering::Greater,
                    FilterOp::IsNull | FilterOp::NotNull | FilterOp::WithinDays => false,
                }
            }
        }
    }
}

/// Compares two JSON values under the declared field type. Returns `None`
/// when the values are not comparable.
pub fn compare_values(field_type: Option<&FieldType>, left: &Value, right: &Value) -> Option<Ordering> {
    if field_type.is_some_and(FieldType::is_timestamp) {
        let l = parse_timestamp(left)?;
        let r = parse_timestamp(right)?;
        return Some(l.cmp(&r));
    }
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// Pre-computed sort key so ordering does not re-parse field values.
#[derive(Debug, Clone)]
enum SortKey {
    Null,
    Number(f64),
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Null => 0,
            SortKey::Number(_) => 1,
            SortKey::Timestamp(_) => 2,
            SortKey::Text(_) => 3,
        }
    }

    fn for_record(record: &Record, field: &str, field_type: Option<&FieldType>) -> Self {
        if field_type.is_some_and(FieldType::is_timestamp) {
            return record
                .get_timestamp(field)
                .map_or(SortKey::Null, SortKey::Timestamp);
        }
        match record.get_field(field) {
            Some(Value::Number(n)) => n.as_f64().map_or(SortKey::Null, SortKey::Number),
            Some(Value::String(s)) => SortKey::Text(s),
            Some(Value::Bool(b)) => SortKey::Number(if b { 1.0 } else { 0.0 }),
            _ => SortKey::Null,
        }
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

/// Sorts records by `order`, breaking ties on id in the same direction.
pub fn sort_records(records: &mut Vec<&Record>, schema: &EntitySchema, order: &OrderSpec) {
    let field_type = schema.field_type(&order.field);
    let mut keyed: Vec<(SortKey, &Record)> = records
        .drain(..)
        .map(|r| (SortKey::for_record(r, &order.field, field_type.as_ref()), r))
        .collect();

    keyed.sort_by(|(ka, ra), (kb, rb)| {
        let ordering = ka.cmp(kb).then_with(|| ra.id.cmp(&rb.id));
        if order.desc { ordering.reverse() } else { ordering }
    });

    records.extend(keyed.into_iter().map(|(_, r)| r));
}
