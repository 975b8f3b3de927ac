use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Comparison operators available to named filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    IsNull,
    NotNull,
    /// Field is a timestamp no older than `value` days at evaluation time.
    WithinDays,
}

/// Largest look-back a `within_days` condition may declare.
pub const MAX_WITHIN_DAYS: f64 = 1_000_000.0;

/// One condition of a named filter. A filter matches when all of its
/// conditions match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub op: FilterOp,
    #[serde(default)]
    pub value: Value,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Look-back window of a `within_days` condition. `None` unless the value
    /// is a day count in `0..=MAX_WITHIN_DAYS`.
    pub fn within_days_span(&self) -> Option<Duration> {
        let days = self
            .value
            .as_f64()
            .filter(|d| (0.0..=MAX_WITHIN_DAYS).contains(d))?;
        Duration::try_seconds((days * 86_400.0).round() as i64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Condition(FilterCondition),
    /// Timestamp window; the lower bound is inclusive, a missing upper bound
    /// leaves the window open-ended.
    Range {
        field: String,
        lower: DateTime<Utc>,
        upper: Option<DateTime<Utc>>,
    },
}

/// Backend-neutral description of a query over one entity. Stores build it
/// through the `DataStore` capability and interpret it on execution.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityQuery {
    entity: String,
    predicates: Vec<Predicate>,
    applied_filters: Vec<String>,
    as_of: Option<DateTime<Utc>>,
}

impl EntityQuery {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            predicates: Vec::new(),
            applied_filters: Vec::new(),
            as_of: None,
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn applied_filters(&self) -> &[String] {
        &self.applied_filters
    }

    /// Instant relative conditions such as `within_days` are evaluated at.
    /// Unset means the store's clock at execution.
    pub fn as_of(&self) -> Option<DateTime<Utc>> {
        self.as_of
    }

    pub fn with_as_of(mut self, now: DateTime<Utc>) -> Self {
        self.as_of = Some(now);
        self
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn with_named_filter(mut self, name: &str, conditions: &[FilterCondition]) -> Self {
        self.applied_filters.push(name.to_string());
        self.predicates
            .extend(conditions.iter().cloned().map(Predicate::Condition));
        self
    }

    pub fn with_range(
        self,
        field: &str,
        lower: DateTime<Utc>,
        upper: Option<DateTime<Utc>>,
    ) -> Self {
        self.with_predicate(Predicate::Range {
            field: field.to_string(),
            lower,
            upper,
        })
    }
}

impl fmt::Display for EntityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EntityQuery({}, filters={:?}, predicates={})",
            self.entity,
            self.applied_filters,
            self.predicates.len()
        )
    }
}

/// Ordering for `fetch_ordered`; ties are broken by record id in the same
/// direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: String,
    pub desc: bool,
}

impl OrderSpec {
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: true,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: false,
        }
    }
}
