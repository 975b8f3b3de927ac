use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::engine::store::record::parse_timestamp;

/// Identifier assigned by the store to every record.
pub const ID_FIELD: &str = "id";
/// Creation timestamp assigned by the store to every record.
pub const CREATED_AT_FIELD: &str = "created_at";

/// Declared type of an entity field.
/// - Accepts common aliases (e.g., int, decimal)
/// - Nullable via `Optional(T)` (e.g., "float | null")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Optional(Box<FieldType>),
}

impl FieldType {
    /// Parse one primitive/alias (e.g., "int" -> Integer, "decimal" -> Float).
    pub fn from_primitive_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" | "text" | "varchar" => Some(FieldType::String),
            "integer" | "int" | "i64" | "bigint" | "references" => Some(FieldType::Integer),
            "float" | "f64" | "double" | "decimal" | "number" => Some(FieldType::Float),
            "bool" | "boolean" => Some(FieldType::Boolean),
            "timestamp" | "datetime" | "date" => Some(FieldType::Timestamp),
            _ => None,
        }
    }

    /// Parse `T | null` into `Optional(T)`.
    pub fn from_spec_with_nullable(s: &str) -> Option<Self> {
        if !s.contains('|') {
            return FieldType::from_primitive_str(s);
        }
        let parts: Vec<&str> = s.split('|').map(str::trim).collect();
        let has_null = parts.iter().any(|p| p.eq_ignore_ascii_case("null"));
        let non_null: Vec<&str> = parts
            .into_iter()
            .filter(|p| !p.eq_ignore_ascii_case("null"))
            .collect();
        if non_null.len() != 1 {
            return None;
        }
        let base = FieldType::from_primitive_str(non_null[0])?;
        if has_null {
            Some(FieldType::Optional(Box::new(base)))
        } else {
            Some(base)
        }
    }

    pub fn base(&self) -> &FieldType {
        match self {
            FieldType::Optional(inner) => inner.base(),
            other => other,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, FieldType::Optional(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.base(), FieldType::Integer | FieldType::Float)
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self.base(), FieldType::Timestamp)
    }

    /// Whether `value` may be stored in a field of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Optional(_), Value::Null) => true,
            (FieldType::Optional(inner), other) => inner.accepts(other),
            (FieldType::String, Value::String(_)) => true,
            (FieldType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (FieldType::Float, Value::Number(_)) => true,
            (FieldType::Boolean, Value::Bool(_)) => true,
            (FieldType::Timestamp, v) => parse_timestamp(v).is_some(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => f.write_str("string"),
            FieldType::Integer => f.write_str("integer"),
            FieldType::Float => f.write_str("float"),
            FieldType::Boolean => f.write_str("boolean"),
            FieldType::Timestamp => f.write_str("timestamp"),
            FieldType::Optional(inner) => write!(f, "{} | null", inner),
        }
    }
}

impl TryFrom<String> for FieldType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FieldType::from_spec_with_nullable(&value)
            .ok_or_else(|| format!("Unknown field type: '{value}'"))
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

/// Human-readable JSON type name, used in mismatch errors.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field layout of one entity. Core fields (`id`, `created_at`) are implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    name: String,
    fields: IndexMap<String, FieldType>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn from_fields(name: impl Into<String>, fields: IndexMap<String, FieldType>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_core_field(field: &str) -> bool {
        field == ID_FIELD || field == CREATED_AT_FIELD
    }

    /// Type of a declared or core field.
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        match field {
            ID_FIELD => Some(FieldType::Integer),
            CREATED_AT_FIELD => Some(FieldType::Timestamp),
            other => self.fields.get(other).cloned(),
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        Self::is_core_field(field) || self.fields.contains_key(field)
    }

    /// Declared (non-core) fields in declaration order.
    pub fn declared_fields(&self) -> impl Iterator<Item = (&String, &FieldType)> {
        self.fields.iter()
    }
}
