use std::io;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Errors raised while building the resource registry or bootstrapping the
/// process. These are fatal at startup and never surface at request time.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("latest must be a positive integer, got {0}")]
    NonPositiveLatest(i64),

    #[error("resource '{resource}': field '{field}' is not declared on {entity}")]
    UnknownField {
        resource: String,
        entity: String,
        field: String,
    },

    #[error("resource '{resource}': field '{field}' on {entity} is {found}, expected a numeric field")]
    NonNumericField {
        resource: String,
        entity: String,
        field: String,
        found: String,
    },

    #[error("resource '{resource}': time field '{field}' on {entity} is {found}, expected a timestamp")]
    NonTimestampField {
        resource: String,
        entity: String,
        field: String,
        found: String,
    },

    #[error("resource key must not be empty")]
    EmptyResourceKey,

    #[error("auth_token must be configured")]
    MissingAuthToken,

    #[error("mount_path '{0}' must start with '/'")]
    InvalidMountPath(String),

    #[error("Unknown time zone: {0}")]
    InvalidTimezone(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Store setup failed: {0}")]
    Store(#[from] StoreError),
}

/// Errors reported by a data store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Model not found: {0}")]
    EntityNotFound(String),

    #[error("Filter not found: {0}")]
    FilterNotFound(String),

    #[error("Unknown field '{field}' on {entity}")]
    UnknownField { entity: String, field: String },

    #[error("Field '{field}' on {entity} expects {expected}, got {found}")]
    TypeMismatch {
        entity: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("Invalid filter {entity}.{filter}: {reason}")]
    InvalidFilter {
        entity: String,
        filter: String,
        reason: String,
    },

    #[error("Field '{0}' is assigned by the store")]
    ReservedField(String),

    #[error("Entity already defined: {0}")]
    DuplicateEntity(String),

    #[error("Duplicate id {id} for {entity}")]
    DuplicateId { entity: String, id: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Entity and filter lookups fail structurally; everything else is a data
    /// access failure.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            StoreError::EntityNotFound(_) | StoreError::FilterNotFound(_)
        )
    }

    /// Message placed in the `error` slot of a failed resource.
    pub fn result_message(&self) -> String {
        if self.is_resolution_failure() {
            self.to_string()
        } else {
            format!("Query failed: {}", self)
        }
    }

    pub fn log_error(&self, resource: &str) {
        match self {
            StoreError::EntityNotFound(entity) => {
                warn!(target: "briefing::runner", resource, entity = %entity, "Model not found");
            }
            StoreError::FilterNotFound(filter) => {
                warn!(target: "briefing::runner", resource, filter = %filter, "Filter not found");
            }
            other => {
                error!(target: "briefing::runner", resource, "Query failed: {}", other);
                debug!(target: "briefing::runner", resource, "Query failure details: {:?}", other);
            }
        }
    }
}
