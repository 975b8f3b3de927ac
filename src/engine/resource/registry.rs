use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::engine::errors::ConfigurationError;
use crate::engine::resource::descriptor::{ResourceDescriptor, ResourceDescriptorBuilder};
use crate::engine::store::{DataStore, EntitySchema};
use crate::shared::config::ResourceSettings;

/// Exposed resources keyed by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceRegistry {
    resources: IndexMap<String, ResourceDescriptor>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key`, inferring the entity from the key when none is given
    /// (`users` -> `User`). Re-exposing a key replaces the earlier descriptor
    /// in its original position.
    pub fn expose<F>(
        &mut self,
        key: &str,
        entity: Option<&str>,
        configure: F,
    ) -> Result<&ResourceDescriptor, ConfigurationError>
    where
        F: FnOnce(ResourceDescriptorBuilder) -> Result<ResourceDescriptorBuilder, ConfigurationError>,
    {
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigurationError::EmptyResourceKey);
        }
        let entity = entity
            .map(str::to_string)
            .unwrap_or_else(|| entity_name_for_key(key));
        let descriptor = configure(ResourceDescriptor::builder(entity))?.build();
        debug!(
            target: "briefing::registry",
            key,
            entity = descriptor.entity_name(),
            "Exposed resource"
        );
        let index = self.resources.insert_full(key.to_string(), descriptor).0;
        Ok(&self.resources[index])
    }

    pub fn from_settings(settings: &[ResourceSettings]) -> Result<Self, ConfigurationError> {
        let mut registry = Self::new();
        for resource in settings {
            registry.expose(&resource.key, resource.entity.as_deref(), |mut builder| {
                builder = builder
                    .enable_count(resource.count)
                    .set_projection(resource.attributes.iter().cloned());
                if let Some(n) = resource.latest {
                    builder = builder.set_latest(n)?;
                }
                for field in &resource.sum {
                    builder = builder.add_sum(field.clone());
                }
                for field in &resource.avg {
                    builder = builder.add_avg(field.clone());
                }
                if let Some(scope) = &resource.scope {
                    builder = builder.set_filter(scope.clone());
                }
                if let Some(column) = &resource.date_column {
                    builder = builder.set_time_field(column.clone());
                }
                Ok(builder)
            })?;
        }
        info!(
            target: "briefing::registry",
            count = registry.len(),
            "Resource registry built"
        );
        Ok(registry)
    }

    /// Checks every descriptor against the store's schema catalog.
    ///
    /// Fields are validated only for entities the store knows; an unknown
    /// entity is left to fail per request with "Model not found".
    pub fn validate(&self, store: &dyn DataStore) -> Result<(), ConfigurationError> {
        for (key, descriptor) in &self.resources {
            let Some(schema) = store.schema(descriptor.entity_name()) else {
                warn!(
                    target: "briefing::registry",
                    resource = %key,
                    entity = descriptor.entity_name(),
                    "Entity is not known to the store; requests will report it as not found"
                );
                continue;
            };
            validate_descriptor(key, descriptor, &schema)?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&ResourceDescriptor> {
        self.resources.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resources.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceDescriptor)> {
        self.resources.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Descriptors for the requested keys in request order, or every resource
    /// when `requested` is `None`. Unknown keys are dropped; repeats run once.
    pub fn select(&self, requested: Option<&[String]>) -> Vec<(&str, &ResourceDescriptor)> {
        let Some(requested) = requested else {
            return self.iter().collect();
        };
        let mut selected: IndexMap<&str, &ResourceDescriptor> = IndexMap::new();
        for key in requested {
            if let Some((name, descriptor)) = self.resources.get_key_value(key.as_str()) {
                selected.entry(name.as_str()).or_insert(descriptor);
            }
        }
        selected.into_iter().collect()
    }
}

fn validate_descriptor(
    key: &str,
    descriptor: &ResourceDescriptor,
    schema: &EntitySchema,
) -> Result<(), ConfigurationError> {
    let unknown = |field: &str| ConfigurationError::UnknownField {
        resource: key.to_string(),
        entity: schema.name().to_string(),
        field: field.to_string(),
    };

    for field in descriptor.projection_fields() {
        if !schema.has_field(field) {
            return Err(unknown(field));
        }
    }

    for field in descriptor.sum_fields().iter().chain(descriptor.avg_fields()) {
        let field_type = schema.field_type(field).ok_or_else(|| unknown(field))?;
        if !field_type.is_numeric() {
            return Err(ConfigurationError::NonNumericField {
                resource: key.to_string(),
                entity: schema.name().to_string(),
                field: field.clone(),
                found: field_type.to_string(),
            });
        }
    }

    let time_field = descriptor.time_field();
    let field_type = schema.field_type(time_field).ok_or_else(|| unknown(time_field))?;
    if !field_type.is_timestamp() {
        return Err(ConfigurationError::NonTimestampField {
            resource: key.to_string(),
            entity: schema.name().to_string(),
            field: time_field.to_string(),
            found: field_type.to_string(),
        });
    }

    Ok(())
}

/// Derives an entity name from a resource key: the last word is singularized
/// and every `_`-separated word is capitalized (`line_items` -> `LineItem`).
pub fn entity_name_for_key(key: &str) -> String {
    let words: Vec<&str> = key.split('_').filter(|w| !w.is_empty()).collect();
    let last = words.len().saturating_sub(1);
    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let word = word.to_ascii_lowercase();
            let word = if i == last { singularize(&word) } else { word };
            capitalize(&word)
        })
        .collect()
}

fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && word.len() > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
