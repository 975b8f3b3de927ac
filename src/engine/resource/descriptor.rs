use crate::engine::errors::ConfigurationError;
use crate::engine::store::CREATED_AT_FIELD;

/// What to compute for one exposed resource. Built once through
/// [`ResourceDescriptorBuilder`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    entity_name: String,
    count_enabled: bool,
    sum_fields: Vec<String>,
    avg_fields: Vec<String>,
    latest_count: Option<usize>,
    projection_fields: Vec<String>,
    filter_name: Option<String>,
    time_field: String,
}

impl ResourceDescriptor {
    pub fn builder(entity_name: impl Into<String>) -> ResourceDescriptorBuilder {
        ResourceDescriptorBuilder::new(entity_name)
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn count_enabled(&self) -> bool {
        self.count_enabled
    }

    pub fn sum_fields(&self) -> &[String] {
        &self.sum_fields
    }

    pub fn avg_fields(&self) -> &[String] {
        &self.avg_fields
    }

    pub fn latest_count(&self) -> Option<usize> {
        self.latest_count
    }

    /// Allow-list for `latest` rows; empty means identifier only.
    pub fn projection_fields(&self) -> &[String] {
        &self.projection_fields
    }

    pub fn filter_name(&self) -> Option<&str> {
        self.filter_name.as_deref()
    }

    pub fn time_field(&self) -> &str {
        &self.time_field
    }
}

/// Accumulates descriptor options. Options only ever add or overwrite; there
/// is no removal.
#[derive(Debug, Clone)]
pub struct ResourceDescriptorBuilder {
    descriptor: ResourceDescriptor,
}

impl ResourceDescriptorBuilder {
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            descriptor: ResourceDescriptor {
                entity_name: entity_name.into(),
                count_enabled: false,
                sum_fields: Vec::new(),
                avg_fields: Vec::new(),
                latest_count: None,
                projection_fields: Vec::new(),
                filter_name: None,
                time_field: CREATED_AT_FIELD.to_string(),
            },
        }
    }

    /// Replaces the projection allow-list.
    pub fn set_projection<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor.projection_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn enable_count(mut self, enabled: bool) -> Self {
        self.descriptor.count_enabled = enabled;
        self
    }

    /// Shorthand for `enable_count(true)`.
    pub fn count(self) -> Self {
        self.enable_count(true)
    }

    pub fn set_latest(mut self, n: i64) -> Result<Self, ConfigurationError> {
        if n <= 0 {
            return Err(ConfigurationError::NonPositiveLatest(n));
        }
        let n = usize::try_from(n).map_err(|_| ConfigurationError::NonPositiveLatest(n))?;
        self.descriptor.latest_count = Some(n);
        Ok(self)
    }

    pub fn add_sum(mut self, field: impl Into<String>) -> Self {
        self.descriptor.sum_fields.push(field.into());
        self
    }

    pub fn add_avg(mut self, field: impl Into<String>) -> Self {
        self.descriptor.avg_fields.push(field.into());
        self
    }

    pub fn set_filter(mut self, name: impl Into<String>) -> Self {
        self.descriptor.filter_name = Some(name.into());
        self
    }

    pub fn set_time_field(mut self, name: impl Into<String>) -> Self {
        self.descriptor.time_field = name.into();
        self
    }

    pub fn build(self) -> ResourceDescriptor {
        self.descriptor
    }
}
