use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::engine::errors::StoreError;
use crate::engine::period::PeriodResolver;
use crate::engine::query::result::{AggregateResult, AggregateValues, round2};
use crate::engine::resource::ResourceDescriptor;
use crate::engine::store::{CREATED_AT_FIELD, DataStore, EntityQuery, ID_FIELD, OrderSpec};

/// Executes one resource descriptor against a data store.
///
/// The runner holds no per-call state; the same instance may serve many
/// descriptors concurrently.
pub struct QueryRunner<'a> {
    store: &'a dyn DataStore,
    default_period: &'a str,
}

impl<'a> QueryRunner<'a> {
    pub fn new(store: &'a dyn DataStore, default_period: &'a str) -> Self {
        Self {
            store,
            default_period,
        }
    }

    /// Runs `descriptor` now, labelling logs with its entity name.
    pub async fn run(
        &self,
        descriptor: &ResourceDescriptor,
        period_key: Option<&str>,
        latest_override: Option<usize>,
    ) -> AggregateResult {
        self.run_at(
            descriptor.entity_name(),
            descriptor,
            period_key,
            latest_override,
            Utc::now(),
        )
        .await
    }

    /// Runs the resource registered as `resource` at the instant `now`. The
    /// period window and relative filter conditions are both evaluated
    /// against `now`.
    pub async fn run_at(
        &self,
        resource: &str,
        descriptor: &ResourceDescriptor,
        period_key: Option<&str>,
        latest_override: Option<usize>,
        now: DateTime<Utc>,
    ) -> AggregateResult {
        match self
            .execute(resource, descriptor, period_key, latest_override, now)
            .await
        {
            Ok(values) => AggregateResult::Values(values),
            Err(err) => {
                err.log_error(resource);
                AggregateResult::failure(&err)
            }
        }
    }

    async fn execute(
        &self,
        resource: &str,
        descriptor: &ResourceDescriptor,
        period_key: Option<&str>,
        latest_override: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<AggregateValues, StoreError> {
        let query = self.base_query(descriptor, period_key, now).await?;
        let mut values = AggregateValues::default();

        if descriptor.count_enabled() {
            values.count = Some(self.store.count(&query).await?);
        }

        if !descriptor.sum_fields().is_empty() {
            let mut sums = IndexMap::new();
            for field in descriptor.sum_fields() {
                let total = self.store.sum(&query, field).await?.unwrap_or(0.0);
                sums.insert(field.clone(), round2(total));
            }
            values.sum = Some(sums);
        }

        if !descriptor.avg_fields().is_empty() {
            let mut avgs = IndexMap::new();
            for field in descriptor.avg_fields() {
                let mean = self.store.average(&query, field).await?.unwrap_or(0.0);
                avgs.insert(field.clone(), round2(mean));
            }
            values.avg = Some(avgs);
        }

        if let Some(limit) = effective_latest(latest_override, descriptor.latest_count()) {
            values.latest = Some(self.fetch_latest(&query, descriptor, limit).await?);
        }

        info!(
            target: "briefing::runner",
            resource,
            entity = descriptor.entity_name(),
            count = ?values.count,
            latest = values.latest.as_ref().map(Vec::len),
            "Resource evaluated"
        );
        Ok(values)
    }

    /// Entity, then named filter, then the period window.
    async fn base_query(
        &self,
        descriptor: &ResourceDescriptor,
        period_key: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<EntityQuery, StoreError> {
        let mut query = self
            .store
            .resolve_entity(descriptor.entity_name())
            .await?
            .with_as_of(now);

        if let Some(filter) = descriptor.filter_name() {
            query = self.store.apply_named_filter(query, filter).await?;
        }

        let span = PeriodResolver::resolve(period_key, self.default_period);
        if let Some(lower) = span.lower_bound(now) {
            query = self
                .store
                .filter_by_range(query, descriptor.time_field(), lower, Some(now));
        }

        debug!(target: "briefing::runner", query = %query, span = ?span, "Built base query");
        Ok(query)
    }

    async fn fetch_latest(
        &self,
        query: &EntityQuery,
        descriptor: &ResourceDescriptor,
        limit: usize,
    ) -> Result<Vec<Map<String, Value>>, StoreError> {
        let order = OrderSpec::desc(CREATED_AT_FIELD);
        let records = self.store.fetch_ordered(query, &order, limit).await?;

        let id_only = [ID_FIELD.to_string()];
        let fields: &[String] = if descriptor.projection_fields().is_empty() {
            &id_only
        } else {
            descriptor.projection_fields()
        };

        Ok(records
            .iter()
            .map(|record| self.store.project(record, fields))
            .collect())
    }
}

/// A positive override wins over the descriptor's own cap.
fn effective_latest(latest_override: Option<usize>, configured: Option<usize>) -> Option<usize> {
    latest_override.filter(|n| *n > 0).or(configured)
}
