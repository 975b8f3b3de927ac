use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::engine::briefing::request::BriefingRequest;
use crate::engine::errors::ConfigurationError;
use crate::engine::period::{PeriodResolver, PeriodWindow};
use crate::engine::query::{AggregateResult, QueryRunner};
use crate::engine::resource::ResourceRegistry;
use crate::engine::store::DataStore;
use crate::shared::config::BriefingConfig;

/// Response envelope of the briefing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Briefing {
    pub app_name: String,
    pub generated_at: String,
    pub period: PeriodWindow,
    pub data: IndexMap<String, AggregateResult>,
}

/// Fans a request out over the selected resources and merges the results.
pub struct BriefingAssembler {
    registry: Arc<ResourceRegistry>,
    store: Arc<dyn DataStore>,
    app_name: String,
    default_period: String,
    timezone: Tz,
}

impl BriefingAssembler {
    pub fn new(
        registry: Arc<ResourceRegistry>,
        store: Arc<dyn DataStore>,
        config: &BriefingConfig,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            registry,
            store,
            app_name: config.app_name.clone(),
            default_period: config.default_period.clone(),
            timezone: config.parse_timezone()?,
        })
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn default_period(&self) -> &str {
        &self.default_period
    }

    /// Runs every selected resource concurrently. Result order follows the
    /// request (or registry order when no subset was requested).
    pub async fn collect(
        &self,
        request: &BriefingRequest,
        now: DateTime<Utc>,
    ) -> IndexMap<String, AggregateResult> {
        let runner = QueryRunner::new(self.store.as_ref(), &self.default_period);
        let selected = self.registry.select(request.resources.as_deref());
        debug!(
            target: "briefing::assembler",
            selected = selected.len(),
            "Collecting resources"
        );

        let runs = selected.iter().map(|(key, descriptor)| {
            runner.run_at(key, descriptor, request.period.as_deref(), request.latest, now)
        });
        let results = join_all(runs).await;

        selected
            .into_iter()
            .map(|(key, _)| key.to_string())
            .zip(results)
            .collect()
    }

    pub fn period_window(&self, period: Option<&str>, now: DateTime<Utc>) -> PeriodWindow {
        let span = PeriodResolver::resolve(period, &self.default_period);
        PeriodWindow::at(span, now, self.timezone)
    }

    pub async fn assemble(&self, request: &BriefingRequest) -> Briefing {
        self.assemble_at(request, Utc::now()).await
    }

    pub async fn assemble_at(&self, request: &BriefingRequest, now: DateTime<Utc>) -> Briefing {
        let data = self.collect(request, now).await;
        let failed = data.values().filter(|r| r.is_error()).count();
        info!(
            target: "briefing::assembler",
            resources = data.len(),
            failed,
            period = request.period.as_deref().unwrap_or(&self.default_period),
            "Briefing assembled"
        );

        Briefing {
            app_name: self.app_name.clone(),
            generated_at: now
                .with_timezone(&self.timezone)
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            period: self.period_window(request.period.as_deref(), now),
            data,
        }
    }
}
