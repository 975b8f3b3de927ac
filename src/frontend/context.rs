use std::sync::Arc;
use tracing::info;

use crate::engine::briefing::BriefingAssembler;
use crate::engine::errors::ConfigurationError;
use crate::engine::resource::ResourceRegistry;
use crate::engine::store::{DataStore, MemoryStore};
use crate::frontend::http::auth::GatewayAuth;
use crate::frontend::server_state::ServerState;
use crate::shared::config::Settings;

/// Everything a request handler needs, built once at startup and shared
/// read-only afterwards.
#[derive(Clone)]
pub struct FrontendContext {
    pub settings: Arc<Settings>,
    pub assembler: Arc<BriefingAssembler>,
    pub auth: GatewayAuth,
    pub server_state: Arc<ServerState>,
}

impl FrontendContext {
    /// Validates settings, builds the resource registry and checks it
    /// against the store's schema.
    pub fn new(
        settings: Settings,
        store: Arc<dyn DataStore>,
    ) -> Result<Arc<Self>, ConfigurationError> {
        let settings = settings.prepare()?;

        let registry = ResourceRegistry::from_settings(&settings.resources)?;
        registry.validate(store.as_ref())?;

        let assembler =
            BriefingAssembler::new(Arc::new(registry), store, &settings.briefing)?;
        let auth = GatewayAuth::new(&settings.server.path_secret, &settings.server.auth_token);

        info!(
            target: "briefing::context",
            resources = assembler.registry().len(),
            default_period = assembler.default_period(),
            "Frontend context ready"
        );

        Ok(Arc::new(Self {
            settings: Arc::new(settings),
            assembler: Arc::new(assembler),
            auth,
            server_state: Arc::new(ServerState::new()),
        }))
    }

    /// Same as [`new`](Self::new), backed by the configured data file.
    pub fn from_settings(settings: Settings) -> Result<Arc<Self>, ConfigurationError> {
        let store = MemoryStore::load(&settings.store.data_file)?;
        Self::new(settings, Arc::new(store))
    }

    /// Full route of the briefing endpoint, secret included.
    pub fn briefing_path(&self) -> String {
        format!(
            "{}/{}/briefing",
            self.settings.server.mount_path, self.settings.server.path_secret
        )
    }
}
