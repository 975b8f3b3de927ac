use chrono_tz::Tz;
use rand::{Rng, distributions::Alphanumeric};
use serde::Deserialize;
use std::env;
use tracing::{info, warn};

use crate::engine::errors::ConfigurationError;
use crate::engine::period::{FALLBACK_PERIOD_DAYS, PeriodResolver};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    #[serde(default)]
    pub briefing: BriefingConfig,
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub resources: Vec<ResourceSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub http_addr: String,
    /// Prefix under which the briefing route is mounted
    #[serde(default = "default_mount_path")]
    pub mount_path: String,
    /// Blank means a random secret is generated at startup
    #[serde(default)]
    pub path_secret: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default)]
    pub keep_alive: bool,
    /// Upper bound on assembling one briefing
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_mount_path() -> String {
    "/agent-gateway".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct BriefingConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_period")]
    pub default_period: String,
    /// IANA zone used for the dates in the `period` block (UTC when unset)
    pub timezone: Option<String>,
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            default_period: default_period(),
            timezone: None,
        }
    }
}

impl BriefingConfig {
    pub fn parse_timezone(&self) -> Result<Tz, ConfigurationError> {
        match self.timezone.as_deref().map(str::trim) {
            None | Some("") => Ok(Tz::UTC),
            Some(name) => name
                .parse()
                .map_err(|_| ConfigurationError::InvalidTimezone(name.to_string())),
        }
    }
}

fn default_app_name() -> String {
    "App".to_string()
}

fn default_period() -> String {
    "7d".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub data_file: String,
}

/// One `[[resources]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceSettings {
    pub key: String,
    pub entity: Option<String>,
    #[serde(default)]
    pub count: bool,
    pub latest: Option<i64>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub sum: Vec<String>,
    #[serde(default)]
    pub avg: Vec<String>,
    pub scope: Option<String>,
    pub date_column: Option<String>,
}

impl Settings {
    /// Startup checks. A missing auth token is fatal; a missing path secret
    /// is replaced by a random one which is logged so operators can find it.
    pub fn prepare(mut self) -> Result<Self, ConfigurationError> {
        if self.server.auth_token.trim().is_empty() {
            return Err(ConfigurationError::MissingAuthToken);
        }

        let mount = self.server.mount_path.trim().trim_end_matches('/').to_string();
        if !mount.is_empty() && !mount.starts_with('/') {
            return Err(ConfigurationError::InvalidMountPath(self.server.mount_path));
        }
        self.server.mount_path = mount;

        if self.server.path_secret.trim().is_empty() {
            self.server.path_secret = generate_path_secret();
            info!(
                target: "briefing::config",
                path_secret = %self.server.path_secret,
                "path_secret auto-generated"
            );
        }

        self.briefing.parse_timezone()?;

        if !PeriodResolver::is_known(&self.briefing.default_period) {
            warn!(
                target: "briefing::config",
                default_period = %self.briefing.default_period,
                fallback_days = FALLBACK_PERIOD_DAYS,
                "Unknown default_period; briefings will use the fallback window"
            );
        }

        Ok(self)
    }
}

fn generate_path_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Loads settings from `path` (or `$BRIEFING_CONFIG`, default `config`),
/// overlaid with `BRIEFING__SECTION__KEY` environment variables.
pub fn load_settings(path: Option<&str>) -> Result<Settings, config::ConfigError> {
    let config_path = match path {
        Some(p) => p.to_string(),
        None => env::var("BRIEFING_CONFIG").unwrap_or_else(|_| "config".to_string()),
    };

    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(&config_path))
        .add_source(config::Environment::with_prefix("BRIEFING").separator("__"))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
