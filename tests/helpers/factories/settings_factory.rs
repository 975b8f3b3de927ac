use crate::shared::config::{
    BriefingConfig, LoggingConfig, ResourceSettings, ServerConfig, Settings, StoreConfig,
};

/// Settings mirroring a typical deployment: `users` (count, latest 2,
/// email/name) and `orders` (count, sum/avg of total).
pub struct SettingsFactory {
    settings: Settings,
}

impl SettingsFactory {
    pub fn new() -> Self {
        Self {
            settings: Settings {
                server: ServerConfig {
                    http_addr: "127.0.0.1:0".to_string(),
                    mount_path: "/agent-gateway".to_string(),
                    path_secret: "test-secret".to_string(),
                    auth_token: "test-token".to_string(),
                    keep_alive: false,
                    request_timeout_ms: 5_000,
                },
                briefing: BriefingConfig {
                    app_name: "TestApp".to_string(),
                    default_period: "7d".to_string(),
                    timezone: None,
                },
                logging: LoggingConfig {
                    log_dir: "logs".to_string(),
                    stdout_level: "info".to_string(),
                    file_level: "debug".to_string(),
                },
                store: StoreConfig {
                    data_file: "data/store.json".to_string(),
                },
                resources: vec![
                    ResourceSettings {
                        key: "users".to_string(),
                        entity: Some("User".to_string()),
                        count: true,
                        latest: Some(2),
                        attributes: vec!["email".to_string(), "name".to_string()],
                        ..Default::default()
                    },
                    ResourceSettings {
                        key: "orders".to_string(),
                        entity: Some("Order".to_string()),
                        count: true,
                        sum: vec!["total".to_string()],
                        avg: vec!["total".to_string()],
                        ..Default::default()
                    },
                ],
            },
        }
    }

    pub fn with_resources(mut self, resources: Vec<ResourceSettings>) -> Self {
        self.settings.resources = resources;
        self
    }

    pub fn with_path_secret(mut self, secret: &str) -> Self {
        self.settings.server.path_secret = secret.to_string();
        self
    }

    pub fn with_auth_token(mut self, token: &str) -> Self {
        self.settings.server.auth_token = token.to_string();
        self
    }

    pub fn with_default_period(mut self, period: &str) -> Self {
        self.settings.briefing.default_period = period.to_string();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.settings.server.request_timeout_ms = timeout_ms;
        self
    }

    pub fn create(self) -> Settings {
        self.settings
    }
}
