pub mod model;

pub use model::{
    BriefingConfig, LoggingConfig, ResourceSettings, ServerConfig, Settings, StoreConfig,
    load_settings,
};

#[cfg(test)]
mod model_test;
