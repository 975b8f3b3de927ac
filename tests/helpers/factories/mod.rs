pub mod record_factory;
pub mod settings_factory;
pub mod store_factory;

pub use record_factory::RecordFactory;
pub use settings_factory::SettingsFactory;
pub use store_factory::StoreFactory;
