pub use super::factories::{RecordFactory, SettingsFactory, StoreFactory};

pub struct Factory;

impl Factory {
    pub fn record() -> RecordFactory {
        RecordFactory::new()
    }

    /// Store with the `User` and `Order` entities defined and no rows.
    pub fn store() -> StoreFactory {
        StoreFactory::new()
    }

    pub fn settings() -> SettingsFactory {
        SettingsFactory::new()
    }
}
