pub mod briefing;
pub mod errors;
pub mod period;
pub mod query;
pub mod resource;
pub mod store;

pub use errors::*;
