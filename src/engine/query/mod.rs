pub mod result;
pub mod runner;

pub use result::{AggregateResult, AggregateValues, round2};
pub use runner::QueryRunner;
