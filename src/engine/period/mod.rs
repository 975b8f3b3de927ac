pub mod resolver;
pub mod window;

pub use resolver::{ALL_PERIOD_KEY, FALLBACK_PERIOD_DAYS, PeriodResolver, PeriodSpan};
pub use window::PeriodWindow;
