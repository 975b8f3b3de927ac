use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};

/// Window length used when neither the request nor the process default names
/// a known period.
pub const FALLBACK_PERIOD_DAYS: u32 = 7;

/// Period key meaning "no time filter".
pub const ALL_PERIOD_KEY: &str = "all";

/// Lookback length of a briefing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSpan {
    Days(u32),
    Unbounded,
}

impl PeriodSpan {
    /// Inclusive lower bound of the window ending at `now`; `None` when
    /// unbounded.
    pub fn lower_bound(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            PeriodSpan::Days(days) => Some(now - Duration::days(i64::from(*days))),
            PeriodSpan::Unbounded => None,
        }
    }

    pub fn days(&self) -> Option<u32> {
        match self {
            PeriodSpan::Days(days) => Some(*days),
            PeriodSpan::Unbounded => None,
        }
    }
}

/// Renders as the day count, or `"all"` when unbounded.
impl Serialize for PeriodSpan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PeriodSpan::Days(days) => serializer.serialize_u32(*days),
            PeriodSpan::Unbounded => serializer.serialize_str(ALL_PERIOD_KEY),
        }
    }
}

const PERIODS: [(&str, PeriodSpan); 6] = [
    ("1d", PeriodSpan::Days(1)),
    ("7d", PeriodSpan::Days(7)),
    ("30d", PeriodSpan::Days(30)),
    ("90d", PeriodSpan::Days(90)),
    ("1y", PeriodSpan::Days(365)),
    (ALL_PERIOD_KEY, PeriodSpan::Unbounded),
];

/// Maps period keys to lookback windows.
///
/// Resolution is deliberately permissive: an unknown request key is treated
/// as absent and falls back to the process default, and an unknown default
/// falls back to seven days. Malformed input never produces an error.
pub struct PeriodResolver;

impl PeriodResolver {
    pub fn lookup(key: &str) -> Option<PeriodSpan> {
        PERIODS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, span)| *span)
    }

    pub fn is_known(key: &str) -> bool {
        Self::lookup(key).is_some()
    }

    pub fn keys() -> impl Iterator<Item = &'static str> {
        PERIODS.iter().map(|(name, _)| *name)
    }

    pub fn resolve(period_key: Option<&str>, default_key: &str) -> PeriodSpan {
        period_key
            .and_then(Self::lookup)
            .or_else(|| Self::lookup(default_key))
            .unwrap_or(PeriodSpan::Days(FALLBACK_PERIOD_DAYS))
    }
}
