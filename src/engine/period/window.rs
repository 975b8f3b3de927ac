use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::engine::period::resolver::PeriodSpan;

/// The `period` block of a briefing: calendar dates in the configured time
/// zone plus the resolved span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodWindow {
    #[serde(serialize_with = "serialize_date_opt")]
    pub from: Option<NaiveDate>,
    #[serde(serialize_with = "serialize_date")]
    pub to: NaiveDate,
    pub days: PeriodSpan,
}

impl PeriodWindow {
    pub fn at(span: PeriodSpan, now: DateTime<Utc>, tz: Tz) -> Self {
        let from = span
            .lower_bound(now)
            .map(|lower| lower.with_timezone(&tz).date_naive());
        Self {
            from,
            to: now.with_timezone(&tz).date_naive(),
            days: span,
        }
    }
}

fn serialize_date<S: serde::Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&date.format("%Y-%m-%d"))
}

fn serialize_date_opt<S: serde::Serializer>(
    date: &Option<NaiveDate>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serialize_date(date, s),
        None => s.serialize_none(),
    }
}
