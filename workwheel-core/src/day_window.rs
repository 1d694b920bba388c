//! The window of events fetched for a tick.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

/// The UTC calendar day containing an instant: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn containing(now: DateTime<Utc>) -> Self {
        let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        DayWindow {
            start,
            end: start + TimeDelta::days(1),
        }
    }

    /// `timeMin` for an events.list query.
    pub fn time_min(&self) -> String {
        self.start.to_rfc3339()
    }

    /// `timeMax` for an events.list query.
    pub fn time_max(&self) -> String {
        self.end.to_rfc3339()
    }
}
