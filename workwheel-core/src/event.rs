//! Calendar event types.
//!
//! `RawEvent` mirrors the JSON shape of a Google Calendar `events.list` item,
//! which is what providers hand back. `CalendarEvent` is the normalized form
//! the classifier works with.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Provider wire shape
// =============================================================================

/// A calendar event as returned by a provider, before normalization.
///
/// Every field is optional; missing fields are resolved by explicit default
/// rules in `CalendarEvent::from_raw`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// "confirmed", "tentative" or "cancelled"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<RawEventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<RawEventTime>,
    /// "default", "focusTime", "outOfOffice", "workingLocation", ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// "opaque" or "transparent"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_location_properties: Option<RawWorkingLocation>,
}

/// Start or end of a raw event: either `date` (all-day) or `dateTime`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawWorkingLocation {
    /// "homeOffice", "officeLocation" or "customLocation"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

// =============================================================================
// Normalized event
// =============================================================================

/// Working location type that maps to `Status::WorkingFromHome`.
pub const HOME_OFFICE: &str = "homeOffice";

/// A normalized calendar event.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub summary: String,
    pub is_cancelled: bool,
    pub span: EventSpan,
    pub event_type: EventType,
    pub transparency: Transparency,
    /// e.g. "homeOffice"
    pub working_location_type: Option<String>,
}

impl CalendarEvent {
    pub fn is_all_day(&self) -> bool {
        matches!(self.span, EventSpan::AllDay { .. })
    }

    pub fn is_opaque(&self) -> bool {
        self.transparency == Transparency::Opaque
    }

    /// Whether this event describes where the user works rather than what
    /// they are doing.
    pub fn is_working_location(&self) -> bool {
        self.event_type == EventType::WorkingLocation || self.working_location_type.is_some()
    }

    pub fn is_home_office(&self) -> bool {
        self.working_location_type.as_deref() == Some(HOME_OFFICE)
    }

    /// A plain busy block: opaque, and none of focus time, out of office or
    /// working location.
    pub fn is_plain_busy(&self) -> bool {
        self.is_opaque()
            && !matches!(self.event_type, EventType::FocusTime | EventType::OutOfOffice)
            && !self.is_working_location()
    }
}

/// The interval an event covers.
///
/// Timed events keep whether their instants carried an offset, since an
/// aware instant can only be compared against an aware "now" and a naive
/// one against a naive "now".
#[derive(Debug, Clone, PartialEq)]
pub enum EventSpan {
    /// Half-open range of calendar dates: `[start, end)`.
    AllDay { start: NaiveDate, end: NaiveDate },
    /// Offset-aware instants, compared against `now` in UTC.
    Timed {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
    /// Naive instants, compared against the naive UTC wall clock of `now`.
    Floating {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl EventSpan {
    /// Whether the span covers `now`.
    ///
    /// All-day spans exclude their end date; timed spans include both bounds.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        match self {
            EventSpan::AllDay { start, end } => {
                let today = now.date_naive();
                *start <= today && today < *end
            }
            EventSpan::Timed { start, end } => {
                start.with_timezone(&Utc) <= now && now <= end.with_timezone(&Utc)
            }
            EventSpan::Floating { start, end } => {
                let now = now.naive_utc();
                *start <= now && now <= *end
            }
        }
    }

    /// Time from `now` until the span starts. `None` for all-day spans.
    pub fn lead_time(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        match self {
            EventSpan::AllDay { .. } => None,
            EventSpan::Timed { start, .. } => Some(start.with_timezone(&Utc) - now),
            EventSpan::Floating { start, .. } => Some(*start - now.naive_utc()),
        }
    }

    pub fn start(&self) -> EventTime {
        match self {
            EventSpan::AllDay { start, .. } => EventTime::Date(*start),
            EventSpan::Timed { start, .. } => EventTime::DateTime(*start),
            EventSpan::Floating { start, .. } => EventTime::Floating(*start),
        }
    }

    pub fn end(&self) -> EventTime {
        match self {
            EventSpan::AllDay { end, .. } => EventTime::Date(*end),
            EventSpan::Timed { end, .. } => EventTime::DateTime(*end),
            EventSpan::Floating { end, .. } => EventTime::Floating(*end),
        }
    }
}

/// A single event bound, used in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTime {
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Floating(NaiveDateTime),
}

impl std::fmt::Display for EventTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            EventTime::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            EventTime::Floating(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    #[default]
    Default,
    FocusTime,
    OutOfOffice,
    WorkingLocation,
}

impl EventType {
    /// Unrecognized values fall back to `Default`.
    pub fn from_provider(value: &str) -> Self {
        match value {
            "focusTime" => EventType::FocusTime,
            "outOfOffice" => EventType::OutOfOffice,
            "workingLocation" => EventType::WorkingLocation,
            _ => EventType::Default,
        }
    }
}

/// Event transparency (busy/free status)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transparency {
    /// Event blocks time on calendar (default)
    #[default]
    Opaque,
    /// Event does not block time (shows as free)
    Transparent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 9, h, m, s).unwrap()
    }

    #[test]
    fn test_raw_event_deserializes_google_shape() {
        let raw: RawEvent = serde_json::from_value(serde_json::json!({
            "summary": "WFH",
            "status": "confirmed",
            "start": {"dateTime": "2025-11-09T08:00:00Z", "timeZone": "UTC"},
            "end": {"dateTime": "2025-11-09T17:00:00Z"},
            "eventType": "workingLocation",
            "workingLocationProperties": {"type": "homeOffice"}
        }))
        .unwrap();

        assert_eq!(raw.summary.as_deref(), Some("WFH"));
        assert_eq!(
            raw.start.unwrap().date_time.as_deref(),
            Some("2025-11-09T08:00:00Z")
        );
        assert_eq!(
            raw.working_location_properties.unwrap().kind.as_deref(),
            Some("homeOffice")
        );
        assert!(raw.transparency.is_none());
    }

    #[test]
    fn test_all_day_span_excludes_end_date() {
        let span = EventSpan::AllDay {
            start: NaiveDate::from_ymd_opt(2025, 11, 9).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
        };

        assert!(span.contains(utc(0, 0, 0)));
        assert!(span.contains(utc(23, 59, 59)));
        assert!(!span.contains(Utc.with_ymd_and_hms(2025, 11, 10, 0, 0, 0).unwrap()));
        assert_eq!(span.lead_time(utc(10, 0, 0)), None);
    }

    #[test]
    fn test_timed_span_compares_in_utc() {
        // 05:00-06:00 at -05:00 is 10:00-11:00 UTC
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let span = EventSpan::Timed {
            start: offset.with_ymd_and_hms(2025, 11, 9, 5, 0, 0).unwrap(),
            end: offset.with_ymd_and_hms(2025, 11, 9, 6, 0, 0).unwrap(),
        };

        assert!(span.contains(utc(10, 0, 0)));
        assert!(span.contains(utc(11, 0, 0)));
        assert!(!span.contains(utc(9, 59, 59)));
        assert_eq!(span.lead_time(utc(9, 55, 0)), Some(TimeDelta::minutes(5)));
    }

    #[test]
    fn test_floating_span_compares_naive_wall_clock() {
        let day = NaiveDate::from_ymd_opt(2025, 11, 9).unwrap();
        let span = EventSpan::Floating {
            start: day.and_hms_opt(9, 30, 0).unwrap(),
            end: day.and_hms_opt(10, 30, 0).unwrap(),
        };

        assert!(span.contains(utc(10, 0, 0)));
        assert!(!span.contains(utc(10, 30, 1)));
    }

    #[test]
    fn test_plain_busy_excludes_special_types() {
        let mut event = CalendarEvent {
            summary: "Sync".to_string(),
            is_cancelled: false,
            span: EventSpan::AllDay {
                start: NaiveDate::from_ymd_opt(2025, 11, 9).unwrap(),
                end: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
            },
            event_type: EventType::Default,
            transparency: Transparency::Opaque,
            working_location_type: None,
        };
        assert!(event.is_plain_busy());

        event.event_type = EventType::FocusTime;
        assert!(!event.is_plain_busy());

        event.event_type = EventType::Default;
        event.working_location_type = Some("officeLocation".to_string());
        assert!(!event.is_plain_busy());

        event.working_location_type = None;
        event.transparency = Transparency::Transparent;
        assert!(!event.is_plain_busy());
    }
}
