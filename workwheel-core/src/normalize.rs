//! Conversion from provider events to `CalendarEvent`.
//!
//! Default rules for missing fields:
//! - no `summary` => "No title"
//! - no `eventType` or an unknown one => `EventType::Default`
//! - no `transparency` or anything but "transparent" => `Transparency::Opaque`
//! - empty `workingLocationProperties.type` => no working location

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::MalformedEvent;
use crate::event::{CalendarEvent, EventSpan, EventType, RawEvent, RawEventTime, Transparency};

/// Display name for events without a summary.
pub const NO_TITLE: &str = "No title";

/// Normalize a provider's event list, dropping cancelled and malformed events.
pub fn normalize(raw_events: impl IntoIterator<Item = RawEvent>) -> Vec<CalendarEvent> {
    raw_events
        .into_iter()
        .filter_map(|raw| {
            let id = raw.id.clone().unwrap_or_default();
            match CalendarEvent::from_raw(raw) {
                Ok(event) if event.is_cancelled => {
                    debug!(id = %id, summary = %event.summary, "Dropping cancelled event");
                    None
                }
                Ok(event) => Some(event),
                Err(e) => {
                    debug!(id = %id, error = %e, "Dropping malformed event");
                    None
                }
            }
        })
        .collect()
}

impl CalendarEvent {
    pub fn from_raw(raw: RawEvent) -> Result<Self, MalformedEvent> {
        let start = raw.start.as_ref().ok_or(MalformedEvent::MissingStart)?;
        let end = raw.end.as_ref().ok_or(MalformedEvent::MissingEnd)?;
        let span = parse_span(start, end)?;

        let event_type = raw
            .event_type
            .as_deref()
            .map(EventType::from_provider)
            .unwrap_or_default();

        let transparency = if raw.transparency.as_deref() == Some("transparent") {
            Transparency::Transparent
        } else {
            Transparency::Opaque
        };

        let working_location_type = raw
            .working_location_properties
            .and_then(|wl| wl.kind)
            .filter(|kind| !kind.is_empty());

        Ok(CalendarEvent {
            summary: raw
                .summary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NO_TITLE.to_string()),
            is_cancelled: raw.status.as_deref() == Some("cancelled"),
            span,
            event_type,
            transparency,
            working_location_type,
        })
    }
}

/// All-day when the start carries a `date`; timed otherwise.
fn parse_span(start: &RawEventTime, end: &RawEventTime) -> Result<EventSpan, MalformedEvent> {
    if let Some(start_date) = non_empty(&start.date) {
        let end_date = match (non_empty(&end.date), non_empty(&end.date_time)) {
            (Some(d), _) => d,
            (None, Some(_)) => return Err(MalformedEvent::MixedBounds),
            (None, None) => return Err(MalformedEvent::MissingEnd),
        };
        return Ok(EventSpan::AllDay {
            start: parse_date(start_date)?,
            end: parse_date(end_date)?,
        });
    }

    let start_str = non_empty(&start.date_time).ok_or(MalformedEvent::MissingStart)?;
    let end_str = match (non_empty(&end.date_time), non_empty(&end.date)) {
        (Some(dt), _) => dt,
        (None, Some(_)) => return Err(MalformedEvent::MixedBounds),
        (None, None) => return Err(MalformedEvent::MissingEnd),
    };

    match (parse_instant(start_str)?, parse_instant(end_str)?) {
        (Instant::Aware(start), Instant::Aware(end)) => Ok(EventSpan::Timed { start, end }),
        (Instant::Naive(start), Instant::Naive(end)) => Ok(EventSpan::Floating { start, end }),
        _ => Err(MalformedEvent::MixedAwareness),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, MalformedEvent> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| MalformedEvent::InvalidDate(s.to_string()))
}

enum Instant {
    Aware(DateTime<chrono::FixedOffset>),
    Naive(NaiveDateTime),
}

/// Parse an RFC 3339 instant, keeping its offset, or a naive ISO 8601 one.
fn parse_instant(s: &str) -> Result<Instant, MalformedEvent> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Instant::Aware(dt));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map(Instant::Naive)
        .map_err(|_| MalformedEvent::InvalidDateTime(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_drops_cancelled_events() {
        let events = normalize(vec![
            raw(json!({
                "summary": "Cancelled",
                "status": "cancelled",
                "start": {"dateTime": "2025-11-09T09:30:00Z"},
                "end": {"dateTime": "2025-11-09T10:30:00Z"}
            })),
            raw(json!({
                "summary": "Kept",
                "status": "confirmed",
                "start": {"dateTime": "2025-11-09T09:30:00Z"},
                "end": {"dateTime": "2025-11-09T10:30:00Z"}
            })),
        ]);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Kept");
    }

    #[test]
    fn test_normalize_drops_events_without_times() {
        let events = normalize(vec![
            raw(json!({"summary": "No times"})),
            raw(json!({
                "summary": "Empty dateTime",
                "start": {"dateTime": ""},
                "end": {"dateTime": "2025-11-09T10:30:00Z"}
            })),
            raw(json!({
                "summary": "Missing end",
                "start": {"dateTime": "2025-11-09T09:30:00Z"}
            })),
        ]);

        assert!(events.is_empty());
    }

    #[test]
    fn test_from_raw_applies_defaults() {
        let event = CalendarEvent::from_raw(raw(json!({
            "start": {"dateTime": "2025-11-09T09:30:00Z"},
            "end": {"dateTime": "2025-11-09T10:30:00Z"}
        })))
        .unwrap();

        assert_eq!(event.summary, NO_TITLE);
        assert_eq!(event.event_type, EventType::Default);
        assert_eq!(event.transparency, Transparency::Opaque);
        assert_eq!(event.working_location_type, None);
        assert!(!event.is_cancelled);
    }

    #[test]
    fn test_unknown_event_type_is_default() {
        let event = CalendarEvent::from_raw(raw(json!({
            "eventType": "fromGmail",
            "transparency": "transparent",
            "start": {"dateTime": "2025-11-09T09:30:00Z"},
            "end": {"dateTime": "2025-11-09T10:30:00Z"}
        })))
        .unwrap();

        assert_eq!(event.event_type, EventType::Default);
        assert_eq!(event.transparency, Transparency::Transparent);
    }

    #[test]
    fn test_all_day_event_uses_dates() {
        let event = CalendarEvent::from_raw(raw(json!({
            "summary": "OOO",
            "eventType": "outOfOffice",
            "start": {"date": "2025-11-09"},
            "end": {"date": "2025-11-10"}
        })))
        .unwrap();

        assert!(event.is_all_day());
        assert_eq!(
            event.span,
            EventSpan::AllDay {
                start: NaiveDate::from_ymd_opt(2025, 11, 9).unwrap(),
                end: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
            }
        );
    }

    #[test]
    fn test_offset_is_preserved() {
        let event = CalendarEvent::from_raw(raw(json!({
            "start": {"dateTime": "2025-11-09T00:00:00-05:00"},
            "end": {"dateTime": "2025-11-10T00:00:00-05:00"}
        })))
        .unwrap();

        match event.span {
            EventSpan::Timed { start, .. } => {
                assert_eq!(start.offset().local_minus_utc(), -5 * 3600);
            }
            other => panic!("Expected Timed, got {:?}", other),
        }
    }

    #[test]
    fn test_naive_instants_become_floating() {
        let event = CalendarEvent::from_raw(raw(json!({
            "start": {"dateTime": "2025-11-09T09:30:00"},
            "end": {"dateTime": "2025-11-09T10:30:00"}
        })))
        .unwrap();

        assert!(matches!(event.span, EventSpan::Floating { .. }));
    }

    #[test]
    fn test_mixed_bounds_are_malformed() {
        let mixed_kind = CalendarEvent::from_raw(raw(json!({
            "start": {"date": "2025-11-09"},
            "end": {"dateTime": "2025-11-09T10:30:00Z"}
        })));
        assert_eq!(mixed_kind, Err(MalformedEvent::MixedBounds));

        let mixed_awareness = CalendarEvent::from_raw(raw(json!({
            "start": {"dateTime": "2025-11-09T09:30:00Z"},
            "end": {"dateTime": "2025-11-09T10:30:00"}
        })));
        assert_eq!(mixed_awareness, Err(MalformedEvent::MixedAwareness));

        let bad_date = CalendarEvent::from_raw(raw(json!({
            "start": {"date": "2025-13-09"},
            "end": {"date": "2025-13-10"}
        })));
        assert_eq!(
            bad_date,
            Err(MalformedEvent::InvalidDate("2025-13-09".to_string()))
        );
    }

    #[test]
    fn test_empty_working_location_type_is_ignored() {
        let event = CalendarEvent::from_raw(raw(json!({
            "start": {"date": "2025-11-09"},
            "end": {"date": "2025-11-10"},
            "workingLocationProperties": {"type": ""}
        })))
        .unwrap();

        assert_eq!(event.working_location_type, None);
    }
}
