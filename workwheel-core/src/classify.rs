//! Status classification.
//!
//! Every event is checked against every rule; each match becomes a
//! candidate. The candidate with the best precedence wins, and among equal
//! ranks the earliest event in input order wins.
//!
//! | Status          | Rule                                                    |
//! |-----------------|---------------------------------------------------------|
//! | OutOfOffice     | `outOfOffice` event covering now (or today, if all-day) |
//! | WorkingFromHome | `homeOffice` location covering now (or today)           |
//! | FocusTime       | timed `focusTime` event covering now                    |
//! | InMeeting       | timed plain busy event covering now                     |
//! | GoingToEvent    | timed plain busy event starting within 5 minutes        |
//! | Available       | nothing matched                                         |

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::{CalendarEvent, EventTime, EventType};
use crate::status::{Status, WheelPosition};

/// How far ahead, in seconds, a busy event triggers `GoingToEvent`.
pub const GOING_TO_EVENT_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub status: Status,
    /// Wheel position showing `status`.
    pub position: WheelPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<EventSummary>,
}

impl ClassificationResult {
    pub fn new(status: Status, source: Option<EventSummary>) -> Self {
        ClassificationResult {
            status,
            position: status.position(),
            source,
        }
    }

    pub fn available() -> Self {
        ClassificationResult::new(Status::Available, None)
    }
}

/// The fields of the winning event that are reported back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    pub event_type: EventType,
}

impl From<&CalendarEvent> for EventSummary {
    fn from(event: &CalendarEvent) -> Self {
        EventSummary {
            summary: event.summary.clone(),
            start: event.span.start(),
            end: event.span.end(),
            event_type: event.event_type,
        }
    }
}

/// Derive the single presence status for `now` from `events`.
pub fn classify(events: &[CalendarEvent], now: DateTime<Utc>) -> ClassificationResult {
    let winner = events
        .iter()
        .filter(|event| !event.is_cancelled)
        .flat_map(|event| candidates(event, now).into_iter().map(move |s| (s, event)))
        .inspect(|(status, event)| {
            debug!(status = status.name(), summary = %event.summary, "Found candidate");
        })
        .min_by_key(|(status, _)| status.precedence());

    match winner {
        Some((status, event)) => ClassificationResult::new(status, Some(EventSummary::from(event))),
        None => ClassificationResult::available(),
    }
}

/// All statuses a single event supports at `now`.
fn candidates(event: &CalendarEvent, now: DateTime<Utc>) -> Vec<Status> {
    let mut found = Vec::new();
    let active = event.span.contains(now);
    let timed = !event.is_all_day();

    if event.event_type == EventType::OutOfOffice && active {
        found.push(Status::OutOfOffice);
    }

    if event.is_home_office() && active {
        found.push(Status::WorkingFromHome);
    }

    if timed && event.event_type == EventType::FocusTime && active {
        found.push(Status::FocusTime);
    }

    if timed && event.is_plain_busy() {
        if active {
            found.push(Status::InMeeting);
        }

        let starts_soon = event
            .span
            .lead_time(now)
            .is_some_and(|lead| {
                lead > TimeDelta::zero() && lead <= TimeDelta::seconds(GOING_TO_EVENT_SECS)
            });
        if starts_soon {
            found.push(Status::GoingToEvent);
        }
    }

    found
}
