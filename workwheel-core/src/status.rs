//! Presence statuses and their two fixed tables.
//!
//! Precedence decides which status wins when several apply. Wheel position
//! is where the status is printed on the physical wheel. The two orders are
//! unrelated and must not be derived from each other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorkWheelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    OutOfOffice,
    InMeeting,
    FocusTime,
    GoingToEvent,
    WorkingFromHome,
    Available,
}

/// Highest priority first.
const PRECEDENCE: [Status; 6] = [
    Status::OutOfOffice,
    Status::InMeeting,
    Status::FocusTime,
    Status::GoingToEvent,
    Status::WorkingFromHome,
    Status::Available,
];

/// Indexed by wheel position.
const WHEEL: [Status; 6] = [
    Status::InMeeting,
    Status::GoingToEvent,
    Status::FocusTime,
    Status::OutOfOffice,
    Status::WorkingFromHome,
    Status::Available,
];

impl Status {
    pub const ALL: [Status; 6] = PRECEDENCE;

    /// Rank used for tie-breaking; lower wins.
    pub fn precedence(self) -> usize {
        PRECEDENCE
            .iter()
            .position(|s| *s == self)
            .unwrap_or(PRECEDENCE.len())
    }

    pub fn position(self) -> WheelPosition {
        let index = WHEEL.iter().position(|s| *s == self).unwrap_or(0);
        WheelPosition(index as u8)
    }

    /// Stable identifier, as used on the command line and in JSON.
    pub fn name(self) -> &'static str {
        match self {
            Status::OutOfOffice => "out_of_office",
            Status::InMeeting => "in_meeting",
            Status::FocusTime => "focus_time",
            Status::GoingToEvent => "going_to_event",
            Status::WorkingFromHome => "working_from_home",
            Status::Available => "available",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::OutOfOffice => "Out of office",
            Status::InMeeting => "In a meeting",
            Status::FocusTime => "Focus time",
            Status::GoingToEvent => "Going to an event",
            Status::WorkingFromHome => "Working from home",
            Status::Available => "Available",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = WorkWheelError;

    /// Accepts the snake_case name, with '-' allowed in place of '_'.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Status::ALL
            .into_iter()
            .find(|status| status.name() == normalized)
            .ok_or_else(|| WorkWheelError::UnknownStatus(s.to_string()))
    }
}

/// One of the six wheel positions, each a sixth of a revolution apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WheelPosition(u8);

impl WheelPosition {
    pub const COUNT: u8 = 6;

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn status(self) -> Status {
        WHEEL[self.0 as usize]
    }

    /// Signed number of positions from `self` to `target`, in -5..=5.
    pub fn offset_to(self, target: WheelPosition) -> i8 {
        target.0 as i8 - self.0 as i8
    }
}

impl TryFrom<u8> for WheelPosition {
    type Error = WorkWheelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < Self::COUNT {
            Ok(WheelPosition(value))
        } else {
            Err(WorkWheelError::InvalidPosition(value))
        }
    }
}

impl From<WheelPosition> for u8 {
    fn from(position: WheelPosition) -> u8 {
        position.0
    }
}

impl fmt::Display for WheelPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
