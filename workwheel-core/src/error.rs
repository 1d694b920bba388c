//! Error types for workwheel.

use thiserror::Error;

/// Errors from parsing statuses, positions and requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkWheelError {
    #[error("Unknown status '{0}'")]
    UnknownStatus(String),

    #[error("Wheel position {0} is out of range (expected 0-5)")]
    InvalidPosition(u8),

    #[error("Invalid params for '{command}': {message}")]
    InvalidParams { command: String, message: String },
}

/// Result type alias for workwheel operations.
pub type WorkWheelResult<T> = Result<T, WorkWheelError>;

/// A raw event that cannot be turned into a `CalendarEvent`.
///
/// Never propagated past the normalizer; such events are dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedEvent {
    #[error("event has no start time")]
    MissingStart,

    #[error("event has no end time")]
    MissingEnd,

    #[error("event mixes all-day and timed bounds")]
    MixedBounds,

    #[error("event mixes offset-aware and naive instants")]
    MixedAwareness,

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("invalid date-time '{0}'")]
    InvalidDateTime(String),
}

/// Fetching today's events failed (transport, auth, timeout).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to fetch calendar events: {0}")]
pub struct FetchError(pub String);

impl FetchError {
    pub fn new(msg: impl std::fmt::Display) -> Self {
        FetchError(msg.to_string())
    }
}

/// Commanding the motor failed (hardware, communication, timeout).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Motor control error: {0}")]
pub struct ActuationError(pub String);

impl ActuationError {
    pub fn new(msg: impl std::fmt::Display) -> Self {
        ActuationError(msg.to_string())
    }
}
