//! Core types and logic for workwheel.
//!
//! This crate turns a day's calendar events into a single presence status
//! and drives a six-position wheel to show it:
//! - `event` / `normalize` for the provider-neutral event model
//! - `classify` for status precedence
//! - `actuator` for the wheel position state machine
//! - `control` for the tick loop tying them together
//! - `protocol` for the typed command surface used by the CLI

pub mod actuator;
pub mod classify;
pub mod config;
pub mod control;
pub mod day_window;
pub mod error;
pub mod event;
pub mod normalize;
pub mod protocol;
pub mod status;

pub use actuator::{ActuatorState, Motor, MoveAction, MoveReport, move_to_status};
pub use classify::{ClassificationResult, EventSummary, classify};
pub use config::WheelConfig;
pub use control::{EventSource, TickError, TickErrorKind, TickReport, Wheel, run_tick};
pub use error::{ActuationError, FetchError, MalformedEvent, WorkWheelError, WorkWheelResult};
pub use event::{CalendarEvent, EventSpan, EventTime, EventType, RawEvent, Transparency};
pub use normalize::normalize;
pub use status::{Status, WheelPosition};
