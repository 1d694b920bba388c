//! The control loop for one wheel.
//!
//! A tick fetches today's events, classifies them, and moves the wheel.
//! State is committed only when the whole tick succeeds; any failure hands
//! back the pre-tick state along with the error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::actuator::{ActuatorState, Motor, MoveReport, move_to_status};
use crate::classify::{ClassificationResult, classify};
use crate::config::WheelConfig;
use crate::error::{ActuationError, FetchError};
use crate::event::RawEvent;
use crate::normalize::normalize;
use crate::status::Status;

/// Supplies the raw events for the day containing `now`.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_today_events(&self, now: DateTime<Utc>) -> Result<Vec<RawEvent>, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub classification: ClassificationResult,
    pub movement: MoveReport,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TickErrorKind {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Actuation(#[from] ActuationError),
}

/// A failed tick, with the actuator state as it was before the tick.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} (wheel still at position {})", .state.current_position)]
pub struct TickError {
    pub kind: TickErrorKind,
    pub state: ActuatorState,
}

impl TickError {
    fn new(kind: impl Into<TickErrorKind>, state: ActuatorState) -> Self {
        TickError {
            kind: kind.into(),
            state,
        }
    }
}

/// Fetch, classify and classify-driven move in one step.
///
/// Returns the state to carry into the next tick: the new state on
/// success, `state` itself on failure.
pub async fn run_tick<S, M>(
    state: ActuatorState,
    now: DateTime<Utc>,
    source: &S,
    motor: &M,
    config: &WheelConfig,
) -> (ActuatorState, Result<TickReport, TickError>)
where
    S: EventSource + ?Sized,
    M: Motor + ?Sized,
{
    let raw = match source.fetch_today_events(now).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Tick aborted before classification");
            return (state, Err(TickError::new(e, state)));
        }
    };

    let events = normalize(raw);
    let classification = classify(&events, now);
    info!(
        status = classification.status.name(),
        position = %classification.position,
        events = events.len(),
        "Calendar status"
    );

    match move_to_status(state, classification.status, config, motor).await {
        Ok((next, movement)) => (
            next,
            Ok(TickReport {
                classification,
                movement,
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Tick aborted before committing position");
            (state, Err(TickError::new(e, state)))
        }
    }
}

struct Shared {
    state: ActuatorState,
    config: WheelConfig,
}

/// One wheel and its collaborators.
///
/// Every operation that touches the actuator holds the wheel's lock for its
/// whole duration, so ticks never interleave. Dropping an operation's future
/// mid-flight leaves the state as it was.
pub struct Wheel<S, M> {
    source: S,
    motor: M,
    shared: Mutex<Shared>,
}

impl<S: EventSource, M: Motor> Wheel<S, M> {
    pub fn new(source: S, motor: M, config: WheelConfig, state: ActuatorState) -> Self {
        Wheel {
            source,
            motor,
            shared: Mutex::new(Shared { state, config }),
        }
    }

    pub async fn state(&self) -> ActuatorState {
        self.shared.lock().await.state
    }

    /// Classify without touching the wheel.
    pub async fn classify(&self, now: DateTime<Utc>) -> Result<ClassificationResult, FetchError> {
        let raw = self.source.fetch_today_events(now).await?;
        Ok(classify(&normalize(raw), now))
    }

    pub async fn tick(&self, now: DateTime<Utc>) -> Result<TickReport, TickError> {
        let mut shared = self.shared.lock().await;
        let (next, result) =
            run_tick(shared.state, now, &self.source, &self.motor, &shared.config).await;
        shared.state = next;
        result
    }

    /// Show `status` regardless of the calendar.
    pub async fn move_to(&self, status: Status) -> Result<MoveReport, TickError> {
        let mut shared = self.shared.lock().await;
        let config = shared.config;
        match move_to_status(shared.state, status, &config, &self.motor).await {
            Ok((next, report)) => {
                shared.state = next;
                Ok(report)
            }
            Err(e) => Err(TickError::new(e, shared.state)),
        }
    }

    /// Force a calibration revolution before the next move.
    pub async fn require_calibration(&self) -> ActuatorState {
        let mut shared = self.shared.lock().await;
        shared.state = shared.state.require_calibration();
        info!("Wheel will calibrate on the next move");
        shared.state
    }

    /// Replace the tracked state, e.g. with one persisted by another process.
    pub async fn restore(&self, state: ActuatorState) {
        self.shared.lock().await.state = state;
    }
}
