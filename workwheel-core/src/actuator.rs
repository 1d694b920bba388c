//! Wheel position state machine.
//!
//! ```text
//!   Uncalibrated ──(one full revolution)──▶ Calibrated(OutOfOffice) ──(moves)──▶ Calibrated(P)
//! ```
//!
//! `ActuatorState` is a plain value: `move_to_status` takes the current one
//! and hands back the next. A failed motor call returns an error and no new
//! state, so the caller keeps the last confirmed position.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::WheelConfig;
use crate::error::ActuationError;
use crate::status::{Status, WheelPosition};

/// Where the wheel rests after a calibration revolution.
pub const CALIBRATION_STATUS: Status = Status::OutOfOffice;

/// Something that can turn the wheel by a signed number of revolutions.
#[async_trait]
pub trait Motor: Send + Sync {
    async fn turn(&self, revolutions: f64) -> Result<(), ActuationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorState {
    pub current_position: WheelPosition,
    /// `current_position` is only trustworthy once this is false.
    pub needs_calibration: bool,
}

impl ActuatorState {
    /// State after (re)configuration: the next move calibrates first.
    pub fn uncalibrated() -> Self {
        ActuatorState {
            current_position: CALIBRATION_STATUS.position(),
            needs_calibration: true,
        }
    }

    pub fn calibrated_at(position: WheelPosition) -> Self {
        ActuatorState {
            current_position: position,
            needs_calibration: false,
        }
    }

    pub fn require_calibration(self) -> Self {
        ActuatorState {
            needs_calibration: true,
            ..self
        }
    }
}

impl Default for ActuatorState {
    fn default() -> Self {
        ActuatorState::uncalibrated()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveAction {
    None,
    Moved,
}

/// What a move did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveReport {
    pub action: MoveAction,
    /// A calibration revolution ran before the move.
    pub calibrated: bool,
    /// Position the move started from (after calibration, if any).
    pub previous_position: WheelPosition,
    pub position: WheelPosition,
    /// Revolutions commanded for the move itself, excluding calibration.
    pub revolutions: f64,
}

/// Turn the wheel to show `target`.
pub async fn move_to_status<M>(
    state: ActuatorState,
    target: Status,
    config: &WheelConfig,
    motor: &M,
) -> Result<(ActuatorState, MoveReport), ActuationError>
where
    M: Motor + ?Sized,
{
    let direction = config.direction();
    let mut current = state.current_position;

    if state.needs_calibration {
        info!("Calibrating wheel with one full revolution");
        motor.turn(direction).await?;
        current = CALIBRATION_STATUS.position();
        info!(position = %current, "Calibration complete");
    }

    let target_position = target.position();

    if target_position == current {
        info!(position = %current, status = target.name(), "Already in position");
        return Ok((
            ActuatorState::calibrated_at(current),
            MoveReport {
                action: MoveAction::None,
                calibrated: state.needs_calibration,
                previous_position: current,
                position: current,
                revolutions: 0.0,
            },
        ));
    }

    let offset = current.offset_to(target_position);
    let revolutions = f64::from(offset) / f64::from(WheelPosition::COUNT) * direction;

    info!(
        from = %current,
        to = %target_position,
        offset,
        revolutions,
        status = target.name(),
        "Moving wheel"
    );
    motor.turn(revolutions).await?;

    Ok((
        ActuatorState::calibrated_at(target_position),
        MoveReport {
            action: MoveAction::Moved,
            calibrated: state.needs_calibration,
            previous_position: current,
            position: target_position,
            revolutions,
        },
    ))
}
