//! Wheel configuration consumed by the core.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelConfig {
    /// The motor is wired so that positive revolutions turn the wheel backwards.
    #[serde(default)]
    pub motor_direction_reversed: bool,
}

impl WheelConfig {
    /// Sign applied to every commanded revolution.
    pub fn direction(&self) -> f64 {
        if self.motor_direction_reversed { -1.0 } else { 1.0 }
    }
}
