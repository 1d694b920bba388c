//! Motor backends.
//!
//! The wheel's motor is driven by an external program so that any
//! controller (a robot SDK client, a GPIO script, ...) can be plugged in.
//! Each move runs `command... --rpm <rpm> --revolutions <n>` and succeeds
//! when the program exits with status 0.

use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use workwheel_core::{ActuationError, Motor};

use crate::config::{MotorConfig, expand_path};

pub enum MotorBackend {
    /// Only log the moves.
    DryRun,
    Command(CommandMotor),
}

impl MotorBackend {
    pub fn from_config(config: &MotorConfig) -> Self {
        match config.command.as_deref() {
            Some([program, args @ ..]) => MotorBackend::Command(CommandMotor {
                program: program.clone(),
                args: args.to_vec(),
                rpm: config.rpm,
                timeout: Duration::from_secs(config.timeout_secs),
            }),
            _ => MotorBackend::DryRun,
        }
    }
}

#[async_trait]
impl Motor for MotorBackend {
    async fn turn(&self, revolutions: f64) -> Result<(), ActuationError> {
        match self {
            MotorBackend::DryRun => {
                tracing::info!(revolutions, "Dry run: motor not moved");
                Ok(())
            }
            MotorBackend::Command(motor) => motor.turn(revolutions).await,
        }
    }
}

pub struct CommandMotor {
    program: String,
    args: Vec<String>,
    rpm: f64,
    timeout: Duration,
}

impl CommandMotor {
    async fn turn(&self, revolutions: f64) -> Result<(), ActuationError> {
        let program = expand_path(&self.program);
        let mut command = Command::new(&program);
        command
            .args(&self.args)
            .arg("--rpm")
            .arg(self.rpm.to_string())
            .arg("--revolutions")
            .arg(revolutions.to_string())
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true);

        tracing::debug!(program = %program.display(), revolutions, rpm = self.rpm, "Running motor command");

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                ActuationError::new(format!(
                    "motor command timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                ActuationError::new(format!("failed to run {}: {}", program.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ActuationError::new(format!(
                "motor command exited with status {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        Ok(())
    }
}
