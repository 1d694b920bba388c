//! Persisted actuator state.
//!
//! The wheel's position only lives in memory of the process that moved it,
//! so between invocations it is kept at ~/.local/share/workwheel/state.json
//! along with the motor config it was calibrated under.
//!
//! Every process that moves the wheel holds `state.json.lock` from loading
//! the state until the new state is saved.

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use workwheel_core::ActuatorState;

use crate::config::MotorConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StateFile {
    actuator: ActuatorState,
    motor: MotorConfig,
}

pub struct StateStore {
    path: PathBuf,
}

/// Exclusive hold on a wheel's state; released when dropped.
pub struct StateLock {
    _file: File,
}

impl StateStore {
    pub fn new(path: PathBuf) -> Self {
        StateStore { path }
    }

    /// The default store under the platform data directory.
    pub fn open_default() -> Result<Self> {
        let path = dirs::data_dir()
            .context("Could not determine data directory")?
            .join("workwheel")
            .join("state.json");
        Ok(StateStore::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("state.json"));
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn create_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create state directory at {}", parent.display())
            })?;
        }
        Ok(())
    }

    /// Wait until no other process holds this wheel's state.
    pub async fn lock(&self) -> Result<StateLock> {
        self.create_parent()?;
        let path = self.sibling(".lock");

        tokio::task::spawn_blocking(move || {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create lock file at {}", path.display()))?;
            file.lock_exclusive()
                .with_context(|| format!("Failed to lock {}", path.display()))?;
            Ok(StateLock { _file: file })
        })
        .await
        .context("State lock task failed")?
    }

    /// Load the last confirmed state for a wheel driven with `motor`.
    ///
    /// No saved state, an unreadable one, or state saved under a different
    /// motor config means the wheel has to calibrate before its position can
    /// be trusted.
    pub fn load(&self, motor: &MotorConfig) -> Result<ActuatorState> {
        if !self.path.exists() {
            return Ok(ActuatorState::uncalibrated());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file at {}", self.path.display()))?;

        let saved: StateFile = match serde_json::from_str(&contents) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Unreadable state file, wheel will calibrate on the next move"
                );
                return Ok(ActuatorState::uncalibrated());
            }
        };

        if saved.motor != *motor {
            tracing::info!("Motor configuration changed, wheel will calibrate on the next move");
            return Ok(saved.actuator.require_calibration());
        }

        Ok(saved.actuator)
    }

    /// Save `actuator` (atomic write via temp file + rename).
    pub fn save(&self, actuator: ActuatorState, motor: &MotorConfig) -> Result<()> {
        self.create_parent()?;

        let file = StateFile {
            actuator,
            motor: motor.clone(),
        };
        let contents = serde_json::to_string_pretty(&file).context("Failed to serialize state")?;

        let temp_path = self.sibling(".tmp");
        fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write temp state at {}", temp_path.display()))?;

        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to rename state to {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use workwheel_core::Status;

    fn store() -> (tempfile::TempDir, StateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("workwheel").join("state.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_state_needs_calibration() {
        let (_dir, store) = store();
        let state = store.load(&MotorConfig::default()).unwrap();
        assert_eq!(state, ActuatorState::uncalibrated());
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, store) = store();
        let motor = MotorConfig::default();
        let state = ActuatorState::calibrated_at(Status::FocusTime.position());

        store.save(state, &motor).unwrap();
        assert_eq!(store.load(&motor).unwrap(), state);
    }

    #[test]
    fn test_save_replaces_file_without_leftovers() {
        let (_dir, store) = store();
        let motor = MotorConfig::default();

        store
            .save(ActuatorState::calibrated_at(Status::FocusTime.position()), &motor)
            .unwrap();
        let latest = ActuatorState::calibrated_at(Status::InMeeting.position());
        store.save(latest, &motor).unwrap();

        assert_eq!(store.load(&motor).unwrap(), latest);
        assert!(!store.sibling(".tmp").exists());
    }

    #[test]
    fn test_motor_change_requires_calibration() {
        let (_dir, store) = store();
        let motor = MotorConfig::default();
        let state = ActuatorState::calibrated_at(Status::FocusTime.position());
        store.save(state, &motor).unwrap();

        let reversed = MotorConfig {
            reversed: true,
            ..MotorConfig::default()
        };
        let loaded = store.load(&reversed).unwrap();

        assert!(loaded.needs_calibration);
        assert_eq!(loaded.current_position, state.current_position);
    }

    #[test]
    fn test_truncated_state_requires_calibration() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{\n  \"actuator\": {\n    \"current_pos").unwrap();

        let state = store.load(&MotorConfig::default()).unwrap();
        assert_eq!(state, ActuatorState::uncalibrated());
    }

    #[test]
    fn test_out_of_range_position_requires_calibration() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{\"actuator\": {\"current_position\": 9}}").unwrap();

        let state = store.load(&MotorConfig::default()).unwrap();
        assert!(state.needs_calibration);
    }

    #[tokio::test]
    async fn test_lock_is_exclusive() {
        let (_dir, store) = store();
        let held = store.lock().await.unwrap();

        let waiting = tokio::time::timeout(Duration::from_millis(100), store.lock()).await;
        assert!(waiting.is_err());

        drop(held);
        let reacquired = tokio::time::timeout(Duration::from_secs(5), store.lock()).await;
        assert!(reacquired.is_ok());
    }
}
