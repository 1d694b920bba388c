pub mod calibrate;
pub mod classify;
pub mod config;
pub mod move_status;
pub mod serve;
pub mod state;
pub mod tick;
pub mod watch;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tokio::sync::Mutex;
use workwheel_core::{ActuatorState, ClassificationResult, MoveReport, Status, TickReport, Wheel};

use crate::config::{Config, MotorConfig, load_config};
use crate::motor::MotorBackend;
use crate::source::Source;
use crate::state::{StateLock, StateStore};

/// Whether a command reads the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    Required,
    Unused,
}

/// A wheel backed by its persisted state.
///
/// Each operation locks the state file, reloads the state, runs, and saves
/// the result before unlocking, so separate processes never act on a stale
/// position.
pub struct App {
    wheel: Wheel<Source, MotorBackend>,
    store: StateStore,
    motor: MotorConfig,
    /// State that moved the wheel but could not be saved yet.
    unsaved: Mutex<Option<ActuatorState>>,
}

/// The operation succeeded but its new state could not be written.
#[derive(Error, Debug)]
#[error("Wheel is at position {} but its state could not be saved", .0.current_position)]
pub struct UnsavedState(pub ActuatorState);

impl App {
    pub fn load(config_path: Option<&Path>, calendar: Calendar) -> Result<Self> {
        let config = load_config(config_path)?;
        App::new(config, StateStore::open_default()?, calendar)
    }

    pub fn new(config: Config, store: StateStore, calendar: Calendar) -> Result<Self> {
        let source = match calendar {
            Calendar::Required => Source::from_config(config.calendar.as_ref())?,
            Calendar::Unused => Source::Unconfigured,
        };

        // Replaced by the stored state before every operation
        let wheel = Wheel::new(
            source,
            MotorBackend::from_config(&config.motor),
            config.motor.wheel_config(),
            ActuatorState::uncalibrated(),
        );

        Ok(App {
            wheel,
            store,
            motor: config.motor,
            unsaved: Mutex::new(None),
        })
    }

    /// Classify without touching the wheel or its state.
    pub async fn classify(&self, now: DateTime<Utc>) -> Result<ClassificationResult> {
        Ok(self.wheel.classify(now).await?)
    }

    pub async fn tick(&self, now: DateTime<Utc>) -> Result<TickReport> {
        let (_lock, before) = self.begin().await?;
        let result = self.wheel.tick(now).await;
        self.finish(before).await?;
        Ok(result?)
    }

    pub async fn move_to(&self, status: Status) -> Result<MoveReport> {
        let (_lock, before) = self.begin().await?;
        let result = self.wheel.move_to(status).await;
        self.finish(before).await?;
        Ok(result?)
    }

    pub async fn calibrate(&self) -> Result<ActuatorState> {
        let (_lock, before) = self.begin().await?;
        let state = self.wheel.require_calibration().await;
        self.finish(before).await?;
        Ok(state)
    }

    pub async fn state(&self) -> Result<ActuatorState> {
        let (_lock, state) = self.begin().await?;
        Ok(state)
    }

    /// Lock the state file and bring the wheel up to date with it.
    async fn begin(&self) -> Result<(StateLock, ActuatorState)> {
        let lock = self.store.lock().await?;
        let mut unsaved = self.unsaved.lock().await;

        let state = match *unsaved {
            // This process moved the wheel last; the file is behind.
            Some(state) => {
                self.store
                    .save(state, &self.motor)
                    .map_err(|e| e.context(UnsavedState(state)))?;
                tracing::info!(path = %self.store.path().display(), "Saved pending wheel state");
                *unsaved = None;
                state
            }
            None => self.store.load(&self.motor)?,
        };

        self.wheel.restore(state).await;
        Ok((lock, state))
    }

    /// Save the wheel's state if the operation changed it.
    async fn finish(&self, before: ActuatorState) -> Result<()> {
        let after = self.wheel.state().await;
        if after == before {
            return Ok(());
        }

        if let Err(e) = self.store.save(after, &self.motor) {
            *self.unsaved.lock().await = Some(after);
            return Err(e.context(UnsavedState(after)));
        }

        tracing::debug!(path = %self.store.path().display(), "Saved wheel state");
        Ok(())
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalendarConfig;

    pub(crate) struct Fixture {
        pub dir: tempfile::TempDir,
        pub app: App,
    }

    pub(crate) fn app_on(dir: &Path, calendar: Calendar) -> App {
        let config = Config {
            calendar: Some(CalendarConfig::File {
                path: dir.join("events.json").display().to_string(),
            }),
            ..Config::default()
        };
        App::new(config, StateStore::new(dir.join("state.json")), calendar).unwrap()
    }

    pub(crate) fn fixture(events: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("events.json"), events).unwrap();
        let app = app_on(dir.path(), Calendar::Required);
        Fixture { dir, app }
    }

    pub(crate) const MEETING: &str = r#"[{
        "summary": "Standup",
        "start": {"dateTime": "2025-11-09T09:30:00Z"},
        "end": {"dateTime": "2025-11-09T10:30:00Z"}
    }]"#;

    pub(crate) fn ten_am() -> DateTime<Utc> {
        use chrono::TimeZone;
        Utc.with_ymd_and_hms(2025, 11, 9, 10, 0, 0).unwrap()
    }

    fn prime(app: &App, status: Status) {
        app.store
            .save(ActuatorState::calibrated_at(status.position()), &app.motor)
            .unwrap();
    }

    #[tokio::test]
    async fn test_apps_sharing_a_store_see_each_others_moves() {
        let f = fixture(MEETING);
        let other = app_on(f.dir.path(), Calendar::Required);
        prime(&f.app, Status::Available);

        let report = other.move_to(Status::FocusTime).await.unwrap();
        assert_eq!(report.previous_position, Status::Available.position());

        let report = f.app.tick(ten_am()).await.unwrap();
        assert_eq!(report.movement.previous_position, Status::FocusTime.position());
        assert_eq!(report.movement.position, Status::InMeeting.position());
        assert_eq!(report.movement.revolutions, -2.0 / 6.0);

        assert_eq!(
            f.app.state().await.unwrap(),
            ActuatorState::calibrated_at(Status::InMeeting.position())
        );
        assert_eq!(other.state().await.unwrap(), f.app.state().await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_apps_chain_their_moves() {
        let f = fixture("[]");
        let other = app_on(f.dir.path(), Calendar::Unused);
        prime(&f.app, Status::Available);

        let (a, b) = tokio::join!(
            f.app.move_to(Status::FocusTime),
            other.move_to(Status::InMeeting)
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        // Whichever ran second started where the first one stopped
        let available = Status::Available.position();
        assert!(
            (a.previous_position == available && b.previous_position == a.position)
                || (b.previous_position == available && a.previous_position == b.position)
        );
    }

    #[tokio::test]
    async fn test_failed_save_is_reported_and_retried() {
        let f = fixture("[]");
        prime(&f.app, Status::Available);

        // A directory in place of the temp file makes the write fail
        let temp_path = f.dir.path().join("state.json.tmp");
        std::fs::create_dir(&temp_path).unwrap();

        let err = f.app.move_to(Status::FocusTime).await.unwrap_err();
        let unsaved = err.downcast_ref::<UnsavedState>().unwrap();
        assert_eq!(unsaved.0.current_position, Status::FocusTime.position());

        // Still failing: the pending state is not lost, and nothing moves
        assert!(f.app.state().await.is_err());

        std::fs::remove_dir(&temp_path).unwrap();
        assert_eq!(
            f.app.state().await.unwrap(),
            ActuatorState::calibrated_at(Status::FocusTime.position())
        );
        assert_eq!(
            f.app.store.load(&f.app.motor).unwrap(),
            ActuatorState::calibrated_at(Status::FocusTime.position())
        );
    }

    #[tokio::test]
    async fn test_failed_tick_leaves_stored_state() {
        let f = fixture("{ broken");

        let err = f.app.tick(ten_am()).await.unwrap_err();
        assert!(err.to_string().contains("position 3"));
        assert!(!f.app.store.path().exists());
    }
}
