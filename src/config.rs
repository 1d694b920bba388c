use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use workwheel_core::WheelConfig;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// How to drive the wheel's motor
    #[serde(default)]
    pub motor: MotorConfig,

    /// Where today's events come from
    pub calendar: Option<CalendarConfig>,
}

/// Motor settings. Any change here invalidates the wheel's calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorConfig {
    /// The motor turns the wheel backwards for positive revolutions
    #[serde(default)]
    pub reversed: bool,

    #[serde(default = "default_rpm")]
    pub rpm: f64,

    /// Program (and leading args) that moves the motor. Dry run when absent.
    #[serde(default)]
    pub command: Option<Vec<String>>,

    #[serde(default = "default_motor_timeout")]
    pub timeout_secs: u64,
}

impl Default for MotorConfig {
    fn default() -> Self {
        MotorConfig {
            reversed: false,
            rpm: default_rpm(),
            command: None,
            timeout_secs: default_motor_timeout(),
        }
    }
}

impl MotorConfig {
    pub fn wheel_config(&self) -> WheelConfig {
        WheelConfig {
            motor_direction_reversed: self.reversed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CalendarConfig {
    /// Ask a `workwheel-provider-{provider}` binary
    Provider {
        provider: String,
        /// Run this instead of looking the provider up in PATH
        #[serde(default)]
        command: Option<Vec<String>>,
        account: Option<String>,
        #[serde(default = "default_calendar_id")]
        calendar_id: String,
        #[serde(default = "default_provider_timeout")]
        timeout_secs: u64,
    },
    /// Read events from a JSON file
    File { path: String },
}

fn default_rpm() -> f64 {
    15.0
}

fn default_motor_timeout() -> u64 {
    30
}

fn default_provider_timeout() -> u64 {
    10
}

/// Google's alias for the user's main calendar
fn default_calendar_id() -> String {
    "primary".to_string()
}

/// Get the config directory path (~/.config/workwheel)
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("workwheel");
    Ok(config_dir)
}

/// Get the config file path (~/.config/workwheel/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load config from `path`, or from ~/.config/workwheel/config.toml.
///
/// A missing file yields the defaults: dry-run motor, no calendar.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

    Ok(config)
}

/// Write a config file with every option commented out.
pub fn create_default_config(path: &Path) -> Result<()> {
    let contents = "\
# workwheel configuration

[motor]
# Flip if the wheel turns the wrong way:
# reversed = false
# rpm = 15.0
# Program that turns the motor; receives --rpm <rpm> --revolutions <n>.
# Without it, moves are only logged.
# command = [\"motorctl\", \"--name\", \"wheel\"]
# timeout_secs = 30

# [calendar]
# source = \"provider\"
# provider = \"google\"
# account = \"you@example.com\"
# calendar_id = \"primary\"
# timeout_secs = 10
#
# or, for a static list of events:
# source = \"file\"
# path = \"~/events.json\"
";

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory at {}", parent.display()))?;
    }

    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config file at {}", path.display()))?;

    Ok(())
}

/// Expand ~ in paths to the home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
