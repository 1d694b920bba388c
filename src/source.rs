//! Where today's events come from.
//!
//! Providers are external executables named `workwheel-provider-{name}`
//! that speak the JSON protocol from `workwheel_core::protocol` over
//! stdin/stdout. They own authentication and credentials entirely; we only
//! ask for a day's events in Google Calendar's `events.list` item format.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use workwheel_core::day_window::DayWindow;
use workwheel_core::protocol::{ListEvents, ProviderCommand, Request, Response};
use workwheel_core::{EventSource, FetchError, RawEvent};

use crate::config::{CalendarConfig, expand_path};

// =============================================================================
// Provider Client
// =============================================================================

pub struct ProviderSource {
    binary_path: PathBuf,
    args: Vec<String>,
    account: Option<String>,
    calendar_id: String,
    timeout: Duration,
}

impl ProviderSource {
    /// Looks for an executable named `workwheel-provider-{name}` in PATH.
    pub fn new(
        name: &str,
        account: Option<String>,
        calendar_id: String,
        timeout: Duration,
    ) -> Result<Self> {
        let binary_name = format!("workwheel-provider-{}", name);
        let binary_path = which::which(&binary_name)
            .with_context(|| format!("Provider '{}' not found in PATH", binary_name))?;

        Ok(Self::from_command(binary_path, Vec::new(), account, calendar_id, timeout))
    }

    /// Use an explicit program and leading args instead of PATH discovery.
    pub fn from_command(
        binary_path: PathBuf,
        args: Vec<String>,
        account: Option<String>,
        calendar_id: String,
        timeout: Duration,
    ) -> Self {
        ProviderSource {
            binary_path,
            args,
            account,
            calendar_id,
            timeout,
        }
    }

    async fn list_events(&self, now: DateTime<Utc>) -> Result<Vec<RawEvent>> {
        let params = ListEvents::for_day(
            self.account.clone(),
            self.calendar_id.clone(),
            &DayWindow::containing(now),
        );
        let params = serde_json::to_value(params).context("Failed to serialize provider params")?;

        tokio::time::timeout(self.timeout, self.call(ProviderCommand::ListEvents, params))
            .await
            .with_context(|| {
                format!("Provider timed out after {}s", self.timeout.as_secs())
            })?
    }

    /// Send one request line and read one response line.
    async fn call<R: serde::de::DeserializeOwned>(
        &self,
        command: ProviderCommand,
        params: serde_json::Value,
    ) -> Result<R> {
        let request = Request { command, params };

        let request_json =
            serde_json::to_string(&request).context("Failed to serialize provider request")?;

        let mut child = Command::new(&self.binary_path)
            .args(&self.args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| {
                format!("Failed to spawn provider: {}", self.binary_path.display())
            })?;

        {
            let mut stdin = child.stdin.take().context("Provider stdin was not captured")?;
            stdin
                .write_all(format!("{request_json}\n").as_bytes())
                .await
                .context("Failed to write to provider stdin")?;
            stdin.flush().await.context("Failed to flush provider stdin")?;
            // Dropping stdin signals EOF
        }

        let stdout = child.stdout.take().context("Provider stdout was not captured")?;
        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .await
            .context("Failed to read provider response")?;

        if line.is_empty() {
            anyhow::bail!("Provider returned no response");
        }

        let status = child.wait().await.context("Failed to wait for provider")?;
        if !status.success() {
            anyhow::bail!("Provider exited with status: {}", status.code().unwrap_or(-1));
        }

        let response: Response<R> = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse provider response: {}", line.trim()))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(anyhow::anyhow!("{}", error)),
        }
    }
}

// =============================================================================
// File Source
// =============================================================================

/// Events read from a JSON file on every fetch.
///
/// Accepts either a bare array of events or an events.list page
/// (`{"items": [...]}`).
pub struct FileSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EventsFile {
    List(Vec<RawEvent>),
    Page { items: Vec<RawEvent> },
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        FileSource { path }
    }

    async fn read(&self) -> Result<Vec<RawEvent>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read events file at {}", self.path.display()))?;

        let file: EventsFile = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse events file at {}", self.path.display()))?;

        Ok(match file {
            EventsFile::List(events) => events,
            EventsFile::Page { items } => items,
        })
    }
}

// =============================================================================
// Configured source
// =============================================================================

pub enum Source {
    Provider(ProviderSource),
    File(FileSource),
    /// No `[calendar]` section; every fetch fails.
    Unconfigured,
}

impl Source {
    pub fn from_config(config: Option<&CalendarConfig>) -> Result<Self> {
        Ok(match config {
            Some(CalendarConfig::Provider {
                provider,
                command,
                account,
                calendar_id,
                timeout_secs,
            }) => {
                let timeout = Duration::from_secs(*timeout_secs);
                let provider = match command.as_deref() {
                    Some([program, args @ ..]) => ProviderSource::from_command(
                        expand_path(program),
                        args.to_vec(),
                        account.clone(),
                        calendar_id.clone(),
                        timeout,
                    ),
                    _ => ProviderSource::new(provider, account.clone(), calendar_id.clone(), timeout)?,
                };
                Source::Provider(provider)
            }
            Some(CalendarConfig::File { path }) => Source::File(FileSource::new(expand_path(path))),
            None => Source::Unconfigured,
        })
    }
}

#[async_trait]
impl EventSource for Source {
    async fn fetch_today_events(&self, now: DateTime<Utc>) -> Result<Vec<RawEvent>, FetchError> {
        let result = match self {
            Source::Provider(provider) => provider.list_events(now).await,
            Source::File(file) => file.read().await,
            Source::Unconfigured => Err(anyhow::anyhow!(
                "No calendar configured. Add a [calendar] section to your config.toml"
            )),
        };

        result
            .inspect(|events| tracing::debug!(count = events.len(), "Fetched events for today"))
            .map_err(|e| FetchError::new(format!("{:#}", e)))
    }
}
