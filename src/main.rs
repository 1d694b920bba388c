mod commands;
mod config;
mod motor;
mod render;
mod source;
mod state;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use commands::{App, Calendar};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use workwheel_core::Status;

#[derive(Parser)]
#[command(name = "workwheel")]
#[command(about = "Turn a status wheel to match what your calendar says you're doing")]
struct Cli {
    /// Config file to use instead of ~/.config/workwheel/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the status today's events call for, without moving the wheel
    Classify {
        /// Evaluate at this RFC 3339 instant instead of now
        #[arg(long, value_parser = parse_now)]
        now: Option<DateTime<Utc>>,

        #[arg(long)]
        json: bool,
    },
    /// Turn the wheel to a status (e.g. "focus_time")
    Move {
        status: Status,

        #[arg(long)]
        json: bool,
    },
    /// Fetch, classify and move once
    Tick {
        /// Evaluate at this RFC 3339 instant instead of now
        #[arg(long, value_parser = parse_now)]
        now: Option<DateTime<Utc>>,

        #[arg(long)]
        json: bool,
    },
    /// Tick repeatedly until interrupted
    Watch {
        /// Time between ticks (e.g. "30s", "1m")
        #[arg(long, default_value = "1m", value_parser = humantime::parse_duration)]
        interval: Duration,
    },
    /// Make the wheel recalibrate before its next move
    Calibrate,
    /// Show where the wheel is
    State {
        #[arg(long)]
        json: bool,
    },
    /// Accept JSON requests on stdin, one per line
    Serve,
    /// Print the config file path, creating a default one if missing
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Classify { now, json } => {
            let app = App::load(config, Calendar::Required)?;
            commands::classify::run(&app, now.unwrap_or_else(Utc::now), json).await
        }
        Commands::Move { status, json } => {
            let app = App::load(config, Calendar::Unused)?;
            commands::move_status::run(&app, status, json).await
        }
        Commands::Tick { now, json } => {
            let app = App::load(config, Calendar::Required)?;
            commands::tick::run(&app, now.unwrap_or_else(Utc::now), json).await
        }
        Commands::Watch { interval } => {
            let app = App::load(config, Calendar::Required)?;
            commands::watch::run(&app, interval).await
        }
        Commands::Calibrate => {
            let app = App::load(config, Calendar::Unused)?;
            commands::calibrate::run(&app).await
        }
        Commands::State { json } => {
            let app = App::load(config, Calendar::Unused)?;
            commands::state::run(&app, json).await
        }
        Commands::Serve => {
            let app = App::load(config, Calendar::Required)?;
            commands::serve::run(&app).await
        }
        Commands::Config => commands::config::run(config),
    }
}

/// Logs go to stderr; stdout is reserved for command output.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workwheel=info,workwheel_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_now(s: &str) -> Result<DateTime<Utc>> {
    let instant = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid RFC 3339 instant: {}", s))?;
    Ok(instant.with_timezone(&Utc))
}
