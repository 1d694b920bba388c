use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use workwheel_core::TickError;

use super::App;
use crate::render::Render;

/// Tick every `interval` until interrupted.
///
/// A failed tick is reported and the next one starts from the stored state.
/// A tick whose state could not be saved is retried at the start of the next.
/// Ctrl-C drops an in-flight tick, which leaves the state untouched.
pub async fn run(app: &App, interval: Duration) -> Result<()> {
    tracing::info!(interval = %humantime::format_duration(interval), "Watching calendar");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        let now = Utc::now();

        tokio::select! {
            result = app.tick(now) => {
                println!("{}", now.format("%H:%M:%S").dimmed());
                match result {
                    Ok(report) => println!("{}", report.render()),
                    Err(e) => {
                        tracing::warn!(error = %format!("{:#}", e), "Tick failed");
                        match e.downcast_ref::<TickError>() {
                            Some(tick_error) => println!("{}", tick_error.render()),
                            None => println!("{}", format!("{:#}", e).red()),
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("Stopped watching");
    Ok(())
}
