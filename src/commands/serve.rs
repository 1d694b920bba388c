//! Line-delimited JSON control of the wheel over stdin/stdout.
//!
//! Each input line is a `Request`; each output line the matching `Response`.
//! Logs go to stderr so stdout carries only responses.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use workwheel_core::protocol::{Operation, Request, Response};

use super::App;

pub async fn run(app: &App) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    tracing::info!("Serving wheel requests on stdin");

    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(app, &line).await;
        stdout
            .write_all(format!("{response}\n").as_bytes())
            .await
            .context("Failed to write response")?;
        stdout.flush().await.context("Failed to flush response")?;
    }

    Ok(())
}

/// Handle one request line and return the response line.
pub async fn handle_line(app: &App, line: &str) -> String {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => return Response::error(&format!("Invalid request: {}", e)),
    };

    let op = match Operation::try_from(request) {
        Ok(op) => op,
        Err(e) => return Response::error(&e.to_string()),
    };

    tracing::debug!(?op, "Handling request");

    match op {
        Operation::Classify { now } => reply(app.classify(now.unwrap_or_else(Utc::now)).await),
        Operation::MoveToStatus { status } => reply(app.move_to(status).await),
        Operation::Tick { now } => reply(app.tick(now.unwrap_or_else(Utc::now)).await),
        Operation::Calibrate => reply(app.calibrate().await),
        Operation::State => reply(app.state().await),
    }
}

fn reply<T: Serialize>(result: Result<T>) -> String {
    match result {
        Ok(data) => Response::success(data),
        Err(e) => Response::error(&format!("{:#}", e)),
    }
}
