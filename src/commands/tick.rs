use anyhow::Result;
use chrono::{DateTime, Utc};

use super::{App, print_json};
use crate::render::Render;

pub async fn run(app: &App, now: DateTime<Utc>, json: bool) -> Result<()> {
    let report = app.tick(now).await?;

    if json {
        print_json(&report)
    } else {
        println!("{}", report.render());
        Ok(())
    }
}
