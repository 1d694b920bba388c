use anyhow::Result;
use workwheel_core::Status;

use super::{App, print_json};
use crate::render::Render;

pub async fn run(app: &App, status: Status, json: bool) -> Result<()> {
    let report = app.move_to(status).await?;

    if json {
        print_json(&report)
    } else {
        println!("{}", status.render());
        println!("{}", report.render());
        Ok(())
    }
}
