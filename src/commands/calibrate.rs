use anyhow::Result;
use owo_colors::OwoColorize;

use super::App;

pub async fn run(app: &App) -> Result<()> {
    app.calibrate().await?;

    println!(
        "{}",
        "The wheel will make one full revolution before its next move.".dimmed()
    );
    Ok(())
}
