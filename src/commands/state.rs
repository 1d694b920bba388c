use anyhow::Result;

use super::{App, print_json};
use crate::render::Render;

pub async fn run(app: &App, json: bool) -> Result<()> {
    let state = app.state().await?;

    if json {
        print_json(&state)
    } else {
        println!("{}", state.render());
        Ok(())
    }
}
