use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;

use crate::config::{config_path, create_default_config};

pub fn run(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };

    if path.exists() {
        println!("{}", path.display());
    } else {
        create_default_config(&path)?;
        println!("{} {}", "Created".green(), path.display());
    }

    Ok(())
}
