//! Reveal command implementation.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use pixguard_core::{ColorCode, EngineConfig, Protector};
use tracing::{error, info};

use crate::utils;

/// Execute the reveal command.
///
/// With `expect`, the command fails unless the hidden payload equals it.
pub fn execute(config: &EngineConfig, file: PathBuf, expect: Option<String>) -> Result<()> {
    let image = utils::read_image(&file)?;
    let protector = Protector::new(config.clone())?;

    let payload = protector
        .reveal(&image)
        .with_context(|| format!("Failed to reveal payload: {}", file.display()))?;

    info!(len = payload.len(), "Payload extracted");

    match expect {
        None => {
            println!("{payload}");
            Ok(())
        }
        Some(expected) if expected == payload => {
            utils::banner("OWNER VERIFIED", ColorCode::Green);
            println!("   {} {}", "Payload:".dimmed(), payload.green());
            Ok(())
        }
        Some(_) => {
            error!("Hidden payload does not match the expected owner");
            utils::banner("OWNER MISMATCH", ColorCode::Red);
            println!("   {} {}", "Payload:".dimmed(), payload.red());
            bail!("Owner mismatch: image carries a different payload")
        }
    }
}
