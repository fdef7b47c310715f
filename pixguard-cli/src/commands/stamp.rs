//! Stamp command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use pixguard_core::{
    apply_overlay, decode_image, decode_mark, encode_png, ColorCode, MarkPosition, OverlayOptions,
};
use tracing::info;

use crate::utils;

/// Execute the stamp command.
///
/// The result is always written as PNG so that a later `protect` run can
/// still embed a payload into it.
pub fn execute(
    file: PathBuf,
    mark: PathBuf,
    position: &str,
    opacity: f32,
    margin: u32,
    output: Option<PathBuf>,
) -> Result<()> {
    let options = OverlayOptions {
        position: position.parse::<MarkPosition>()?,
        opacity,
        margin,
    };
    options.validate()?;

    let image = utils::read_image(&file)?;
    let mut buffer = decode_image(&image)
        .with_context(|| format!("Failed to decode image: {}", file.display()))?;
    let mark_image = decode_mark(&utils::read_image(&mark)?)
        .with_context(|| format!("Failed to decode mark: {}", mark.display()))?;

    let (x, y) = apply_overlay(&mut buffer, &mark_image, &options)?;
    let png = encode_png(&buffer)?;

    let output = output.unwrap_or_else(|| utils::build_stamped_path(&file));
    std::fs::write(&output, &png)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    info!(path = %output.display(), x, y, "Wrote stamped image");

    utils::banner("STAMPED", ColorCode::Green);
    println!("   {} {}", "Output:".dimmed(), output.display());
    println!(
        "   {} {} at ({}, {})",
        "Mark:".dimmed(),
        options.position,
        x,
        y
    );
    println!("   {} {:.0}%", "Opacity:".dimmed(), options.opacity * 100.0);

    Ok(())
}
