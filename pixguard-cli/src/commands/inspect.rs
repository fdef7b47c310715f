//! Inspect command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use pixguard_core::inspect;
use serde_json::json;

use crate::utils;

/// Execute the inspect command.
pub fn execute(file: PathBuf, as_json: bool) -> Result<()> {
    let bytes = utils::read_image(&file)?;
    let info =
        inspect(&bytes).with_context(|| format!("Failed to inspect image: {}", file.display()))?;
    let capacity = info.capacity_bits;

    if as_json {
        let value = json!({
            "width": info.width,
            "height": info.height,
            "format": info.format,
            "hasAlpha": info.has_alpha,
            "byteSize": info.byte_size,
            "capacityBits": capacity,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", file.display().to_string().bold());
    println!("   {} {}", "Format:".dimmed(), info.format);
    println!("   {} {}x{}", "Dimensions:".dimmed(), info.width, info.height);
    println!(
        "   {} {}",
        "Alpha:".dimmed(),
        if info.has_alpha { "yes" } else { "no" }
    );
    println!("   {} {} bytes", "Size:".dimmed(), info.byte_size);
    println!(
        "   {} {} bits ({} bytes)",
        "Capacity:".dimmed(),
        capacity,
        capacity / 8
    );

    Ok(())
}
