//! Compare command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use pixguard_core::{
    compare, decode_image, hamming_distance, score, EngineConfig, Fingerprint, FingerprintHasher,
};
use serde_json::json;
use tracing::debug;

use crate::utils;

fn fingerprint_file(hasher: &FingerprintHasher, path: &Path) -> Result<Fingerprint> {
    let image = utils::read_image(path)?;
    let buffer = decode_image(&image)
        .with_context(|| format!("Failed to decode image: {}", path.display()))?;
    Ok(hasher.hash(&buffer)?)
}

/// Execute the compare command.
pub fn execute(
    config: &EngineConfig,
    original: PathBuf,
    candidate: PathBuf,
    as_json: bool,
) -> Result<()> {
    let hasher = FingerprintHasher::new(config.hash_algorithm)
        .with_grid(config.sample_width, config.sample_height);

    let a = fingerprint_file(&hasher, &original)?;
    let b = fingerprint_file(&hasher, &candidate)?;

    let similarity = compare(&a, &b);
    let distance = hamming_distance(&a, &b)?;
    let tamper = score(similarity);

    debug!(similarity, distance, level = %tamper.tamper_level, "Compared images");

    if as_json {
        let value = json!({
            "hammingDistance": distance,
            "tamperScore": tamper,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    utils::banner(
        &tamper.tamper_level.label().to_uppercase(),
        tamper.color_code,
    );
    println!("   {} {:.4}", "Similarity:".dimmed(), similarity);
    println!(
        "   {} {} of {} bits",
        "Distance:".dimmed(),
        distance,
        a.len()
    );
    println!(
        "   {} {}",
        "Originality:".dimmed(),
        utils::paint(
            &format!("{}%", tamper.originality_percentage),
            tamper.color_code
        )
    );
    println!("   {} {:?}", "Confidence:".dimmed(), tamper.confidence);

    Ok(())
}
