//! Hash command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use pixguard_core::{decode_image, EngineConfig, FingerprintHasher, HashAlgorithm};
use serde_json::json;

use crate::utils;

/// Execute the hash command.
pub fn execute(
    config: &EngineConfig,
    file: PathBuf,
    algorithm: Option<String>,
    as_json: bool,
) -> Result<()> {
    let algorithm = match algorithm {
        Some(name) => name.parse::<HashAlgorithm>()?,
        None => config.hash_algorithm,
    };

    let image = utils::read_image(&file)?;
    let buffer = decode_image(&image)
        .with_context(|| format!("Failed to decode image: {}", file.display()))?;

    let fingerprint = FingerprintHasher::new(algorithm)
        .with_grid(config.sample_width, config.sample_height)
        .hash(&buffer)?;

    if as_json {
        let value = json!({
            "algorithm": algorithm,
            "bits": fingerprint,
            "hex": fingerprint.to_hex(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", fingerprint.to_hex());
    }

    Ok(())
}
