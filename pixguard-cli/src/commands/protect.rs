//! Protect command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use pixguard_core::{best_match, ColorCode, EngineConfig, Protector};
use tracing::{info, warn};

use crate::utils::{self, FingerprintIndex, IndexEntry};

/// Execute the protect command.
pub fn execute(
    config: &EngineConfig,
    file: PathBuf,
    secret: &str,
    output: Option<PathBuf>,
    index_path: Option<PathBuf>,
    id: Option<String>,
) -> Result<()> {
    let upload = utils::read_image(&file)?;

    let protector = Protector::new(config.clone())?;
    let protected = protector
        .protect(&upload, secret)
        .with_context(|| format!("Failed to protect image: {}", file.display()))?;

    let output = output.unwrap_or_else(|| utils::build_protected_path(&file));
    std::fs::write(&output, &protected.png_bytes)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    info!(
        path = %output.display(),
        bytes = protected.png_bytes.len(),
        "Wrote protected image"
    );

    utils::banner("PROTECTED", ColorCode::Green);
    println!("   {} {}", "Output:".dimmed(), output.display());
    println!(
        "   {} {}x{}",
        "Dimensions:".dimmed(),
        protected.width,
        protected.height
    );
    println!(
        "   {} {} bits",
        "Payload:".dimmed(),
        protected.payload_bits
    );
    println!(
        "   {} {}",
        "Fingerprint:".dimmed(),
        protected.fingerprint.to_hex()
    );
    println!(
        "   {} {}",
        "SHA3-256:".dimmed(),
        protected.content_digest
    );

    let Some(index_path) = index_path else {
        return Ok(());
    };

    let mut index = FingerprintIndex::load_or_default(&index_path)?;
    let id = id.unwrap_or_else(|| utils::default_entry_id(&file));

    if let Some(prior) = best_match(&protected.fingerprint, &index.pairs()) {
        if prior.similarity >= config.match_floor {
            warn!(
                existing = %prior.id,
                similarity = prior.similarity,
                "Protected image resembles an indexed image"
            );
            println!(
                "   {} {} ({:.1}% similar)",
                "Resembles:".dimmed(),
                prior.id.yellow(),
                prior.similarity * 100.0
            );
        }
    }

    index.entries.push(IndexEntry {
        id: id.clone(),
        fingerprint: protected.fingerprint,
        content_digest: protected.content_digest,
        width: protected.width,
        height: protected.height,
        protected_at: Utc::now(),
    });
    index.save(&index_path)?;

    info!(id = %id, entries = index.entries.len(), "Updated index");
    println!("   {} {} ({})", "Indexed as:".dimmed(), id, index_path.display());

    Ok(())
}
