//! Common utility functions shared across CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use pixguard_core::{ColorCode, Fingerprint};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Read an input image, tagging failures so they map to the no-input exit code.
pub fn read_image(path: &Path) -> Result<Vec<u8>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Read file");
    Ok(bytes)
}

/// Build the protected output path from the original file path.
///
/// Transforms `photo.jpg` into `photo.protected.png`.
pub fn build_protected_path(file: &Path) -> PathBuf {
    file.with_extension("protected.png")
}

/// Build the stamped output path: `photo.jpg` becomes `photo_watermarked.png`.
pub fn build_stamped_path(file: &Path) -> PathBuf {
    let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
    file.with_file_name(format!("{stem}_watermarked.png"))
}

/// Identifier used for an index entry when none is given.
pub fn default_entry_id(file: &Path) -> String {
    file.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image")
        .to_string()
}

/// One protected image in the fingerprint index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: String,
    pub fingerprint: Fingerprint,
    pub content_digest: String,
    pub width: u32,
    pub height: u32,
    pub protected_at: DateTime<Utc>,
}

/// Flat JSON file of stored fingerprints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FingerprintIndex {
    pub entries: Vec<IndexEntry>,
}

impl FingerprintIndex {
    /// Load an index that must already exist.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read index: {}", path.display()))?;
        let index: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse index: {}", path.display()))?;
        debug!(path = %path.display(), entries = index.entries.len(), "Loaded index");
        Ok(index)
    }

    /// Load an index, starting empty when the file does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).context("Failed to serialize index")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write index: {}", path.display()))
    }

    /// `(id, fingerprint)` pairs in insertion order, as the detector expects.
    pub fn pairs(&self) -> Vec<(String, Fingerprint)> {
        self.entries
            .iter()
            .map(|e| (e.id.clone(), e.fingerprint.clone()))
            .collect()
    }
}

/// Paint text with a tamper colour code.
pub fn paint(text: &str, color: ColorCode) -> ColoredString {
    match color {
        ColorCode::Green => text.green(),
        ColorCode::Yellow => text.yellow(),
        ColorCode::Orange => text.truecolor(255, 165, 0),
        ColorCode::Red => text.red(),
    }
}

/// Print a boxed banner line in the given colour.
pub fn banner(title: &str, color: ColorCode) {
    println!();
    println!("{}", paint("╔════════════════════════════════════════╗", color));
    println!("{}", paint(&format!("║{:^40}║", title), color).bold());
    println!("{}", paint("╚════════════════════════════════════════╝", color));
    println!();
}
