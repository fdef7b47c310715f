//! Detect command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use pixguard_core::{EngineConfig, Protector, Verdict};
use tracing::info;

use crate::utils::{self, FingerprintIndex};

/// Execute the detect command.
///
/// Detection is informational: finding a copy is not a failure, so the
/// command exits successfully whatever the verdict.
pub fn execute(
    config: &EngineConfig,
    file: PathBuf,
    index_path: PathBuf,
    as_json: bool,
) -> Result<()> {
    let image = utils::read_image(&file)?;
    let index = FingerprintIndex::load(&index_path)?;

    let protector = Protector::new(config.clone())?;
    let candidate = protector
        .fingerprint(&image)
        .with_context(|| format!("Failed to fingerprint image: {}", file.display()))?;

    let report = protector.detector().detect(&candidate, &index.pairs());

    info!(
        verdict = %report.verdict,
        matches = report.total_matches,
        indexed = index.entries.len(),
        "Detection finished"
    );

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let overall = &report.overall_tamper_score;
    let title = match report.verdict {
        Verdict::Original => "ORIGINAL",
        Verdict::SimilarFound => "SIMILAR FOUND",
        Verdict::Modified => "MODIFIED",
        Verdict::PotentiallyCopied => "POTENTIALLY COPIED",
        Verdict::NoMatch => "NO MATCH",
    };
    utils::banner(title, overall.color_code);

    println!(
        "   {} {:.4}",
        "Highest similarity:".dimmed(),
        report.highest_similarity
    );
    println!("   {} {}", "Tamper level:".dimmed(), overall.tamper_level);
    println!(
        "   {} {} of {} indexed",
        "Matches:".dimmed(),
        report.total_matches,
        index.entries.len()
    );

    for m in &report.matches {
        println!(
            "   {:>3}. {} {} {}",
            m.rank,
            m.id,
            utils::paint(
                &format!("{}%", m.tamper_score.originality_percentage),
                m.tamper_score.color_code
            ),
            m.tamper_score.tamper_level.to_string().dimmed()
        );
    }

    Ok(())
}
