//! Detection-time verdict assembly.
//!
//! Compares a candidate fingerprint against the stored fingerprints the
//! caller supplies (already scoped to one owner) and condenses the result
//! into a [`DetectionReport`]: ranked matches, a tamper score for the best
//! one, and a coarse [`Verdict`].
//!
//! The verdict and the tamper level come from the same clamped similarity
//! and share the 0.95 / 0.85 / 0.70 cut points, so they never disagree.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::config::{EngineConfig, DEFAULT_MATCH_FLOOR, DEFAULT_MAX_MATCHES};
use crate::fingerprint::{compare, Fingerprint};
use crate::tamper::{
    clamp_similarity, TamperScore, MINOR_THRESHOLD, MODERATE_THRESHOLD, NO_TAMPERING_THRESHOLD,
};

/// Coarse detection decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Best match >= 0.95.
    Original,
    /// Best match >= 0.85.
    SimilarFound,
    /// Best match >= 0.70.
    Modified,
    /// A match above the floor but below 0.70.
    PotentiallyCopied,
    /// Nothing stored, or the best match is below the floor.
    NoMatch,
}

impl Verdict {
    /// Classify the best similarity of a scan.
    pub fn classify(highest: Option<f64>, match_floor: f64) -> Self {
        let Some(highest) = highest.map(clamp_similarity) else {
            return Verdict::NoMatch;
        };
        if highest < match_floor {
            Verdict::NoMatch
        } else if highest >= NO_TAMPERING_THRESHOLD {
            Verdict::Original
        } else if highest >= MINOR_THRESHOLD {
            Verdict::SimilarFound
        } else if highest >= MODERATE_THRESHOLD {
            Verdict::Modified
        } else {
            Verdict::PotentiallyCopied
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Original => "original",
            Verdict::SimilarFound => "similar_found",
            Verdict::Modified => "modified",
            Verdict::PotentiallyCopied => "potentially_copied",
            Verdict::NoMatch => "no_match",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored fingerprint that cleared the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport<I> {
    pub id: I,
    pub similarity: f64,
    pub tamper_score: TamperScore,
    /// 1-based position in the ranking.
    pub rank: usize,
}

/// Result of comparing one candidate against a stored set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport<I> {
    /// Stored fingerprints at or above the floor, before truncation.
    pub total_matches: usize,
    /// Best similarity over the whole stored set, 0.0 when empty.
    pub highest_similarity: f64,
    /// Ranked matches, best first.
    pub matches: Vec<MatchReport<I>>,
    pub overall_tamper_score: TamperScore,
    pub verdict: Verdict,
}

/// Detection settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detector {
    match_floor: f64,
    max_matches: usize,
}

impl Default for Detector {
    fn default() -> Self {
        Self {
            match_floor: DEFAULT_MATCH_FLOOR,
            max_matches: DEFAULT_MAX_MATCHES,
        }
    }
}

impl Detector {
    pub fn new(match_floor: f64, max_matches: usize) -> Self {
        Self {
            match_floor,
            max_matches,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.match_floor, config.max_matches)
    }

    pub fn match_floor(&self) -> f64 {
        self.match_floor
    }

    /// Compare `candidate` against every stored fingerprint.
    ///
    /// Similarities are computed in parallel; ranking is a stable sort, so
    /// equal similarities keep the order of `stored`.
    pub fn detect<I>(
        &self,
        candidate: &Fingerprint,
        stored: &[(I, Fingerprint)],
    ) -> DetectionReport<I>
    where
        I: Clone + Sync,
    {
        let similarities: Vec<f64> = stored
            .par_iter()
            .map(|(_, fp)| compare(candidate, fp))
            .collect();

        let highest = similarities.iter().copied().reduce(f64::max);

        let mut ranked: Vec<(usize, f64)> = similarities
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, s)| s >= self.match_floor)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let total_matches = ranked.len();
        let matches = ranked
            .into_iter()
            .take(self.max_matches)
            .enumerate()
            .map(|(rank, (index, similarity))| MatchReport {
                id: stored[index].0.clone(),
                similarity,
                tamper_score: TamperScore::from_similarity(similarity),
                rank: rank + 1,
            })
            .collect();

        let highest_similarity = highest.unwrap_or(0.0);
        let verdict = Verdict::classify(highest, self.match_floor);

        info!(
            stored = stored.len(),
            total_matches,
            highest_similarity,
            verdict = %verdict,
            "Detection complete"
        );

        DetectionReport {
            total_matches,
            highest_similarity,
            matches,
            overall_tamper_score: TamperScore::from_similarity(highest_similarity),
            verdict,
        }
    }
}
