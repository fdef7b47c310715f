//! Fingerprint comparison.
//!
//! Two entry points with deliberately different contracts:
//!
//! - [`compare`] is lenient: fingerprints of different lengths are simply
//!   not similar (`0.0`).
//! - [`hamming_distance`] is strict: different lengths are an error.

use rayon::prelude::*;
use tracing::debug;

use super::Fingerprint;
use crate::error::{PixguardError, Result};

/// Fraction of bit positions at which `a` and `b` agree, in `[0, 1]`.
///
/// Returns `0.0` when the lengths differ or both fingerprints are empty.
pub fn compare(a: &Fingerprint, b: &Fingerprint) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let matching = a
        .bits()
        .iter()
        .zip(b.bits())
        .filter(|(x, y)| x == y)
        .count();

    matching as f64 / a.len() as f64
}

/// Number of bit positions at which `a` and `b` differ.
///
/// # Errors
///
/// `LengthMismatch` if the fingerprints have different lengths.
pub fn hamming_distance(a: &Fingerprint, b: &Fingerprint) -> Result<u32> {
    if a.len() != b.len() {
        return Err(PixguardError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let distance = a
        .bits()
        .iter()
        .zip(b.bits())
        .filter(|(x, y)| x != y)
        .count();

    Ok(distance as u32)
}

/// Best scoring stored fingerprint for a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch<I> {
    /// Position of the winner in the stored sequence.
    pub index: usize,
    pub id: I,
    pub similarity: f64,
}

/// Scan `stored` in parallel for the fingerprint most similar to `candidate`.
///
/// Equal similarities resolve to the entry that comes first in `stored`, so
/// the result does not depend on how the scan is split across threads.
/// Returns `None` for an empty slice.
pub fn best_match<I>(candidate: &Fingerprint, stored: &[(I, Fingerprint)]) -> Option<BestMatch<I>>
where
    I: Clone + Sync,
{
    let (index, similarity) = stored
        .par_iter()
        .enumerate()
        .map(|(index, (_, fp))| (index, compare(candidate, fp)))
        .reduce_with(|a, b| if prefer(a, b) { a } else { b })?;

    debug!(index, similarity, scanned = stored.len(), "Best match found");

    Some(BestMatch {
        index,
        id: stored[index].0.clone(),
        similarity,
    })
}

/// Whether `a` wins over `b`: higher similarity, then earlier position.
fn prefer(a: (usize, f64), b: (usize, f64)) -> bool {
    a.1 > b.1 || (a.1 == b.1 && a.0 < b.0)
}
