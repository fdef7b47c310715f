//! Image fingerprints.
//!
//! A fingerprint is a short ordered bit string derived from downsampled pixel
//! intensities. Identical pixel data always produces the same fingerprint;
//! near-identical images produce fingerprints that differ in few positions.
//!
//! # Components
//!
//! - **Hasher**: average-hash and difference-hash over a fixed sample grid.
//! - **Similarity**: bitwise comparison, strict Hamming distance and the
//!   parallel best-match scan used at detection time.
//!
//! These hashes survive lossless re-encoding and mild recompression. They are
//! not robust to rotation, cropping or strong colour changes.

mod hasher;
pub mod similarity;

pub use hasher::{average_hash, difference_hash, FingerprintHasher, HashAlgorithm};
pub use similarity::{best_match, compare, hamming_distance, BestMatch};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::codec::{bits_to_string, parse_bits};
use crate::error::{PixguardError, Result};

/// An ordered sequence of fingerprint bits.
///
/// Serialized as a string of `'0'` and `'1'` characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint {
    bits: Vec<bool>,
}

impl Fingerprint {
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Parse a `'0'`/`'1'` string.
    pub fn from_bit_str(s: &str) -> Result<Self> {
        parse_bits(s.trim())
            .map(Self::from_bits)
            .map_err(|e| PixguardError::InvalidFingerprint(e.to_string()))
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of set bits.
    pub fn ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn to_bit_string(&self) -> String {
        bits_to_string(&self.bits)
    }

    /// Lowercase hex, MSB first. A trailing partial byte is zero-padded.
    pub fn to_hex(&self) -> String {
        let bytes: Vec<u8> = self
            .bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, &bit)| acc | (u8::from(bit) << (7 - i)))
            })
            .collect();
        hex::encode(bytes)
    }

    /// Compare against another fingerprint. See [`compare`].
    pub fn similarity(&self, other: &Self) -> f64 {
        compare(self, other)
    }

    /// Strict Hamming distance. See [`hamming_distance`].
    pub fn hamming_distance(&self, other: &Self) -> Result<u32> {
        hamming_distance(self, other)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bit_string())
    }
}

impl FromStr for Fingerprint {
    type Err = PixguardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bit_str(s)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = PixguardError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_bit_str(&value)
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.to_bit_string()
    }
}
