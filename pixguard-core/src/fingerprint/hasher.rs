//! Average-hash and difference-hash computation.
//!
//! # Resampling
//!
//! Both hashes work on 8-bit BT.601 luma and downsample with
//! [`imageops::thumbnail`], an integer area average. Images smaller than the
//! grid along an axis are first enlarged with nearest-neighbour sampling so
//! the area average always runs on whole pixels. The resampling is part of
//! the fingerprint format: changing it invalidates every stored fingerprint.

use image::imageops::{self, FilterType};
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use super::Fingerprint;
use crate::error::{PixguardError, Result};
use crate::pixels::PixelBuffer;

/// Fingerprint algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// One bit per sample: brighter than the grid mean.
    #[default]
    Average,
    /// One bit per horizontal neighbour pair: left brighter than right.
    Difference,
}

impl FromStr for HashAlgorithm {
    type Err = PixguardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "average" | "ahash" => Ok(Self::Average),
            "difference" | "dhash" => Ok(Self::Difference),
            other => Err(PixguardError::InvalidConfig(format!(
                "unknown hash algorithm '{other}'"
            ))),
        }
    }
}

/// Fingerprint hasher configuration and computation.
#[derive(Debug, Clone, Copy)]
pub struct FingerprintHasher {
    algorithm: HashAlgorithm,
    sample_width: u32,
    sample_height: u32,
}

impl Default for FingerprintHasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

impl FingerprintHasher {
    /// Create a hasher with the standard 8x8 grid.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            sample_width: 8,
            sample_height: 8,
        }
    }

    pub fn with_grid(mut self, sample_width: u32, sample_height: u32) -> Self {
        self.sample_width = sample_width;
        self.sample_height = sample_height;
        self
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Number of bits produced per fingerprint.
    pub fn bit_len(&self) -> usize {
        self.sample_width as usize * self.sample_height as usize
    }

    pub fn hash(&self, buffer: &PixelBuffer) -> Result<Fingerprint> {
        match self.algorithm {
            HashAlgorithm::Average => average_hash(buffer, self.sample_width, self.sample_height),
            HashAlgorithm::Difference => {
                difference_hash(buffer, self.sample_width, self.sample_height)
            }
        }
    }
}

/// Compute the average hash of `buffer` over a `sample_width x sample_height` grid.
///
/// Ties with the mean resolve to `0`, so a uniform image hashes to all zeros.
pub fn average_hash(
    buffer: &PixelBuffer,
    sample_width: u32,
    sample_height: u32,
) -> Result<Fingerprint> {
    let samples = downsample(buffer, sample_width, sample_height)?;
    let samples = samples.as_raw();

    // sample > sum / n, kept in integers so equal samples never exceed the mean
    let n = samples.len() as u64;
    let sum: u64 = samples.iter().map(|&s| u64::from(s)).sum();
    let bits: Vec<bool> = samples.iter().map(|&s| u64::from(s) * n > sum).collect();

    debug!(
        width = buffer.width(),
        height = buffer.height(),
        bits = bits.len(),
        sum,
        "Computed average hash"
    );

    Ok(Fingerprint::from_bits(bits))
}

/// Compute the difference hash of `buffer`.
///
/// Samples a `(sample_width + 1) x sample_height` grid and compares each
/// sample with its right neighbour, giving `sample_width * sample_height` bits.
pub fn difference_hash(
    buffer: &PixelBuffer,
    sample_width: u32,
    sample_height: u32,
) -> Result<Fingerprint> {
    if sample_width == 0 {
        return Err(PixguardError::InvalidBuffer(
            "sample grid must be at least 1x1".into(),
        ));
    }
    let grid_width = sample_width + 1;
    let samples = downsample(buffer, grid_width, sample_height)?;

    let bits: Vec<bool> = samples
        .as_raw()
        .chunks_exact(grid_width as usize)
        .flat_map(|row| row.windows(2).map(|pair| pair[0] > pair[1]))
        .collect();

    debug!(
        width = buffer.width(),
        height = buffer.height(),
        bits = bits.len(),
        "Computed difference hash"
    );

    Ok(Fingerprint::from_bits(bits))
}

/// Area-average luma over a `grid_width x grid_height` grid, in raster order.
fn downsample(buffer: &PixelBuffer, grid_width: u32, grid_height: u32) -> Result<GrayImage> {
    if grid_width == 0 || grid_height == 0 {
        return Err(PixguardError::InvalidBuffer(
            "sample grid must be at least 1x1".into(),
        ));
    }
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(PixguardError::InvalidBuffer(
            "cannot fingerprint an empty image".into(),
        ));
    }

    let gray = buffer.to_gray_image();
    let (width, height) = gray.dimensions();

    let gray = if width < grid_width || height < grid_height {
        imageops::resize(
            &gray,
            width.max(grid_width),
            height.max(grid_height),
            FilterType::Nearest,
        )
    } else {
        gray
    };

    Ok(imageops::thumbnail(&gray, grid_width, grid_height))
}
