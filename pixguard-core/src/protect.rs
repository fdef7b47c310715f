//! End-to-end protection pipeline.
//!
//! Ties the pieces together for the two flows callers actually run:
//!
//! - **Protect**: decode upload → embed owner secret → encode PNG →
//!   fingerprint the watermarked pixels.
//! - **Inspect**: decode candidate → fingerprint / reveal / verify owner.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::container::{decode_image, encode_png};
use crate::detection::Detector;
use crate::error::Result;
use crate::fingerprint::{Fingerprint, FingerprintHasher};
use crate::pixels::PixelBuffer;
use crate::watermark::LsbCodec;

/// A watermarked image ready to be stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedImage {
    /// Lossless PNG encoding of the watermarked pixels.
    #[serde(skip)]
    pub png_bytes: Vec<u8>,
    /// Fingerprint of the watermarked pixels.
    pub fingerprint: Fingerprint,
    pub width: u32,
    pub height: u32,
    /// Hex SHA3-256 of `png_bytes`, for exact-copy lookups.
    pub content_digest: String,
    /// Payload bits written into the image.
    pub payload_bits: usize,
}

/// Protection pipeline configured from an [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct Protector {
    config: EngineConfig,
    lsb: LsbCodec,
    hasher: FingerprintHasher,
}

impl Protector {
    /// Build a pipeline, validating the configuration first.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let lsb = LsbCodec::new(config.payload_format, config.capacity_policy);
        let hasher = FingerprintHasher::new(config.hash_algorithm)
            .with_grid(config.sample_width, config.sample_height);
        Ok(Self {
            config,
            lsb,
            hasher,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn detector(&self) -> Detector {
        Detector::from_config(&self.config)
    }

    /// Decode `image_bytes`, embed `owner_secret` and fingerprint the result.
    pub fn protect(&self, image_bytes: &[u8], owner_secret: &str) -> Result<ProtectedImage> {
        let buffer = decode_image(image_bytes)?;
        self.protect_buffer(buffer, owner_secret)
    }

    /// Embed `owner_secret` into an already decoded buffer.
    pub fn protect_buffer(
        &self,
        mut buffer: PixelBuffer,
        owner_secret: &str,
    ) -> Result<ProtectedImage> {
        let report = self
            .lsb
            .embed(&mut buffer, owner_secret, self.config.fixed_length)?;
        let png_bytes = encode_png(&buffer)?;
        let fingerprint = self.hasher.hash(&buffer)?;
        let content_digest = content_digest(&png_bytes);

        info!(
            width = buffer.width(),
            height = buffer.height(),
            payload_bits = report.bits_written,
            digest = &content_digest[..16],
            "Image protected"
        );

        Ok(ProtectedImage {
            png_bytes,
            fingerprint,
            width: buffer.width(),
            height: buffer.height(),
            content_digest,
            payload_bits: report.bits_written,
        })
    }

    /// Fingerprint an encoded image.
    pub fn fingerprint(&self, image_bytes: &[u8]) -> Result<Fingerprint> {
        let buffer = decode_image(image_bytes)?;
        self.hasher.hash(&buffer)
    }

    /// Extract the hidden payload from an encoded image.
    pub fn reveal(&self, image_bytes: &[u8]) -> Result<String> {
        let buffer = decode_image(image_bytes)?;
        let payload = self.lsb.extract(&buffer, self.config.fixed_length)?;
        debug!(len = payload.len(), "Revealed payload");
        Ok(payload)
    }

    /// Whether an encoded image still carries `owner_secret`.
    pub fn verify_owner(&self, image_bytes: &[u8], owner_secret: &str) -> Result<bool> {
        let buffer = decode_image(image_bytes)?;
        Ok(self
            .lsb
            .contains_payload(&buffer, owner_secret, self.config.fixed_length))
    }
}

/// Hex SHA3-256 of `data`.
pub fn content_digest(data: &[u8]) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
