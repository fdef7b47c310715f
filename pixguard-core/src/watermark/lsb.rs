//! Least-significant-bit payload embedding.
//!
//! The payload stream is written one bit per colour channel, walking pixels
//! in raster order and channels in R, G, B order. Alpha is never touched.
//! Only the first `ceil(bits / 3)` pixels change, and every changed channel
//! moves by exactly one.
//!
//! There is no length field or checksum in the sentinel stream: extracting
//! from an image that was never watermarked returns noise. The watermark
//! survives lossless re-encoding only; any lossy step destroys it.

use tracing::{debug, warn};

use crate::codec::{BitCodec, PayloadFormat};
use crate::config::CapacityPolicy;
use crate::error::{PixguardError, Result};
use crate::pixels::{PixelBuffer, COLOR_CHANNELS};

/// Outcome of a successful embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedReport {
    /// Bits in the encoded payload stream.
    pub bits_requested: usize,
    /// Bits actually written. Smaller than requested only under truncation.
    pub bits_written: usize,
    /// Leading pixels that carry payload bits.
    pub pixels_used: usize,
}

impl EmbedReport {
    pub fn is_truncated(&self) -> bool {
        self.bits_written < self.bits_requested
    }
}

/// LSB steganographic codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct LsbCodec {
    codec: BitCodec,
    policy: CapacityPolicy,
}

impl LsbCodec {
    pub fn new(format: PayloadFormat, policy: CapacityPolicy) -> Self {
        Self {
            codec: BitCodec::new(format),
            policy,
        }
    }

    pub fn format(&self) -> PayloadFormat {
        self.codec.format()
    }

    pub fn policy(&self) -> CapacityPolicy {
        self.policy
    }

    /// Hide `payload` in the LSBs of `buffer`.
    ///
    /// # Errors
    ///
    /// - `PayloadTooLong` if `payload` exceeds `fixed_length` bytes.
    /// - `InsufficientCapacity` under [`CapacityPolicy::Strict`] when the
    ///   buffer has fewer than `stream_bits` colour channels. The buffer is
    ///   left untouched.
    pub fn embed(
        &self,
        buffer: &mut PixelBuffer,
        payload: &str,
        fixed_length: usize,
    ) -> Result<EmbedReport> {
        let bits = self.codec.encode(payload, fixed_length)?;
        let available = capacity_bits(buffer);

        if bits.len() > available {
            match self.policy {
                CapacityPolicy::Strict => {
                    return Err(PixguardError::InsufficientCapacity {
                        required: bits.len(),
                        available,
                    });
                }
                CapacityPolicy::Truncate => {
                    warn!(
                        required = bits.len(),
                        available, "Image too small for payload, truncating watermark"
                    );
                }
            }
        }

        let mut cursor = bits.iter();
        let mut written = 0;
        'pixels: for pixel in buffer.pixels_mut() {
            for channel in &mut pixel[..COLOR_CHANNELS] {
                let Some(&bit) = cursor.next() else {
                    break 'pixels;
                };
                *channel = (*channel & 0xFE) | u8::from(bit);
                written += 1;
            }
        }

        let report = EmbedReport {
            bits_requested: bits.len(),
            bits_written: written,
            pixels_used: written.div_ceil(COLOR_CHANNELS),
        };

        debug!(
            bits = report.bits_written,
            pixels = report.pixels_used,
            format = ?self.codec.format(),
            "Embedded payload"
        );

        Ok(report)
    }

    /// Recover the payload embedded with the same `fixed_length` and format.
    ///
    /// # Errors
    ///
    /// - `InsufficientCapacity` under [`CapacityPolicy::Strict`] when the
    ///   image cannot hold a full stream. Under truncation the available
    ///   whole bytes are decoded instead.
    /// - `CorruptPayload` when a length-prefixed stream is not well formed.
    pub fn extract(&self, buffer: &PixelBuffer, fixed_length: usize) -> Result<String> {
        let wanted = self.codec.format().stream_bits(fixed_length);
        let available = capacity_bits(buffer);

        let take = if wanted <= available {
            wanted
        } else {
            match self.policy {
                CapacityPolicy::Strict => {
                    return Err(PixguardError::InsufficientCapacity {
                        required: wanted,
                        available,
                    });
                }
                CapacityPolicy::Truncate => available - available % 8,
            }
        };

        let bits: Vec<bool> = buffer
            .pixels()
            .flat_map(|pixel| pixel[..COLOR_CHANNELS].iter().map(|&c| c & 1 == 1))
            .take(take)
            .collect();

        debug!(bits = bits.len(), format = ?self.codec.format(), "Extracted payload bits");

        self.codec.decode(&bits)
    }

    /// Whether `buffer` carries exactly `expected` as its payload.
    ///
    /// Extraction failures count as "not present".
    pub fn contains_payload(
        &self,
        buffer: &PixelBuffer,
        expected: &str,
        fixed_length: usize,
    ) -> bool {
        match self.extract(buffer, fixed_length) {
            Ok(found) => found == expected,
            Err(e) => {
                debug!(error = %e, "No readable payload");
                false
            }
        }
    }
}

/// Number of payload bits `buffer` can hold: three per pixel.
pub fn capacity_bits(buffer: &PixelBuffer) -> usize {
    buffer.pixel_count() * COLOR_CHANNELS
}
