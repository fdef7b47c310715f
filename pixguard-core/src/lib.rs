//! Pixguard Core - image fingerprinting and invisible watermarking
//!
//! This crate provides the engine behind Pixguard image protection: it hides
//! an ownership secret inside pixel data, fingerprints images so copies can be
//! found later, and turns fingerprint similarity into a tamper verdict.
//!
//! # Features
//!
//! - LSB steganography over RGB channels with fixed-length payloads
//! - Average-hash and difference-hash fingerprints on a fixed sample grid
//! - Lenient similarity and strict Hamming distance
//! - Five-band tamper scoring and detection verdicts
//! - Semi-transparent visible marks anchored to a corner or the centre
//! - Lossless PNG re-encoding (feature `image-io`)
//!
//! # Example
//!
//! ```no_run
//! use pixguard_core::{EngineConfig, Protector};
//!
//! # fn example() -> pixguard_core::Result<()> {
//! let protector = Protector::new(EngineConfig::default())?;
//!
//! // Watermark an upload with the owner's secret
//! let upload = std::fs::read("photo.jpg").unwrap();
//! let protected = protector.protect(&upload, "OWNER123")?;
//!
//! // Later: check a suspicious copy against the stored fingerprint
//! let suspect = std::fs::read("suspect.png").unwrap();
//! let candidate = protector.fingerprint(&suspect)?;
//! let stored = vec![("photo-1".to_string(), protected.fingerprint.clone())];
//! let report = protector.detector().detect(&candidate, &stored);
//! println!("{}: {}", report.verdict, report.overall_tamper_score.tamper_level);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod detection;
pub mod error;
pub mod fingerprint;
pub mod pixels;
pub mod tamper;
pub mod watermark;

#[cfg(feature = "image-io")]
pub mod container;
#[cfg(feature = "image-io")]
pub mod protect;

// Re-export main types for convenience
pub use codec::{BitCodec, PayloadFormat};
pub use config::{CapacityPolicy, EngineConfig, DEFAULT_FIXED_LENGTH};
pub use detection::{DetectionReport, Detector, MatchReport, Verdict};
pub use error::{PixguardError, Result};
pub use fingerprint::{
    average_hash, best_match, compare, difference_hash, hamming_distance, Fingerprint,
    FingerprintHasher, HashAlgorithm,
};
pub use pixels::PixelBuffer;
pub use tamper::{score, ColorCode, Confidence, TamperLevel, TamperScore};
pub use watermark::{apply_overlay, EmbedReport, LsbCodec, MarkPosition, OverlayOptions};

#[cfg(feature = "image-io")]
pub use container::{decode_image, decode_mark, encode_png, inspect, ImageInfo};
#[cfg(feature = "image-io")]
pub use protect::{ProtectedImage, Protector};
