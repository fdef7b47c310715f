#![no_main]

//! Fuzz target for LSB extraction
//!
//! Builds a pixel buffer from arbitrary bytes and extracts with every
//! format/policy combination. Extraction on garbage pixels must fail cleanly.
//!
//! Run with: cargo +nightly fuzz run fuzz_extract

use libfuzzer_sys::fuzz_target;
use pixguard_core::{CapacityPolicy, LsbCodec, PayloadFormat, PixelBuffer};

fuzz_target!(|data: &[u8]| {
    let Some((&header, pixels)) = data.split_first() else {
        return;
    };

    let channels = if header & 1 == 0 { 3 } else { 4 };
    let fixed_length = usize::from(header >> 1).max(1);
    let width = (pixels.len() / channels) as u32;
    let used = width as usize * channels;

    let Ok(buffer) = PixelBuffer::new(width, 1, channels, pixels[..used].to_vec()) else {
        return;
    };

    for format in [PayloadFormat::Sentinel, PayloadFormat::LengthPrefixed] {
        for policy in [CapacityPolicy::Strict, CapacityPolicy::Truncate] {
            let _ = LsbCodec::new(format, policy).extract(&buffer, fixed_length);
        }
    }
});
