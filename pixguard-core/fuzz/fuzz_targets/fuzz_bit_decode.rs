#![no_main]

//! Fuzz target for payload bit decoding
//!
//! Feeds arbitrary bytes through both payload formats as raw bit streams and
//! as '0'/'1' text. Decoding must return an error, never panic.
//!
//! Run with: cargo +nightly fuzz run fuzz_bit_decode

use libfuzzer_sys::fuzz_target;
use pixguard_core::codec::{bytes_to_bits, parse_bits};
use pixguard_core::{BitCodec, PayloadFormat};

fuzz_target!(|data: &[u8]| {
    let bits = bytes_to_bits(data);
    for format in [PayloadFormat::Sentinel, PayloadFormat::LengthPrefixed] {
        let codec = BitCodec::new(format);
        let _ = codec.decode(&bits);
        // Drop a bit so lengths that are not a multiple of 8 are exercised
        if let Some((_, rest)) = bits.split_last() {
            let _ = codec.decode(rest);
        }
    }

    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(parsed) = parse_bits(text) {
            let _ = BitCodec::default().decode(&parsed);
        }
    }
});
