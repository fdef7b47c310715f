//! Payload bit codec.
//!
//! Converts a short text payload into the flat bit sequence that the LSB
//! embedder writes into pixels, and back.
//!
//! # Formats
//!
//! - [`PayloadFormat::Sentinel`]: the payload is right-padded with `'#'` to a
//!   fixed byte length. Decoding strips the trailing `'#'` run, so payloads
//!   that themselves end in `'#'` do not survive a round trip. Kept to read
//!   images watermarked by earlier deployments.
//! - [`PayloadFormat::LengthPrefixed`]: a big-endian `u16` byte count, the
//!   payload bytes, then zero padding up to the fixed length. Any payload
//!   round-trips exactly.
//!
//! Bits are emitted most significant bit first within each byte.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{PixguardError, Result};

/// Padding byte of the sentinel format.
pub const SENTINEL: u8 = b'#';

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_BYTES: usize = 2;

/// Wire layout of an encoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// Right-padded with `'#'`, trailing run stripped on decode.
    Sentinel,
    /// `u16` length prefix followed by zero-padded payload bytes.
    #[default]
    LengthPrefixed,
}

impl PayloadFormat {
    /// Number of bits the encoded stream occupies for a given fixed length.
    pub fn stream_bits(&self, fixed_length: usize) -> usize {
        match self {
            PayloadFormat::Sentinel => fixed_length * 8,
            PayloadFormat::LengthPrefixed => (LENGTH_PREFIX_BYTES + fixed_length) * 8,
        }
    }
}

impl FromStr for PayloadFormat {
    type Err = PixguardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sentinel" | "legacy" => Ok(Self::Sentinel),
            "length_prefixed" | "prefixed" => Ok(Self::LengthPrefixed),
            other => Err(PixguardError::InvalidConfig(format!(
                "unknown payload format '{other}'"
            ))),
        }
    }
}

/// Encoder/decoder for one payload format.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitCodec {
    format: PayloadFormat,
}

impl BitCodec {
    pub fn new(format: PayloadFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    /// Encode `text` into exactly `self.format.stream_bits(fixed_length)` bits.
    pub fn encode(&self, text: &str, fixed_length: usize) -> Result<Vec<bool>> {
        match self.format {
            PayloadFormat::Sentinel => encode_sentinel(text, fixed_length),
            PayloadFormat::LengthPrefixed => encode_length_prefixed(text, fixed_length),
        }
    }

    /// Decode a bit stream produced by [`BitCodec::encode`].
    pub fn decode(&self, bits: &[bool]) -> Result<String> {
        match self.format {
            PayloadFormat::Sentinel => decode_sentinel(bits),
            PayloadFormat::LengthPrefixed => decode_length_prefixed(bits),
        }
    }
}

/// Pad `text` with `'#'` to `fixed_length` bytes and expand it to bits.
pub fn encode_sentinel(text: &str, fixed_length: usize) -> Result<Vec<bool>> {
    let bytes = text.as_bytes();
    if bytes.len() > fixed_length {
        return Err(PixguardError::PayloadTooLong {
            len: bytes.len(),
            max: fixed_length,
        });
    }

    let mut padded = Vec::with_capacity(fixed_length);
    padded.extend_from_slice(bytes);
    padded.resize(fixed_length, SENTINEL);

    Ok(bytes_to_bits(&padded))
}

/// Group bits into bytes and strip the trailing `'#'` run.
///
/// Invalid UTF-8 is replaced rather than rejected: reading an image that was
/// never watermarked yields noise, not an error.
pub fn decode_sentinel(bits: &[bool]) -> Result<String> {
    let bytes = bits_to_bytes(bits)?;
    let end = bytes
        .iter()
        .rposition(|&b| b != SENTINEL)
        .map_or(0, |i| i + 1);
    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}

/// Prefix `text` with its byte length and zero-pad it to `fixed_length` bytes.
pub fn encode_length_prefixed(text: &str, fixed_length: usize) -> Result<Vec<bool>> {
    let bytes = text.as_bytes();
    if bytes.len() > fixed_length {
        return Err(PixguardError::PayloadTooLong {
            len: bytes.len(),
            max: fixed_length,
        });
    }
    let len = u16::try_from(bytes.len()).map_err(|_| PixguardError::PayloadTooLong {
        len: bytes.len(),
        max: usize::from(u16::MAX),
    })?;

    let mut framed = Vec::with_capacity(LENGTH_PREFIX_BYTES + fixed_length);
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(bytes);
    framed.resize(LENGTH_PREFIX_BYTES + fixed_length, 0);

    Ok(bytes_to_bits(&framed))
}

/// Read the length prefix and return exactly that many payload bytes.
pub fn decode_length_prefixed(bits: &[bool]) -> Result<String> {
    let bytes = bits_to_bytes(bits)?;
    if bytes.len() < LENGTH_PREFIX_BYTES {
        return Err(PixguardError::CorruptPayload(format!(
            "stream of {} bytes has no length prefix",
            bytes.len()
        )));
    }

    let declared = usize::from(u16::from_be_bytes([bytes[0], bytes[1]]));
    let body = &bytes[LENGTH_PREFIX_BYTES..];
    if declared > body.len() {
        return Err(PixguardError::CorruptPayload(format!(
            "declared length {} exceeds {} available bytes",
            declared,
            body.len()
        )));
    }

    String::from_utf8(body[..declared].to_vec())
        .map_err(|e| PixguardError::CorruptPayload(format!("payload is not UTF-8: {e}")))
}

/// Expand bytes to bits, most significant bit first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
        .collect()
}

/// Pack bits (MSB first) into bytes. The bit count must be a multiple of 8.
pub fn bits_to_bytes(bits: &[bool]) -> Result<Vec<u8>> {
    if bits.len() % 8 != 0 {
        return Err(PixguardError::MalformedBitstring(format!(
            "{} bits is not a multiple of 8",
            bits.len()
        )));
    }

    Ok(bits
        .chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit)))
        .collect())
}

/// Render bits as a `'0'`/`'1'` string.
pub fn bits_to_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Parse a `'0'`/`'1'` string into bits.
pub fn parse_bits(s: &str) -> Result<Vec<bool>> {
    s.chars()
        .enumerate()
        .map(|(i, c)| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(PixguardError::MalformedBitstring(format!(
                "unexpected character {other:?} at position {i}"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_encode_length() {
        let bits = encode_sentinel("OWNER123", 20).unwrap();
        assert_eq!(bits.len(), 160);
    }

    #[test]
    fn test_sentinel_encode_pads_with_hash() {
        let bits = encode_sentinel("A", 3).unwrap();
        assert_eq!(bits_to_string(&bits), "010000010010001100100011");
    }

    #[test]
    fn test_sentinel_roundtrip() {
        let bits = encode_sentinel("OWNER123", 20).unwrap();
        assert_eq!(decode_sentinel(&bits).unwrap(), "OWNER123");
    }

    #[test]
    fn test_sentinel_exact_length_payload() {
        let text = "TIMES_PROJECT_SECRET";
        assert_eq!(text.len(), 20);
        let bits = encode_sentinel(text, 20).unwrap();
        assert_eq!(decode_sentinel(&bits).unwrap(), text);
    }

    #[test]
    fn test_sentinel_strips_trailing_hash_from_payload() {
        // The ambiguity of the legacy format: payload hashes are lost.
        let bits = encode_sentinel("tag##", 8).unwrap();
        assert_eq!(decode_sentinel(&bits).unwrap(), "tag");
    }

    #[test]
    fn test_sentinel_keeps_inner_hash() {
        let bits = encode_sentinel("a#b", 8).unwrap();
        assert_eq!(decode_sentinel(&bits).unwrap(), "a#b");
    }

    #[test]
    fn test_payload_too_long() {
        let err = encode_sentinel("this payload is far too long", 8).unwrap_err();
        assert_eq!(err, PixguardError::PayloadTooLong { len: 28, max: 8 });

        let err = encode_length_prefixed("123456789", 8).unwrap_err();
        assert_eq!(err, PixguardError::PayloadTooLong { len: 9, max: 8 });
    }

    #[test]
    fn test_payload_length_counts_bytes_not_chars() {
        // "é" is two bytes in UTF-8.
        assert!(encode_sentinel("éé", 3).is_err());
        assert!(encode_sentinel("éé", 4).is_ok());
    }

    #[test]
    fn test_decode_rejects_partial_byte() {
        let bits = vec![true; 12];
        assert!(matches!(
            decode_sentinel(&bits),
            Err(PixguardError::MalformedBitstring(_))
        ));
        assert!(matches!(
            decode_length_prefixed(&bits),
            Err(PixguardError::MalformedBitstring(_))
        ));
    }

    #[test]
    fn test_length_prefixed_layout() {
        let bits = encode_length_prefixed("A", 2).unwrap();
        assert_eq!(bits.len(), 32);
        let bytes = bits_to_bytes(&bits).unwrap();
        assert_eq!(bytes, vec![0x00, 0x01, b'A', 0x00]);
    }

    #[test]
    fn test_length_prefixed_preserves_hash_suffix() {
        let bits = encode_length_prefixed("tag##", 8).unwrap();
        assert_eq!(decode_length_prefixed(&bits).unwrap(), "tag##");
    }

    #[test]
    fn test_length_prefixed_empty_payload() {
        let bits = encode_length_prefixed("", 4).unwrap();
        assert_eq!(decode_length_prefixed(&bits).unwrap(), "");
    }

    #[test]
    fn test_length_prefixed_rejects_oversized_declaration() {
        let bytes = [0xFF, 0xFF, b'x', b'y'];
        let err = decode_length_prefixed(&bytes_to_bits(&bytes)).unwrap_err();
        assert!(matches!(err, PixguardError::CorruptPayload(_)));
    }

    #[test]
    fn test_length_prefixed_rejects_missing_prefix() {
        let err = decode_length_prefixed(&bytes_to_bits(&[0x01])).unwrap_err();
        assert!(matches!(err, PixguardError::CorruptPayload(_)));
    }

    #[test]
    fn test_stream_bits() {
        assert_eq!(PayloadFormat::Sentinel.stream_bits(20), 160);
        assert_eq!(PayloadFormat::LengthPrefixed.stream_bits(20), 176);
    }

    #[test]
    fn test_bit_string_helpers() {
        let bits = parse_bits("10110").unwrap();
        assert_eq!(bits, vec![true, false, true, true, false]);
        assert_eq!(bits_to_string(&bits), "10110");
        assert!(parse_bits("10a1").is_err());
    }

    #[test]
    fn test_codec_dispatch() {
        for format in [PayloadFormat::Sentinel, PayloadFormat::LengthPrefixed] {
            let codec = BitCodec::new(format);
            let bits = codec.encode("OWNER123", 20).unwrap();
            assert_eq!(bits.len(), format.stream_bits(20));
            assert_eq!(codec.decode(&bits).unwrap(), "OWNER123");
        }
    }

    #[test]
    fn test_payload_format_from_str() {
        assert_eq!(
            "length-prefixed".parse::<PayloadFormat>(),
            Ok(PayloadFormat::LengthPrefixed)
        );
        assert_eq!("sentinel".parse::<PayloadFormat>(), Ok(PayloadFormat::Sentinel));
        assert!("base64".parse::<PayloadFormat>().is_err());
    }
}
