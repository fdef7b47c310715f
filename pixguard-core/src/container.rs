//! Image container conversion.
//!
//! Decodes uploaded images into a [`PixelBuffer`] and re-encodes watermarked
//! buffers as PNG. PNG is the only output format: any lossy container
//! would destroy the LSB payload.

use image::{DynamicImage, GenericImageView, ImageFormat, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

use crate::error::{PixguardError, Result};
use crate::pixels::{PixelBuffer, COLOR_CHANNELS};

/// Basic properties of an encoded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Lowercase format name, e.g. `"png"` or `"jpg"`.
    pub format: String,
    pub has_alpha: bool,
    /// Size of the encoded bytes.
    pub byte_size: usize,
    /// Payload bits the decoded pixels can hold.
    pub capacity_bits: usize,
}

/// Decode any supported image format into a pixel buffer.
///
/// Images with an alpha channel stay RGBA; everything else becomes RGB8.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| PixguardError::ImageDecode(format!("Failed to decode image: {}", e)))?;
    from_dynamic(image)
}

/// Decode an overlay mark, keeping (or adding) its alpha channel.
pub fn decode_mark(bytes: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| PixguardError::ImageDecode(format!("Failed to decode mark: {}", e)))?;
    Ok(image.into_rgba8())
}

/// Convert a decoded image into a pixel buffer.
pub fn from_dynamic(image: DynamicImage) -> Result<PixelBuffer> {
    if image.color().has_alpha() {
        let rgba = image.into_rgba8();
        let (width, height) = rgba.dimensions();
        PixelBuffer::new(width, height, 4, rgba.into_raw())
    } else {
        let rgb = image.into_rgb8();
        let (width, height) = rgb.dimensions();
        PixelBuffer::new(width, height, 3, rgb.into_raw())
    }
}

/// Convert a pixel buffer back into an `image` crate image.
pub fn to_dynamic(buffer: PixelBuffer) -> Result<DynamicImage> {
    let (width, height, channels) = (buffer.width(), buffer.height(), buffer.channels());
    let raw = buffer.into_bytes();
    let image = match channels {
        4 => RgbaImage::from_raw(width, height, raw).map(DynamicImage::ImageRgba8),
        _ => RgbImage::from_raw(width, height, raw).map(DynamicImage::ImageRgb8),
    };
    image.ok_or_else(|| {
        PixguardError::InvalidBuffer(format!("{width}x{height} buffer does not match its data"))
    })
}

/// Losslessly encode a pixel buffer as PNG.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let image = to_dynamic(buffer.clone())?;
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| PixguardError::ImageEncode(format!("Failed to encode PNG: {}", e)))?;

    let bytes = out.into_inner();
    debug!(
        width = buffer.width(),
        height = buffer.height(),
        bytes = bytes.len(),
        "Encoded PNG"
    );
    Ok(bytes)
}

/// Read dimensions, format, alpha presence and LSB capacity of an encoded
/// image, decoding it once.
pub fn inspect(bytes: &[u8]) -> Result<ImageInfo> {
    let format = image::guess_format(bytes)
        .map_err(|e| PixguardError::ImageDecode(format!("Unrecognized image format: {}", e)))?;
    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| PixguardError::ImageDecode(format!("Failed to decode image: {}", e)))?;

    let (width, height) = image.dimensions();
    Ok(ImageInfo {
        width,
        height,
        format: format
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("unknown")
            .to_string(),
        has_alpha: image.color().has_alpha(),
        byte_size: bytes.len(),
        capacity_bits: width as usize * height as usize * COLOR_CHANNELS,
    })
}

/// Check if the provided bytes appear to be a supported image format.
pub fn is_supported_format(data: &[u8]) -> bool {
    image::guess_format(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_roundtrip_rgb() {
        let buf = PixelBuffer::from_fn(13, 7, |x, y| [x as u8, y as u8, (x * y) as u8]);
        let png = encode_png(&buf).unwrap();
        assert!(is_supported_format(&png));

        let decoded = decode_image(&png).unwrap();
        assert_eq!(decoded, buf);
    }

    #[test]
    fn test_png_roundtrip_rgba_keeps_alpha() {
        let data: Vec<u8> = (0..4 * 4 * 4).map(|i| i as u8).collect();
        let buf = PixelBuffer::new(4, 4, 4, data).unwrap();
        let decoded = decode_image(&encode_png(&buf).unwrap()).unwrap();
        assert_eq!(decoded.channels(), 4);
        assert_eq!(decoded, buf);
    }

    #[test]
    fn test_inspect() {
        let buf = PixelBuffer::filled(21, 9, [1, 2, 3]);
        let png = encode_png(&buf).unwrap();
        let info = inspect(&png).unwrap();

        assert_eq!(info.width, 21);
        assert_eq!(info.height, 9);
        assert_eq!(info.format, "png");
        assert!(!info.has_alpha);
        assert_eq!(info.byte_size, png.len());
        assert_eq!(info.capacity_bits, crate::watermark::capacity_bits(&buf));
        assert_eq!(info.capacity_bits, 21 * 9 * 3);
    }

    #[test]
    fn test_decode_mark_adds_alpha() {
        let png = encode_png(&PixelBuffer::filled(3, 2, [9, 8, 7])).unwrap();
        let mark = decode_mark(&png).unwrap();
        assert_eq!(mark.dimensions(), (3, 2));
        assert!(mark.pixels().all(|p| p.0 == [9, 8, 7, 255]));
        assert!(decode_mark(b"nope").is_err());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_image(b"not an image"),
            Err(PixguardError::ImageDecode(_))
        ));
        assert!(!is_supported_format(&[0x00, 0x00, 0x00]));
    }
}
