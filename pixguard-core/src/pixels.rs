//! Owned raw pixel storage.

use image::{GrayImage, Luma};

use crate::error::{PixguardError, Result};

/// Number of colour channels used for bit work and greyscale conversion.
pub const COLOR_CHANNELS: usize = 3;

/// Interleaved 8-bit pixels in raster order (RGB or RGBA).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw interleaved bytes.
    ///
    /// `channels` must be 3 (RGB) or 4 (RGBA) and `data` must hold exactly
    /// `width * height * channels` bytes.
    pub fn new(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self> {
        if !(COLOR_CHANNELS..=4).contains(&channels) {
            return Err(PixguardError::InvalidBuffer(format!(
                "expected 3 or 4 channels per pixel, got {channels}"
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| PixguardError::InvalidBuffer("dimensions overflow".into()))?;
        if data.len() != expected {
            return Err(PixguardError::InvalidBuffer(format!(
                "{}x{}x{} needs {} bytes, got {}",
                width,
                height,
                channels,
                expected,
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// A buffer where every pixel has the same RGB value.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let data = rgb.iter().copied().cycle().take(pixels * COLOR_CHANNELS).collect();
        Self {
            width,
            height,
            channels: COLOR_CHANNELS,
            data,
        }
    }

    /// Build an RGB buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * COLOR_CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            channels: COLOR_CHANNELS,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Iterate over pixels as channel slices, in raster order.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.channels)
    }

    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        self.data.chunks_exact_mut(self.channels)
    }

    /// RGB of the pixel at `(x, y)`. Panics when out of bounds.
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = (y as usize * self.width as usize + x as usize) * self.channels;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }

    /// Greyscale intensity of the pixel at `(x, y)`.
    pub fn luma(&self, x: u32, y: u32) -> u8 {
        let [r, g, b] = self.rgb(x, y);
        luma(r, g, b)
    }

    /// 8-bit greyscale copy using BT.601 luma; alpha is ignored.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| Luma([self.luma(x, y)]))
    }
}

/// ITU-R BT.601 luma, `(299 R + 587 G + 114 B) / 1000` rounded to nearest.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    ((weighted + 500) / 1000) as u8
}
