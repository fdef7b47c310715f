//! Visible overlay marks.
//!
//! Stamps a semi-transparent mark image (a logo or pre-rendered caption)
//! onto one corner or the centre of a buffer. The overlay rewrites whole
//! colour values, so stamp before LSB embedding, never after.

use image::{imageops, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{PixguardError, Result};
use crate::pixels::{PixelBuffer, COLOR_CHANNELS};

/// Mark opacity used when none is given.
pub const DEFAULT_OPACITY: f32 = 0.3;

/// Gap in pixels between the mark and the nearest image edges.
pub const DEFAULT_MARGIN: u32 = 20;

/// Where the mark is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

impl FromStr for MarkPosition {
    type Err = PixguardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "top-left" => Ok(Self::TopLeft),
            "top-right" => Ok(Self::TopRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-right" => Ok(Self::BottomRight),
            "center" | "centre" => Ok(Self::Center),
            other => Err(PixguardError::InvalidConfig(format!(
                "unknown mark position '{other}'"
            ))),
        }
    }
}

impl fmt::Display for MarkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::Center => "center",
        };
        f.write_str(name)
    }
}

/// Placement and strength of a visible mark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayOptions {
    pub position: MarkPosition,
    /// Multiplier on the mark's own alpha, in `[0, 1]`.
    pub opacity: f32,
    pub margin: u32,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            position: MarkPosition::default(),
            opacity: DEFAULT_OPACITY,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl OverlayOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(PixguardError::InvalidConfig(format!(
                "mark opacity {} is outside [0, 1]",
                self.opacity
            )));
        }
        Ok(())
    }
}

/// Top-left corner of a `mark` sized overlay on an `image` sized canvas.
///
/// Coordinates go negative when the mark is larger than the free space;
/// the overlay is clipped to the canvas in that case. The centre position
/// rounds halves up.
pub fn mark_origin(
    position: MarkPosition,
    image: (u32, u32),
    mark: (u32, u32),
    margin: u32,
) -> (i64, i64) {
    let (iw, ih) = (i64::from(image.0), i64::from(image.1));
    let (mw, mh) = (i64::from(mark.0), i64::from(mark.1));
    let margin = i64::from(margin);

    let left = iw - mw - margin;
    let bottom = ih - mh - margin;
    match position {
        MarkPosition::TopLeft => (margin, margin),
        MarkPosition::TopRight => (left, margin),
        MarkPosition::BottomLeft => (margin, bottom),
        MarkPosition::BottomRight => (left, bottom),
        MarkPosition::Center => ((iw - mw + 1).div_euclid(2), (ih - mh + 1).div_euclid(2)),
    }
}

/// Alpha-composite `mark` onto `buffer` and return where it was placed.
///
/// The buffer's own alpha channel, if any, is left untouched.
pub fn apply_overlay(
    buffer: &mut PixelBuffer,
    mark: &RgbaImage,
    options: &OverlayOptions,
) -> Result<(i64, i64)> {
    options.validate()?;

    let (x, y) = mark_origin(
        options.position,
        (buffer.width(), buffer.height()),
        mark.dimensions(),
        options.margin,
    );

    let mut canvas = RgbaImage::from_fn(buffer.width(), buffer.height(), |px, py| {
        let [r, g, b] = buffer.rgb(px, py);
        Rgba([r, g, b, u8::MAX])
    });
    imageops::overlay(&mut canvas, &fade(mark, options.opacity), x, y);

    for (dst, src) in buffer.pixels_mut().zip(canvas.pixels()) {
        dst[..COLOR_CHANNELS].copy_from_slice(&src.0[..COLOR_CHANNELS]);
    }

    debug!(
        position = %options.position,
        x,
        y,
        mark_width = mark.width(),
        mark_height = mark.height(),
        opacity = options.opacity,
        "Applied visible mark"
    );

    Ok((x, y))
}

fn fade(mark: &RgbaImage, opacity: f32) -> RgbaImage {
    let mut faded = mark.clone();
    for pixel in faded.pixels_mut() {
        pixel.0[3] = (f32::from(pixel.0[3]) * opacity).round() as u8;
    }
    faded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white_mark(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
    }

    fn opaque(position: MarkPosition) -> OverlayOptions {
        OverlayOptions {
            position,
            opacity: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let options = OverlayOptions::default();
        assert_eq!(options.position, MarkPosition::BottomRight);
        assert_eq!(options.opacity, 0.3);
        assert_eq!(options.margin, 20);
    }

    #[test]
    fn test_mark_origin_corners() {
        let image = (200, 100);
        let mark = (50, 10);
        assert_eq!(mark_origin(MarkPosition::TopLeft, image, mark, 20), (20, 20));
        assert_eq!(mark_origin(MarkPosition::TopRight, image, mark, 20), (130, 20));
        assert_eq!(mark_origin(MarkPosition::BottomLeft, image, mark, 20), (20, 70));
        assert_eq!(mark_origin(MarkPosition::BottomRight, image, mark, 20), (130, 70));
    }

    #[test]
    fn test_mark_origin_center_rounds_half_up() {
        assert_eq!(mark_origin(MarkPosition::Center, (101, 50), (50, 10), 20), (26, 20));
        assert_eq!(mark_origin(MarkPosition::Center, (40, 40), (45, 45), 20), (-2, -2));
    }

    #[test]
    fn test_mark_origin_oversized_mark_goes_negative() {
        assert_eq!(
            mark_origin(MarkPosition::BottomRight, (30, 30), (40, 5), 20),
            (-30, 5)
        );
    }

    #[test]
    fn test_position_from_str() {
        assert_eq!("top-left".parse::<MarkPosition>(), Ok(MarkPosition::TopLeft));
        assert_eq!("Bottom_Right".parse::<MarkPosition>(), Ok(MarkPosition::BottomRight));
        assert_eq!("centre".parse::<MarkPosition>(), Ok(MarkPosition::Center));
        assert!("middle".parse::<MarkPosition>().is_err());

        for position in [MarkPosition::TopRight, MarkPosition::BottomLeft, MarkPosition::Center] {
            assert_eq!(position.to_string().parse::<MarkPosition>(), Ok(position));
        }
    }

    #[test]
    fn test_opaque_mark_replaces_pixels() {
        let mut buffer = PixelBuffer::filled(64, 48, [0, 0, 0]);
        let options = opaque(MarkPosition::TopLeft);
        let origin = apply_overlay(&mut buffer, &white_mark(10, 5), &options).unwrap();

        assert_eq!(origin, (20, 20));
        assert_eq!(buffer.rgb(20, 20), [255, 255, 255]);
        assert_eq!(buffer.rgb(29, 24), [255, 255, 255]);
        assert_eq!(buffer.rgb(19, 20), [0, 0, 0]);
        assert_eq!(buffer.rgb(30, 20), [0, 0, 0]);
        assert_eq!(buffer.rgb(20, 25), [0, 0, 0]);
    }

    #[test]
    fn test_partial_opacity_blends() {
        let mut buffer = PixelBuffer::filled(64, 64, [0, 0, 0]);
        let options = OverlayOptions {
            position: MarkPosition::Center,
            opacity: 0.5,
            ..Default::default()
        };
        apply_overlay(&mut buffer, &white_mark(8, 8), &options).unwrap();

        let [r, g, b] = buffer.rgb(32, 32);
        assert!((120..=135).contains(&r), "blended value {r}");
        assert_eq!((r, g), (g, b));
        assert_eq!(buffer.rgb(0, 0), [0, 0, 0]);
    }

    #[test]
    fn test_zero_opacity_leaves_buffer_unchanged() {
        let original = PixelBuffer::from_fn(40, 40, |x, y| [x as u8, y as u8, 7]);
        let mut buffer = original.clone();
        let options = OverlayOptions {
            opacity: 0.0,
            ..Default::default()
        };
        apply_overlay(&mut buffer, &white_mark(10, 10), &options).unwrap();
        assert_eq!(buffer, original);
    }

    #[test]
    fn test_overlay_keeps_buffer_alpha() {
        let data: Vec<u8> = [10, 20, 30, 77].repeat(50 * 50);
        let mut buffer = PixelBuffer::new(50, 50, 4, data).unwrap();
        let options = opaque(MarkPosition::BottomRight);
        apply_overlay(&mut buffer, &white_mark(5, 5), &options).unwrap();

        assert_eq!(buffer.rgb(25, 25), [255, 255, 255]);
        assert!(buffer.pixels().all(|p| p[3] == 77));
    }

    #[test]
    fn test_oversized_mark_is_clipped() {
        let mut buffer = PixelBuffer::filled(16, 16, [0, 0, 0]);
        let options = opaque(MarkPosition::Center);
        apply_overlay(&mut buffer, &white_mark(64, 64), &options).unwrap();
        assert!(buffer.pixels().all(|p| p == [255, 255, 255]));
    }

    #[test]
    fn test_rejects_opacity_out_of_range() {
        let mut buffer = PixelBuffer::filled(8, 8, [0, 0, 0]);
        for opacity in [1.5, -0.1, f32::NAN] {
            let options = OverlayOptions {
                opacity,
                ..Default::default()
            };
            assert!(matches!(
                apply_overlay(&mut buffer, &white_mark(2, 2), &options),
                Err(PixguardError::InvalidConfig(_))
            ));
        }
    }
}
