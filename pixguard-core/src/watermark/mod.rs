//! Invisible ownership watermarks.
//!
//! This module hides a short owner secret inside pixel data so that a
//! protected image can later be attributed to its owner.
//!
//! # Components
//!
//! - **LSB embedding**: one payload bit per colour channel, raster order.
//!   Lossless containers only (PNG).
//! - **Visible overlay**: a semi-transparent mark composited onto a corner or
//!   the centre. Applied before LSB embedding.

pub mod lsb;
pub mod visible;

pub use lsb::{capacity_bits, EmbedReport, LsbCodec};
pub use visible::{apply_overlay, MarkPosition, OverlayOptions};
