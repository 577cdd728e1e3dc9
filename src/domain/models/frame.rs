//! Captured frames and the image pyramid built from them.
//!
//! A [`Frame`] is one RGBA capture from the external frame source. The core only
//! reads it. A [`Pyramid`] is the multi-resolution view derived from a frame:
//! level 0 is a copy of the frame at full resolution and every following level
//! halves the linear dimensions of its predecessor (never below 1x1).

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// One captured RGBA image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Capture timestamp in milliseconds.
    pub t: f64,
    /// Logical layer id of the producing surface.
    pub layer: u32,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// RGBA bytes, row-major, `width * height * 4` long for a well-formed frame.
    pub pixels: Vec<u8>,
}

impl Frame {
    /// Create a frame, checking the buffer length against the dimensions.
    ///
    /// Frames built directly through the struct literal skip this check; every
    /// core operation tolerates mismatched buffers by ignoring the missing pixels.
    pub fn new(
        t: f64,
        layer: u32,
        width: usize,
        height: usize,
        pixels: Vec<u8>,
    ) -> DomainResult<Self> {
        let expected = width.saturating_mul(height).saturating_mul(CHANNELS);
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(DomainError::InvalidFrame {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            t,
            layer,
            width,
            height,
            pixels,
        })
    }

    /// A frame filled with one RGBA colour.
    pub fn solid(t: f64, layer: u32, width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width * height * CHANNELS)
            .collect();
        Self {
            t,
            layer,
            width,
            height,
            pixels,
        }
    }

    /// Number of pixels the dimensions claim.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// One resolution of an image pyramid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PyramidLevel {
    /// Linear scale relative to the source frame (1, 1/2, 1/4, ...).
    pub scale: f64,
    /// Width in pixels, at least 1.
    pub width: usize,
    /// Height in pixels, at least 1.
    pub height: usize,
    /// RGBA bytes owned by this level.
    pub data: Vec<u8>,
}

impl PyramidLevel {
    /// RGBA channels of the pixel at `(x, y)`, or `None` when the coordinate or
    /// its byte offset falls outside the level.
    pub fn rgba_at(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * CHANNELS;
        self.data.get(offset..offset + CHANNELS)
    }

    /// Number of complete pixels actually present in the buffer, capped by the
    /// declared dimensions.
    pub fn available_pixels(&self) -> usize {
        (self.data.len() / CHANNELS).min(self.width * self.height)
    }
}

/// Ordered pyramid levels, level 0 first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pyramid {
    /// Timestamp of the source frame.
    pub t: f64,
    /// Levels from full resolution downwards.
    pub levels: Vec<PyramidLevel>,
}

impl Pyramid {
    /// The full-resolution level.
    pub fn base(&self) -> Option<&PyramidLevel> {
        self.levels.first()
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the pyramid has no levels.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_new_validates_length() {
        let ok = Frame::new(0.0, 0, 2, 2, vec![0; 16]);
        assert!(ok.is_ok());

        let err = Frame::new(0.0, 0, 2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidFrame {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn test_frame_new_rejects_zero_dimensions() {
        assert!(Frame::new(0.0, 0, 0, 4, vec![]).is_err());
        assert!(Frame::new(0.0, 0, 4, 0, vec![]).is_err());
    }

    #[test]
    fn test_solid_frame_fills_every_pixel() {
        let frame = Frame::solid(5.0, 1, 3, 2, [10, 20, 30, 255]);
        assert_eq!(frame.pixels.len(), 24);
        assert_eq!(&frame.pixels[20..24], &[10, 20, 30, 255]);
        assert_eq!(frame.pixel_count(), 6);
    }

    #[test]
    fn test_rgba_at_guards_short_buffer() {
        let level = PyramidLevel {
            scale: 1.0,
            width: 2,
            height: 2,
            data: vec![1; 12],
        };
        assert_eq!(level.rgba_at(0, 1), Some(&[1, 1, 1, 1][..]));
        assert_eq!(level.rgba_at(1, 1), None);
        assert_eq!(level.rgba_at(2, 0), None);
        assert_eq!(level.available_pixels(), 3);
    }
}
