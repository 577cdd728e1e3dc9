//! Synthetic frame producer.
//!
//! Renders a drifting Sierpinski triangle (`x & y == 0`) whose brightness
//! pulses over time. Output is a pure function of the field and `t`, which
//! makes it usable as a stand-in for a real rendering surface in the CLI and
//! in tests.

use std::f64::consts::TAU;

use crate::domain::models::{Frame, CHANNELS};

/// Milliseconds between one-pixel horizontal shifts of the pattern.
pub const DRIFT_MS: f64 = 100.0;
/// Brightness pulse period in milliseconds.
pub const PULSE_PERIOD_MS: f64 = 4000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SierpinskiField {
    pub width: usize,
    pub height: usize,
    pub layer: u32,
}

impl SierpinskiField {
    /// Dimensions are raised to at least 1.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            layer: 0,
        }
    }

    pub fn with_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    /// Foreground intensity at time `t`, between 1 and 255.
    pub fn intensity(t: f64) -> u8 {
        let phase = (t / PULSE_PERIOD_MS) * TAU;
        (128.0 + 127.0 * phase.sin()).round().clamp(1.0, 255.0) as u8
    }

    /// Render the frame for timestamp `t` (milliseconds).
    pub fn render(&self, t: f64) -> Frame {
        let shift = if t.is_finite() && t > 0.0 {
            (t / DRIFT_MS) as usize % self.width
        } else {
            0
        };
        let on = Self::intensity(t);
        let tint = (self.layer % 4) as u8 * 16;

        let mut pixels = Vec::with_capacity(self.width * self.height * CHANNELS);
        for y in 0..self.height {
            for x in 0..self.width {
                let xs = (x + shift) % self.width;
                if xs & y == 0 {
                    pixels.extend_from_slice(&[on, on, on.saturating_sub(tint), 255]);
                } else {
                    pixels.extend_from_slice(&[0, 0, tint, 255]);
                }
            }
        }

        Frame {
            t,
            layer: self.layer,
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// `count` frames starting at `start_ms`, `step_ms` apart.
    pub fn frames(&self, start_ms: f64, step_ms: f64, count: usize) -> impl Iterator<Item = Frame> + '_ {
        (0..count).map(move |i| self.render(start_ms + step_ms * i as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_is_deterministic() {
        let field = SierpinskiField::new(32, 16);
        assert_eq!(field.render(1234.0), field.render(1234.0));
        assert_ne!(field.render(0.0).pixels, field.render(1000.0).pixels);
    }

    #[test]
    fn test_frame_shape() {
        let frame = SierpinskiField::new(20, 10).with_layer(3).render(0.0);
        assert_eq!((frame.width, frame.height, frame.layer), (20, 10, 3));
        assert_eq!(frame.pixels.len(), 20 * 10 * 4);
        assert!(Frame::new(0.0, 3, 20, 10, frame.pixels).is_ok());
    }

    #[test]
    fn test_pattern_drifts() {
        let field = SierpinskiField::new(8, 8);
        let frame = field.render(1000.0);
        // t = 1000 shifts by 10 % 8 = 2 columns
        let on = SierpinskiField::intensity(1000.0);
        let px = |x: usize, y: usize| frame.pixels[(y * 8 + x) * 4];
        assert_eq!(px(6, 1), on); // (6 + 2) % 8 = 0
        assert_eq!(px(0, 2), 0); // 2 & 2 != 0
    }

    #[test]
    fn test_intensity_range() {
        assert_eq!(SierpinskiField::intensity(0.0), 128);
        assert_eq!(SierpinskiField::intensity(1000.0), 255);
        assert_eq!(SierpinskiField::intensity(3000.0), 1);
    }

    #[test]
    fn test_frames_iterator() {
        let field = SierpinskiField::new(4, 4);
        let ts: Vec<f64> = field.frames(100.0, 50.0, 3).map(|f| f.t).collect();
        assert_eq!(ts, vec![100.0, 150.0, 200.0]);
    }
}
