//! Perceptual hashing and scalar features of pyramid levels.
//!
//! Every feature reads luma (ITU-R BT.601 weights) from RGBA pixels and skips
//! pixels that fall outside the level's buffer.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Frame, MotifHash, Pyramid, PyramidLevel, ViewSample};

use super::pyramid_builder::build_pyramid;

/// Largest grid whose bits fit in a [`MotifHash`].
pub const MAX_GRID: usize = 11;

/// Base-32 digits needed to cover every bit of a [`MotifHash`].
pub const MAX_MOTIF_DIGITS: usize = 26;

/// Default motif label width.
pub const DEFAULT_MOTIF_DIGITS: usize = 16;

/// Default box-counting divisors.
pub const BOX_COUNT_THRESHOLDS: [usize; 4] = [16, 8, 4, 2];

const BASE32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHIJKLMNOPQRSTUV";
const HASH_THRESHOLD: f64 = 127.0;
const FOREGROUND_THRESHOLD: f64 = 140.0;
const MID_GRAY: f64 = 128.0;

/// BT.601 luma of an RGBA pixel.
pub fn luma(px: &[u8]) -> f64 {
    match px {
        [r, g, b, ..] => {
            f64::from(u32::from(*r) * 299 + u32::from(*g) * 587 + u32::from(*b) * 114) / 1000.0
        }
        _ => 0.0,
    }
}

fn luma_at(level: &PyramidLevel, x: usize, y: usize) -> Option<f64> {
    level.rgba_at(x, y).map(luma)
}

/// Grid-average luminance hash.
///
/// The level is split into `grid x grid` cells of `floor(dim / grid)` pixels
/// (at least 1); the last row and column absorb the remainder. A cell whose
/// mean luma exceeds 127 sets its bit. Bits are assigned row-major starting
/// at bit 0. `grid` is clamped to `1..=MAX_GRID`.
pub fn phash(level: &PyramidLevel, grid: usize) -> MotifHash {
    let grid = grid.clamp(1, MAX_GRID);
    let cell_w = (level.width / grid).max(1);
    let cell_h = (level.height / grid).max(1);
    let span = |cell: usize, size: usize, extent: usize| {
        let start = cell * size;
        let end = if cell + 1 == grid {
            extent
        } else {
            ((cell + 1) * size).min(extent)
        };
        start..end.max(start)
    };

    let mut bits: MotifHash = 0;
    for gy in 0..grid {
        for gx in 0..grid {
            let mut sum = 0.0;
            let mut n = 0usize;
            for y in span(gy, cell_h, level.height) {
                for x in span(gx, cell_w, level.width) {
                    if let Some(l) = luma_at(level, x, y) {
                        sum += l;
                        n += 1;
                    }
                }
            }
            let avg = if n == 0 { 0.0 } else { sum / n as f64 };
            if avg > HASH_THRESHOLD {
                bits |= 1u128 << (gy * grid + gx);
            }
        }
    }
    bits
}

/// Mean `|luma - 128|` over the pixels present in the level.
pub fn avg_energy(level: &PyramidLevel) -> f64 {
    let pixels = level.available_pixels();
    if pixels == 0 {
        return 0.0;
    }
    let total: f64 = level
        .data
        .chunks_exact(4)
        .take(pixels)
        .map(|px| (luma(px) - MID_GRAY).abs())
        .sum();
    total / pixels as f64
}

/// Mean Sobel magnitude over interior pixels (1-pixel border excluded).
///
/// Interior positions whose 3x3 neighbourhood is not fully present in the
/// buffer are left out of the mean.
pub fn sobel_gradient(level: &PyramidLevel) -> f64 {
    let (w, h) = (level.width, level.height);
    if w < 3 || h < 3 {
        return 0.0;
    }

    let mut acc = 0.0;
    let mut n = 0usize;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut k = [[0.0f64; 3]; 3];
            let mut complete = true;
            'window: for (dy, row) in k.iter_mut().enumerate() {
                for (dx, cell) in row.iter_mut().enumerate() {
                    match luma_at(level, x + dx - 1, y + dy - 1) {
                        Some(l) => *cell = l,
                        None => {
                            complete = false;
                            break 'window;
                        }
                    }
                }
            }
            if !complete {
                continue;
            }

            let gx = -k[0][0] - 2.0 * k[1][0] - k[2][0] + k[0][2] + 2.0 * k[1][2] + k[2][2];
            let gy = -k[0][0] - 2.0 * k[0][1] - k[0][2] + k[2][0] + 2.0 * k[2][1] + k[2][2];
            acc += gx.hypot(gy);
            n += 1;
        }
    }

    if n == 0 {
        0.0
    } else {
        acc / n as f64
    }
}

/// Box-counting fractal dimension of the level's bright pixels (luma > 140).
///
/// For each divisor `s` the box size is `max(1, floor(min(w, h) / s))`; the
/// slope of `ln(count)` against `ln(1 / eps)` with `eps = box / max(w, h)` is
/// fitted by least squares and clamped to `[0, 2]`. A degenerate fit (all
/// divisors giving the same box size) yields 0.
pub fn box_count_dimension(level: &PyramidLevel, thresholds: &[usize]) -> f64 {
    let (w, h) = (level.width, level.height);
    if w == 0 || h == 0 || thresholds.is_empty() {
        return 0.0;
    }

    let foreground: Vec<bool> = (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .map(|(x, y)| luma_at(level, x, y).is_some_and(|l| l > FOREGROUND_THRESHOLD))
        .collect();

    let points: Vec<(f64, f64)> = thresholds
        .iter()
        .map(|&s| {
            let bs = (w.min(h) / s.max(1)).max(1);
            let mut count = 0usize;
            for by in (0..h).step_by(bs) {
                for bx in (0..w).step_by(bs) {
                    let filled = (by..(by + bs).min(h))
                        .any(|y| (bx..(bx + bs).min(w)).any(|x| foreground[y * w + x]));
                    if filled {
                        count += 1;
                    }
                }
            }
            let eps = bs as f64 / w.max(h) as f64;
            ((1.0 / eps).ln(), (count.max(1) as f64).ln())
        })
        .collect();

    least_squares_slope(&points).clamp(0.0, 2.0)
}

fn least_squares_slope(points: &[(f64, f64)]) -> f64 {
    let n = points.len() as f64;
    let sx: f64 = points.iter().map(|p| p.0).sum();
    let sy: f64 = points.iter().map(|p| p.1).sum();
    let sxx: f64 = points.iter().map(|p| p.0 * p.0).sum();
    let sxy: f64 = points.iter().map(|p| p.0 * p.1).sum();
    let denom = n * sxx - sx * sx;
    if denom.abs() <= 1e-12 {
        return 0.0;
    }
    let slope = (n * sxy - sx * sy) / denom;
    if slope.is_finite() {
        slope
    } else {
        0.0
    }
}

/// Fixed-width base-32 label: `digits` characters, least significant 5 bits first.
pub fn hash_to_base32(hash: MotifHash, digits: usize) -> String {
    let mut n = hash;
    (0..digits)
        .map(|_| {
            let c = BASE32_ALPHABET[(n & 31) as usize] as char;
            n >>= 5;
            c
        })
        .collect()
}

/// Inverse of [`hash_to_base32`].
///
/// Round-trips any hash below `32^digits`. Lowercase letters are accepted.
pub fn base32_to_hash(label: &str) -> DomainResult<MotifHash> {
    if label.is_empty() || label.len() > MAX_MOTIF_DIGITS {
        return Err(DomainError::InvalidMotif(label.to_string()));
    }

    let mut hash: MotifHash = 0;
    for (i, ch) in label.chars().enumerate() {
        let digit = ch
            .to_digit(32)
            .ok_or_else(|| DomainError::InvalidMotif(label.to_string()))?;
        let shifted = MotifHash::from(digit)
            .checked_shl(5 * i as u32)
            .filter(|v| v >> (5 * i as u32) == MotifHash::from(digit))
            .ok_or_else(|| DomainError::InvalidMotif(label.to_string()))?;
        hash |= shifted;
    }
    Ok(hash)
}

/// Build the pyramid for `frame` and extract one [`ViewSample`] per level.
pub fn sample_frame(frame: &Frame, levels: usize, grid: usize) -> (Pyramid, Vec<ViewSample>) {
    let pyramid = build_pyramid(frame, levels);
    let samples = pyramid
        .levels
        .iter()
        .enumerate()
        .map(|(idx, level)| ViewSample {
            layer: frame.layer,
            level: idx,
            hash: phash(level, grid),
            energy: avg_energy(level),
            grad: sobel_gradient(level),
        })
        .collect();
    (pyramid, samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> u8) -> PyramidLevel {
        let mut data = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                let v = f(x, y);
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        PyramidLevel {
            scale: 1.0,
            width,
            height,
            data,
        }
    }

    #[test]
    fn test_luma_weights() {
        assert!((luma(&[255, 255, 255, 255]) - 255.0).abs() < 1e-9);
        assert!((luma(&[255, 0, 0, 255]) - 76.245).abs() < 1e-9);
        assert!((luma(&[1, 2]) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_phash_white_and_black() {
        let white = level_from_fn(16, 16, |_, _| 255);
        let black = level_from_fn(16, 16, |_, _| 0);
        assert_eq!(phash(&white, 8), u128::from(u64::MAX));
        assert_eq!(phash(&black, 8), 0);
    }

    #[test]
    fn test_phash_left_half_bright() {
        let level = level_from_fn(16, 16, |x, _| if x < 8 { 255 } else { 0 });
        let hash = phash(&level, 8);
        // bits 0..4 of every row set
        let row: u128 = 0b0000_1111;
        let expected = (0..8).fold(0u128, |acc, r| acc | (row << (r * 8)));
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_phash_remainder_absorbed_by_last_cell() {
        // width 10, grid 4: cells of 2 px, last cell spans x = 6..10
        let level = level_from_fn(10, 4, |x, _| if x >= 8 { 255 } else { 0 });
        let hash = phash(&level, 4);
        // last column cell mean = (0 + 0 + 255 + 255) / 4 = 127.5 > 127
        for row in 0..4 {
            assert_eq!((hash >> (row * 4 + 3)) & 1, 1);
            assert_eq!((hash >> (row * 4)) & 0b111, 0);
        }
    }

    #[test]
    fn test_phash_is_deterministic() {
        let level = level_from_fn(20, 13, |x, y| ((x * 37 + y * 11) % 256) as u8);
        assert_eq!(phash(&level, 8), phash(&level, 8));
    }

    #[test]
    fn test_avg_energy() {
        let gray = level_from_fn(4, 4, |_, _| 128);
        assert!(avg_energy(&gray).abs() < 1e-9);
        let white = level_from_fn(4, 4, |_, _| 255);
        assert!((avg_energy(&white) - 127.0).abs() < 1e-9);
        let empty = PyramidLevel {
            scale: 1.0,
            width: 4,
            height: 4,
            data: vec![],
        };
        assert!(avg_energy(&empty).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sobel_flat_and_edge() {
        let flat = level_from_fn(6, 6, |_, _| 90);
        assert!(sobel_gradient(&flat).abs() < 1e-9);

        let edge = level_from_fn(4, 3, |x, _| if x >= 2 { 255 } else { 0 });
        // interior (1,1) and (2,1): |gx| = 4 * 255 each, gy = 0
        assert!((sobel_gradient(&edge) - 1020.0).abs() < 1e-6);

        let tiny = level_from_fn(2, 2, |_, _| 255);
        assert!(sobel_gradient(&tiny).abs() < f64::EPSILON);
    }

    #[test]
    fn test_box_count_bounds() {
        let black = level_from_fn(64, 64, |_, _| 0);
        let white = level_from_fn(64, 64, |_, _| 255);
        assert!(box_count_dimension(&black, &BOX_COUNT_THRESHOLDS).abs() < 1e-9);
        let d_white = box_count_dimension(&white, &BOX_COUNT_THRESHOLDS);
        assert!((d_white - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_box_count_sierpinski_is_fractional() {
        let level = level_from_fn(64, 64, |x, y| if x & y == 0 { 255 } else { 0 });
        let d = box_count_dimension(&level, &BOX_COUNT_THRESHOLDS);
        assert!(d > 1.3 && d < 1.8, "dimension {d}");
    }

    #[test]
    fn test_box_count_degenerate_single_box_size() {
        let level = level_from_fn(1, 1, |_, _| 255);
        assert!(box_count_dimension(&level, &BOX_COUNT_THRESHOLDS).abs() < f64::EPSILON);
    }

    #[test]
    fn test_base32_encoding() {
        assert_eq!(hash_to_base32(0, 16), "0000000000000000");
        assert_eq!(hash_to_base32(31, 4), "V000");
        assert_eq!(hash_to_base32(32 + 10, 3), "A10");
        assert_eq!(
            hash_to_base32(u128::from(u64::MAX), 16),
            "VVVVVVVVVVVVF000"
        );
    }

    #[test]
    fn test_base32_decode_round_trip() {
        for hash in [0u128, 1, 42, 0xDEAD_BEEF, u128::from(u64::MAX)] {
            let label = hash_to_base32(hash, DEFAULT_MOTIF_DIGITS);
            assert_eq!(base32_to_hash(&label).unwrap(), hash);
        }
        assert_eq!(base32_to_hash("a10").unwrap(), 42);
    }

    #[test]
    fn test_base32_decode_rejects_bad_labels() {
        assert!(base32_to_hash("").is_err());
        assert!(base32_to_hash("W").is_err());
        assert!(base32_to_hash("!").is_err());
        // 26th digit may only carry the top 3 bits of a u128
        let overflow = format!("{}V", "0".repeat(25));
        assert!(base32_to_hash(&overflow).is_err());
    }

    #[test]
    fn test_sample_frame_one_sample_per_level() {
        let frame = Frame::solid(7.0, 3, 64, 64, [255, 255, 255, 255]);
        let (pyramid, samples) = sample_frame(&frame, 4, 8);
        assert_eq!(pyramid.len(), 4);
        assert_eq!(samples.len(), 4);
        for (i, s) in samples.iter().enumerate() {
            assert_eq!(s.level, i);
            assert_eq!(s.layer, 3);
            assert_eq!(s.hash, u128::from(u64::MAX));
        }
    }
}
