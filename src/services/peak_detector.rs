//! Prominence-based peak detection over a divergence timeline.
//!
//! Pipeline, in order:
//!
//! 1. rolling median baseline over a centred window of half-width `window / 2`
//! 2. strict interior local maxima standing more than [`BASELINE_TOLERANCE`]
//!    above their baseline
//! 3. prominence against the higher of the two surrounding valleys, dropping
//!    candidates below `prominence_min`
//! 4. width at half prominence
//! 5. confidence blend of prominence, normalised width and delta
//! 6. greedy distance filter over the index-ordered peaks
//! 7. final ordering by confidence, then delta, then index

use std::cmp::Ordering;
use std::fmt::Write as _;

use tracing::debug;

use crate::domain::models::{DivergencePoint, Peak, PeakParams};

use super::evidence_scorer::clamp01;

/// Margin a candidate must clear above its rolling baseline.
pub const BASELINE_TOLERANCE: f64 = 0.01;

/// Grid the final ordering compares confidence and delta on.
const ORDER_RESOLUTION: f64 = 1e-6;

/// Column layout of [`export_peak_csv`].
pub const PEAK_CSV_HEADER: &str = "index,delta,prominence,width,confidence,leftBase,rightBase";

/// Detect peaks in `points`, most confident first.
///
/// Empty, single-point and flat inputs yield no peaks. The result is a pure
/// function of its inputs, order included.
pub fn find_peaks(points: &[DivergencePoint], params: &PeakParams) -> Vec<Peak> {
    if points.len() < 3 {
        return Vec::new();
    }

    let deltas: Vec<f64> = points.iter().map(|p| p.delta).collect();
    let baselines = rolling_median(&deltas, params.window);
    let candidates = local_maxima(&deltas, &baselines);

    let peaks: Vec<Peak> = candidates
        .iter()
        .filter_map(|&index| {
            let prominence = prominence(&deltas, index);
            if prominence < params.prominence_min {
                return None;
            }
            let (left_base, right_base) = half_prominence_bases(&deltas, index, prominence);
            let width = right_base - left_base;
            let delta = deltas[index];
            Some(Peak {
                index: points[index].index,
                delta,
                prominence,
                left_base,
                right_base,
                width,
                confidence: confidence(prominence, width, deltas.len(), delta, params),
            })
        })
        .collect();

    let mut kept = apply_distance_filter(peaks, params.distance_min);
    kept.sort_by(compare_peaks);

    debug!(
        points = points.len(),
        candidates = candidates.len(),
        peaks = kept.len(),
        "peak detection finished"
    );
    kept
}

/// First `k` peaks of an already ordered list.
pub fn summarize_peaks(peaks: &[Peak], k: usize) -> &[Peak] {
    &peaks[..k.min(peaks.len())]
}

/// Fixed-column CSV: header plus one row per peak, newline separated with no
/// trailing newline.
pub fn export_peak_csv(peaks: &[Peak]) -> String {
    let mut out = String::from(PEAK_CSV_HEADER);
    for p in peaks {
        // writing into a String cannot fail
        let _ = write!(
            out,
            "\n{},{:.6},{:.6},{},{:.6},{},{}",
            p.index, p.delta, p.prominence, p.width, p.confidence, p.left_base, p.right_base
        );
    }
    out
}

fn rolling_median(values: &[f64], window: usize) -> Vec<f64> {
    let half = window / 2;
    let mut scratch = Vec::with_capacity(half * 2 + 1);

    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(values.len());
            scratch.clear();
            scratch.extend_from_slice(&values[start..end]);
            scratch.sort_by(f64::total_cmp);

            let mid = scratch.len() / 2;
            if scratch.len() % 2 == 0 {
                (scratch[mid - 1] + scratch[mid]) / 2.0
            } else {
                scratch[mid]
            }
        })
        .collect()
}

fn local_maxima(deltas: &[f64], baselines: &[f64]) -> Vec<usize> {
    (1..deltas.len() - 1)
        .filter(|&i| {
            let v = deltas[i];
            v > deltas[i - 1] && v > deltas[i + 1] && v > baselines[i] + BASELINE_TOLERANCE
        })
        .collect()
}

/// Height of `deltas[index]` above the highest lower value found on either side.
fn prominence(deltas: &[f64], index: usize) -> f64 {
    let v = deltas[index];
    let side_max = |side: &[f64]| {
        side.iter()
            .copied()
            .filter(|&d| d < v)
            .fold(0.0_f64, f64::max)
    };

    let valley = side_max(&deltas[..index]).max(side_max(&deltas[index + 1..]));
    (v - valley).max(0.0)
}

/// Nearest indices on each side at or below half prominence; the peak index
/// itself when a side never drops that low.
fn half_prominence_bases(deltas: &[f64], index: usize, prominence: f64) -> (usize, usize) {
    let half_height = deltas[index] - prominence / 2.0;

    let left = (0..index)
        .rev()
        .find(|&i| deltas[i] <= half_height)
        .unwrap_or(index);
    let right = (index + 1..deltas.len())
        .find(|&i| deltas[i] <= half_height)
        .unwrap_or(index);

    (left, right)
}

fn confidence(prominence: f64, width: usize, len: usize, delta: f64, params: &PeakParams) -> f64 {
    let width_norm = (width as f64 / len as f64).min(1.0);
    let delta_norm = delta.min(1.0);
    clamp01(params.alpha * prominence + params.beta * width_norm + params.gamma * delta_norm)
}

/// Keeps the first peak, then each peak at least `distance_min` indices from
/// the last one kept. Expects index order.
fn apply_distance_filter(peaks: Vec<Peak>, distance_min: usize) -> Vec<Peak> {
    let mut kept: Vec<Peak> = Vec::with_capacity(peaks.len());
    for peak in peaks {
        match kept.last() {
            Some(last) if peak.index.abs_diff(last.index) < distance_min => {}
            _ => kept.push(peak),
        }
    }
    kept
}

fn quantize(value: f64) -> i64 {
    if value.is_nan() {
        i64::MIN
    } else {
        (value / ORDER_RESOLUTION).round() as i64
    }
}

fn compare_peaks(a: &Peak, b: &Peak) -> Ordering {
    quantize(b.confidence)
        .cmp(&quantize(a.confidence))
        .then_with(|| quantize(b.delta).cmp(&quantize(a.delta)))
        .then_with(|| a.index.cmp(&b.index))
}
