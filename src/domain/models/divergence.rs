//! Divergence timeline and peak records.

use serde::{Deserialize, Serialize};

/// Spread across aligned series at one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DivergencePoint {
    pub index: usize,
    /// `max - min` across the series, never negative.
    pub delta: f64,
    /// Mean across the series.
    pub baseline: f64,
}

/// A detected divergence peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peak {
    pub index: usize,
    pub delta: f64,
    pub prominence: f64,
    pub left_base: usize,
    pub right_base: usize,
    /// Samples between the half-prominence bases.
    pub width: usize,
    /// 0..=1
    pub confidence: f64,
}

/// Tuning for peak detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PeakParams {
    /// Rolling median window.
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_prominence_min")]
    pub prominence_min: f64,
    /// Minimum index separation between kept peaks.
    #[serde(default = "default_distance_min")]
    pub distance_min: usize,
    /// Prominence weight.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Width weight.
    #[serde(default = "default_beta")]
    pub beta: f64,
    /// Delta weight.
    #[serde(default = "default_gamma")]
    pub gamma: f64,
}

const fn default_window() -> usize {
    15
}

const fn default_prominence_min() -> f64 {
    0.08
}

const fn default_distance_min() -> usize {
    10
}

const fn default_alpha() -> f64 {
    0.6
}

const fn default_beta() -> f64 {
    0.2
}

const fn default_gamma() -> f64 {
    0.2
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            window: default_window(),
            prominence_min: default_prominence_min(),
            distance_min: default_distance_min(),
            alpha: default_alpha(),
            beta: default_beta(),
            gamma: default_gamma(),
        }
    }
}

/// One `{t, strategy, value}` measurement from a run history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSample {
    pub t: f64,
    pub strategy: String,
    pub value: f64,
}

/// Time-bucketed mean value of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketPoint {
    /// Bucket start time.
    pub t: f64,
    pub value: f64,
    pub count: usize,
}

/// Bucketed series of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketedSeries {
    pub strategy: String,
    pub points: Vec<BucketPoint>,
}

/// Squared difference at one common bucket time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedDivergence {
    pub t: f64,
    pub d: f64,
}
