use serde::{Deserialize, Serialize};

/// Perceptual hash bits, one per grid cell in row-major order.
///
/// Wide enough for grids up to 11x11.
pub type MotifHash = u128;

/// Per-level features extracted from one pyramid level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSample {
    /// Layer of the source frame.
    pub layer: u32,
    /// Pyramid level index, 0 = full resolution.
    pub level: usize,
    /// Grid luminance hash.
    pub hash: MotifHash,
    /// Mean luma departure from mid-gray.
    pub energy: f64,
    /// Mean interior Sobel magnitude.
    pub grad: f64,
}

/// A [`ViewSample`] projected into report form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Report timestamp in milliseconds.
    pub t: f64,
    pub layer: u32,
    pub level: usize,
    /// Fixed-width base-32 label of the hash.
    pub motif: String,
    /// Rounded energy, 0..=255.
    pub signal: u8,
    /// Rounded gradient / 4, 0..=255.
    pub grad: u8,
}
