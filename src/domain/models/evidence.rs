use serde::{Deserialize, Serialize};

/// Confidence-scored motif carried by a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBullet {
    pub motif: String,
    /// Occurrences in the current window.
    pub count: usize,
    /// Consecutive most-recent history windows containing the motif.
    pub persisted: usize,
    /// Blended score, 0..=1.
    pub confidence: f64,
}

/// Weights for evidence blending.
///
/// `min_persistence` is the run length that marks a motif as persistent. The
/// persistence score is normalised by `max(min_persistence, 3)`, so the two
/// thresholds differ for the default of 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EvidenceConfig {
    #[serde(default = "default_w_convergence")]
    pub w_convergence: f64,
    #[serde(default = "default_w_persistence")]
    pub w_persistence: f64,
    #[serde(default = "default_w_stability")]
    pub w_stability: f64,
    #[serde(default = "default_min_persistence")]
    pub min_persistence: usize,
}

const fn default_w_convergence() -> f64 {
    0.4
}

const fn default_w_persistence() -> f64 {
    0.4
}

const fn default_w_stability() -> f64 {
    0.2
}

const fn default_min_persistence() -> usize {
    2
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            w_convergence: default_w_convergence(),
            w_persistence: default_w_persistence(),
            w_stability: default_w_stability(),
            min_persistence: default_min_persistence(),
        }
    }
}

/// Aggregate view over a set of evidence bullets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvidenceStats {
    pub total_bullets: usize,
    pub avg_confidence: f64,
    pub persistent_count: usize,
    /// Bullets with confidence above 0.7.
    pub high_confidence_count: usize,
}
