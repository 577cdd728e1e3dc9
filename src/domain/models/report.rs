//! Report records produced once per reporting cadence.

use serde::{Deserialize, Serialize};

use super::evidence::EvidenceBullet;
use super::sample::Observation;

/// A motif label with its frequency in one report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotifCount {
    pub motif: String,
    pub count: usize,
}

impl MotifCount {
    pub fn new(motif: impl Into<String>, count: usize) -> Self {
        Self {
            motif: motif.into(),
            count,
        }
    }
}

/// Scalar metrics attached to a report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetrics {
    /// Share of the dominant motif among observed levels, 0..=1.
    pub convergence: f64,
    /// Externally supplied rolling stability, passed through.
    pub stability: f64,
    /// Box-counting dimension of level 0, 0..=2.
    pub fractal_dim: f64,
    /// Energy of the level-0 sample.
    pub energy_mean: f64,
    /// Jaccard similarity to the previous window's motif set, 0..=1.
    pub jaccard_prev: f64,
}

/// One analysis window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub t: f64,
    pub window_ms: f64,
    pub observations: Vec<Observation>,
    pub summary: String,
    pub metrics: ReportMetrics,
    pub top_motifs: Vec<MotifCount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<EvidenceBullet>,
}

impl Report {
    /// Motif labels of every observation, in observation order.
    pub fn motif_labels(&self) -> Vec<String> {
        self.observations.iter().map(|o| o.motif.clone()).collect()
    }
}
