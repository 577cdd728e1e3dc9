//! Aggregates per-level samples into one report window.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::domain::models::{
    EvidenceConfig, MotifCount, MotifHistory, Observation, PyramidLevel, Report, ReportMetrics,
    ViewSample,
};

use super::evidence_scorer::compute_evidence;
use super::motif_hasher::{box_count_dimension, hash_to_base32, BOX_COUNT_THRESHOLDS};

/// Everything a report needs besides the samples themselves.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    /// Report timestamp in milliseconds.
    pub t: f64,
    /// Reporting cadence the window covers.
    pub window_ms: f64,
    /// Level 0 of the pyramid the samples came from, for the fractal dimension.
    pub base_level: Option<&'a PyramidLevel>,
    /// Prior windows' motif sets; evidence is only computed when non-empty.
    pub motif_history: &'a MotifHistory,
    /// Externally supplied rolling stability.
    pub stability: f64,
    /// Motifs listed in `top_motifs`; 0 is treated as 1.
    pub top_k: usize,
    /// Motif label width.
    pub motif_digits: usize,
    /// Weights and thresholds for the evidence bullets.
    pub evidence: &'a EvidenceConfig,
}

/// Build the report for one window. Pure; never fails.
pub fn generate_report(samples: &[ViewSample], ctx: &ReportContext<'_>) -> Report {
    let observations: Vec<Observation> = samples
        .iter()
        .map(|s| Observation {
            t: ctx.t,
            layer: s.layer,
            level: s.level,
            motif: hash_to_base32(s.hash, ctx.motif_digits),
            signal: to_byte(s.energy),
            grad: to_byte(s.grad / 4.0),
        })
        .collect();

    let counts = count_motifs(&observations);
    let dominant = counts.first().map_or(0, |m| m.count);
    let convergence = if observations.is_empty() {
        0.0
    } else {
        dominant as f64 / observations.len() as f64
    };

    let base_sample = samples.iter().find(|s| s.level == 0);
    let fractal_dim = match (base_sample, ctx.base_level) {
        (Some(_), Some(level)) => box_count_dimension(level, &BOX_COUNT_THRESHOLDS),
        _ => 0.0,
    };
    let energy_mean = base_sample.map_or(0.0, |s| s.energy);

    let current: BTreeSet<&str> = observations.iter().map(|o| o.motif.as_str()).collect();
    let jaccard_prev = ctx
        .motif_history
        .latest()
        .map_or(0.0, |prev| jaccard(&current, prev));

    let top_motifs: Vec<MotifCount> = counts.into_iter().take(ctx.top_k.max(1)).collect();

    let summary = if top_motifs.is_empty() {
        format!("No motif convergence in {} views.", observations.len())
    } else {
        let listed = top_motifs
            .iter()
            .map(|m| format!("{}\u{d7}{}", m.motif, m.count))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Convergence motif(s): {listed} across {} views.",
            observations.len()
        )
    };

    let evidence = if ctx.motif_history.is_empty() {
        Vec::new()
    } else {
        compute_evidence(&top_motifs, ctx.motif_history, ctx.stability, ctx.evidence)
    };

    debug!(
        t = ctx.t,
        views = observations.len(),
        convergence,
        fractal_dim,
        "report generated"
    );

    Report {
        t: ctx.t,
        window_ms: ctx.window_ms,
        observations,
        summary,
        metrics: ReportMetrics {
            convergence,
            stability: ctx.stability,
            fractal_dim,
            energy_mean,
            jaccard_prev,
        },
        top_motifs,
        evidence,
    }
}

/// Motif frequencies, most frequent first; ties keep first-seen order.
fn count_motifs(observations: &[Observation]) -> Vec<MotifCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<MotifCount> = Vec::new();
    for o in observations {
        if let Some(&i) = index.get(o.motif.as_str()) {
            counts[i].count += 1;
        } else {
            index.insert(o.motif.as_str(), counts.len());
            counts.push(MotifCount::new(o.motif.clone(), 1));
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

fn jaccard(current: &BTreeSet<&str>, previous: &BTreeSet<String>) -> f64 {
    let intersection = current
        .iter()
        .filter(|m| previous.contains(**m))
        .count();
    let union = current.len() + previous.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn to_byte(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 255.0) as u8
    }
}
