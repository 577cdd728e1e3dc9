//! Confidence scoring for motifs that recur across report windows.
//!
//! Each current motif gets a blended confidence from three signals:
//!
//! - **convergence**: its share of the current motif count, doubled so that a
//!   single dominant motif saturates quickly
//! - **persistence**: the run length of consecutive recent history windows
//!   containing it, normalised by `max(min_persistence, 3)`
//! - **stability**: the externally supplied rolling stability
//!
//! ```text
//! confidence = clamp01(w_c * min(1, 2 * share)
//!                    + w_p * min(1, persisted / max(min_persistence, 3))
//!                    + w_s * min(1, stability))
//! ```

use tracing::debug;

use crate::domain::models::{EvidenceBullet, EvidenceConfig, EvidenceStats, MotifCount, MotifHistory};

/// Confidence above which a bullet counts as high-confidence.
pub const HIGH_CONFIDENCE: f64 = 0.7;

/// Score every current motif against the history, highest confidence first.
///
/// Equal confidences keep the input order.
pub fn compute_evidence(
    current_motifs: &[MotifCount],
    history: &MotifHistory,
    stability: f64,
    config: &EvidenceConfig,
) -> Vec<EvidenceBullet> {
    if current_motifs.is_empty() {
        return Vec::new();
    }

    let total: usize = current_motifs.iter().map(|m| m.count).sum();
    let persistence_norm = config.min_persistence.max(3) as f64;
    let stability_score = stability.min(1.0);

    let mut evidence: Vec<EvidenceBullet> = current_motifs
        .iter()
        .map(|m| {
            let persisted = history.run_length(&m.motif);
            let share = if total > 0 {
                m.count as f64 / total as f64
            } else {
                0.0
            };

            let convergence_score = (share * 2.0).min(1.0);
            let persistence_score = (persisted as f64 / persistence_norm).min(1.0);
            let confidence = config.w_convergence * convergence_score
                + config.w_persistence * persistence_score
                + config.w_stability * stability_score;

            EvidenceBullet {
                motif: m.motif.clone(),
                count: m.count,
                persisted,
                confidence: clamp01(confidence),
            }
        })
        .collect();

    evidence.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    debug!(
        bullets = evidence.len(),
        history_windows = history.len(),
        stability,
        "evidence computed"
    );
    evidence
}

/// One display line per bullet.
pub fn format_evidence_bullets(evidence: &[EvidenceBullet], config: &EvidenceConfig) -> Vec<String> {
    evidence
        .iter()
        .map(|e| {
            let pct = (e.confidence * 100.0).round();
            let status = if e.persisted >= config.min_persistence {
                "persistent"
            } else {
                "new"
            };
            format!(
                "\u{2022} {} \u{d7}{} ({} {}w) \u{2014} confidence {}%",
                e.motif, e.count, status, e.persisted, pct
            )
        })
        .collect()
}

/// Summary statistics over a set of bullets.
pub fn evidence_stats(evidence: &[EvidenceBullet], config: &EvidenceConfig) -> EvidenceStats {
    if evidence.is_empty() {
        return EvidenceStats::default();
    }

    EvidenceStats {
        total_bullets: evidence.len(),
        avg_confidence: evidence.iter().map(|e| e.confidence).sum::<f64>() / evidence.len() as f64,
        persistent_count: evidence
            .iter()
            .filter(|e| e.persisted >= config.min_persistence)
            .count(),
        high_confidence_count: evidence
            .iter()
            .filter(|e| e.confidence > HIGH_CONFIDENCE)
            .count(),
    }
}

/// NaN maps to 0.
pub(crate) fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
