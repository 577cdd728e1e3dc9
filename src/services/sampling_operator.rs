//! Periodic sampling loop over an incoming frame stream.
//!
//! The operator is driven by its caller: every frame is handed to
//! [`SamplingOperator::ingest`] together with the caller's clock, and a report
//! is produced whenever the current cadence has elapsed since the last one.
//! The operator is the single producer for its motif history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::models::{
    AdaptiveCadenceConfig, EvidenceConfig, Frame, MotifHistory, Report, SamplingConfig,
};

use super::motif_hasher::sample_frame;
use super::report_generator::{generate_report, ReportContext};
use super::stability_tracker::StabilityTracker;

/// Why the reporting cadence changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceReason {
    EnergyHigh,
    EnergyLow,
    Manual,
}

impl CadenceReason {
    /// Stable snake_case name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnergyHigh => "energy_high",
            Self::EnergyLow => "energy_low",
            Self::Manual => "manual",
        }
    }
}

/// Output of [`SamplingOperator::ingest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OperatorEvent {
    /// A report window closed.
    Report { report: Box<Report> },
    /// The cadence switched to `ms`.
    Cadence { ms: f64, reason: CadenceReason },
}

/// Buffers frames and emits a report every cadence period.
pub struct SamplingOperator {
    config: SamplingConfig,
    evidence: EvidenceConfig,
    frames: VecDeque<Frame>,
    history: MotifHistory,
    stability: StabilityTracker,
    cadence_ms: f64,
    last_report_ms: f64,
    reports: u64,
}

impl SamplingOperator {
    /// The clock starts at 0; see [`SamplingOperator::start_at`].
    pub fn new(config: SamplingConfig, evidence: EvidenceConfig) -> Self {
        let ring_size = config.ring_size.max(1);
        Self {
            frames: VecDeque::with_capacity(ring_size),
            history: MotifHistory::new(config.history_capacity),
            stability: StabilityTracker::new(config.stability_window, config.stability_threshold),
            cadence_ms: config.report_every_ms,
            last_report_ms: 0.0,
            reports: 0,
            evidence,
            config,
        }
    }

    /// Restart the cadence clock at `now_ms`.
    pub fn start_at(&mut self, now_ms: f64) {
        self.last_report_ms = now_ms;
    }

    /// Buffer `frame` and report on the newest buffered frame once the
    /// cadence has elapsed. A cadence change is emitted before the report
    /// that caused it.
    pub fn ingest(&mut self, frame: Frame, now_ms: f64) -> Vec<OperatorEvent> {
        if self.frames.len() >= self.config.ring_size.max(1) {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);

        if now_ms - self.last_report_ms < self.cadence_ms {
            return Vec::new();
        }
        self.last_report_ms = now_ms;

        let Some(latest) = self.frames.back() else {
            return Vec::new();
        };

        let (pyramid, samples) = sample_frame(latest, self.config.levels, self.config.grid);
        let ctx = ReportContext {
            t: latest.t,
            window_ms: self.cadence_ms,
            base_level: pyramid.base(),
            motif_history: &self.history,
            stability: self.stability.stability(),
            top_k: self.config.top_motifs,
            motif_digits: self.config.motif_digits,
            evidence: &self.evidence,
        };
        let report = generate_report(&samples, &ctx);

        self.history
            .push_labels(report.observations.iter().map(|o| o.motif.clone()));
        self.stability.record(report.metrics.convergence);
        self.reports += 1;

        let mut events = Vec::with_capacity(2);
        if self.config.adaptive_cadence.enabled {
            let energy = samples.first().map_or(0.0, |s| s.energy);
            if let Some(event) = self.adapt_cadence(energy) {
                events.push(event);
            }
        }

        debug!(
            t = report.t,
            convergence = report.metrics.convergence,
            stability = report.metrics.stability,
            "operator report"
        );
        events.push(OperatorEvent::Report {
            report: Box::new(report),
        });
        events
    }

    /// Override the cadence; `None` when it is unchanged.
    pub fn set_cadence(&mut self, ms: f64) -> Option<OperatorEvent> {
        self.switch_cadence(ms, CadenceReason::Manual)
    }

    fn adapt_cadence(&mut self, energy: f64) -> Option<OperatorEvent> {
        let AdaptiveCadenceConfig {
            fast_ms,
            slow_ms,
            hi_energy,
            lo_energy,
            ..
        } = self.config.adaptive_cadence;

        if energy >= hi_energy {
            self.switch_cadence(fast_ms, CadenceReason::EnergyHigh)
        } else if energy <= lo_energy {
            self.switch_cadence(slow_ms, CadenceReason::EnergyLow)
        } else {
            // hysteresis band
            None
        }
    }

    fn switch_cadence(&mut self, ms: f64, reason: CadenceReason) -> Option<OperatorEvent> {
        if (ms - self.cadence_ms).abs() < f64::EPSILON {
            return None;
        }
        info!(
            from_ms = self.cadence_ms,
            to_ms = ms,
            reason = reason.as_str(),
            "cadence changed"
        );
        self.cadence_ms = ms;
        Some(OperatorEvent::Cadence { ms, reason })
    }

    /// Current reporting cadence.
    pub fn cadence_ms(&self) -> f64 {
        self.cadence_ms
    }

    /// Rolling stability fed into each report.
    pub fn stability(&self) -> f64 {
        self.stability.stability()
    }

    /// Motif sets of past reports.
    pub fn history(&self) -> &MotifHistory {
        &self.history
    }

    /// Frames waiting for the next report.
    pub fn buffered_frames(&self) -> usize {
        self.frames.len()
    }

    /// Reports produced since creation or the last reset.
    pub fn reports_emitted(&self) -> u64 {
        self.reports
    }

    /// Drop buffered frames, motif history and stability.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.history.clear();
        self.stability.reset();
        self.cadence_ms = self.config.report_every_ms;
        self.reports = 0;
    }
}
