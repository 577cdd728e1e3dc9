//! Session recording and replay.
//!
//! A session is the full event stream of one run (frames and reports). It is
//! exported as line-delimited JSON, one event per line, and replayed from the
//! same format for offline divergence analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Frame, Peak, PeakParams, Report, Session, SessionEvent, SessionMetadata};

use super::divergence_analyzer::compute_divergence;
use super::peak_detector::find_peaks;

/// Default run threshold for [`find_peak_divergence`].
pub const DEFAULT_DIVERGENCE_THRESHOLD: f64 = 0.1;

/// Collects events for one run.
#[derive(Debug, Clone)]
pub struct SessionRecorder {
    id: Uuid,
    started: DateTime<Utc>,
    events: Vec<SessionEvent>,
    strategies: Vec<String>,
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started: Utc::now(),
            events: Vec::new(),
            strategies: Vec::new(),
        }
    }

    /// Record the strategy names in the session metadata.
    pub fn with_strategies<I, S>(mut self, strategies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strategies = strategies.into_iter().map(Into::into).collect();
        self
    }

    pub fn push(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.push(SessionEvent::Frame { frame });
    }

    pub fn push_report(&mut self, report: Report) {
        self.push(SessionEvent::Report {
            report: Box::new(report),
        });
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Snapshot of the session so far, stamped with the current time as its end.
    pub fn finish(&self) -> Session {
        Session {
            id: self.id,
            started: self.started,
            ended: Some(Utc::now()),
            events: self.events.clone(),
            metadata: SessionMetadata {
                strategies: self.strategies.clone(),
                ..SessionMetadata::default()
            },
        }
    }

    /// One JSON event per line, no trailing newline.
    pub fn export_ldjson(&self) -> DomainResult<String> {
        let lines = self
            .events
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    /// The finished session as pretty-printed JSON.
    pub fn export_json(&self) -> DomainResult<String> {
        Ok(serde_json::to_string_pretty(&self.finish())?)
    }

    /// Drop all events and restart the clock under a fresh id.
    pub fn clear(&mut self) {
        self.events.clear();
        self.id = Uuid::new_v4();
        self.started = Utc::now();
    }
}

/// Parse one LDJSON line; `line_no` is 1-based and only used for the error.
pub fn parse_session_event(line_no: usize, line: &str) -> DomainResult<SessionEvent> {
    serde_json::from_str(line).map_err(|err| DomainError::SessionParse {
        line: line_no,
        reason: err.to_string(),
    })
}

/// Rebuild a session from LDJSON. Blank lines are ignored; malformed lines
/// are logged and skipped.
pub fn replay_session(ldjson: &str) -> Session {
    let mut events = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in ldjson.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_session_event(idx + 1, line) {
            Ok(event) => events.push(event),
            Err(err) => {
                skipped += 1;
                warn!(error = %err, "skipping malformed session event");
            }
        }
    }

    debug!(events = events.len(), skipped, "session replayed");
    let now = Utc::now();
    Session {
        id: Uuid::new_v4(),
        started: now,
        ended: Some(now),
        events,
        metadata: SessionMetadata::default(),
    }
}

/// Report convergences split alternately into two strategy series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvergenceSeries {
    pub uniform: Vec<f64>,
    pub energy_biased: Vec<f64>,
    /// `|latest uniform - latest energy-biased|` after each report.
    pub divergence: Vec<f64>,
}

/// Split the session's report convergences alternately: the first report goes
/// to `uniform`, the second to `energy_biased`, and so on.
pub fn extract_convergence_series(session: &Session) -> ConvergenceSeries {
    let mut out = ConvergenceSeries::default();

    for report in session.reports() {
        let conv = report.metrics.convergence;
        if out.uniform.len() <= out.energy_biased.len() {
            out.uniform.push(conv);
        } else {
            out.energy_biased.push(conv);
        }

        let u = out.uniform.last().copied().unwrap_or(conv);
        let e = out.energy_biased.last().copied().unwrap_or(conv);
        out.divergence.push((u - e).abs());
    }
    out
}

/// A maximal run of divergence values at or above a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DivergenceInterval {
    pub start: usize,
    /// Inclusive.
    pub end: usize,
    /// Index of the highest value in the run (first one on ties).
    pub peak: usize,
    pub value: f64,
}

/// Threshold runs over `divergence`, highest peak value first.
pub fn find_peak_divergence(divergence: &[f64], threshold: f64) -> Vec<DivergenceInterval> {
    let mut intervals = Vec::new();
    let mut current: Option<DivergenceInterval> = None;

    for (i, &value) in divergence.iter().enumerate() {
        if value >= threshold {
            match current.as_mut() {
                None => {
                    current = Some(DivergenceInterval {
                        start: i,
                        end: i,
                        peak: i,
                        value,
                    });
                }
                Some(run) => {
                    run.end = i;
                    if value > run.value {
                        run.value = value;
                        run.peak = i;
                    }
                }
            }
        } else if let Some(run) = current.take() {
            intervals.push(run);
        }
    }
    intervals.extend(current);

    intervals.sort_by(|a, b| b.value.total_cmp(&a.value));
    intervals
}

/// Peaks of the divergence between the two alternating convergence series,
/// truncated to the shorter one.
pub fn find_peaks_in_session(session: &Session, params: &PeakParams) -> Vec<Peak> {
    let series = extract_convergence_series(session);
    if series.uniform.is_empty() {
        return Vec::new();
    }
    let n = series.uniform.len().min(series.energy_biased.len());
    let points = compute_divergence(&[&series.uniform[..n], &series.energy_biased[..n]]);
    find_peaks(&points, params)
}
