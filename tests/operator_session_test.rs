//! Operator driven by the synthetic field, recorded and replayed as a session.

use glyph_operator::domain::models::{EvidenceConfig, PeakParams, Report, SamplingConfig, SessionEvent};
use glyph_operator::infrastructure::SierpinskiField;
use glyph_operator::services::evidence_scorer::{evidence_stats, format_evidence_bullets};
use glyph_operator::services::{
    extract_convergence_series, find_peak_divergence, find_peaks_in_session, replay_session, OperatorEvent,
    SamplingOperator, SessionRecorder,
};

fn run(frames: usize, step_ms: f64, recorder: &mut SessionRecorder) -> Vec<Report> {
    let field = SierpinskiField::new(64, 64);
    let mut operator = SamplingOperator::new(SamplingConfig::default(), EvidenceConfig::default());
    let mut reports = Vec::new();

    for frame in field.frames(0.0, step_ms, frames) {
        let now = frame.t;
        recorder.push_frame(frame.clone());
        for event in operator.ingest(frame, now) {
            if let OperatorEvent::Report { report } = event {
                recorder.push_report((*report).clone());
                reports.push(*report);
            }
        }
    }
    assert!((0.0..=1.0).contains(&operator.stability()));
    reports
}

#[test]
fn test_operator_reports_on_cadence() {
    let mut recorder = SessionRecorder::new();
    let reports = run(40, 50.0, &mut recorder);

    let ts: Vec<f64> = reports.iter().map(|r| r.t).collect();
    assert_eq!(ts, vec![250.0, 500.0, 750.0, 1000.0, 1250.0, 1500.0, 1750.0]);

    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.observations.len(), 4);
        assert!((0.0..=1.0).contains(&report.metrics.convergence));
        assert!((0.0..=1.0).contains(&report.metrics.stability));
        assert!((0.0..=2.0).contains(&report.metrics.fractal_dim));
        assert!((0.0..=1.0).contains(&report.metrics.jaccard_prev));
        // evidence needs at least one earlier window
        assert_eq!(report.evidence.is_empty(), i == 0);
        assert!(report.summary.ends_with("across 4 views."));
    }
}

#[test]
fn test_evidence_formatting_of_live_report() {
    let mut recorder = SessionRecorder::new();
    let reports = run(20, 50.0, &mut recorder);
    let last = reports.last().unwrap();
    let config = EvidenceConfig::default();

    let lines = format_evidence_bullets(&last.evidence, &config);
    assert_eq!(lines.len(), last.evidence.len());
    assert!(lines.iter().all(|l| l.starts_with("• ")));

    let stats = evidence_stats(&last.evidence, &config);
    assert_eq!(stats.total_bullets, last.evidence.len());
    assert!((0.0..=1.0).contains(&stats.avg_confidence));
    assert!(stats.high_confidence_count <= stats.total_bullets);
}

#[test]
fn test_session_round_trip_and_analysis() {
    let mut recorder = SessionRecorder::new().with_strategies(["uniform", "energy"]);
    let reports = run(40, 50.0, &mut recorder);

    let ldjson = recorder.export_ldjson().unwrap();
    assert_eq!(ldjson.lines().count(), 40 + reports.len());

    let replayed = replay_session(&ldjson);
    assert_eq!(replayed.events, recorder.finish().events);
    assert_eq!(replayed.reports().count(), reports.len());
    assert!(matches!(replayed.events[0], SessionEvent::Frame { .. }));

    let series = extract_convergence_series(&replayed);
    assert_eq!(series.uniform.len(), 4);
    assert_eq!(series.energy_biased.len(), 3);
    assert_eq!(series.divergence.len(), reports.len());
    assert!(series.divergence.iter().all(|d| *d >= 0.0));

    for interval in find_peak_divergence(&series.divergence, 0.0) {
        assert!(interval.start <= interval.peak && interval.peak <= interval.end);
    }

    let params = PeakParams {
        window: 3,
        prominence_min: 0.0,
        distance_min: 1,
        ..PeakParams::default()
    };
    for peak in find_peaks_in_session(&replayed, &params) {
        assert!(peak.index > 0 && peak.index < 2);
    }
}
