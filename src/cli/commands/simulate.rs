//! `simulate`: drive the sampling operator over synthetic frames.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::cli::display::{colorize_cadence, count_label, heading, millis, output, report_table, CommandOutput};
use crate::cli::output::{create_progress_bar, hidden_progress_bar, ProgressBarExt};
use crate::domain::models::{Config, Frame, Report};
use crate::infrastructure::SierpinskiField;
use crate::services::{
    CadenceReason, LatestReportFilter, OperatorEvent, SamplingOperator, SamplingWorker, SessionRecorder,
};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of frames to generate
    #[arg(short = 'n', long, default_value = "40")]
    pub frames: usize,

    /// Milliseconds between frames
    #[arg(long, default_value = "50")]
    pub step_ms: f64,

    /// Frame width in pixels
    #[arg(long, default_value = "64")]
    pub width: usize,

    /// Frame height in pixels
    #[arg(long, default_value = "64")]
    pub height: usize,

    /// Frame layer
    #[arg(long, default_value = "0")]
    pub layer: u32,

    /// Write the session as line-delimited JSON
    #[arg(short, long)]
    pub record: Option<PathBuf>,

    /// Enable energy-driven cadence switching
    #[arg(long)]
    pub adaptive: bool,

    /// Analyse every frame on the background worker instead of the operator
    #[arg(long, conflicts_with = "adaptive")]
    pub offload: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CadenceChange {
    pub t: f64,
    pub ms: f64,
    pub reason: CadenceReason,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateOutput {
    pub session_id: String,
    pub frames: usize,
    pub reports: Vec<Report>,
    pub cadence_changes: Vec<CadenceChange>,
    /// Worker reports discarded as stale.
    pub dropped: usize,
    pub final_stability: f64,
    pub recorded_to: Option<String>,
}

impl CommandOutput for SimulateOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            heading(&format!(
                "Simulated {} into {}",
                count_label(self.frames, "frame", "frames"),
                count_label(self.reports.len(), "report", "reports")
            )),
            report_table(&self.reports).to_string(),
        ];

        if !self.cadence_changes.is_empty() {
            lines.push(String::new());
            for change in &self.cadence_changes {
                lines.push(format!(
                    "  t={:.0} cadence -> {} ({})",
                    change.t,
                    millis(change.ms),
                    colorize_cadence(change.reason)
                ));
            }
        }
        if self.dropped > 0 {
            lines.push(format!("Dropped {} stale", count_label(self.dropped, "report", "reports")));
        }

        lines.push(format!("Final stability: {:.3}", self.final_stability));
        if let Some(path) = &self.recorded_to {
            lines.push(format!("Session {} recorded to {path}", self.session_id));
        }
        lines.join("\n")
    }
}

struct RunResult {
    reports: Vec<Report>,
    cadence_changes: Vec<CadenceChange>,
    dropped: usize,
    final_stability: f64,
}

fn run_operator(
    config: &Config,
    adaptive: bool,
    frames: Vec<Frame>,
    recorder: &mut SessionRecorder,
    progress: &indicatif::ProgressBar,
) -> RunResult {
    let mut sampling = config.sampling.clone();
    sampling.adaptive_cadence.enabled |= adaptive;

    let mut operator = SamplingOperator::new(sampling, config.evidence.clone());
    let mut reports = Vec::new();
    let mut cadence_changes = Vec::new();

    for frame in frames {
        let now = frame.t;
        recorder.push_frame(frame.clone());
        for event in operator.ingest(frame, now) {
            match event {
                OperatorEvent::Report { report } => {
                    recorder.push_report((*report).clone());
                    reports.push(*report);
                }
                OperatorEvent::Cadence { ms, reason } => {
                    cadence_changes.push(CadenceChange { t: now, ms, reason });
                }
            }
        }
        progress.inc(1);
    }

    RunResult {
        reports,
        cadence_changes,
        dropped: 0,
        final_stability: operator.stability(),
    }
}

async fn run_offloaded(
    config: &Config,
    frames: Vec<Frame>,
    recorder: &mut SessionRecorder,
    progress: &indicatif::ProgressBar,
) -> Result<RunResult> {
    let worker = SamplingWorker::new(config.sampling.clone(), &config.worker);
    let (handle, mut receiver) = worker.spawn();

    let collector = tokio::spawn(async move {
        let mut filter = LatestReportFilter::new();
        let mut accepted = Vec::new();
        let mut dropped = 0usize;
        while let Some(report) = receiver.recv().await {
            if filter.accept(&report) {
                accepted.push(report);
            } else {
                dropped += 1;
            }
        }
        (accepted, dropped)
    });

    for frame in frames {
        recorder.push_frame(frame.clone());
        handle.submit(frame).await?;
        progress.inc(1);
    }
    let dispatched = handle.shutdown().await?;
    let (reports, dropped) = collector.await.context("Report collector failed")?;
    info!(dispatched, accepted = reports.len(), dropped, "offloaded run finished");

    for report in &reports {
        recorder.push_report(report.clone());
    }

    Ok(RunResult {
        reports,
        cadence_changes: Vec::new(),
        dropped,
        final_stability: 0.0,
    })
}

pub async fn execute(args: SimulateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let field = SierpinskiField::new(args.width, args.height).with_layer(args.layer);
    let frames: Vec<Frame> = field.frames(0.0, args.step_ms, args.frames).collect();

    let strategy = if args.offload { "worker" } else { "operator" };
    let mut recorder = SessionRecorder::new().with_strategies([strategy]);

    let progress = if json_mode {
        hidden_progress_bar()
    } else {
        create_progress_bar(args.frames as u64)
    };

    let run = if args.offload {
        run_offloaded(config, frames, &mut recorder, &progress).await?
    } else {
        run_operator(config, args.adaptive, frames, &mut recorder, &progress)
    };
    progress.finish_success("frames processed");

    let recorded_to = match &args.record {
        Some(path) => {
            let ldjson = recorder.export_ldjson().context("Failed to serialize session")?;
            tokio::fs::write(path, ldjson)
                .await
                .with_context(|| format!("Failed to write session to {}", path.display()))?;
            Some(path.display().to_string())
        }
        None => None,
    };

    output(
        &SimulateOutput {
            session_id: recorder.id().to_string(),
            frames: args.frames,
            reports: run.reports,
            cadence_changes: run.cadence_changes,
            dropped: run.dropped,
            final_stability: run.final_stability,
            recorded_to,
        },
        json_mode,
    );
    Ok(())
}
