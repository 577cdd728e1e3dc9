//! `session`: replay a recorded LDJSON session and look for divergence.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::display::{count_label, heading, list_table, output, peak_table, render_list, CommandOutput};
use crate::domain::models::{Config, Peak};
use crate::services::session_recorder::DEFAULT_DIVERGENCE_THRESHOLD;
use crate::services::{
    extract_convergence_series, find_peak_divergence, find_peaks_in_session, replay_session, summarize_peaks,
    DivergenceInterval,
};

use super::PeakOverrides;

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Recorded session (one JSON event per line)
    pub input: PathBuf,

    /// Divergence level that opens an interval
    #[arg(long, default_value_t = DEFAULT_DIVERGENCE_THRESHOLD)]
    pub threshold: f64,

    /// Number of peaks to show
    #[arg(short = 'k', long, default_value = "10")]
    pub top: usize,

    #[command(flatten)]
    pub peaks: PeakOverrides,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutput {
    pub events: usize,
    pub reports: usize,
    pub mean_convergence: f64,
    pub intervals: Vec<DivergenceInterval>,
    pub peaks: Vec<Peak>,
}

impl CommandOutput for SessionOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            heading(&format!(
                "Replayed {} ({})",
                count_label(self.events, "event", "events"),
                count_label(self.reports, "report", "reports")
            )),
            format!("Mean convergence: {:.3}", self.mean_convergence),
            String::new(),
        ];

        let mut table = list_table(&["start", "end", "peak", "value"]);
        for i in &self.intervals {
            table.add_row(vec![
                i.start.to_string(),
                i.end.to_string(),
                i.peak.to_string(),
                format!("{:.4}", i.value),
            ]);
        }
        lines.push(render_list("divergence interval", &table, self.intervals.len()));
        lines.push(String::new());
        lines.push(render_list("peak", &peak_table(&self.peaks), self.peaks.len()));
        lines.join("\n")
    }
}

pub async fn execute(args: SessionArgs, config: &Config, json_mode: bool) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read session from {}", args.input.display()))?;

    let session = replay_session(&text);
    let reports: Vec<f64> = session.reports().map(|r| r.metrics.convergence).collect();
    let mean_convergence = if reports.is_empty() {
        0.0
    } else {
        reports.iter().sum::<f64>() / reports.len() as f64
    };

    let series = extract_convergence_series(&session);
    let intervals = find_peak_divergence(&series.divergence, args.threshold);

    let params = args.peaks.apply(&config.peaks);
    let peaks = find_peaks_in_session(&session, &params);

    output(
        &SessionOutput {
            events: session.events.len(),
            reports: reports.len(),
            mean_convergence,
            intervals,
            peaks: summarize_peaks(&peaks, args.top).to_vec(),
        },
        json_mode,
    );
    Ok(())
}
