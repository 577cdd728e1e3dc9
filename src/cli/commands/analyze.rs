//! `analyze`: one frame in, one report out.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::display::{evidence_table, heading, list_table, metric, output, report_table, CommandOutput};
use crate::domain::models::{Config, Frame, MotifHistory, Report};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::SierpinskiField;
use crate::services::{
    create_ensemble_report, generate_report, run_ensemble, sample_frame, EnsembleReport,
    ReportContext, SamplingStrategy,
};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Raw RGBA file (width*height*4 bytes); a synthetic frame is rendered when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Frame width in pixels
    #[arg(long, default_value = "128")]
    pub width: usize,

    /// Frame height in pixels
    #[arg(long, default_value = "128")]
    pub height: usize,

    /// Frame timestamp in milliseconds
    #[arg(short, long, default_value = "0")]
    pub t: f64,

    /// Frame layer
    #[arg(long, default_value = "0")]
    pub layer: u32,

    /// Override pyramid levels
    #[arg(long)]
    pub levels: Option<usize>,

    /// Override hash grid size
    #[arg(long)]
    pub grid: Option<usize>,

    /// Sampling strategies to compare (uniform, energy[:k], address)
    #[arg(short, long, value_delimiter = ',', default_value = "uniform,energy,address")]
    pub strategies: Vec<SamplingStrategy>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeOutput {
    pub source: String,
    pub report: Report,
    pub ensemble: EnsembleReport,
}

impl CommandOutput for AnalyzeOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            heading(&format!("Report for {}", self.source)),
            report_table(std::slice::from_ref(&self.report)).to_string(),
            String::new(),
            self.report.summary.clone(),
        ];

        if !self.report.evidence.is_empty() {
            lines.push(String::new());
            lines.push(evidence_table(&self.report.evidence).to_string());
        }

        if !self.ensemble.rankings.is_empty() {
            let mut table = list_table(&["strategy", "convergence", "energy", "diversity", "score"]);
            for r in &self.ensemble.rankings {
                table.add_row(vec![
                    r.strategy.clone(),
                    metric(r.convergence),
                    metric(r.energy),
                    metric(r.diversity),
                    metric(r.score),
                ]);
            }
            lines.push(String::new());
            lines.push(heading("Ensemble"));
            lines.push(table.to_string());
            lines.push(self.ensemble.summary.clone());
        }

        lines.join("\n")
    }
}

/// Apply the command-line overrides and re-validate.
fn effective_config(args: &AnalyzeArgs, config: &Config) -> Result<Config> {
    let mut config = config.clone();
    if let Some(levels) = args.levels {
        config.sampling.levels = levels;
    }
    if let Some(grid) = args.grid {
        config.sampling.grid = grid;
        // widen the label so it still holds every hash bit
        let needed = (grid * grid).div_ceil(5);
        config.sampling.motif_digits = config.sampling.motif_digits.max(needed);
    }
    ConfigLoader::validate(&config).context("Invalid analysis options")?;
    Ok(config)
}

async fn load_frame(args: &AnalyzeArgs) -> Result<(Frame, String)> {
    match &args.input {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read frame from {}", path.display()))?;
            let frame = Frame::new(args.t, args.layer, args.width, args.height, bytes)
                .with_context(|| format!("Invalid frame in {}", path.display()))?;
            Ok((frame, path.display().to_string()))
        }
        None => {
            let field = SierpinskiField::new(args.width, args.height).with_layer(args.layer);
            Ok((field.render(args.t), format!("synthetic frame t={}", args.t)))
        }
    }
}

pub async fn execute(args: AnalyzeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let config = effective_config(&args, config)?;
    let (frame, source) = load_frame(&args).await?;

    let sampling = &config.sampling;
    let (pyramid, samples) = sample_frame(&frame, sampling.levels, sampling.grid);
    let history = MotifHistory::new(sampling.history_capacity);
    let ctx = ReportContext {
        t: frame.t,
        window_ms: sampling.report_every_ms,
        base_level: pyramid.base(),
        motif_history: &history,
        stability: 0.0,
        top_k: sampling.top_motifs,
        motif_digits: sampling.motif_digits,
        evidence: &config.evidence,
    };
    let report = generate_report(&samples, &ctx);

    let results = run_ensemble(&args.strategies, &samples);
    let ensemble = create_ensemble_report(&results);

    output(
        &AnalyzeOutput {
            source,
            report,
            ensemble,
        },
        json_mode,
    );
    Ok(())
}
