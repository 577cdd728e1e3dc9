//! `peaks`: series file in, divergence peaks out.
//!
//! Accepted inputs:
//! - JSON array of arrays: `[[0.1, 0.2], [0.1, 0.4]]`
//! - JSON object of named arrays: `{"uniform": [..], "energy": [..]}`
//! - JSON run history: `[{"t": 0, "strategy": "uniform", "value": 0.5}, ..]`,
//!   bucketed per strategy and aligned on bucket time before comparison
//! - CSV with one column per series and an optional header row
//!
//! `null` and empty cells become NaN and the divergence skips them.

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cli::display::{count_label, heading, output, peak_table, render_list, CommandOutput};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{BucketedSeries, Config, Peak, RunSample, TimedDivergence};
use crate::services::{
    align_buckets, bucketize, compute_divergence, export_peak_csv, find_peaks, pairwise_divergences, summarize_peaks,
};

use super::PeakOverrides;

#[derive(Args, Debug)]
pub struct PeaksArgs {
    /// Series file (.json or .csv)
    pub input: PathBuf,

    /// Print the peaks as CSV
    #[arg(long)]
    pub csv: bool,

    /// Number of peaks to show
    #[arg(short = 'k', long, default_value = "10")]
    pub top: usize,

    /// Bucket width for run-history input
    #[arg(long, default_value = "250")]
    pub bucket_ms: f64,

    /// Baseline strategy for run-history comparisons (defaults to the first)
    #[arg(long)]
    pub baseline: Option<String>,

    #[command(flatten)]
    pub peaks: PeakOverrides,
}

/// Series parsed from an input file, aligned by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSeries {
    pub names: Vec<String>,
    pub values: Vec<Vec<f64>>,
    /// Present for run-history input.
    pub buckets: Option<Vec<BucketedSeries>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeriesFile {
    Arrays(Vec<Vec<Option<f64>>>),
    Named(BTreeMap<String, Vec<Option<f64>>>),
    Runs(Vec<RunSample>),
}

fn fill_nan(values: Vec<Option<f64>>) -> Vec<f64> {
    values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

pub fn parse_series_json(text: &str, bucket_ms: f64) -> DomainResult<ParsedSeries> {
    let file: SeriesFile = serde_json::from_str(text)
        .map_err(|err| DomainError::InvalidSeries(format!("unrecognized JSON layout: {err}")))?;

    let parsed = match file {
        SeriesFile::Arrays(arrays) => ParsedSeries {
            names: (0..arrays.len()).map(|i| format!("series{i}")).collect(),
            values: arrays.into_iter().map(fill_nan).collect(),
            buckets: None,
        },
        SeriesFile::Named(named) => {
            let (names, values) = named.into_iter().map(|(k, v)| (k, fill_nan(v))).unzip();
            ParsedSeries {
                names,
                values,
                buckets: None,
            }
        }
        SeriesFile::Runs(runs) => {
            let buckets = bucketize(&runs, bucket_ms);
            let (_, values) = align_buckets(&buckets);
            ParsedSeries {
                names: buckets.iter().map(|b| b.strategy.clone()).collect(),
                values,
                buckets: Some(buckets),
            }
        }
    };

    if parsed.values.is_empty() {
        return Err(DomainError::InvalidSeries("no series found".to_string()));
    }
    Ok(parsed)
}

fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("null") {
        return Some(f64::NAN);
    }
    cell.parse().ok()
}

pub fn parse_series_csv(text: &str) -> DomainResult<ParsedSeries> {
    let mut rows = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()).peekable();

    let Some(&(_, first)) = rows.peek() else {
        return Err(DomainError::InvalidSeries("empty CSV".to_string()));
    };
    let columns = first.split(',').count();
    let is_header = first.split(',').any(|c| parse_cell(c).is_none());
    let names = if is_header {
        rows.next();
        first.split(',').map(|c| c.trim().to_string()).collect()
    } else {
        (0..columns).map(|i| format!("series{i}")).collect()
    };

    let mut values = vec![Vec::new(); columns];
    for (idx, line) in rows {
        let cells: Vec<&str> = line.split(',').collect();
        if cells.len() != columns {
            return Err(DomainError::InvalidSeries(format!(
                "line {} has {} columns, expected {columns}",
                idx + 1,
                cells.len()
            )));
        }
        for (col, cell) in cells.iter().enumerate() {
            let value = parse_cell(cell).ok_or_else(|| {
                DomainError::InvalidSeries(format!("line {}: not a number: {}", idx + 1, cell.trim()))
            })?;
            values[col].push(value);
        }
    }

    Ok(ParsedSeries {
        names,
        values,
        buckets: None,
    })
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeaksOutput {
    pub source: String,
    pub series: Vec<String>,
    pub points: usize,
    pub total_peaks: usize,
    pub peaks: Vec<Peak>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub pairwise: BTreeMap<String, Vec<TimedDivergence>>,
}

impl CommandOutput for PeaksOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            heading(&format!(
                "{}: {} over {}",
                self.source,
                count_label(self.series.len(), "series", "series"),
                count_label(self.points, "point", "points")
            )),
            render_list("peak", &peak_table(&self.peaks), self.peaks.len()),
        ];
        if self.total_peaks > self.peaks.len() {
            lines.push(format!("({} more not shown)", self.total_peaks - self.peaks.len()));
        }

        for (strategy, mse) in &self.pairwise {
            let mean = if mse.is_empty() {
                0.0
            } else {
                mse.iter().map(|d| d.d).sum::<f64>() / mse.len() as f64
            };
            lines.push(format!("  {strategy}: mean squared divergence {mean:.4} over {} buckets", mse.len()));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: PeaksArgs, config: &Config, json_mode: bool) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read series from {}", args.input.display()))?;

    let parsed = if is_csv(&args.input) {
        parse_series_csv(&text)
    } else {
        parse_series_json(&text, args.bucket_ms)
    }
    .with_context(|| format!("Invalid series file {}", args.input.display()))?;

    let params = args.peaks.apply(&config.peaks);
    let points = compute_divergence(&parsed.values);
    let peaks = find_peaks(&points, &params);
    let top = summarize_peaks(&peaks, args.top);

    if args.csv {
        println!("{}", export_peak_csv(top));
        return Ok(());
    }

    let pairwise = match &parsed.buckets {
        Some(buckets) => {
            let baseline = args
                .baseline
                .clone()
                .or_else(|| parsed.names.first().cloned())
                .unwrap_or_default();
            pairwise_divergences(buckets, &baseline)
        }
        None => BTreeMap::new(),
    };

    output(
        &PeaksOutput {
            source: args.input.display().to_string(),
            series: parsed.names,
            points: points.len(),
            total_peaks: peaks.len(),
            peaks: top.to_vec(),
            pairwise,
        },
        json_mode,
    );
    Ok(())
}
