use serde::{Deserialize, Serialize};

use super::divergence::PeakParams;
use super::evidence::EvidenceConfig;

/// Main configuration structure for the glyph operator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Pyramid sampling and reporting cadence
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Evidence blending weights
    #[serde(default)]
    pub evidence: EvidenceConfig,

    /// Divergence peak detection
    #[serde(default)]
    pub peaks: PeakParams,

    /// Background sampling worker
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Sampling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SamplingConfig {
    /// Pyramid levels per frame (1-16)
    #[serde(default = "default_levels")]
    pub levels: usize,

    /// Perceptual hash grid size (1-11)
    #[serde(default = "default_grid")]
    pub grid: usize,

    /// Base-32 digits per motif label (1-26)
    #[serde(default = "default_motif_digits")]
    pub motif_digits: usize,

    /// Motifs listed per report
    #[serde(default = "default_top_motifs")]
    pub top_motifs: usize,

    /// Reporting cadence in milliseconds
    #[serde(default = "default_report_every_ms")]
    pub report_every_ms: f64,

    /// Frames retained by the operator
    #[serde(default = "default_ring_size")]
    pub ring_size: usize,

    /// Report windows retained for persistence scoring
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Report windows in the rolling stability estimate
    #[serde(default = "default_stability_window")]
    pub stability_window: usize,

    /// Convergence above which a window counts as stable
    #[serde(default = "default_stability_threshold")]
    pub stability_threshold: f64,

    /// Energy-driven cadence switching
    #[serde(default)]
    pub adaptive_cadence: AdaptiveCadenceConfig,
}

const fn default_levels() -> usize {
    4
}

const fn default_grid() -> usize {
    8
}

const fn default_motif_digits() -> usize {
    16
}

const fn default_top_motifs() -> usize {
    3
}

const fn default_report_every_ms() -> f64 {
    250.0
}

const fn default_ring_size() -> usize {
    16
}

const fn default_history_capacity() -> usize {
    20
}

const fn default_stability_window() -> usize {
    60
}

const fn default_stability_threshold() -> f64 {
    0.6
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            grid: default_grid(),
            motif_digits: default_motif_digits(),
            top_motifs: default_top_motifs(),
            report_every_ms: default_report_every_ms(),
            ring_size: default_ring_size(),
            history_capacity: default_history_capacity(),
            stability_window: default_stability_window(),
            stability_threshold: default_stability_threshold(),
            adaptive_cadence: AdaptiveCadenceConfig::default(),
        }
    }
}

/// Adaptive cadence configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AdaptiveCadenceConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Cadence while level-0 energy is high
    #[serde(default = "default_fast_ms")]
    pub fast_ms: f64,

    /// Cadence while level-0 energy is low
    #[serde(default = "default_slow_ms")]
    pub slow_ms: f64,

    #[serde(default = "default_hi_energy")]
    pub hi_energy: f64,

    #[serde(default = "default_lo_energy")]
    pub lo_energy: f64,
}

const fn default_fast_ms() -> f64 {
    120.0
}

const fn default_slow_ms() -> f64 {
    500.0
}

const fn default_hi_energy() -> f64 {
    48.0
}

const fn default_lo_energy() -> f64 {
    18.0
}

impl Default for AdaptiveCadenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            fast_ms: default_fast_ms(),
            slow_ms: default_slow_ms(),
            hi_energy: default_hi_energy(),
            lo_energy: default_lo_energy(),
        }
    }
}

/// Background worker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkerConfig {
    /// Frames analysed concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Pending frames before submitters wait
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

const fn default_concurrency() -> usize {
    2
}

const fn default_queue_depth() -> usize {
    32
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            queue_depth: default_queue_depth(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
