use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::services::motif_hasher::{MAX_GRID, MAX_MOTIF_DIGITS};

/// Highest pyramid depth accepted from configuration.
pub const MAX_LEVELS: usize = 16;

/// Project configuration directory.
pub const CONFIG_DIR: &str = ".glyph";
/// Project configuration file inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yaml";
/// Uncommitted local overrides inside [`CONFIG_DIR`].
pub const LOCAL_CONFIG_FILE: &str = "local.yaml";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid levels: {0}. Must be between 1 and {MAX_LEVELS}")]
    InvalidLevels(usize),

    #[error("Invalid grid: {0}. Must be between 1 and {MAX_GRID}")]
    InvalidGrid(usize),

    #[error("Invalid motif_digits: {0}. Must be between 1 and {MAX_MOTIF_DIGITS}")]
    InvalidMotifDigits(usize),

    #[error("Invalid motif_digits: {digits} digits hold {} bits but grid {grid} hashes {} bits", .digits * 5, .grid * .grid)]
    MotifLabelTooShort { digits: usize, grid: usize },

    #[error("Invalid top_motifs: {0}. Must be at least 1")]
    InvalidTopMotifs(usize),

    #[error("Invalid {0}: must be at least 1")]
    ZeroCapacity(&'static str),

    #[error("Invalid report_every_ms: {0}. Must be positive")]
    InvalidCadence(f64),

    #[error("Invalid stability_threshold: {0}. Must be between 0 and 1")]
    InvalidStabilityThreshold(f64),

    #[error("Invalid evidence weight {name}: {value}. Must not be negative")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("Invalid peaks window: must be at least 1")]
    InvalidPeakWindow,

    #[error("Invalid prominence_min: {0}. Must not be negative")]
    InvalidProminence(f64),

    #[error("Invalid adaptive cadence: fast_ms ({0}) must not exceed slow_ms ({1})")]
    InvalidCadenceRange(f64, f64),

    #[error("Invalid adaptive cadence: lo_energy ({0}) must not exceed hi_energy ({1})")]
    InvalidEnergyRange(f64, f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .glyph/config.yaml (project config)
    /// 3. .glyph/local.yaml (local overrides, optional)
    /// 4. Environment variables (GLYPH_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(format!("{CONFIG_DIR}/{CONFIG_FILE}")))
            .merge(Yaml::file(format!("{CONFIG_DIR}/{LOCAL_CONFIG_FILE}")))
            .merge(Env::prefixed("GLYPH_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// The default configuration rendered as YAML.
    pub fn default_yaml() -> Result<String> {
        serde_yaml::to_string(&Config::default()).context("Failed to serialize default configuration")
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let sampling = &config.sampling;

        if sampling.levels == 0 || sampling.levels > MAX_LEVELS {
            return Err(ConfigError::InvalidLevels(sampling.levels));
        }
        if sampling.grid == 0 || sampling.grid > MAX_GRID {
            return Err(ConfigError::InvalidGrid(sampling.grid));
        }
        if sampling.motif_digits == 0 || sampling.motif_digits > MAX_MOTIF_DIGITS {
            return Err(ConfigError::InvalidMotifDigits(sampling.motif_digits));
        }
        // every hash bit must survive base-32 encoding
        if sampling.motif_digits * 5 < sampling.grid * sampling.grid {
            return Err(ConfigError::MotifLabelTooShort {
                digits: sampling.motif_digits,
                grid: sampling.grid,
            });
        }
        if sampling.top_motifs == 0 {
            return Err(ConfigError::InvalidTopMotifs(sampling.top_motifs));
        }
        if sampling.report_every_ms.is_nan() || sampling.report_every_ms <= 0.0 {
            return Err(ConfigError::InvalidCadence(sampling.report_every_ms));
        }

        for (name, value) in [
            ("ring_size", sampling.ring_size),
            ("history_capacity", sampling.history_capacity),
            ("stability_window", sampling.stability_window),
            ("worker.concurrency", config.worker.concurrency),
            ("worker.queue_depth", config.worker.queue_depth),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroCapacity(name));
            }
        }

        if !(0.0..=1.0).contains(&sampling.stability_threshold) {
            return Err(ConfigError::InvalidStabilityThreshold(
                sampling.stability_threshold,
            ));
        }

        let cadence = &sampling.adaptive_cadence;
        if cadence.enabled {
            if cadence.fast_ms > cadence.slow_ms {
                return Err(ConfigError::InvalidCadenceRange(
                    cadence.fast_ms,
                    cadence.slow_ms,
                ));
            }
            if cadence.lo_energy > cadence.hi_energy {
                return Err(ConfigError::InvalidEnergyRange(
                    cadence.lo_energy,
                    cadence.hi_energy,
                ));
            }
        }

        let evidence = &config.evidence;
        for (name, value) in [
            ("w_convergence", evidence.w_convergence),
            ("w_persistence", evidence.w_persistence),
            ("w_stability", evidence.w_stability),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }

        if config.peaks.window == 0 {
            return Err(ConfigError::InvalidPeakWindow);
        }
        if config.peaks.prominence_min.is_nan() || config.peaks.prominence_min < 0.0 {
            return Err(ConfigError::InvalidProminence(config.peaks.prominence_min));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
