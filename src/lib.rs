//! Glyph Operator - temporal multi-scale motif sampling
//!
//! Frames are reduced to an image pyramid, each level is hashed into a
//! perceptual motif, and the motifs of a reporting window are aggregated into
//! a report with convergence, stability, fractal-dimension and evidence
//! scores. Convergence series from competing sampling strategies are compared
//! and the points where they diverge most are reported as peaks.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): data records and boundary errors
//! - **Service Layer** (`services`): the analysis pipeline, operator and worker
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, frame source
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```
//! use glyph_operator::services::{compute_divergence, find_peaks};
//! use glyph_operator::domain::models::PeakParams;
//!
//! let a = [0.1, 0.1, 0.9, 0.1, 0.1];
//! let b = [0.1, 0.1, 0.1, 0.1, 0.1];
//! let points = compute_divergence(&[&a[..], &b[..]]);
//! let params = PeakParams { window: 3, distance_min: 1, ..PeakParams::default() };
//! let peaks = find_peaks(&points, &params);
//! assert_eq!(peaks[0].index, 2);
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, DivergencePoint, Frame, MotifHistory, Peak, PeakParams, Pyramid, Report, ViewSample,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{SamplingOperator, SamplingWorker, SessionRecorder};
