//! Infrastructure layer module
//!
//! Everything the analysis core deliberately stays out of:
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//! - The synthetic frame source used in place of a rendering surface

pub mod config;
pub mod frame_source;
pub mod logging;

pub use frame_source::SierpinskiField;
