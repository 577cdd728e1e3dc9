//! CLI command implementations.

pub mod analyze;
pub mod init;
pub mod peaks;
pub mod session;
pub mod simulate;

use clap::Args;

use crate::domain::models::PeakParams;

/// Peak detection options shared by `peaks` and `session`; unset ones keep
/// the configured value.
#[derive(Args, Debug, Clone, Default)]
pub struct PeakOverrides {
    /// Rolling median window
    #[arg(long)]
    pub window: Option<usize>,

    /// Minimum prominence
    #[arg(long)]
    pub prominence_min: Option<f64>,

    /// Minimum index distance between peaks
    #[arg(long)]
    pub distance_min: Option<usize>,
}

impl PeakOverrides {
    pub fn apply(&self, base: &PeakParams) -> PeakParams {
        PeakParams {
            window: self.window.unwrap_or(base.window),
            prominence_min: self.prominence_min.unwrap_or(base.prominence_min),
            distance_min: self.distance_min.unwrap_or(base.distance_min),
            ..base.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_keep_unset_values() {
        let base = PeakParams::default();
        let params = PeakOverrides {
            window: Some(5),
            ..PeakOverrides::default()
        }
        .apply(&base);
        assert_eq!(params.window, 5);
        assert_eq!(params.distance_min, base.distance_min);
        assert!((params.alpha - base.alpha).abs() < f64::EPSILON);
    }
}
