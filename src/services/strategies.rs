//! Sampling strategies and ensemble comparison.
//!
//! A strategy reweights the per-level samples of one frame by appending
//! duplicates of the samples it favours, which amplifies their motif vote.
//! The ensemble helpers run several strategies over the same samples and
//! rank them.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::models::{MotifHash, ViewSample};

/// Weight of convergence in the ensemble ranking score.
pub const RANK_WEIGHT_CONVERGENCE: f64 = 0.4;
/// Weight of mean energy in the ensemble ranking score.
pub const RANK_WEIGHT_ENERGY: f64 = 0.3;
/// Weight of diversity in the ensemble ranking score.
pub const RANK_WEIGHT_DIVERSITY: f64 = 0.3;

const DEFAULT_ENERGY_TOP_K: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SamplingStrategy {
    /// Samples pass through unchanged.
    Uniform,
    /// Appends the `k` highest-energy samples.
    EnergyBiased { k: usize },
    /// Appends the samples of levels 0 and 1.
    AddressAware,
}

impl SamplingStrategy {
    pub fn energy_biased() -> Self {
        Self::EnergyBiased {
            k: DEFAULT_ENERGY_TOP_K,
        }
    }

    /// The strategies the operator compares by default.
    pub fn defaults() -> Vec<Self> {
        vec![Self::Uniform, Self::energy_biased(), Self::AddressAware]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::EnergyBiased { .. } => "energy",
            Self::AddressAware => "address",
        }
    }

    pub fn apply(&self, samples: &[ViewSample]) -> Vec<ViewSample> {
        let mut out = samples.to_vec();
        match self {
            Self::Uniform => {}
            Self::EnergyBiased { k } => {
                let mut by_energy = samples.to_vec();
                by_energy.sort_by(|a, b| b.energy.total_cmp(&a.energy));
                by_energy.truncate(*k);
                out.extend(by_energy);
            }
            Self::AddressAware => {
                out.extend(samples.iter().filter(|s| s.level <= 1).cloned());
            }
        }
        out
    }
}

impl fmt::Display for SamplingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnergyBiased { k } if *k != DEFAULT_ENERGY_TOP_K => write!(f, "energy:{k}"),
            _ => f.write_str(self.name()),
        }
    }
}

impl FromStr for SamplingStrategy {
    type Err = DomainError;

    /// Accepts `uniform`, `address`, `energy` and `energy:<k>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "uniform" => Ok(Self::Uniform),
            "address" | "address_aware" => Ok(Self::AddressAware),
            "energy" | "energy_biased" => Ok(Self::energy_biased()),
            other => other
                .strip_prefix("energy:")
                .and_then(|k| k.parse().ok())
                .map(|k| Self::EnergyBiased { k })
                .ok_or_else(|| DomainError::InvalidStrategy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyMetrics {
    /// Share of the most common motif.
    pub convergence: f64,
    /// Mean sample energy.
    pub energy: f64,
    /// Distinct motifs per sample.
    pub diversity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleResult {
    pub strategy: String,
    pub samples: Vec<ViewSample>,
    pub metrics: StrategyMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsembleComparison {
    pub best_convergence: String,
    pub best_energy: String,
    pub best_diversity: String,
    /// Convergence gap between the two most convergent strategies.
    pub divergence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleRanking {
    pub strategy: String,
    pub convergence: f64,
    pub energy: f64,
    pub diversity: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleReport {
    pub summary: String,
    /// Highest score first.
    pub rankings: Vec<EnsembleRanking>,
}

/// Apply every strategy to the same samples, in the given order.
pub fn run_ensemble(strategies: &[SamplingStrategy], samples: &[ViewSample]) -> Vec<EnsembleResult> {
    strategies
        .iter()
        .map(|strategy| {
            let out = strategy.apply(samples);
            EnsembleResult {
                strategy: strategy.to_string(),
                metrics: strategy_metrics(&out),
                samples: out,
            }
        })
        .collect()
}

pub fn strategy_metrics(samples: &[ViewSample]) -> StrategyMetrics {
    if samples.is_empty() {
        return StrategyMetrics::default();
    }

    let mut counts: HashMap<MotifHash, usize> = HashMap::new();
    for s in samples {
        *counts.entry(s.hash).or_default() += 1;
    }
    let dominant = counts.values().copied().max().unwrap_or(0);
    let n = samples.len() as f64;

    StrategyMetrics {
        convergence: dominant as f64 / n,
        energy: samples.iter().map(|s| s.energy).sum::<f64>() / n,
        diversity: counts.len() as f64 / n,
    }
}

/// Best strategy per metric; the earliest result wins ties.
///
/// With fewer than two results the divergence is 0 and every best is the
/// single result's name, or `"none"`.
pub fn compare_ensemble_results(results: &[EnsembleResult]) -> EnsembleComparison {
    let best_by = |metric: fn(&StrategyMetrics) -> f64| {
        results
            .iter()
            .fold(None::<&EnsembleResult>, |best, r| match best {
                Some(b) if metric(&r.metrics) <= metric(&b.metrics) => Some(b),
                _ => Some(r),
            })
            .map_or_else(|| "none".to_string(), |r| r.strategy.clone())
    };

    let divergence = if results.len() < 2 {
        0.0
    } else {
        let mut conv: Vec<f64> = results.iter().map(|r| r.metrics.convergence).collect();
        conv.sort_by(|a, b| b.total_cmp(a));
        (conv[0] - conv[1]).abs()
    };

    EnsembleComparison {
        best_convergence: best_by(|m| m.convergence),
        best_energy: best_by(|m| m.energy),
        best_diversity: best_by(|m| m.diversity),
        divergence,
    }
}

pub fn create_ensemble_report(results: &[EnsembleResult]) -> EnsembleReport {
    let comparison = compare_ensemble_results(results);

    let mut rankings: Vec<EnsembleRanking> = results
        .iter()
        .map(|r| {
            let m = r.metrics;
            EnsembleRanking {
                strategy: r.strategy.clone(),
                convergence: m.convergence,
                energy: m.energy,
                diversity: m.diversity,
                score: m.convergence * RANK_WEIGHT_CONVERGENCE
                    + m.energy * RANK_WEIGHT_ENERGY
                    + m.diversity * RANK_WEIGHT_DIVERSITY,
            }
        })
        .collect();
    rankings.sort_by(|a, b| b.score.total_cmp(&a.score));

    let summary = format!(
        "Ensemble analysis: {} leads convergence, {} leads energy, {} leads diversity. Divergence: {:.3}",
        comparison.best_convergence,
        comparison.best_energy,
        comparison.best_diversity,
        comparison.divergence
    );

    EnsembleReport { summary, rankings }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(level: usize, hash: u128, energy: f64) -> ViewSample {
        ViewSample {
            layer: 0,
            level,
            hash,
            energy,
            grad: 0.0,
        }
    }

    fn samples() -> Vec<ViewSample> {
        vec![
            sample(0, 1, 10.0),
            sample(1, 2, 40.0),
            sample(2, 2, 30.0),
            sample(3, 3, 5.0),
        ]
    }

    #[test]
    fn test_uniform_is_identity() {
        assert_eq!(SamplingStrategy::Uniform.apply(&samples()), samples());
    }

    #[test]
    fn test_energy_biased_appends_top_k() {
        let out = SamplingStrategy::EnergyBiased { k: 2 }.apply(&samples());
        assert_eq!(out.len(), 6);
        assert_eq!(out[4].level, 1);
        assert_eq!(out[5].level, 2);

        let all = SamplingStrategy::EnergyBiased { k: 10 }.apply(&samples());
        assert_eq!(all.len(), 8);
    }

    #[test]
    fn test_address_aware_appends_low_levels() {
        let out = SamplingStrategy::AddressAware.apply(&samples());
        let appended: Vec<_> = out[4..].iter().map(|s| s.level).collect();
        assert_eq!(appended, vec![0, 1]);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("uniform".parse::<SamplingStrategy>().unwrap(), SamplingStrategy::Uniform);
        assert_eq!(
            "Energy:5".parse::<SamplingStrategy>().unwrap(),
            SamplingStrategy::EnergyBiased { k: 5 }
        );
        assert_eq!(SamplingStrategy::EnergyBiased { k: 5 }.to_string(), "energy:5");
        assert_eq!(SamplingStrategy::energy_biased().to_string(), "energy");
        assert!("random".parse::<SamplingStrategy>().is_err());
    }

    #[test]
    fn test_metrics() {
        let m = strategy_metrics(&samples());
        assert!((m.convergence - 0.5).abs() < 1e-12);
        assert!((m.energy - 21.25).abs() < 1e-12);
        assert!((m.diversity - 0.75).abs() < 1e-12);
        assert_eq!(strategy_metrics(&[]), StrategyMetrics::default());
    }

    #[test]
    fn test_ensemble_comparison_and_report() {
        let results = run_ensemble(&SamplingStrategy::defaults(), &samples());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].strategy, "uniform");

        let comparison = compare_ensemble_results(&results);
        // energy-biased duplicates the two hash-2 samples: 4 of 6
        assert_eq!(comparison.best_convergence, "energy");
        assert_eq!(comparison.best_energy, "energy");
        assert_eq!(comparison.best_diversity, "uniform");
        assert!((comparison.divergence - (4.0 / 6.0 - 0.5)).abs() < 1e-12);

        let report = create_ensemble_report(&results);
        assert_eq!(report.rankings.len(), 3);
        assert!(report.rankings[0].score >= report.rankings[1].score);
        assert!(report.summary.starts_with("Ensemble analysis: energy leads convergence"));
        assert!(report.summary.ends_with("Divergence: 0.167"));
    }

    #[test]
    fn test_comparison_with_single_result() {
        let results = run_ensemble(&[SamplingStrategy::Uniform], &samples());
        let comparison = compare_ensemble_results(&results);
        assert_eq!(comparison.best_energy, "uniform");
        assert!(comparison.divergence.abs() < f64::EPSILON);
        assert_eq!(compare_ensemble_results(&[]).best_convergence, "none");
    }
}
