//! Divergence signals across aligned strategy series.

use std::collections::{BTreeMap, HashMap};

use crate::domain::models::{BucketPoint, BucketedSeries, DivergencePoint, RunSample, TimedDivergence};

/// Per-index spread of N aligned series.
///
/// The series are truncated to the shortest length; any empty series yields
/// an empty result. NaN values are dropped per index; an index with nothing
/// left reports zero delta and baseline.
pub fn compute_divergence<S: AsRef<[f64]>>(series: &[S]) -> Vec<DivergencePoint> {
    let Some(length) = series.iter().map(|s| s.as_ref().len()).min() else {
        return Vec::new();
    };

    (0..length)
        .map(|index| {
            let values: Vec<f64> = series
                .iter()
                .map(|s| s.as_ref()[index])
                .filter(|v| !v.is_nan())
                .collect();

            if values.is_empty() {
                return DivergencePoint {
                    index,
                    delta: 0.0,
                    baseline: 0.0,
                };
            }

            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let baseline = values.iter().sum::<f64>() / values.len() as f64;

            DivergencePoint {
                index,
                delta: (max - min).max(0.0),
                baseline,
            }
        })
        .collect()
}

/// Group runs into per-strategy time buckets of `bucket_ms` (mean value per bucket).
///
/// Series come out sorted by strategy name, points by bucket time.
pub fn bucketize(runs: &[RunSample], bucket_ms: f64) -> Vec<BucketedSeries> {
    let bucket_ms = if bucket_ms > 0.0 { bucket_ms } else { 1.0 };
    let mut by_strategy: BTreeMap<&str, BTreeMap<i64, (f64, usize)>> = BTreeMap::new();

    for run in runs.iter().filter(|r| r.t.is_finite()) {
        let bucket = (run.t / bucket_ms).floor() as i64;
        let entry = by_strategy
            .entry(run.strategy.as_str())
            .or_default()
            .entry(bucket)
            .or_insert((0.0, 0));
        entry.0 += run.value;
        entry.1 += 1;
    }

    by_strategy
        .into_iter()
        .map(|(strategy, buckets)| BucketedSeries {
            strategy: strategy.to_string(),
            points: buckets
                .into_iter()
                .map(|(bucket, (sum, count))| BucketPoint {
                    t: bucket as f64 * bucket_ms,
                    value: sum / count as f64,
                    count,
                })
                .collect(),
        })
        .collect()
}

/// Lay bucketed series out on the sorted union of their bucket times.
///
/// Returns the shared time axis and one value per time for each series, with
/// NaN where a series has no bucket, so the result is index-aligned for
/// [`compute_divergence`].
pub fn align_buckets(series: &[BucketedSeries]) -> (Vec<f64>, Vec<Vec<f64>>) {
    let mut times: Vec<f64> = series.iter().flat_map(|s| s.points.iter().map(|p| p.t)).collect();
    times.sort_by(f64::total_cmp);
    times.dedup_by(|a, b| a.to_bits() == b.to_bits());

    let slot: HashMap<u64, usize> = times.iter().enumerate().map(|(i, t)| (t.to_bits(), i)).collect();
    let values = series
        .iter()
        .map(|s| {
            let mut row = vec![f64::NAN; times.len()];
            for p in &s.points {
                if let Some(&i) = slot.get(&p.t.to_bits()) {
                    row[i] = p.value;
                }
            }
            row
        })
        .collect();

    (times, values)
}

/// Squared difference of two bucketed series at their common bucket times.
pub fn divergence_mse(a: &BucketedSeries, b: &BucketedSeries) -> Vec<TimedDivergence> {
    let b_by_time: HashMap<u64, f64> = b.points.iter().map(|p| (p.t.to_bits(), p.value)).collect();

    let mut out: Vec<TimedDivergence> = a
        .points
        .iter()
        .filter_map(|p| {
            b_by_time.get(&p.t.to_bits()).map(|bv| TimedDivergence {
                t: p.t,
                d: (p.value - bv).powi(2),
            })
        })
        .collect();
    out.sort_by(|x, y| x.t.total_cmp(&y.t));
    out
}

/// MSE divergence of every strategy against `baseline_strategy`.
///
/// Empty when the baseline strategy is absent.
pub fn pairwise_divergences(
    series: &[BucketedSeries],
    baseline_strategy: &str,
) -> BTreeMap<String, Vec<TimedDivergence>> {
    let Some(baseline) = series.iter().find(|s| s.strategy == baseline_strategy) else {
        return BTreeMap::new();
    };

    series
        .iter()
        .filter(|s| s.strategy != baseline_strategy)
        .map(|s| (s.strategy.clone(), divergence_mse(s, baseline)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(t: f64, strategy: &str, value: f64) -> RunSample {
        RunSample {
            t,
            strategy: strategy.to_string(),
            value,
        }
    }

    #[test]
    fn test_two_series_delta_and_baseline() {
        let points = compute_divergence(&[vec![0.1, 0.2, 0.8], vec![0.2, 0.1, 0.2]]);
        assert_eq!(points.len(), 3);
        assert!((points[0].delta - 0.1).abs() < 1e-10);
        assert!((points[2].delta - 0.6).abs() < 1e-10);
        assert!((points[2].baseline - 0.5).abs() < 1e-10);
        assert_eq!(points[1].index, 1);
    }

    #[test]
    fn test_truncates_to_shortest_series() {
        let points = compute_divergence(&[vec![1.0, 2.0, 3.0], vec![0.0, 0.0]]);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_empty_inputs() {
        let none: Vec<Vec<f64>> = Vec::new();
        assert!(compute_divergence(&none).is_empty());
        assert!(compute_divergence(&[vec![1.0], vec![]]).is_empty());
    }

    #[test]
    fn test_nan_values_are_dropped() {
        let points = compute_divergence(&[
            vec![f64::NAN, 0.5, f64::NAN],
            vec![f64::NAN, 0.1, 0.3],
            vec![f64::NAN, 0.2, 0.9],
        ]);
        assert!(points[0].delta.abs() < f64::EPSILON);
        assert!(points[0].baseline.abs() < f64::EPSILON);
        assert!((points[1].delta - 0.4).abs() < 1e-10);
        assert!((points[2].delta - 0.6).abs() < 1e-10);
        assert!((points[2].baseline - 0.6).abs() < 1e-10);
    }

    #[test]
    fn test_three_way_divergence() {
        let points = compute_divergence(&[[0.0, 1.0], [0.5, 1.0], [1.0, 1.0]]);
        assert!((points[0].delta - 1.0).abs() < 1e-12);
        assert!(points[1].delta.abs() < 1e-12);
    }

    #[test]
    fn test_bucketize_groups_and_averages() {
        let runs = vec![
            run(2500.0, "uniform", 0.2),
            run(100.0, "uniform", 0.4),
            run(1900.0, "uniform", 0.6),
            run(300.0, "energy", 1.0),
        ];
        let series = bucketize(&runs, 2000.0);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].strategy, "energy");
        let uniform = &series[1];
        assert_eq!(uniform.points.len(), 2);
        assert!((uniform.points[0].t - 0.0).abs() < f64::EPSILON);
        assert!((uniform.points[0].value - 0.5).abs() < 1e-12);
        assert_eq!(uniform.points[0].count, 2);
        assert!((uniform.points[1].t - 2000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_align_buckets_fills_missing_times() {
        let runs = vec![
            run(0.0, "uniform", 0.3),
            run(250.0, "uniform", 0.6),
            run(250.0, "energy", 0.5),
        ];
        let (times, values) = align_buckets(&bucketize(&runs, 250.0));
        assert_eq!(times, vec![0.0, 250.0]);
        assert!(values[0][0].is_nan());
        assert!((values[0][1] - 0.5).abs() < 1e-12);
        assert_eq!(values[1], vec![0.3, 0.6]);

        let points = compute_divergence(&values);
        assert_eq!(points.len(), 2);
        assert!(points[0].delta.abs() < f64::EPSILON);
        assert!((points[1].delta - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_mse_on_common_times_and_pairwise() {
        let runs = vec![
            run(0.0, "base", 0.5),
            run(2000.0, "base", 0.5),
            run(0.0, "other", 0.1),
            run(4000.0, "other", 0.9),
        ];
        let series = bucketize(&runs, 2000.0);
        let pairwise = pairwise_divergences(&series, "base");
        assert_eq!(pairwise.len(), 1);
        let other = &pairwise["other"];
        assert_eq!(other.len(), 1);
        assert!((other[0].d - 0.16).abs() < 1e-12);

        assert!(pairwise_divergences(&series, "missing").is_empty());
    }
}
