//! Rolling convergence stability.

use std::collections::VecDeque;

/// Default number of windows the rolling mean covers.
pub const DEFAULT_STABILITY_WINDOW: usize = 60;
/// Default convergence a window must exceed to count as stable.
pub const DEFAULT_STABILITY_THRESHOLD: f64 = 0.6;

/// Fraction of recent report windows whose convergence exceeded a threshold.
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    window: usize,
    threshold: f64,
    hits: VecDeque<bool>,
}

impl Default for StabilityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_STABILITY_WINDOW, DEFAULT_STABILITY_THRESHOLD)
    }
}

impl StabilityTracker {
    /// `window` is raised to at least 1.
    pub fn new(window: usize, threshold: f64) -> Self {
        let window = window.max(1);
        Self {
            window,
            threshold,
            hits: VecDeque::with_capacity(window),
        }
    }

    /// Record one window's convergence.
    pub fn record(&mut self, convergence: f64) {
        if self.hits.len() == self.window {
            self.hits.pop_front();
        }
        self.hits.push_back(convergence > self.threshold);
    }

    /// Mean of the recorded indicators; 0 before anything is recorded.
    pub fn stability(&self) -> f64 {
        if self.hits.is_empty() {
            return 0.0;
        }
        let stable = self.hits.iter().filter(|&&hit| hit).count();
        stable as f64 / self.hits.len() as f64
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn reset(&mut self) {
        self.hits.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert!(StabilityTracker::default().stability().abs() < f64::EPSILON);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut tracker = StabilityTracker::new(4, 0.6);
        tracker.record(0.6);
        tracker.record(0.61);
        assert!((tracker.stability() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_window_rolls() {
        let mut tracker = StabilityTracker::new(3, 0.5);
        for c in [1.0, 1.0, 1.0, 0.0, 0.0] {
            tracker.record(c);
        }
        assert_eq!(tracker.len(), 3);
        assert!((tracker.stability() - 1.0 / 3.0).abs() < 1e-12);

        tracker.reset();
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_zero_window_is_raised() {
        let mut tracker = StabilityTracker::new(0, 0.5);
        tracker.record(1.0);
        tracker.record(0.0);
        assert_eq!(tracker.window(), 1);
        assert!(tracker.stability().abs() < f64::EPSILON);
    }
}
