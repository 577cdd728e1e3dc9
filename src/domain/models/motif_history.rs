//! Bounded history of recent report windows' motif sets.
//!
//! Fixed memory: a slot arena with a head index. Pushing into a full history
//! overwrites (and returns) the oldest window. There is no hidden shared state;
//! the reporting loop owns its history and is its only writer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Motif labels observed in one report window.
pub type MotifWindow = BTreeSet<String>;

/// Ring buffer of motif windows, oldest evicted first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotifHistory {
    /// Slot arena, `capacity` long.
    slots: Vec<Option<MotifWindow>>,

    /// Slot holding the oldest window.
    head: usize,

    /// Number of occupied slots.
    len: usize,
}

impl Default for MotifHistory {
    fn default() -> Self {
        Self::new(20)
    }
}

impl MotifHistory {
    /// Create an empty history holding at most `capacity` windows (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![None; capacity],
            head: 0,
            len: 0,
        }
    }

    /// Build a history from windows given oldest first.
    pub fn from_windows<I, W, S>(capacity: usize, windows: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = Self::new(capacity);
        for window in windows {
            history.push(window.into_iter().map(Into::into).collect());
        }
        history
    }

    /// Append the newest window, returning the evicted oldest one when full.
    pub fn push(&mut self, window: MotifWindow) -> Option<MotifWindow> {
        let capacity = self.capacity();
        if self.len < capacity {
            let tail = (self.head + self.len) % capacity;
            self.slots[tail] = Some(window);
            self.len += 1;
            None
        } else {
            let evicted = self.slots[self.head].replace(window);
            self.head = (self.head + 1) % capacity;
            evicted
        }
    }

    /// Append a window from any iterator of labels.
    pub fn push_labels<I, S>(&mut self, labels: I) -> Option<MotifWindow>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(labels.into_iter().map(Into::into).collect())
    }

    /// The most recent window.
    pub fn latest(&self) -> Option<&MotifWindow> {
        self.iter_recent().next()
    }

    /// Windows from newest to oldest.
    pub fn iter_recent(&self) -> impl Iterator<Item = &MotifWindow> + '_ {
        let capacity = self.capacity();
        (0..self.len)
            .rev()
            .filter_map(move |offset| self.slots[(self.head + offset) % capacity].as_ref())
    }

    /// Windows from oldest to newest.
    pub fn iter_chronological(&self) -> impl Iterator<Item = &MotifWindow> + '_ {
        let capacity = self.capacity();
        (0..self.len)
            .filter_map(move |offset| self.slots[(self.head + offset) % capacity].as_ref())
    }

    /// Number of consecutive most-recent windows containing `motif`.
    pub fn run_length(&self, motif: &str) -> usize {
        self.iter_recent()
            .take_while(|window| window.contains(motif))
            .count()
    }

    /// Windows currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True before the first push or after `clear`.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum windows kept before the oldest is evicted.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drop every window.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(labels: &[&str]) -> MotifWindow {
        labels.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_new_history_is_empty() {
        let history = MotifHistory::new(3);
        assert!(history.is_empty());
        assert_eq!(history.capacity(), 3);
        assert!(history.latest().is_none());
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut history = MotifHistory::new(0);
        assert_eq!(history.capacity(), 1);
        history.push(window(&["A"]));
        let evicted = history.push(window(&["B"]));
        assert_eq!(evicted, Some(window(&["A"])));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_ring_buffer_wrap_evicts_oldest() {
        let mut history = MotifHistory::new(3);
        for label in ["A", "B", "C"] {
            assert!(history.push(window(&[label])).is_none());
        }
        let evicted = history.push(window(&["D"]));
        assert_eq!(evicted, Some(window(&["A"])));

        let order: Vec<_> = history
            .iter_chronological()
            .map(|w| w.iter().next().cloned().unwrap_or_default())
            .collect();
        assert_eq!(order, vec!["B", "C", "D"]);
        assert_eq!(history.latest(), Some(&window(&["D"])));
    }

    #[test]
    fn test_run_length_stops_at_first_gap() {
        let history = MotifHistory::from_windows(
            10,
            vec![vec!["X", "Y"], vec!["Y"], vec!["X", "Y"], vec!["X"]],
        );
        assert_eq!(history.run_length("X"), 2);
        assert_eq!(history.run_length("Y"), 0);
        assert_eq!(history.run_length("Z"), 0);
    }

    #[test]
    fn test_clear_resets() {
        let mut history = MotifHistory::from_windows(2, vec![vec!["A"], vec!["B"], vec!["C"]]);
        assert_eq!(history.len(), 2);
        history.clear();
        assert!(history.is_empty());
        history.push(window(&["E"]));
        assert_eq!(history.latest(), Some(&window(&["E"])));
    }
}
