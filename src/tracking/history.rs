// Frame-indexed observation history for one entity class.
//
// Bounded deque with an explicit retention window instead of an unbounded
// list rewritten wholesale every frame. Insertion order is capture order;
// the cleaner prunes, it never rewinds.

use crate::types::Observation;
use std::collections::VecDeque;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PositionHistory {
    entries: VecDeque<Observation>,
    capacity: usize,
}

impl PositionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an observation. Frame indices must be non-decreasing; a
    /// regression is dropped (detector replay glitch, not an error).
    /// Duplicates with the same frame index are allowed; the cleaner
    /// resolves them.
    pub fn push(&mut self, obs: Observation) -> bool {
        if let Some(last) = self.entries.back() {
            if obs.frame_index < last.frame_index {
                debug!(
                    "dropping out-of-order observation: frame {} after {}",
                    obs.frame_index, last.frame_index
                );
                return false;
            }
        }
        self.entries.push_back(obs);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    pub fn latest(&self) -> Option<&Observation> {
        self.entries.back()
    }

    /// Second-newest entry, the comparison point for outlier checks
    pub fn previous(&self) -> Option<&Observation> {
        let n = self.entries.len();
        if n >= 2 {
            self.entries.get(n - 2)
        } else {
            None
        }
    }

    pub fn oldest(&self) -> Option<&Observation> {
        self.entries.front()
    }

    /// Drop the newest entry (cleaner outlier rejection)
    pub fn drop_latest(&mut self) -> Option<Observation> {
        self.entries.pop_back()
    }

    /// Discard entries that can no longer participate in an attempt:
    /// everything more than `window` frames behind `frame_index`.
    pub fn prune_older_than(&mut self, frame_index: u64, window: u64) {
        while let Some(front) = self.entries.front() {
            if frame_index.saturating_sub(front.frame_index) > window {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    /// Collapse same-frame duplicates at the tail, keeping the highest
    /// confidence candidate.
    pub fn dedupe_latest_frame(&mut self) {
        while self.entries.len() >= 2 {
            let n = self.entries.len();
            let (prev, last) = (self.entries[n - 2], self.entries[n - 1]);
            if prev.frame_index != last.frame_index {
                break;
            }
            let keep = if last.confidence >= prev.confidence {
                last
            } else {
                prev
            };
            self.entries.pop_back();
            self.entries.pop_back();
            self.entries.push_back(keep);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Observation> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(frame_index: u64, x: f32, y: f32, conf: f32) -> Observation {
        Observation {
            center: (x, y),
            frame_index,
            width: 20.0,
            height: 20.0,
            confidence: conf,
        }
    }

    #[test]
    fn test_rejects_frame_regression() {
        let mut history = PositionHistory::new(8);
        assert!(history.push(obs(5, 0.0, 0.0, 0.9)));
        assert!(!history.push(obs(3, 0.0, 0.0, 0.9)));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_frame_index_non_decreasing_after_pushes() {
        let mut history = PositionHistory::new(8);
        for f in [1u64, 1, 2, 4, 4, 7] {
            history.push(obs(f, 0.0, 0.0, 0.5));
        }
        let frames: Vec<u64> = history.iter().map(|o| o.frame_index).collect();
        let mut sorted = frames.clone();
        sorted.sort_unstable();
        assert_eq!(frames, sorted);
    }

    #[test]
    fn test_capacity_bound() {
        let mut history = PositionHistory::new(3);
        for f in 0..10 {
            history.push(obs(f, 0.0, 0.0, 0.5));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.oldest().unwrap().frame_index, 7);
    }

    #[test]
    fn test_prune_retention_window() {
        let mut history = PositionHistory::new(64);
        for f in 0..40 {
            history.push(obs(f, 0.0, 0.0, 0.5));
        }
        history.prune_older_than(39, 30);
        assert_eq!(history.oldest().unwrap().frame_index, 9);
        assert_eq!(history.latest().unwrap().frame_index, 39);
    }

    #[test]
    fn test_dedupe_keeps_highest_confidence() {
        let mut history = PositionHistory::new(8);
        history.push(obs(1, 0.0, 0.0, 0.9));
        history.push(obs(2, 1.0, 1.0, 0.4));
        history.push(obs(2, 2.0, 2.0, 0.8));
        history.push(obs(2, 3.0, 3.0, 0.6));
        history.dedupe_latest_frame();
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().center, (2.0, 2.0));
    }
}
