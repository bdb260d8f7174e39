// Trajectory cleaning for the ball path and the hoop anchor.
//
// Ball pass: collapse same-frame duplicates, reject teleports (displacement
// beyond a velocity bound derived from the box diagonal), reject non-square
// boxes, and age out observations past the retention window.
//
// Hoop pass: the anchor is sticky. Same-frame candidates are gated by
// nearest-neighbor distance to the last ball position, single-frame jitter
// keeps the previous anchor, and a genuine relocation is adopted only after
// a run of spatially consistent detections.

use crate::tracking::history::PositionHistory;
use crate::types::{CleaningConfig, Observation};
use tracing::{debug, info};

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// A ball or hoop box should be roughly square; elongated boxes are
/// detector noise (an arm, a shadow under the rim).
fn roughly_square(obs: &Observation, max_aspect_ratio: f32) -> bool {
    !(obs.width * max_aspect_ratio < obs.height || obs.height * max_aspect_ratio < obs.width)
}

// ============================================================================
// BALL CLEANING
// ============================================================================

#[derive(Debug, Clone)]
pub struct TrajectoryCleaner {
    config: CleaningConfig,
}

impl TrajectoryCleaner {
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    /// One cleaning pass over the ball history, run once per frame after
    /// the frame's observations have been appended.
    pub fn clean_ball(&self, history: &mut PositionHistory, frame_index: u64) {
        history.dedupe_latest_frame();

        if let (Some(prev), Some(last)) = (
            history.previous().copied(),
            history.latest().copied(),
        ) {
            let frame_gap = last.frame_index - prev.frame_index;
            let dist = distance(prev.center, last.center);
            let max_dist = self.config.velocity_outlier_ratio * prev.diagonal();

            if dist > max_dist && frame_gap < self.config.outlier_frame_gap {
                debug!(
                    "ball outlier dropped at frame {}: moved {:.0}px in {} frame(s), bound {:.0}px",
                    last.frame_index, dist, frame_gap, max_dist
                );
                history.drop_latest();
            } else if !roughly_square(&last, self.config.ball_max_aspect_ratio) {
                debug!(
                    "ball shape rejected at frame {}: {:.0}x{:.0}",
                    last.frame_index, last.width, last.height
                );
                history.drop_latest();
            }
        }

        history.prune_older_than(frame_index, self.config.ball_retention_frames);
    }
}

// ============================================================================
// HOOP TRACKING
// ============================================================================

/// Maintains the hoop history; its last element is the Hoop Reference all
/// zone geometry anchors to. There is one logical hoop per session.
#[derive(Debug, Clone)]
pub struct HoopTracker {
    config: CleaningConfig,
    history: PositionHistory,
    /// Consecutive detections disagreeing with the current anchor: a
    /// relocation candidate being stabilized
    pending: Vec<Observation>,
}

impl HoopTracker {
    pub fn new(config: CleaningConfig) -> Self {
        let history = PositionHistory::new(config.hoop_max_entries);
        Self {
            config,
            history,
            pending: Vec::new(),
        }
    }

    /// Current Hoop Reference, if the hoop has ever been observed
    pub fn anchor(&self) -> Option<&Observation> {
        self.history.latest()
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    /// Pick one of the frame's hoop candidates: the one nearest the most
    /// recent ball position (strictly closer wins on comparison; ties keep
    /// the earlier candidate). Without ball data, highest confidence wins.
    pub fn select_candidate(
        candidates: &[Observation],
        last_ball: Option<(f32, f32)>,
    ) -> Option<Observation> {
        if candidates.is_empty() {
            return None;
        }
        let best = match last_ball {
            Some(ball) => candidates.iter().fold(candidates[0], |best, c| {
                if distance(c.center, ball) < distance(best.center, ball) {
                    *c
                } else {
                    best
                }
            }),
            None => candidates.iter().fold(candidates[0], |best, c| {
                if c.confidence > best.confidence {
                    *c
                } else {
                    best
                }
            }),
        };
        Some(best)
    }

    /// Feed the frame's selected hoop candidate.
    pub fn observe(&mut self, candidate: Observation, last_ball: Option<(f32, f32)>) {
        if !roughly_square(&candidate, self.config.hoop_max_aspect_ratio) {
            debug!(
                "hoop shape rejected at frame {}: {:.0}x{:.0}",
                candidate.frame_index, candidate.width, candidate.height
            );
            return;
        }

        let anchor = match self.history.latest().copied() {
            None => {
                info!(
                    "🏀 hoop anchor established at ({:.0}, {:.0}), frame {}",
                    candidate.center.0, candidate.center.1, candidate.frame_index
                );
                self.history.push(candidate);
                return;
            }
            Some(anchor) => anchor,
        };

        let tolerance = self.config.hoop_jitter_ratio * anchor.diagonal();
        let frame_gap = candidate.frame_index.saturating_sub(anchor.frame_index);

        // Consistent with the anchor: the anchor advances.
        if distance(candidate.center, anchor.center) <= tolerance {
            self.history.push(candidate);
            self.pending.clear();
            return;
        }

        // Disagreeing candidate. The anchor may only move toward a candidate
        // strictly closer to the ball than the current anchor, so a rim
        // reflection on the far side of the court never steals it.
        if let Some(ball) = last_ball {
            if distance(candidate.center, ball) >= distance(anchor.center, ball) {
                debug!(
                    "hoop candidate at ({:.0}, {:.0}) rejected: farther from ball than anchor",
                    candidate.center.0, candidate.center.1
                );
                self.pending.clear();
                return;
            }
        }

        // Redetected after a long absence (camera pan): accept directly.
        if frame_gap >= self.config.outlier_frame_gap {
            self.history.push(candidate);
            self.pending.clear();
            return;
        }

        // Require a run of mutually consistent detections before jumping.
        if let Some(first) = self.pending.first() {
            if distance(candidate.center, first.center)
                > self.config.hoop_jitter_ratio * first.diagonal()
            {
                self.pending.clear();
            }
        }
        self.pending.push(candidate);

        if self.pending.len() >= self.config.hoop_stabilize_run {
            info!(
                "🏀 hoop anchor moved to ({:.0}, {:.0}) after {} consistent detection(s)",
                candidate.center.0,
                candidate.center.1,
                self.pending.len()
            );
            self.history.push(candidate);
            self.pending.clear();
        } else {
            debug!(
                "holding hoop anchor: relocation candidate {}/{}",
                self.pending.len(),
                self.config.hoop_stabilize_run
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(frame_index: u64, x: f32, y: f32) -> Observation {
        Observation {
            center: (x, y),
            frame_index,
            width: 20.0,
            height: 20.0,
            confidence: 0.8,
        }
    }

    fn hoop(frame_index: u64, x: f32, y: f32) -> Observation {
        Observation {
            center: (x, y),
            frame_index,
            width: 50.0,
            height: 40.0,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_ball_teleport_dropped() {
        let cleaner = TrajectoryCleaner::new(CleaningConfig::default());
        let mut history = PositionHistory::new(64);
        history.push(ball(10, 100.0, 100.0));
        // diag(20x20) ~ 28.3, bound ~ 113px; 500px in one frame is a teleport
        history.push(ball(11, 600.0, 100.0));
        cleaner.clean_ball(&mut history, 11);
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().frame_index, 10);
    }

    #[test]
    fn test_ball_plausible_motion_kept() {
        let cleaner = TrajectoryCleaner::new(CleaningConfig::default());
        let mut history = PositionHistory::new(64);
        history.push(ball(10, 100.0, 100.0));
        history.push(ball(11, 130.0, 80.0));
        cleaner.clean_ball(&mut history, 11);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_ball_elongated_box_dropped() {
        let cleaner = TrajectoryCleaner::new(CleaningConfig::default());
        let mut history = PositionHistory::new(64);
        history.push(ball(10, 100.0, 100.0));
        let mut stretched = ball(11, 110.0, 100.0);
        stretched.width = 20.0;
        stretched.height = 60.0;
        history.push(stretched);
        cleaner.clean_ball(&mut history, 11);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_ball_retention_window() {
        let cleaner = TrajectoryCleaner::new(CleaningConfig::default());
        let mut history = PositionHistory::new(64);
        history.push(ball(0, 100.0, 100.0));
        history.push(ball(40, 110.0, 100.0));
        cleaner.clean_ball(&mut history, 40);
        assert_eq!(history.len(), 1);
        assert_eq!(history.oldest().unwrap().frame_index, 40);
    }

    #[test]
    fn test_hoop_jitter_keeps_previous_anchor() {
        let mut tracker = HoopTracker::new(CleaningConfig::default());
        tracker.observe(hoop(1, 640.0, 300.0), None);
        // diag(50x40) ~ 64, tolerance ~ 32px; a 200px jump is jitter
        tracker.observe(hoop(2, 840.0, 300.0), None);
        assert_eq!(tracker.anchor().unwrap().center, (640.0, 300.0));
    }

    #[test]
    fn test_hoop_relocation_adopted_after_consistent_run() {
        let mut tracker = HoopTracker::new(CleaningConfig::default());
        tracker.observe(hoop(1, 640.0, 300.0), None);
        for f in 2..5 {
            tracker.observe(hoop(f, 840.0, 300.0), None);
        }
        assert_eq!(tracker.anchor().unwrap().center, (840.0, 300.0));
    }

    #[test]
    fn test_hoop_inconsistent_run_resets() {
        let mut tracker = HoopTracker::new(CleaningConfig::default());
        tracker.observe(hoop(1, 640.0, 300.0), None);
        tracker.observe(hoop(2, 840.0, 300.0), None);
        tracker.observe(hoop(3, 1040.0, 300.0), None); // disagrees with the pending run too
        tracker.observe(hoop(4, 840.0, 300.0), None);
        assert_eq!(tracker.anchor().unwrap().center, (640.0, 300.0));
    }

    #[test]
    fn test_select_candidate_nearest_to_ball() {
        let far = hoop(5, 100.0, 100.0);
        let near = hoop(5, 640.0, 300.0);
        let chosen =
            HoopTracker::select_candidate(&[far, near], Some((620.0, 250.0))).unwrap();
        assert_eq!(chosen.center, (640.0, 300.0));
    }

    #[test]
    fn test_reflection_never_steals_anchor() {
        let mut tracker = HoopTracker::new(CleaningConfig::default());
        tracker.observe(hoop(1, 640.0, 300.0), Some((630.0, 320.0)));
        // A persistent spurious detection far from the ball
        for f in 2..10 {
            tracker.observe(hoop(f, 1100.0, 500.0), Some((630.0, 320.0)));
        }
        assert_eq!(tracker.anchor().unwrap().center, (640.0, 300.0));
    }
}
