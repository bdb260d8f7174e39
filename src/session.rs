// Per-run tracking session.
//
// Owns every piece of per-run state (histories, hoop anchor, state
// machine, totals, overlay) so multiple sessions can run side by side
// with no ambient globals. One call per frame, strictly frame-synchronous:
// adapt → append → clean → classify → step → (cadence) resolve → fade.

use crate::detection::{person_zone, DetectionAdapter, FrameObservations};
use crate::tracking::{
    HoopTracker, PositionHistory, ScoringEvaluator, ShotState, ShotStateMachine,
    TrajectoryCleaner, ZoneClassifier,
};
use crate::types::{
    Config, Observation, OverlayState, OverlayStatus, PersonZone, RawDetection, SessionTotals,
    ShotEvent, ShotOutcome,
};
use tracing::{debug, info};

/// What the rendering/output collaborator gets back for one frame
#[derive(Debug, Clone)]
pub struct FrameResult {
    pub frame_index: u64,
    pub totals: SessionTotals,
    pub overlay: OverlayStatus,
    pub overlay_color: (u8, u8, u8),
    /// Present only on the frame an attempt resolved
    pub event: Option<ShotEvent>,
    pub person_zones: Vec<(Observation, PersonZone)>,
}

pub struct ShotSession {
    adapter: DetectionAdapter,
    zones: ZoneClassifier,
    cleaner: TrajectoryCleaner,
    scorer: ScoringEvaluator,
    state_machine: ShotStateMachine,

    ball: PositionHistory,
    hoop: HoopTracker,
    person: PositionHistory,

    totals: SessionTotals,
    overlay: OverlayState,
    last_frame: Option<u64>,
}

impl ShotSession {
    pub fn new(config: &Config) -> Self {
        // Room for the retention window plus the odd same-frame duplicate
        // that cleaning collapses on the next pass
        let ball_capacity = config.cleaning.ball_retention_frames as usize * 2;
        Self {
            adapter: DetectionAdapter::new(config.detection.clone()),
            zones: ZoneClassifier::new(config.zones.clone()),
            cleaner: TrajectoryCleaner::new(config.cleaning.clone()),
            scorer: ScoringEvaluator::new(config.zones.clone()),
            state_machine: ShotStateMachine::new(config.shot.clone()),
            ball: PositionHistory::new(ball_capacity),
            hoop: HoopTracker::new(config.cleaning.clone()),
            // Rendering hints only, a short tail is plenty
            person: PositionHistory::new(64),
            totals: SessionTotals::default(),
            overlay: OverlayState::new(config.shot.fade_frames),
            last_frame: None,
        }
    }

    pub fn totals(&self) -> SessionTotals {
        self.totals
    }

    pub fn hoop_anchor(&self) -> Option<&Observation> {
        self.hoop.anchor()
    }

    pub fn state(&self) -> ShotState {
        self.state_machine.state()
    }

    /// Process one frame of detector output. Frame indices must be strictly
    /// increasing; a duplicate or regression is skipped with the current
    /// snapshot returned unchanged.
    pub fn process_frame(
        &mut self,
        frame_index: u64,
        boxes: &[RawDetection],
        frame_width: f32,
        frame_height: f32,
    ) -> FrameResult {
        if let Some(last) = self.last_frame {
            if frame_index <= last {
                debug!(
                    "skipping out-of-order frame {} (last processed {})",
                    frame_index, last
                );
                return self.snapshot(frame_index, Vec::new());
            }
        }
        self.last_frame = Some(frame_index);
        self.overlay.decay();

        // Relaxed ball acceptance is anchored to the hoop as known BEFORE
        // this frame's hoop update.
        let proximity = self.hoop.anchor().map(|h| self.zones.proximity_region(h));
        let observations =
            self.adapter
                .adapt(frame_index, boxes, frame_height, proximity.as_ref());

        let person_zones = self.ingest(frame_index, &observations, frame_width);
        let event = self.detect_shot(frame_index);

        self.snapshot(frame_index, person_zones)
            .with_event(event)
    }

    /// Append the frame's observations and run the cleaning passes
    fn ingest(
        &mut self,
        frame_index: u64,
        observations: &FrameObservations,
        frame_width: f32,
    ) -> Vec<(Observation, PersonZone)> {
        for obs in &observations.ball {
            self.ball.push(*obs);
        }
        self.cleaner.clean_ball(&mut self.ball, frame_index);

        let last_ball = self.ball.latest().map(|o| o.center);
        if let Some(candidate) = HoopTracker::select_candidate(&observations.hoop, last_ball) {
            self.hoop.observe(candidate, last_ball);
        }

        let mut person_zones = Vec::with_capacity(observations.person.len());
        for obs in &observations.person {
            self.person.push(*obs);
            person_zones.push((*obs, person_zone(obs, frame_width)));
        }
        person_zones
    }

    /// Step the state machine on the cleaned ball position and resolve a
    /// completed transit on the cadence tick. Skipped entirely while the
    /// hoop has never been seen or the ball history is empty: "no data
    /// this cycle" is a no-op, not an error.
    fn detect_shot(&mut self, frame_index: u64) -> Option<ShotEvent> {
        let hoop = match self.hoop.anchor().copied() {
            Some(h) => h,
            None => return None,
        };
        let ball = match self.ball.latest().copied() {
            Some(b) => b,
            None => return None,
        };

        let above = self.zones.above_region(&hoop);
        let below = self.zones.below_region(&hoop);
        self.state_machine.step(&ball, &above, &below);

        let window = self.state_machine.try_resolve(frame_index)?;
        let outcome = self.scorer.evaluate(&self.ball, &hoop);
        self.totals.record(outcome);
        self.overlay.set(match outcome {
            ShotOutcome::Make => OverlayStatus::Make,
            ShotOutcome::Miss => OverlayStatus::Miss,
        });

        info!(
            "{} {} {}/{}",
            if outcome == ShotOutcome::Make {
                "✅"
            } else {
                "❌"
            },
            outcome.as_str(),
            self.totals.makes,
            self.totals.attempts
        );

        Some(ShotEvent {
            up_frame: window.up_frame,
            down_frame: window.down_frame,
            resolved_frame: frame_index,
            outcome,
            totals: self.totals,
        })
    }

    fn snapshot(
        &self,
        frame_index: u64,
        person_zones: Vec<(Observation, PersonZone)>,
    ) -> FrameResult {
        FrameResult {
            frame_index,
            totals: self.totals,
            overlay: self.overlay.status,
            overlay_color: self.overlay.status.color(),
            event: None,
            person_zones,
        }
    }
}

impl FrameResult {
    fn with_event(mut self, event: Option<ShotEvent>) -> Self {
        if let Some(ref ev) = event {
            self.overlay = match ev.outcome {
                ShotOutcome::Make => OverlayStatus::Make,
                ShotOutcome::Miss => OverlayStatus::Miss,
            };
            self.overlay_color = self.overlay.color();
            self.totals = ev.totals;
        }
        self.event = event;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f32 = 1280.0;
    const H: f32 = 720.0;

    fn hoop_box() -> RawDetection {
        // center (640, 300), 50x40
        RawDetection {
            class_id: 1,
            confidence: 0.9,
            x1: 615.0,
            y1: 280.0,
            x2: 665.0,
            y2: 320.0,
        }
    }

    fn ball_box(cx: f32, cy: f32) -> RawDetection {
        // 30x30 box; velocity outlier bound is 4x the diagonal (~170px)
        RawDetection {
            class_id: 0,
            confidence: 0.8,
            x1: cx - 15.0,
            y1: cy - 15.0,
            x2: cx + 15.0,
            y2: cy + 15.0,
        }
    }

    fn person_box(cx: f32) -> RawDetection {
        RawDetection {
            class_id: 2,
            confidence: 0.7,
            x1: cx - 30.0,
            y1: 400.0,
            x2: cx + 30.0,
            y2: 560.0,
        }
    }

    /// Drive frames 1..=end; ball boxes appear on the listed frames
    fn run(session: &mut ShotSession, end: u64, ball_frames: &[(u64, f32, f32)], with_hoop: bool) {
        for frame in 1..=end {
            let mut boxes = Vec::new();
            if with_hoop {
                boxes.push(hoop_box());
            }
            for &(f, x, y) in ball_frames {
                if f == frame {
                    boxes.push(ball_box(x, y));
                }
            }
            session.process_frame(frame, &boxes, W, H);
        }
    }

    #[test]
    fn test_clean_make_counts_attempt_and_make() {
        let mut session = ShotSession::new(&Config::default());
        // Above rim at frame 10, straight down through the rim at frame 14
        run(
            &mut session,
            20,
            &[(10, 640.0, 250.0), (14, 640.0, 350.0)],
            true,
        );
        let totals = session.totals();
        assert_eq!(totals.attempts, 1);
        assert_eq!(totals.makes, 1);
    }

    #[test]
    fn test_offset_descent_counts_attempt_not_make() {
        let mut session = ShotSession::new(&Config::default());
        // Crosses the rim plane left of the rim width (predicted x ~ 610
        // against a 620..660 rim band) without tripping the velocity bound
        run(
            &mut session,
            20,
            &[(10, 640.0, 250.0), (14, 540.0, 350.0)],
            true,
        );
        let totals = session.totals();
        assert_eq!(totals.attempts, 1);
        assert_eq!(totals.makes, 0);
    }

    #[test]
    fn test_below_without_above_is_not_an_attempt() {
        let mut session = ShotSession::new(&Config::default());
        run(&mut session, 30, &[(14, 640.0, 350.0)], true);
        let totals = session.totals();
        assert_eq!(totals.attempts, 0);
        assert_eq!(totals.makes, 0);
    }

    #[test]
    fn test_no_hoop_means_no_attempts() {
        let mut session = ShotSession::new(&Config::default());
        run(
            &mut session,
            30,
            &[(10, 640.0, 250.0), (14, 640.0, 350.0)],
            false,
        );
        let totals = session.totals();
        assert_eq!(totals.attempts, 0);
        assert_eq!(totals.makes, 0);
        assert!(session.hoop_anchor().is_none());
    }

    #[test]
    fn test_hoop_candidate_nearest_ball_wins() {
        let mut session = ShotSession::new(&Config::default());
        // Establish a ball position first
        session.process_frame(1, &[ball_box(630.0, 320.0)], W, H);
        // Two hoop candidates: one across the frame, one at the ball
        let far = RawDetection {
            class_id: 1,
            confidence: 0.95,
            x1: 75.0,
            y1: 80.0,
            x2: 125.0,
            y2: 120.0,
        };
        session.process_frame(2, &[far, hoop_box()], W, H);
        let anchor = session.hoop_anchor().expect("anchor established");
        assert_eq!(anchor.center, (640.0, 300.0));
    }

    #[test]
    fn test_makes_never_exceed_attempts() {
        let mut session = ShotSession::new(&Config::default());
        // A make, a miss, and some noise between
        run(
            &mut session,
            60,
            &[
                (10, 640.0, 250.0),
                (14, 640.0, 350.0),
                (35, 640.0, 250.0),
                (39, 520.0, 350.0),
            ],
            true,
        );
        let totals = session.totals();
        assert_eq!(totals.attempts, 2);
        assert!(totals.makes <= totals.attempts);
    }

    #[test]
    fn test_event_carries_attempt_window() {
        let mut session = ShotSession::new(&Config::default());
        let mut event = None;
        for frame in 1..=20 {
            let mut boxes = vec![hoop_box()];
            match frame {
                10 => boxes.push(ball_box(640.0, 250.0)),
                14 => boxes.push(ball_box(640.0, 350.0)),
                _ => {}
            }
            let result = session.process_frame(frame, &boxes, W, H);
            if result.event.is_some() {
                event = result.event;
            }
        }
        let event = event.expect("attempt resolved");
        assert_eq!(event.up_frame, 10);
        assert_eq!(event.down_frame, 14);
        assert_eq!(event.resolved_frame, 20);
        assert_eq!(event.outcome, ShotOutcome::Make);
    }

    #[test]
    fn test_out_of_order_frame_skipped() {
        let mut session = ShotSession::new(&Config::default());
        session.process_frame(5, &[hoop_box()], W, H);
        let result = session.process_frame(3, &[ball_box(640.0, 250.0)], W, H);
        assert!(result.event.is_none());
        // The stale ball box was not ingested
        assert_eq!(session.state(), ShotState::Idle);
    }

    #[test]
    fn test_person_zone_labels_in_result() {
        let mut session = ShotSession::new(&Config::default());
        let result = session.process_frame(1, &[person_box(100.0), person_box(1200.0)], W, H);
        let zones: Vec<PersonZone> = result.person_zones.iter().map(|(_, z)| *z).collect();
        assert_eq!(zones, vec![PersonZone::Left, PersonZone::Right]);
    }

    #[test]
    fn test_overlay_reflects_outcome_then_fades() {
        let mut session = ShotSession::new(&Config::default());
        let mut saw_make = false;
        for frame in 1..=60 {
            let mut boxes = vec![hoop_box()];
            match frame {
                10 => boxes.push(ball_box(640.0, 250.0)),
                14 => boxes.push(ball_box(640.0, 350.0)),
                _ => {}
            }
            let result = session.process_frame(frame, &boxes, W, H);
            if result.overlay == OverlayStatus::Make {
                saw_make = true;
            }
            if frame == 60 {
                // 20-frame fade long expired
                assert_eq!(result.overlay, OverlayStatus::Waiting);
            }
        }
        assert!(saw_make);
    }
}
