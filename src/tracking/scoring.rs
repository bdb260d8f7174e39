// Make/miss evaluation for a resolved attempt.
//
// Finds the last cleaned ball observation above the rim plane and its
// successor below it, fits the line through the pair, and projects where
// that line crosses the rim plane. A make requires the crossing x to fall
// within the rim width, a strictly tighter band than the attempt zones:
// "passed near the rim" and "passed through the rim" differ exactly there.

use crate::tracking::history::PositionHistory;
use crate::tracking::zones::ZoneClassifier;
use crate::types::{Observation, ShotOutcome, ZoneConfig};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ScoringEvaluator {
    config: ZoneConfig,
}

impl ScoringEvaluator {
    pub fn new(config: ZoneConfig) -> Self {
        Self { config }
    }

    /// Judge the attempt from the cleaned ball history and the hoop anchor
    /// at resolution time. Pure: no state, no side effects.
    pub fn evaluate(&self, ball: &PositionHistory, hoop: &Observation) -> ShotOutcome {
        let rim_y = ZoneClassifier::rim_level(hoop);

        let crossing = match self.rim_crossing(ball, rim_y) {
            Some(pair) => pair,
            None => {
                debug!("no rim crossing found in ball history, scoring miss");
                return ShotOutcome::Miss;
            }
        };
        let (over, under) = crossing;

        let predicted_x = Self::x_at_y(&over, &under, rim_y);
        let rim_half_width = self.config.rim_width_ratio * hoop.width;
        let (cx, _) = hoop.center;

        let made = predicted_x > cx - rim_half_width && predicted_x < cx + rim_half_width;
        debug!(
            "rim crossing x={:.0} vs rim [{:.0}, {:.0}]: {}",
            predicted_x,
            cx - rim_half_width,
            cx + rim_half_width,
            if made { "make" } else { "miss" }
        );
        if made {
            ShotOutcome::Make
        } else {
            ShotOutcome::Miss
        }
    }

    /// Newest pair of consecutive observations straddling the rim plane:
    /// the last point above it and the following point at or below it.
    fn rim_crossing(
        &self,
        ball: &PositionHistory,
        rim_y: f32,
    ) -> Option<(Observation, Observation)> {
        let mut successor: Option<&Observation> = None;
        for obs in ball.iter().rev() {
            if obs.center.1 < rim_y {
                return successor.map(|under| (*obs, *under));
            }
            successor = Some(obs);
        }
        None
    }

    /// X where the line through two points crosses the horizontal level `y`.
    /// A vertical drop scores by its shared x directly.
    fn x_at_y(a: &Observation, b: &Observation, y: f32) -> f32 {
        let (x1, y1) = a.center;
        let (x2, y2) = b.center;
        if (x2 - x1).abs() < f32::EPSILON {
            return x1;
        }
        let m = (y2 - y1) / (x2 - x1);
        if m.abs() < f32::EPSILON {
            // Horizontal segment never crosses the rim level; fall back to
            // the midpoint x rather than dividing by zero
            return (x1 + x2) * 0.5;
        }
        let b0 = y1 - m * x1;
        (y - b0) / m
    }
}
