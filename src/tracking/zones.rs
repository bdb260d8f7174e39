// Hoop-relative zone geometry.
//
// All regions are axis-aligned boxes derived from the current hoop anchor
// (cx, cy, w, h). The rim plane sits at the top edge of the hoop box,
// cy - 0.5h. Containment is a pure bounds test: same anchor and point
// always give the same answer.

use crate::types::{Observation, ZoneConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Region {
    pub fn contains(&self, point: (f32, f32)) -> bool {
        let (x, y) = point;
        x > self.x_min && x < self.x_max && y > self.y_min && y < self.y_max
    }
}

#[derive(Debug, Clone)]
pub struct ZoneClassifier {
    config: ZoneConfig,
}

impl ZoneClassifier {
    pub fn new(config: ZoneConfig) -> Self {
        Self { config }
    }

    /// Vertical level of the rim: top edge of the hoop box
    pub fn rim_level(hoop: &Observation) -> f32 {
        hoop.center.1 - 0.5 * hoop.height
    }

    /// Band above the rim the ball must enter for an attempt to start
    pub fn above_region(&self, hoop: &Observation) -> Region {
        let (cx, cy) = hoop.center;
        let half_width = self.config.above_half_width_ratio * hoop.width;
        Region {
            x_min: cx - half_width,
            x_max: cx + half_width,
            y_min: cy - self.config.above_margin_ratio * hoop.height,
            y_max: Self::rim_level(hoop),
        }
    }

    /// Band below the rim the ball must reach to complete the transit
    pub fn below_region(&self, hoop: &Observation) -> Region {
        let (cx, cy) = hoop.center;
        let half_width = self.config.below_half_width_ratio * hoop.width;
        Region {
            x_min: cx - half_width,
            x_max: cx + half_width,
            y_min: cy + 0.5 * hoop.height,
            y_max: cy + self.config.below_margin_ratio * hoop.height,
        }
    }

    /// Wider box around the whole hoop backing the adapter's relaxed ball
    /// threshold. Independent of the above/below split.
    pub fn proximity_region(&self, hoop: &Observation) -> Region {
        let (cx, cy) = hoop.center;
        let half_width = self.config.proximity_half_width_ratio * hoop.width;
        Region {
            x_min: cx - half_width,
            x_max: cx + half_width,
            y_min: cy - self.config.proximity_above_ratio * hoop.height,
            y_max: cy + self.config.proximity_below_ratio * hoop.height,
        }
    }

    /// Rim half-width in pixels, the tighter band used by scoring
    pub fn rim_half_width(&self, hoop: &Observation) -> f32 {
        self.config.rim_width_ratio * hoop.width
    }
}
