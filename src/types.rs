use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionConfig,
    pub cleaning: CleaningConfig,
    pub zones: ZoneConfig,
    pub shot: ShotConfig,
    pub stream: StreamConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Ball acceptance threshold away from the hoop
    pub ball_confidence: f32,
    /// Relaxed ball threshold inside the hoop proximity region, where the
    /// ball is partially occluded by rim and net
    pub ball_near_hoop_confidence: f32,
    pub hoop_confidence: f32,
    pub person_confidence: f32,
    /// Reject hoop candidates whose center is below this fraction of frame
    /// height (scoreboard graphics look hoop-like). None disables the gate.
    pub hoop_max_y_ratio: Option<f32>,
    pub ball_class_id: u32,
    pub hoop_class_id: u32,
    pub person_class_id: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            ball_confidence: 0.30,
            ball_near_hoop_confidence: 0.15,
            hoop_confidence: 0.50,
            person_confidence: 0.40,
            hoop_max_y_ratio: None,
            ball_class_id: 0,
            hoop_class_id: 1,
            person_class_id: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Max ball displacement between nearby frames, as a multiple of the
    /// previous box diagonal. Beyond this the new point is a false positive.
    pub velocity_outlier_ratio: f32,
    /// Frame gap under which the displacement bound applies
    pub outlier_frame_gap: u64,
    /// A ball box should be roughly square
    pub ball_max_aspect_ratio: f32,
    /// Ball observations older than this many frames are discarded
    pub ball_retention_frames: u64,
    /// Max hoop anchor movement between nearby frames, as a multiple of the
    /// anchor box diagonal
    pub hoop_jitter_ratio: f32,
    pub hoop_max_aspect_ratio: f32,
    pub hoop_max_entries: usize,
    /// Consecutive spatially consistent detections required before the
    /// anchor jumps to a new location
    pub hoop_stabilize_run: usize,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            velocity_outlier_ratio: 4.0,
            outlier_frame_gap: 5,
            ball_max_aspect_ratio: 1.4,
            ball_retention_frames: 30,
            hoop_jitter_ratio: 0.5,
            hoop_max_aspect_ratio: 1.3,
            hoop_max_entries: 25,
            hoop_stabilize_run: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Above-rim band half-width as a multiple of hoop width
    pub above_half_width_ratio: f32,
    /// Above-rim band vertical extent as a multiple of hoop height
    pub above_margin_ratio: f32,
    pub below_half_width_ratio: f32,
    pub below_margin_ratio: f32,
    /// Hoop proximity box (adapter's relaxed ball threshold)
    pub proximity_half_width_ratio: f32,
    pub proximity_above_ratio: f32,
    pub proximity_below_ratio: f32,
    /// Rim half-width for make/miss scoring. Tighter than the zone bands:
    /// scoring must separate "through the rim" from "near the rim"
    pub rim_width_ratio: f32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            above_half_width_ratio: 4.0,
            above_margin_ratio: 2.0,
            below_half_width_ratio: 4.0,
            below_margin_ratio: 2.0,
            proximity_half_width_ratio: 1.0,
            proximity_above_ratio: 1.0,
            proximity_below_ratio: 0.5,
            rim_width_ratio: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    /// Attempt resolution runs every Nth frame so one bounce cycle cannot
    /// double-count
    pub resolve_interval: u64,
    /// Frames the make/miss overlay color persists before reverting
    pub fade_frames: u32,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            resolve_interval: 10,
            fade_frames: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub input_path: String,
    pub output_dir: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            input_path: "input/detections.jsonl".to_string(),
            output_dir: "output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectClass {
    Ball,
    Hoop,
    Person,
}

impl ObjectClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ball => "BALL",
            Self::Hoop => "HOOP",
            Self::Person => "PERSON",
        }
    }
}

/// One candidate box from the detector collaborator, before any filtering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawDetection {
    pub class_id: u32,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl RawDetection {
    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) * 0.5, (self.y1 + self.y2) * 0.5)
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }
}

/// One accepted, confidence-filtered detection for one frame.
/// Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub center: (f32, f32),
    pub frame_index: u64,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

impl Observation {
    pub fn from_detection(det: &RawDetection, frame_index: u64) -> Self {
        Self {
            center: det.center(),
            frame_index,
            width: det.width(),
            height: det.height(),
            confidence: det.confidence,
        }
    }

    /// Box diagonal; the displacement bounds in the cleaner scale with it
    pub fn diagonal(&self) -> f32 {
        (self.width * self.width + self.height * self.height).sqrt()
    }
}

/// Horizontal court zone of a person, by frame thirds. Stateless rendering
/// hint, not core state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonZone {
    Left,
    Middle,
    Right,
}

impl PersonZone {
    pub fn from_x(x: f32, frame_width: f32) -> Self {
        if x < frame_width / 3.0 {
            Self::Left
        } else if x < 2.0 * frame_width / 3.0 {
            Self::Middle
        } else {
            Self::Right
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Middle => "MIDDLE",
            Self::Right => "RIGHT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOutcome {
    Make,
    Miss,
}

impl ShotOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Make => "MAKE",
            Self::Miss => "MISS",
        }
    }
}

/// Running attempt/make counters for one session.
/// `makes <= attempts` holds at every observable point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTotals {
    pub attempts: u32,
    pub makes: u32,
}

impl SessionTotals {
    pub fn record(&mut self, outcome: ShotOutcome) {
        self.attempts += 1;
        if outcome == ShotOutcome::Make {
            self.makes += 1;
        }
    }
}

/// Emitted once per resolved attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotEvent {
    pub up_frame: u64,
    pub down_frame: u64,
    pub resolved_frame: u64,
    pub outcome: ShotOutcome,
    pub totals: SessionTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStatus {
    Waiting,
    Make,
    Miss,
}

impl OverlayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "Waiting...",
            Self::Make => "basket made",
            Self::Miss => "basket miss",
        }
    }

    /// RGB color for the rendering collaborator
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Waiting => (0, 0, 0),
            Self::Make => (0, 255, 0),
            Self::Miss => (255, 0, 0),
        }
    }
}

/// Overlay hint handed to the rendering collaborator each frame. The core
/// never draws; it only maintains the current status and its fade window.
#[derive(Debug, Clone, Copy)]
pub struct OverlayState {
    pub status: OverlayStatus,
    fade_remaining: u32,
    fade_frames: u32,
}

impl OverlayState {
    pub fn new(fade_frames: u32) -> Self {
        Self {
            status: OverlayStatus::Waiting,
            fade_remaining: 0,
            fade_frames,
        }
    }

    pub fn set(&mut self, status: OverlayStatus) {
        self.status = status;
        self.fade_remaining = self.fade_frames;
    }

    /// Advance one frame; revert to Waiting once the fade window expires
    pub fn decay(&mut self) {
        if self.status != OverlayStatus::Waiting {
            if self.fade_remaining > 0 {
                self.fade_remaining -= 1;
            } else {
                self.status = OverlayStatus::Waiting;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_zone_thirds() {
        assert_eq!(PersonZone::from_x(100.0, 1280.0), PersonZone::Left);
        assert_eq!(PersonZone::from_x(640.0, 1280.0), PersonZone::Middle);
        assert_eq!(PersonZone::from_x(1200.0, 1280.0), PersonZone::Right);
    }

    #[test]
    fn test_totals_record_keeps_makes_bounded() {
        let mut totals = SessionTotals::default();
        totals.record(ShotOutcome::Make);
        totals.record(ShotOutcome::Miss);
        totals.record(ShotOutcome::Make);
        assert_eq!(totals.attempts, 3);
        assert_eq!(totals.makes, 2);
        assert!(totals.makes <= totals.attempts);
    }

    #[test]
    fn test_overlay_fades_back_to_waiting() {
        let mut overlay = OverlayState::new(2);
        overlay.set(OverlayStatus::Make);
        assert_eq!(overlay.status, OverlayStatus::Make);
        overlay.decay();
        overlay.decay();
        overlay.decay();
        assert_eq!(overlay.status, OverlayStatus::Waiting);
    }
}
