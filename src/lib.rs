// Basketball shot tracking from per-frame detector output.
//
// The core is a frame-synchronous pipeline: detection adapter → position
// histories → trajectory cleaner → hoop-relative zones → shot state
// machine → scoring. Capture, inference, and rendering are collaborators
// outside this crate; the binary replays recorded detections instead.

pub mod config;
pub mod detection;
pub mod session;
pub mod stream;
pub mod tracking;
pub mod types;

pub use detection::DetectionAdapter;
pub use session::{FrameResult, ShotSession};
pub use stream::{DetectionFrame, DetectionStream};
pub use types::{
    Config, Observation, OverlayStatus, PersonZone, RawDetection, SessionTotals, ShotEvent,
    ShotOutcome,
};
