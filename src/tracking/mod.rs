// src/tracking/mod.rs
//
// Trajectory tracking core.
//
// Signal flow:
//   RawDetection → detection adapter → history (ball/hoop/person)
//   ball/hoop history → cleaner → zones → state_machine → scoring → ShotEvent
//
// Orchestrated per frame by session::ShotSession.

pub mod cleaner;
pub mod history;
pub mod scoring;
pub mod state_machine;
pub mod zones;

pub use cleaner::{HoopTracker, TrajectoryCleaner};
pub use history::PositionHistory;
pub use scoring::ScoringEvaluator;
pub use state_machine::{AttemptWindow, ShotState, ShotStateMachine};
pub use zones::{Region, ZoneClassifier};
