// Two-phase shot detection state machine.
//
// A shot attempt is the ball's vertical transit through the rim plane,
// observable only as an above-rim sighting followed by a below-rim sighting.
// Ball handling near the hoop (rebounds, passes, dribbles) never produces
// that ordering, so below-without-above is not an attempt. The state
// encoding makes it unrepresentable: `BelowSeen` always carries the
// `up_frame` it followed.
//
// Resolution is gated to a fixed frame cadence so one bounce cycle cannot
// count twice.

use crate::tracking::zones::Region;
use crate::types::{Observation, ShotConfig};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotState {
    Idle,
    AboveSeen { up_frame: u64 },
    BelowSeen { up_frame: u64, down_frame: u64 },
}

impl ShotState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::AboveSeen { .. } => "ABOVE_SEEN",
            Self::BelowSeen { .. } => "BELOW_SEEN",
        }
    }
}

/// The frame span of a completed above→below transit, handed to the
/// scoring evaluator. `up_frame < down_frame` is guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptWindow {
    pub up_frame: u64,
    pub down_frame: u64,
}

#[derive(Debug, Clone)]
pub struct ShotStateMachine {
    config: ShotConfig,
    state: ShotState,
}

impl ShotStateMachine {
    pub fn new(config: ShotConfig) -> Self {
        Self {
            config,
            state: ShotState::Idle,
        }
    }

    pub fn state(&self) -> ShotState {
        self.state
    }

    /// Advance on the latest cleaned ball observation. Called once per
    /// processed frame while a hoop anchor exists.
    pub fn step(&mut self, ball: &Observation, above: &Region, below: &Region) {
        match self.state {
            ShotState::Idle => {
                if above.contains(ball.center) {
                    debug!("🏀 ball above rim at frame {}", ball.frame_index);
                    self.state = ShotState::AboveSeen {
                        up_frame: ball.frame_index,
                    };
                }
            }
            ShotState::AboveSeen { up_frame } => {
                if below.contains(ball.center) {
                    debug!("🏀 ball below rim at frame {}", ball.frame_index);
                    self.state = ShotState::BelowSeen {
                        up_frame,
                        down_frame: ball.frame_index,
                    };
                }
            }
            ShotState::BelowSeen { .. } => {}
        }
    }

    /// On the cadence tick, resolve a completed transit into an attempt
    /// window and reset to Idle. An ordering violation (down not strictly
    /// after up) abandons the attempt without counting; it is a recoverable
    /// local correction, never an error.
    pub fn try_resolve(&mut self, frame_index: u64) -> Option<AttemptWindow> {
        if frame_index % self.config.resolve_interval != 0 {
            return None;
        }
        match self.state {
            ShotState::BelowSeen {
                up_frame,
                down_frame,
            } => {
                self.state = ShotState::Idle;
                if up_frame < down_frame {
                    info!(
                        "🎯 attempt resolved: up at frame {}, down at frame {}",
                        up_frame, down_frame
                    );
                    Some(AttemptWindow {
                        up_frame,
                        down_frame,
                    })
                } else {
                    warn!(
                        "attempt abandoned: down frame {} not after up frame {}",
                        down_frame, up_frame
                    );
                    None
                }
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = ShotState::Idle;
    }
}
