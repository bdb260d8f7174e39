// Detection adapter: raw detector boxes → typed, confidence-filtered
// observations per class.
//
// The ball threshold relaxes inside the hoop proximity region (computed
// from the previous frame's hoop anchor): the ball is partially occluded
// by rim and net exactly where low-confidence detections matter most,
// while the tight box keeps background noise out elsewhere.

use crate::tracking::zones::Region;
use crate::types::{DetectionConfig, ObjectClass, Observation, PersonZone, RawDetection};
use tracing::debug;

/// One frame's accepted observations, split by class
#[derive(Debug, Clone, Default)]
pub struct FrameObservations {
    pub ball: Vec<Observation>,
    pub hoop: Vec<Observation>,
    pub person: Vec<Observation>,
}

#[derive(Debug, Clone)]
pub struct DetectionAdapter {
    config: DetectionConfig,
}

impl DetectionAdapter {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Filter one frame's candidate boxes. `hoop_proximity` is the relaxed
    /// ball acceptance box around the previous frame's hoop anchor, if one
    /// exists yet.
    pub fn adapt(
        &self,
        frame_index: u64,
        boxes: &[RawDetection],
        frame_height: f32,
        hoop_proximity: Option<&Region>,
    ) -> FrameObservations {
        let mut out = FrameObservations::default();

        for det in boxes {
            match self.classify(det.class_id) {
                Some(ObjectClass::Ball) if self.accept_ball(det, hoop_proximity) => {
                    out.ball.push(Observation::from_detection(det, frame_index));
                }
                Some(ObjectClass::Hoop) if self.accept_hoop(det, frame_height) => {
                    out.hoop.push(Observation::from_detection(det, frame_index));
                }
                Some(ObjectClass::Person) if det.confidence > self.config.person_confidence => {
                    out.person
                        .push(Observation::from_detection(det, frame_index));
                }
                Some(_) => {}
                None => debug!("ignoring unknown class id {}", det.class_id),
            }
        }

        out
    }

    fn classify(&self, class_id: u32) -> Option<ObjectClass> {
        if class_id == self.config.ball_class_id {
            Some(ObjectClass::Ball)
        } else if class_id == self.config.hoop_class_id {
            Some(ObjectClass::Hoop)
        } else if class_id == self.config.person_class_id {
            Some(ObjectClass::Person)
        } else {
            None
        }
    }

    fn accept_ball(&self, det: &RawDetection, hoop_proximity: Option<&Region>) -> bool {
        if det.confidence > self.config.ball_confidence {
            return true;
        }
        match hoop_proximity {
            Some(region) => {
                det.confidence > self.config.ball_near_hoop_confidence
                    && region.contains(det.center())
            }
            None => false,
        }
    }

    fn accept_hoop(&self, det: &RawDetection, frame_height: f32) -> bool {
        if det.confidence <= self.config.hoop_confidence {
            return false;
        }
        // Optional vertical gate: a hoop hangs in the upper part of the
        // frame, scoreboard graphics low in frame do not.
        if let Some(max_ratio) = self.config.hoop_max_y_ratio {
            let (_, cy) = det.center();
            if cy > max_ratio * frame_height {
                debug!("hoop candidate rejected: too low in frame (cy={:.0})", cy);
                return false;
            }
        }
        true
    }
}

/// Left/middle/right court position of a person box: a stateless rendering
/// hint derived from the observation, not core state.
pub fn person_zone(obs: &Observation, frame_width: f32) -> PersonZone {
    PersonZone::from_x(obs.center.0, frame_width)
}
