//! Single object track.

use nalgebra::Vector4;

use crate::tracker::detection::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// Single object track.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Unique track identifier
    pub track_id: u64,
    /// Current track state
    pub state: TrackState,
    /// Current box estimate; coasts along the velocity while unmatched
    pub rect: Rect,
    /// Box of the last matched detection
    pub last_observation: Rect,
    /// Per-frame displacement of the TLBR corners
    pub velocity: Vector4<f32>,
    /// Confidence of the last matched detection
    pub score: f32,
    /// Class label of the last matched detection
    pub class_id: i32,
    /// Consecutive frames with a matched detection
    pub hits: u32,
    /// Frames since the track was created
    pub age: u32,
    /// Frames since the last matched detection
    pub time_since_update: u32,
    /// Frame the track was created in
    pub start_frame: u64,
    /// Input index of the detection matched in the current frame
    pub detection_index: Option<usize>,
}

impl Track {
    /// Create a new tentative track from an unmatched detection.
    pub fn new(track_id: u64, detection: &Detection, frame_id: u64) -> Self {
        Self {
            track_id,
            state: TrackState::Tentative,
            rect: detection.rect,
            last_observation: detection.rect,
            velocity: Vector4::zeros(),
            score: detection.score,
            class_id: detection.class_id,
            hits: 1,
            age: 0,
            time_since_update: 0,
            start_frame: frame_id,
            detection_index: Some(detection.index),
        }
    }

    /// Absorb a matched detection with an already blended velocity.
    pub fn update(&mut self, detection: &Detection, velocity: Vector4<f32>) {
        self.rect = detection.rect;
        self.last_observation = detection.rect;
        self.velocity = velocity;
        self.score = detection.score;
        self.class_id = detection.class_id;
        self.hits += 1;
        self.time_since_update = 0;
        self.detection_index = Some(detection.index);
        if self.state == TrackState::Lost {
            self.state = TrackState::Confirmed;
        }
    }

    /// Advance an unmatched track to its predicted box.
    pub fn coast(&mut self, predicted: Rect) {
        self.rect = predicted;
        self.hits = 0;
        self.time_since_update += 1;
        self.detection_index = None;
        if self.state == TrackState::Confirmed {
            self.state = TrackState::Lost;
        }
    }

    pub fn mark_confirmed(&mut self) {
        self.state = TrackState::Confirmed;
    }

    pub fn mark_removed(&mut self) {
        self.state = TrackState::Removed;
    }

    pub fn is_confirmed(&self) -> bool {
        self.state.is_confirmed()
    }
}
