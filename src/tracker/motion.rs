//! Constant-velocity motion model for track boxes.

use nalgebra::Vector4;

use crate::tracker::detection::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::track::Track;

/// Projects tracks one frame forward and maintains their velocity estimates.
///
/// Velocities are per-frame displacements of the box corners, smoothed with an
/// exponential moving average. Prediction never touches the track.
#[derive(Debug, Clone, Copy)]
pub struct MotionPredictor {
    /// Weight of the newest displacement in the moving average, in (0, 1].
    smoothing: f32,
}

impl Default for MotionPredictor {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl MotionPredictor {
    pub fn new(smoothing: f32) -> Self {
        Self { smoothing }
    }

    /// Box expected for `track` in the current frame: `rect + velocity * dt`, `dt = 1`.
    pub fn predict(&self, track: &Track) -> Rect {
        Rect::from_tlbr_vector(&(track.rect.tlbr_vector() + track.velocity))
    }

    pub fn predict_all<'a, I>(&self, tracks: I) -> Vec<Rect>
    where
        I: IntoIterator<Item = &'a Track>,
    {
        tracks.into_iter().map(|t| self.predict(t)).collect()
    }

    /// Velocity after observing `detection` for `track`.
    ///
    /// The displacement since the last observation is spread over the frames
    /// that elapsed, so a track recovered after coasting does not jump.
    pub fn blend_velocity(&self, track: &Track, detection: &Detection) -> Vector4<f32> {
        let elapsed = (track.time_since_update + 1) as f32;
        let displacement =
            (detection.rect.tlbr_vector() - track.last_observation.tlbr_vector()) / elapsed;
        displacement * self.smoothing + track.velocity * (1.0 - self.smoothing)
    }
}
