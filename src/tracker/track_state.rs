/// Track state enumeration for object tracking lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum TrackState {
    /// Newly created track, not yet confirmed
    #[default]
    Tentative,
    /// Confirmed track matched in the current frame
    Confirmed,
    /// Confirmed track that missed the current frame
    Lost,
    /// Evicted from tracking
    Removed,
}

impl TrackState {
    /// Whether the track has ever been confirmed and is still alive.
    #[inline]
    pub fn is_confirmed(self) -> bool {
        matches!(self, TrackState::Confirmed | TrackState::Lost)
    }
}
