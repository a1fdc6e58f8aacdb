//! Track lifecycle management: birth, confirmation, coasting and removal.
//!
//! - **Birth**: each unmatched detection spawns a tentative track.
//! - **Confirmation**: a tentative track is confirmed after `min_hits`
//!   consecutive hits.
//! - **Deletion**: a tentative track dies on its first miss; a confirmed
//!   track is removed once `time_since_update` exceeds `max_age`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::TrackerError;
use crate::tracker::detection::Detection;
use crate::tracker::matching::AssignmentResult;
use crate::tracker::motion::MotionPredictor;
use crate::tracker::track::Track;
use crate::tracker::track_state::TrackState;

/// Owns every live track, keyed by identifier.
#[derive(Debug, Clone)]
pub struct TrackManager {
    tracks: BTreeMap<u64, Track>,
    next_id: u64,
    min_hits: u32,
    max_age: u32,
}

impl TrackManager {
    pub fn new(min_hits: u32, max_age: u32) -> Self {
        Self {
            tracks: BTreeMap::new(),
            next_id: 1,
            min_hits,
            max_age,
        }
    }

    /// Live tracks in ascending identifier order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn track_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.tracks.keys().copied()
    }

    pub fn get(&self, track_id: u64) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn allocate_id(&mut self) -> Result<u64, TrackerError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(TrackerError::IdSpaceExhausted)?;
        Ok(id)
    }

    fn insert(&mut self, track: Track) -> Result<(), TrackerError> {
        if self.tracks.contains_key(&track.track_id) {
            return Err(TrackerError::DuplicateTrackId(track.track_id));
        }
        self.tracks.insert(track.track_id, track);
        Ok(())
    }

    /// Start a tentative track for an unmatched detection.
    pub fn spawn(&mut self, detection: &Detection, frame_id: u64) -> Result<u64, TrackerError> {
        let track_id = self.allocate_id()?;
        let mut track = Track::new(track_id, detection, frame_id);
        if track.hits >= self.min_hits {
            track.mark_confirmed();
        }
        debug!(track_id, detection = detection.index, "new track");
        self.insert(track)?;
        Ok(track_id)
    }

    /// Apply one frame's association outcome.
    ///
    /// `track_ids[row]` names the track behind each row of the assignment and
    /// `detections[col]` the detection behind each column.
    pub fn apply(
        &mut self,
        track_ids: &[u64],
        assignment: &AssignmentResult,
        detections: &[Detection],
        predictor: &MotionPredictor,
        frame_id: u64,
    ) -> Result<(), TrackerError> {
        for track in self.tracks.values_mut() {
            track.age += 1;
        }

        let mut consumed = vec![false; detections.len()];
        for &(row, col) in &assignment.matches {
            if std::mem::replace(&mut consumed[col], true) {
                return Err(TrackerError::AssignmentConflict {
                    detection: detections[col].index,
                });
            }
            let det = &detections[col];
            let track = track_at(&mut self.tracks, track_ids, row)?;
            let velocity = predictor.blend_velocity(track, det);
            track.update(det, velocity);
            if track.state == TrackState::Tentative && track.hits >= self.min_hits {
                track.mark_confirmed();
                debug!(track_id = track.track_id, "track confirmed");
            }
        }

        for &row in &assignment.unmatched_tracks {
            let track = track_at(&mut self.tracks, track_ids, row)?;
            let predicted = predictor.predict(track);
            track.coast(predicted);
            if track.state == TrackState::Tentative || track.time_since_update > self.max_age {
                track.mark_removed();
            }
        }

        for &col in &assignment.unmatched_detections {
            self.spawn(&detections[col], frame_id)?;
        }

        self.prune();
        Ok(())
    }

    fn prune(&mut self) {
        self.tracks.retain(|&track_id, track| {
            let keep = track.state != TrackState::Removed;
            if !keep {
                debug!(
                    track_id,
                    age = track.age,
                    start_frame = track.start_frame,
                    time_since_update = track.time_since_update,
                    "track removed"
                );
            }
            keep
        });
    }
}

/// The live track behind an assignment row.
fn track_at<'a>(
    tracks: &'a mut BTreeMap<u64, Track>,
    track_ids: &[u64],
    row: usize,
) -> Result<&'a mut Track, TrackerError> {
    let track_id = track_ids
        .get(row)
        .ok_or(TrackerError::UnknownTrack { row })?;
    tracks
        .get_mut(track_id)
        .ok_or(TrackerError::UnknownTrack { row })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::rect::Rect;

    fn detection(x: f32, index: usize) -> Detection {
        Detection {
            rect: Rect::new(x, 0.0, 10.0, 10.0),
            score: 0.9,
            class_id: 0,
            index,
        }
    }

    fn hit_all(manager: &mut TrackManager, dets: &[Detection], frame_id: u64) {
        let ids: Vec<u64> = manager.track_ids().collect();
        let assignment = AssignmentResult {
            matches: (0..ids.len()).map(|i| (i, i)).collect(),
            unmatched_tracks: vec![],
            unmatched_detections: (ids.len()..dets.len()).collect(),
        };
        manager
            .apply(&ids, &assignment, dets, &MotionPredictor::default(), frame_id)
            .unwrap();
    }

    fn miss_all(manager: &mut TrackManager, frame_id: u64) {
        let ids: Vec<u64> = manager.track_ids().collect();
        let assignment = AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..ids.len()).collect(),
            unmatched_detections: vec![],
        };
        manager
            .apply(&ids, &assignment, &[], &MotionPredictor::default(), frame_id)
            .unwrap();
    }

    #[test]
    fn test_confirmation_after_min_hits() {
        let mut manager = TrackManager::new(3, 30);
        let dets = [detection(0.0, 0)];

        hit_all(&mut manager, &dets, 1);
        assert_eq!(manager.tracks().next().unwrap().state, TrackState::Tentative);
        hit_all(&mut manager, &dets, 2);
        assert_eq!(manager.tracks().next().unwrap().state, TrackState::Tentative);
        hit_all(&mut manager, &dets, 3);

        let track = manager.tracks().next().unwrap();
        assert_eq!(track.state, TrackState::Confirmed);
        assert_eq!(track.hits, 3);
        assert_eq!(track.track_id, 1);
    }

    #[test]
    fn test_min_hits_one_confirms_at_birth() {
        let mut manager = TrackManager::new(1, 30);
        let id = manager.spawn(&detection(0.0, 0), 1).unwrap();
        assert_eq!(manager.get(id).unwrap().state, TrackState::Confirmed);
    }

    #[test]
    fn test_tentative_track_dies_on_first_miss() {
        let mut manager = TrackManager::new(3, 30);
        hit_all(&mut manager, &[detection(0.0, 0)], 1);
        hit_all(&mut manager, &[detection(0.0, 0)], 2);
        miss_all(&mut manager, 3);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_confirmed_track_removed_after_max_age() {
        let max_age = 4;
        let mut manager = TrackManager::new(1, max_age);
        hit_all(&mut manager, &[detection(0.0, 0)], 1);

        for frame in 0..max_age {
            miss_all(&mut manager, 2 + frame as u64);
            let track = manager.tracks().next().unwrap();
            assert_eq!(track.state, TrackState::Lost);
            assert_eq!(track.time_since_update, frame + 1);
        }

        miss_all(&mut manager, 100);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut manager = TrackManager::new(3, 30);
        hit_all(&mut manager, &[detection(0.0, 0)], 1);
        miss_all(&mut manager, 2);
        assert!(manager.is_empty());

        hit_all(&mut manager, &[detection(0.0, 0)], 3);
        assert_eq!(manager.track_ids().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_id_space_exhaustion_is_fatal() {
        let mut manager = TrackManager::new(3, 30);
        manager.next_id = u64::MAX;
        assert!(matches!(
            manager.spawn(&detection(0.0, 0), 1),
            Err(TrackerError::IdSpaceExhausted)
        ));
    }

    #[test]
    fn test_duplicate_id_is_fatal() {
        let mut manager = TrackManager::new(3, 30);
        let id = manager.spawn(&detection(0.0, 0), 1).unwrap();
        manager.next_id = id;
        assert!(matches!(
            manager.spawn(&detection(50.0, 1), 1),
            Err(TrackerError::DuplicateTrackId(dup)) if dup == id
        ));
    }

    #[test]
    fn test_double_assignment_is_fatal() {
        let mut manager = TrackManager::new(3, 30);
        manager.spawn(&detection(0.0, 0), 1).unwrap();
        manager.spawn(&detection(1.0, 1), 1).unwrap();
        let ids: Vec<u64> = manager.track_ids().collect();
        let assignment = AssignmentResult {
            matches: vec![(0, 0), (1, 0)],
            unmatched_tracks: vec![],
            unmatched_detections: vec![],
        };
        let result = manager.apply(
            &ids,
            &assignment,
            &[detection(0.0, 0)],
            &MotionPredictor::default(),
            2,
        );
        assert!(matches!(
            result,
            Err(TrackerError::AssignmentConflict { detection: 0 })
        ));
    }

    #[test]
    fn test_unknown_track_row_is_fatal() {
        let mut manager = TrackManager::new(3, 30);
        let id = manager.spawn(&detection(0.0, 0), 1).unwrap();

        // The id list names a track that is not live.
        let assignment = AssignmentResult {
            matches: vec![(0, 0)],
            unmatched_tracks: vec![],
            unmatched_detections: vec![],
        };
        let result = manager.apply(
            &[id + 1],
            &assignment,
            &[detection(0.0, 0)],
            &MotionPredictor::default(),
            2,
        );
        assert!(matches!(result, Err(TrackerError::UnknownTrack { row: 0 })));

        // A row past the end of the id list.
        let assignment = AssignmentResult {
            matches: vec![],
            unmatched_tracks: vec![1],
            unmatched_detections: vec![],
        };
        let result = manager.apply(&[id], &assignment, &[], &MotionPredictor::default(), 3);
        assert!(matches!(result, Err(TrackerError::UnknownTrack { row: 1 })));
    }

    #[test]
    fn test_age_counts_frames_since_birth() {
        let mut manager = TrackManager::new(3, 30);
        hit_all(&mut manager, &[detection(0.0, 0)], 1);
        hit_all(&mut manager, &[detection(0.0, 0)], 2);
        miss_all(&mut manager, 3);
        assert!(manager.is_empty());

        hit_all(&mut manager, &[detection(0.0, 0)], 4);
        hit_all(&mut manager, &[detection(0.0, 0)], 5);
        hit_all(&mut manager, &[detection(0.0, 0)], 6);
        let track = manager.tracks().next().unwrap();
        assert_eq!(track.start_frame, 4);
        assert_eq!(track.age, 2);
    }

    #[test]
    fn test_unmatched_track_coasts_along_velocity() {
        let mut manager = TrackManager::new(1, 30);
        hit_all(&mut manager, &[detection(0.0, 0)], 1);
        hit_all(&mut manager, &[detection(4.0, 0)], 2);
        let track = manager.tracks().next().unwrap();
        assert_eq!(track.velocity[0], 2.0);

        miss_all(&mut manager, 3);
        let track = manager.tracks().next().unwrap();
        assert_eq!(track.rect.x, 6.0);
        assert_eq!(track.last_observation.x, 4.0);
    }
}
