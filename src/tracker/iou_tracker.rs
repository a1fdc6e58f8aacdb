//! Main IouTracker implementation.

use serde::Serialize;
use tracing::{debug, debug_span};

use crate::error::TrackerError;
use crate::tracker::config::TrackerConfig;
use crate::tracker::detection::{self, FrameInfo, Ingested, RawDetection};
use crate::tracker::lifecycle::TrackManager;
use crate::tracker::matching::{self, CostMetric, IouCost};
use crate::tracker::motion::MotionPredictor;
use crate::tracker::rect::Rect;
use crate::tracker::track::Track;
use crate::tracker::track_state::TrackState;

/// A confirmed track as reported for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackedObject {
    pub track_id: u64,
    #[serde(serialize_with = "serialize_rect")]
    pub rect: Rect,
    pub class_id: i32,
    pub score: f32,
    pub state: TrackState,
    /// Input index of the detection matched this frame, if any.
    pub detection_index: Option<usize>,
}

fn serialize_rect<S: serde::Serializer>(rect: &Rect, s: S) -> Result<S::Ok, S::Error> {
    rect.to_tlbr().serialize(s)
}

impl From<&Track> for TrackedObject {
    fn from(track: &Track) -> Self {
        Self {
            track_id: track.track_id,
            rect: track.rect,
            class_id: track.class_id,
            score: track.score,
            state: track.state,
            detection_index: track.detection_index,
        }
    }
}

/// Frame-sequential tracker: ingest, predict, associate, update lifecycle.
///
/// Calls to [`update`](Self::update) must not overlap; the tracker holds no
/// internal locking.
pub struct IouTracker<M: CostMetric = IouCost> {
    manager: TrackManager,
    predictor: MotionPredictor,
    metric: M,
    config: TrackerConfig,
    frame_id: u64,
}

impl IouTracker<IouCost> {
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        let metric = IouCost {
            gate: config.iou_threshold,
        };
        Self::with_metric(config, metric)
    }
}

impl<M: CostMetric> IouTracker<M> {
    /// Build a tracker around a custom association cost.
    pub fn with_metric(config: TrackerConfig, metric: M) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            manager: TrackManager::new(config.min_hits, config.max_age),
            predictor: MotionPredictor::new(config.velocity_smoothing),
            metric,
            config,
            frame_id: 0,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of frames processed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_id
    }

    /// Every live track, tentative ones included, in ascending id order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.manager.tracks()
    }

    /// Process one frame and return the confirmed tracks, ordered by id.
    ///
    /// Invalid detections are dropped. An empty frame ages every track by one
    /// miss. Only internal consistency failures produce an error.
    pub fn update(
        &mut self,
        detections: &[RawDetection],
        frame: &FrameInfo,
    ) -> Result<Vec<TrackedObject>, TrackerError> {
        self.frame_id += 1;
        let _span = debug_span!(
            "update",
            frame = self.frame_id,
            width = frame.width,
            height = frame.height
        )
        .entered();

        let Ingested {
            detections,
            rejected,
        } = detection::ingest(detections);
        for (index, reason) in &rejected {
            debug!(index, %reason, "dropping detection");
        }

        let assignment = {
            let tracks: Vec<&Track> = self.manager.tracks().collect();
            let predicted: Vec<Rect> = self.predictor.predict_all(tracks.iter().copied());
            let costs = matching::cost_matrix(
                &self.metric,
                &tracks,
                &predicted,
                &detections,
                self.config.per_class,
            );
            matching::linear_assignment(&costs)
        };
        debug!(
            matched = assignment.matches.len(),
            unmatched_tracks = assignment.unmatched_tracks.len(),
            unmatched_detections = assignment.unmatched_detections.len(),
            "association done"
        );

        let track_ids: Vec<u64> = self.manager.track_ids().collect();
        self.manager.apply(
            &track_ids,
            &assignment,
            &detections,
            &self.predictor,
            self.frame_id,
        )?;

        Ok(self
            .manager
            .tracks()
            .filter(|t| t.is_confirmed())
            .map(TrackedObject::from)
            .collect())
    }
}
