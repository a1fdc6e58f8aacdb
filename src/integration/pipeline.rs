//! TrackerPipeline for combining a detection stream with tracking.

use thiserror::Error;

use crate::error::TrackerError;
use crate::tracker::{
    CostMetric, FrameInfo, IouCost, IouTracker, RawDetection, Rect, TrackerConfig,
};

use super::{DetectionSource, IntoRawDetection, SelectionFilter, SourceFrame};

/// Errors from a pipeline step.
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    #[error("detection source failed: {0}")]
    Source(E),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// A caller record annotated with the track it was matched to.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotated<R> {
    pub record: R,
    pub track_id: u64,
    /// Track box, which replaces the detection's own box downstream
    pub rect: Rect,
}

/// Tracked output for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedFrame<R> {
    pub frame: FrameInfo,
    pub detections: Vec<Annotated<R>>,
}

/// Bundles a `DetectionSource` with the tracker and a selection filter.
///
/// Only tracks matched to a detection in the current frame are reported,
/// each as the caller's own record for that detection.
pub struct TrackerPipeline<D: DetectionSource, M: CostMetric = IouCost> {
    source: D,
    tracker: IouTracker<M>,
    selection: SelectionFilter,
}

impl<D: DetectionSource> TrackerPipeline<D, IouCost> {
    /// Create a new tracking pipeline with the given source and tracker config.
    pub fn new(source: D, config: TrackerConfig) -> Result<Self, TrackerError> {
        Ok(Self::with_tracker(source, IouTracker::new(config)?))
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(source: D) -> Result<Self, TrackerError> {
        Self::new(source, TrackerConfig::default())
    }
}

impl<D: DetectionSource, M: CostMetric> TrackerPipeline<D, M> {
    pub fn with_tracker(source: D, tracker: IouTracker<M>) -> Self {
        Self {
            source,
            tracker,
            selection: SelectionFilter::new(),
        }
    }

    /// Pull the next frame from the source and track it.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    pub fn process_frame(
        &mut self,
    ) -> Result<Option<TrackedFrame<D::Record>>, PipelineError<D::Error>> {
        let Some(input) = self.source.next_frame().map_err(PipelineError::Source)? else {
            return Ok(None);
        };
        Ok(Some(self.process(input)?))
    }

    /// Track a frame that was obtained outside the source, e.g. from a synchronizer.
    pub fn process(
        &mut self,
        input: SourceFrame<D::Record>,
    ) -> Result<TrackedFrame<D::Record>, TrackerError> {
        let SourceFrame { frame, records } = input;
        let raw: Vec<RawDetection> = records.iter().map(|r| r.to_raw_detection()).collect();
        let tracked = self.tracker.update(&raw, &frame)?;

        let mut slots: Vec<Option<D::Record>> = records.into_iter().map(Some).collect();
        let mut detections = Vec::with_capacity(tracked.len());
        for obj in tracked {
            let Some(index) = obj.detection_index else {
                continue;
            };
            if !self.selection.allows(obj.track_id) {
                continue;
            }
            let Some(record) = slots.get_mut(index).and_then(Option::take) else {
                continue;
            };
            detections.push(Annotated {
                record,
                track_id: obj.track_id,
                rect: obj.rect,
            });
        }

        Ok(TrackedFrame { frame, detections })
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &D {
        &self.source
    }

    /// Get a mutable reference to the underlying source.
    pub fn source_mut(&mut self) -> &mut D {
        &mut self.source
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &IouTracker<M> {
        &self.tracker
    }

    pub fn selection(&self) -> &SelectionFilter {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionFilter {
        &mut self.selection
    }
}
