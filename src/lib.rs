//! IOU-based multi-object tracking-by-detection.
//!
//! Feed one frame of detections at a time into [`IouTracker::update`] and get
//! back the confirmed tracks with their persistent identifiers. The
//! [`integration`] module wraps the tracker for use behind a detection stream.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::TrackerError;
pub use integration::{
    Annotated, ApproximateSynchronizer, DetectionBuilder, DetectionSource, IntoRawDetection,
    PipelineError, SelectionFilter, SourceFrame, TimestampedMessage, TrackedFrame,
    TrackerPipeline,
};
pub use tracker::{
    CostMetric, Detection, FrameInfo, IouCost, IouTracker, RawDetection, Rect, Track,
    TrackState, TrackedObject, TrackerConfig,
};
