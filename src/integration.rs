//! Integration module for connecting detection streams with the tracker.
//!
//! This module provides the source contract, input builders, stream
//! synchronization and output selection that sit around the tracking core.

mod builder;
mod detector;
mod pipeline;
mod selection;
mod sync;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoRawDetection, SourceFrame};
pub use pipeline::{Annotated, PipelineError, TrackedFrame, TrackerPipeline};
pub use selection::SelectionFilter;
pub use sync::{ApproximateSynchronizer, TimestampedMessage};
