//! Contracts for feeding detections into the tracker.

use crate::tracker::{FrameInfo, RawDetection};

/// One frame's worth of caller-side detection records.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFrame<R> {
    pub frame: FrameInfo,
    pub records: Vec<R>,
}

/// Upstream supplier of frames and their detections.
///
/// Implement this trait to connect any detection stream to the tracker.
///
/// # Example
///
/// ```ignore
/// use iou_tracker_rs::{DetectionSource, RawDetection, SourceFrame};
///
/// struct Replay {
///     frames: std::vec::IntoIter<SourceFrame<RawDetection>>,
/// }
///
/// impl DetectionSource for Replay {
///     type Record = RawDetection;
///     type Error = std::convert::Infallible;
///
///     fn next_frame(&mut self) -> Result<Option<SourceFrame<RawDetection>>, Self::Error> {
///         Ok(self.frames.next())
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Caller-side detection record, annotated and handed back after tracking.
    type Record: IntoRawDetection;

    /// Error type for source failures.
    type Error;

    /// Next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<SourceFrame<Self::Record>>, Self::Error>;
}

/// Conversion from a caller-side detection record to the tracker's input.
pub trait IntoRawDetection {
    fn to_raw_detection(&self) -> RawDetection;
}

impl IntoRawDetection for RawDetection {
    fn to_raw_detection(&self) -> RawDetection {
        *self
    }
}
