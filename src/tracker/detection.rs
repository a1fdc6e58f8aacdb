//! Detection ingest: raw per-frame detections to the tracker's representation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tracker::rect::Rect;

/// Detection as handed over by the detector, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Bounding box in TLBR format (x1, y1, x2, y2)
    pub bbox: [f32; 4],
    /// Detection confidence score
    pub score: f32,
    /// Class label
    pub class_id: i32,
}

impl RawDetection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_id: i32) -> Self {
        Self {
            bbox: [x1, y1, x2, y2],
            score,
            class_id,
        }
    }
}

/// Validated detection for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub rect: Rect,
    pub score: f32,
    pub class_id: i32,
    /// Position of the detection in the caller's input sequence.
    pub index: usize,
}

/// Frame metadata supplied alongside each batch of detections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
}

impl FrameInfo {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Why a raw detection was dropped during ingest.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidDetection {
    #[error("bounding box has non-finite coordinates")]
    NonFinite,
    #[error("bounding box has non-positive size {width}x{height}")]
    NonPositiveSize { width: f32, height: f32 },
    #[error("confidence {0} is outside [0, 1]")]
    ScoreOutOfRange(f32),
}

/// Result of ingesting one frame's detections.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    /// Accepted detections, in input order.
    pub detections: Vec<Detection>,
    /// Input index and reason for every dropped detection.
    pub rejected: Vec<(usize, InvalidDetection)>,
}

/// Validate a single raw detection.
pub fn normalize(index: usize, raw: &RawDetection) -> Result<Detection, InvalidDetection> {
    let [x1, y1, x2, y2] = raw.bbox;
    let rect = Rect::from_tlbr(x1, y1, x2, y2);

    if !rect.is_finite() {
        return Err(InvalidDetection::NonFinite);
    }
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return Err(InvalidDetection::NonPositiveSize {
            width: rect.width,
            height: rect.height,
        });
    }
    if !(0.0..=1.0).contains(&raw.score) {
        return Err(InvalidDetection::ScoreOutOfRange(raw.score));
    }

    Ok(Detection {
        rect,
        score: raw.score,
        class_id: raw.class_id,
        index,
    })
}

/// Split a frame's raw detections into accepted and rejected ones.
///
/// Accepted detections keep their original input index so results can be
/// mapped back to the caller's records.
pub fn ingest(raw: &[RawDetection]) -> Ingested {
    let mut out = Ingested {
        detections: Vec::with_capacity(raw.len()),
        rejected: Vec::new(),
    };
    for (index, det) in raw.iter().enumerate() {
        match normalize(index, det) {
            Ok(d) => out.detections.push(d),
            Err(reason) => out.rejected.push((index, reason)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_preserves_order_and_index() {
        let raw = vec![
            RawDetection::new(0.0, 0.0, 10.0, 10.0, 0.9, 0),
            RawDetection::new(5.0, 5.0, 5.0, 20.0, 0.9, 0),
            RawDetection::new(20.0, 20.0, 30.0, 40.0, 0.4, 2),
        ];
        let Ingested {
            detections,
            rejected,
        } = ingest(&raw);

        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].index, 0);
        assert_eq!(detections[1].index, 2);
        assert_eq!(detections[1].class_id, 2);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, 1);
    }

    #[test]
    fn test_rejects_out_of_range_score() {
        let raw = RawDetection::new(0.0, 0.0, 10.0, 10.0, 1.5, 0);
        assert_eq!(normalize(0, &raw), Err(InvalidDetection::ScoreOutOfRange(1.5)));

        let raw = RawDetection::new(0.0, 0.0, 10.0, 10.0, -0.1, 0);
        assert!(normalize(0, &raw).is_err());

        let raw = RawDetection::new(0.0, 0.0, 10.0, 10.0, f32::NAN, 0);
        assert!(normalize(0, &raw).is_err());
    }

    #[test]
    fn test_score_bounds_are_inclusive() {
        assert!(normalize(0, &RawDetection::new(0.0, 0.0, 1.0, 1.0, 0.0, 0)).is_ok());
        assert!(normalize(0, &RawDetection::new(0.0, 0.0, 1.0, 1.0, 1.0, 0)).is_ok());
    }

    #[test]
    fn test_rejects_degenerate_boxes() {
        let inverted = RawDetection::new(10.0, 0.0, 0.0, 10.0, 0.5, 0);
        assert!(matches!(
            normalize(0, &inverted),
            Err(InvalidDetection::NonPositiveSize { .. })
        ));

        let infinite = RawDetection::new(0.0, 0.0, f32::INFINITY, 10.0, 0.5, 0);
        assert_eq!(normalize(0, &infinite), Err(InvalidDetection::NonFinite));
    }
}
