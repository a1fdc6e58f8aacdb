mod config;
mod detection;
mod iou_tracker;
mod lifecycle;
mod matching;
mod motion;
mod rect;
mod track;
mod track_state;

pub use config::TrackerConfig;
pub use detection::{Detection, FrameInfo, Ingested, InvalidDetection, RawDetection, ingest};
pub use iou_tracker::{IouTracker, TrackedObject};
pub use lifecycle::TrackManager;
pub use matching::{
    AssignmentResult, CostMetric, INFEASIBLE_COST, IouCost, cost_matrix, linear_assignment,
};
pub use motion::MotionPredictor;
pub use rect::Rect;
pub use track::Track;
pub use track_state::TrackState;
