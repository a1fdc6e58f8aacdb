//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the tracker.
///
/// Configuration variants come out of constructors and loaders. The remaining
/// variants mean the tracker's own bookkeeping is broken; `update` only returns
/// those, never anything caused by bad input.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid tracker configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read tracker configuration from {path}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tracker configuration")]
    ConfigParse(#[from] serde_json::Error),

    #[error("track identifier {0} is already in use")]
    DuplicateTrackId(u64),

    #[error("track identifier space exhausted")]
    IdSpaceExhausted,

    #[error("detection {detection} was assigned to more than one track")]
    AssignmentConflict { detection: usize },

    #[error("assignment row {row} does not name a live track")]
    UnknownTrack { row: usize },
}
