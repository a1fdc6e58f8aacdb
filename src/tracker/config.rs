//! Tracker configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Configuration for the [`IouTracker`](crate::IouTracker).
///
/// Missing fields take their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum IoU between a predicted track box and a detection for them to be matched
    pub iou_threshold: f32,
    /// Consecutive hits before a tentative track is confirmed
    pub min_hits: u32,
    /// Frames a confirmed track survives without a matched detection
    pub max_age: u32,
    /// Weight of the newest displacement in the velocity average
    pub velocity_smoothing: f32,
    /// Only associate tracks and detections of the same class
    pub per_class: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.3,
            min_hits: 3,
            max_age: 30,
            velocity_smoothing: 0.5,
            per_class: false,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(self.iou_threshold > 0.0 && self.iou_threshold <= 1.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "iou_threshold must be in (0, 1], got {}",
                self.iou_threshold
            )));
        }
        if self.min_hits == 0 {
            return Err(TrackerError::InvalidConfig(
                "min_hits must be at least 1".to_string(),
            ));
        }
        if !(self.velocity_smoothing > 0.0 && self.velocity_smoothing <= 1.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "velocity_smoothing must be in (0, 1], got {}",
                self.velocity_smoothing
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(s: &str) -> Result<Self, TrackerError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| TrackerError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(TrackerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TrackerConfig::from_json_str(r#"{"max_age": 5, "per_class": true}"#).unwrap();
        assert_eq!(config.max_age, 5);
        assert!(config.per_class);
        assert_eq!(config.min_hits, 3);
        assert_eq!(config.iou_threshold, 0.3);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            TrackerConfig::from_json_str(r#"{"iou_threshold": 0.0}"#),
            Err(TrackerError::InvalidConfig(_))
        ));
        assert!(matches!(
            TrackerConfig::from_json_str(r#"{"min_hits": 0}"#),
            Err(TrackerError::InvalidConfig(_))
        ));
        assert!(matches!(
            TrackerConfig::from_json_str(r#"{"velocity_smoothing": 1.5}"#),
            Err(TrackerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            TrackerConfig::from_json_str("{max_age: }"),
            Err(TrackerError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = TrackerConfig::from_path("/nonexistent/tracker.json").unwrap_err();
        assert!(matches!(err, TrackerError::ConfigIo { .. }));
    }
}
