//! Presentation-side filter restricting output to one selected track.

use tracing::{info, warn};

/// Selects a single track identifier to report, or all of them when unset.
///
/// Never feeds back into tracking state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionFilter {
    selected: Option<u64>,
}

impl SelectionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, track_id: Option<u64>) {
        self.selected = track_id;
        match track_id {
            Some(track_id) => info!(track_id, "selected tracked object"),
            None => info!("cleared tracked object selection"),
        }
    }

    pub fn clear(&mut self) {
        self.select(None);
    }

    pub fn selected(&self) -> Option<u64> {
        self.selected
    }

    /// Handle a set-tracked-object request: `-1` clears, a non-negative id selects.
    ///
    /// Other negative ids also clear. Always succeeds.
    pub fn apply_request(&mut self, object_id: i64) -> bool {
        match u64::try_from(object_id) {
            Ok(track_id) => self.select(Some(track_id)),
            Err(_) => {
                if object_id != -1 {
                    warn!(object_id, "negative object id treated as a reset");
                }
                self.clear();
            }
        }
        true
    }

    pub fn allows(&self, track_id: u64) -> bool {
        self.selected.is_none_or(|selected| selected == track_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_allows_everything() {
        let filter = SelectionFilter::new();
        assert!(filter.allows(1));
        assert!(filter.allows(42));
    }

    #[test]
    fn test_select_and_clear() {
        let mut filter = SelectionFilter::new();
        filter.select(Some(7));
        assert!(filter.allows(7));
        assert!(!filter.allows(8));

        filter.clear();
        assert_eq!(filter.selected(), None);
        assert!(filter.allows(8));
    }

    #[test]
    fn test_requests() {
        let mut filter = SelectionFilter::new();
        assert!(filter.apply_request(3));
        assert_eq!(filter.selected(), Some(3));

        assert!(filter.apply_request(-1));
        assert_eq!(filter.selected(), None);

        filter.apply_request(5);
        filter.apply_request(-9);
        assert_eq!(filter.selected(), None);
    }
}
