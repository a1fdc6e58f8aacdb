//! Association between predicted tracks and new detections.

use ndarray::Array2;
use tracing::warn;

use crate::tracker::detection::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::track::Track;

/// Cost of a pair that must never be matched.
pub const INFEASIBLE_COST: f32 = 1.0;

/// Upper bound on the summed tie-break perturbation of any assignment.
const TIE_BREAK_BUDGET: f64 = 1e-8;

/// Pairwise association cost between a track and a detection.
///
/// Feasible costs lie in `[0, 1)`; returning `None` gates the pair out.
pub trait CostMetric {
    fn cost(&self, predicted: &Rect, track: &Track, detection: &Detection) -> Option<f32>;
}

/// `1 - IoU` between the predicted box and the detection, gated on a minimum IoU.
#[derive(Debug, Clone, Copy)]
pub struct IouCost {
    /// Minimum IoU for a pair to be feasible.
    pub gate: f32,
}

impl Default for IouCost {
    fn default() -> Self {
        Self { gate: 0.3 }
    }
}

impl CostMetric for IouCost {
    fn cost(&self, predicted: &Rect, _track: &Track, detection: &Detection) -> Option<f32> {
        let iou = predicted.iou(&detection.rect);
        (iou >= self.gate).then(|| 1.0 - iou)
    }
}

/// Build the (tracks x detections) cost matrix.
///
/// `predicted[i]` is the predicted box of `tracks[i]`. Infeasible entries hold
/// [`INFEASIBLE_COST`]. With `per_class`, pairs of different classes are infeasible.
pub fn cost_matrix<M: CostMetric + ?Sized>(
    metric: &M,
    tracks: &[&Track],
    predicted: &[Rect],
    detections: &[Detection],
    per_class: bool,
) -> Array2<f32> {
    debug_assert_eq!(tracks.len(), predicted.len());

    let mut costs = Array2::from_elem((tracks.len(), detections.len()), INFEASIBLE_COST);
    for (i, (track, pred)) in tracks.iter().zip(predicted).enumerate() {
        for (j, det) in detections.iter().enumerate() {
            if per_class && track.class_id != det.class_id {
                continue;
            }
            if let Some(c) = metric.cost(pred, track, det) {
                costs[[i, j]] = c.clamp(0.0, INFEASIBLE_COST - f32::EPSILON);
            }
        }
    }
    costs
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// Matched (track row, detection column) pairs, ascending by row.
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Minimum-cost bipartite matching restricted to feasible entries.
///
/// Among equally cheap assignments, lower track rows win, then lower
/// detection columns. Rows and columns left without a feasible partner are
/// reported as unmatched.
pub fn linear_assignment(cost_matrix: &Array2<f32>) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
        };
    }

    if cost_matrix.iter().all(|&c| c >= INFEASIBLE_COST) {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
        };
    }

    // Blocked cells cost more than any chain of feasible swaps, so the solver
    // always takes a feasible match when one exists.
    let size = num_rows.max(num_cols);
    let blocked = (size + 1) as f64;
    let tie_step = TIE_BREAK_BUDGET / (2 * (size + 1) * (size + 1) * (size + 1)) as f64;
    let mut padded = Array2::<f64>::from_elem((size, size), blocked);

    for i in 0..num_rows {
        for j in 0..num_cols {
            let c = cost_matrix[[i, j]];
            if c < INFEASIBLE_COST {
                padded[[i, j]] = c as f64 + tie_step * tie_weight(i, j, size) as f64;
            }
        }
    }

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut unmatched_detections_mask: Vec<bool> = vec![true; num_cols];

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row_idx, &col_idx) in row_to_col.iter().enumerate().take(num_rows) {
                if col_idx < num_cols && cost_matrix[[row_idx, col_idx]] < INFEASIBLE_COST {
                    matches.push((row_idx, col_idx));
                    unmatched_detections_mask[col_idx] = false;
                } else {
                    unmatched_tracks.push(row_idx);
                }
            }
        }
        Err(e) => {
            warn!(error = ?e, rows = num_rows, cols = num_cols, "assignment solver failed");
            unmatched_tracks = (0..num_rows).collect();
        }
    }

    let unmatched_detections: Vec<usize> = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { Some(i) } else { None })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

/// Tie-break weight of cell `(row, col)`, below `2 * size^2`.
///
/// The `size * row` term decides which rows get matched and outweighs any
/// reshuffle of columns. Summed over a fixed set of rows, `(size - row) * col`
/// is smallest when rows and columns pair up in ascending order, so a full tie
/// resolves to the identity pairing.
fn tie_weight(row: usize, col: usize, size: usize) -> usize {
    size * row + (size - row) * col
}
