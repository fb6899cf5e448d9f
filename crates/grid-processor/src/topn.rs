//! Bounded top-N selection over an aggregate grid.

use std::cmp::Ordering;

use grid_common::{Coordinates, GridError, GridResult};
use tracing::debug;

use crate::types::{AggregateGrid, RankedPoint};

/// Smallest cap accepted; lower requests are raised to this.
pub const MIN_TOP_N: usize = 100;
/// Cap used when none is configured.
pub const DEFAULT_TOP_N: usize = 5000;

/// Above this share of the candidates a plain sort is cheaper than
/// selecting first and sorting the survivors.
const FULL_SORT_RATIO: f64 = 0.9;

/// Raise a requested cap to [`MIN_TOP_N`]. Negative values also map to the floor.
pub fn sanitize_cap(raw: i64) -> usize {
    if raw < MIN_TOP_N as i64 {
        MIN_TOP_N
    } else {
        raw as usize
    }
}

#[inline]
fn descending(scores: &[f64]) -> impl Fn(&usize, &usize) -> Ordering + '_ {
    move |&a, &b| scores[b].total_cmp(&scores[a])
}

/// Indices of the `cap` largest scores, ordered largest first.
///
/// Uses partition selection when `cap` is well below the number of
/// candidates, so only the survivors are sorted.
fn top_indices(scores: &[f64], mut candidates: Vec<usize>, cap: usize) -> Vec<usize> {
    let n = candidates.len();
    if n > cap && (cap as f64) < FULL_SORT_RATIO * n as f64 {
        candidates.select_nth_unstable_by(cap - 1, descending(scores));
        candidates.truncate(cap);
    }
    candidates.sort_unstable_by(descending(scores));
    candidates.truncate(cap);
    candidates
}

/// Rank the cells with a positive sum, keeping at most `cap` of them.
///
/// `cap` is raised to [`MIN_TOP_N`]. The result is ordered by descending
/// sum; ties come out in unspecified order. The sum and max grids must have
/// the same shape and match the coordinate vectors.
pub fn select_top(
    sum: &AggregateGrid,
    max: &AggregateGrid,
    coords: &Coordinates,
    cap: usize,
) -> GridResult<Vec<RankedPoint>> {
    let cap = cap.max(MIN_TOP_N);

    if sum.width != max.width || sum.height != max.height {
        return Err(GridError::malformed(format!(
            "sum grid is {}x{} but max grid is {}x{}",
            sum.height, sum.width, max.height, max.width
        )));
    }
    if coords.height() != sum.height || coords.width() != sum.width {
        return Err(GridError::malformed(format!(
            "grid is {}x{} but coordinates are {}x{}",
            sum.height,
            sum.width,
            coords.height(),
            coords.width()
        )));
    }

    let candidates: Vec<usize> = sum
        .values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v > 0.0 && v.is_finite())
        .map(|(i, _)| i)
        .collect();
    let positive = candidates.len();

    let selected = top_indices(&sum.values, candidates, cap);

    debug!(positive, cap, selected = selected.len(), "Selected top cells");

    Ok(selected
        .into_iter()
        .map(|i| {
            let (y, x) = (i / sum.width, i % sum.width);
            RankedPoint {
                lat: coords.lat[y],
                lon: coords.lon[x],
                sum_value: sum.values[i],
                max_value: max.values[i],
            }
        })
        .collect())
}
