//! Robust [0, 1] scaling of aggregate magnitudes.
//!
//! Emission fields are heavy-tailed: a handful of point sources dwarf
//! everything else. Values are scaled against a high percentile of the
//! positive cells instead of the maximum, then log-compressed:
//!
//! ```text
//! t = clip(log1p(max(v, 0)) / log1p(scale), 0, 1)
//! ```

use std::cmp::Ordering;

use tracing::warn;

use crate::types::AggregateGrid;

/// Lowest accepted normalization percentile.
pub const MIN_PERCENTILE: f64 = 90.0;
/// Highest accepted normalization percentile.
pub const MAX_PERCENTILE: f64 = 99.99;
/// Percentile used when none (or a non-finite one) is given.
pub const DEFAULT_PERCENTILE: f64 = 99.0;

/// Clamp a requested percentile into [`MIN_PERCENTILE`], [`MAX_PERCENTILE`].
pub fn clamp_percentile(percentile: f64) -> f64 {
    if percentile.is_finite() {
        percentile.clamp(MIN_PERCENTILE, MAX_PERCENTILE)
    } else {
        DEFAULT_PERCENTILE
    }
}

/// Percentile of `values` with linear interpolation between closest ranks.
///
/// Reorders `values` in place. Uses partition selection, so it runs in
/// expected linear time. Returns `None` for an empty slice.
pub fn percentile_of(values: &mut [f64], percentile: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let p = percentile.clamp(0.0, 100.0) / 100.0;
    let rank = p * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let frac = rank - lo as f64;

    let (_, &mut lower, upper_part) = values.select_nth_unstable_by(lo, f64::total_cmp);
    if frac == 0.0 || upper_part.is_empty() {
        return Some(lower);
    }

    let upper = upper_part
        .iter()
        .copied()
        .min_by(f64::total_cmp)
        .unwrap_or(lower);
    Some(lower + (upper - lower) * frac)
}

/// Grid of normalized intensities in [0, 1].
#[derive(Debug, Clone)]
pub struct NormalizedGrid {
    pub width: usize,
    pub height: usize,
    /// Row-major intensities.
    pub values: Vec<f64>,
    /// Value mapped to 1.0; `None` when the grid carried no positive signal.
    pub scale_value: Option<f64>,
    /// Percentile actually used, after clamping.
    pub percentile: f64,
}

impl NormalizedGrid {
    /// Grid with no signal at all. Renders fully transparent.
    pub fn absent(width: usize, height: usize, percentile: f64) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
            scale_value: None,
            percentile,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.scale_value.is_none()
    }

    pub fn get(&self, y: usize, x: usize) -> Option<f64> {
        if y >= self.height || x >= self.width {
            return None;
        }
        self.values.get(y * self.width + x).copied()
    }
}

/// Scale value for a grid: the percentile of its positive cells, or their
/// maximum if the percentile is unusable. `None` when no cell is positive.
pub fn scale_value(grid: &AggregateGrid, percentile: f64) -> Option<f64> {
    let mut positive: Vec<f64> = grid.positive_values().filter(|v| v.is_finite()).collect();
    if positive.is_empty() {
        return None;
    }

    let max = positive
        .iter()
        .copied()
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .unwrap_or(0.0);

    match percentile_of(&mut positive, percentile) {
        Some(scale) if scale.is_finite() && scale > 0.0 => Some(scale),
        other => {
            warn!(
                percentile,
                scale = ?other,
                fallback = max,
                "Degenerate percentile scale, using subset maximum"
            );
            Some(max)
        }
    }
}

/// Map one aggregate value to [0, 1] against `scale` (> 0).
#[inline]
pub fn normalize_value(value: f64, scale: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let t = value.max(0.0).ln_1p() / scale.ln_1p();
    t.clamp(0.0, 1.0)
}

/// Normalize an aggregate grid for rendering.
///
/// `percentile` is clamped to [90, 99.99]. A grid without positive values
/// yields [`NormalizedGrid::absent`].
pub fn normalize(grid: &AggregateGrid, percentile: f64) -> NormalizedGrid {
    let percentile = clamp_percentile(percentile);

    let Some(scale) = scale_value(grid, percentile) else {
        return NormalizedGrid::absent(grid.width, grid.height, percentile);
    };

    let values = grid
        .values
        .iter()
        .map(|&v| normalize_value(v, scale))
        .collect();

    NormalizedGrid {
        width: grid.width,
        height: grid.height,
        values,
        scale_value: Some(scale),
        percentile,
    }
}
