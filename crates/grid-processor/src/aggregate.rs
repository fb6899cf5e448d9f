//! Reduction of the time axis to one value per cell.
//!
//! The source is consumed one slice at a time; accumulators are sized to the
//! strided grid, so memory is O(H′·W′) plus the slice being processed.

use grid_common::{DatasetHandle, GridError, GridResult, Slice2D};
use tracing::{debug, warn};

use crate::source::GridSource;
use crate::types::{AggregateGrid, AggregationMode};

/// Per-cell accumulators for one pass over the time axis.
///
/// Totals and counts are always kept (mean needs both, sum needs the total);
/// the running maximum is only allocated when requested.
#[derive(Debug, Clone)]
pub struct TemporalAggregator {
    width: usize,
    height: usize,
    total: Vec<f64>,
    count: Vec<u32>,
    max: Option<Vec<f64>>,
    steps: usize,
}

impl TemporalAggregator {
    /// Accumulators for a `height`×`width` grid.
    pub fn new(height: usize, width: usize, track_max: bool) -> Self {
        let cells = height * width;
        Self {
            width,
            height,
            total: vec![0.0; cells],
            count: vec![0; cells],
            max: track_max.then(|| vec![0.0; cells]),
            steps: 0,
        }
    }

    /// Fold one time step into the accumulators. Invalid cells are skipped.
    pub fn update(&mut self, slice: &Slice2D) -> GridResult<()> {
        if slice.width != self.width || slice.height != self.height {
            return Err(GridError::malformed(format!(
                "slice is {}x{}, accumulators are {}x{}",
                slice.height, slice.width, self.height, self.width
            )));
        }

        for (i, (value, valid)) in slice.cells().enumerate() {
            if !valid {
                continue;
            }
            // saturate so totals stay finite
            self.total[i] = (self.total[i] + value).min(f64::MAX);
            self.count[i] += 1;
            if let Some(max) = self.max.as_mut() {
                if value > max[i] {
                    max[i] = value;
                }
            }
        }

        self.steps += 1;
        Ok(())
    }

    /// Number of slices folded so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Produce the aggregate for `mode`.
    ///
    /// Cells with no valid sample are 0 in every mode.
    pub fn finish(&self, mode: AggregationMode) -> AggregateGrid {
        let values = match mode {
            AggregationMode::Mean => self
                .total
                .iter()
                .zip(&self.count)
                .map(|(&total, &count)| if count > 0 { total / count as f64 } else { 0.0 })
                .collect(),
            AggregationMode::Sum => self.total.clone(),
            AggregationMode::Max => match &self.max {
                Some(max) => max.clone(),
                None => {
                    warn!("max requested from an aggregator built without max tracking");
                    vec![0.0; self.total.len()]
                }
            },
        };

        AggregateGrid {
            width: self.width,
            height: self.height,
            values,
            valid_count: self.count.clone(),
            mode,
            time_steps: self.steps,
        }
    }
}

fn run<D: DatasetHandle>(source: &GridSource<D>, track_max: bool) -> GridResult<TemporalAggregator> {
    let dims = source.dims();
    let mut acc = TemporalAggregator::new(dims.height, dims.width, track_max);

    for slice in source.slices() {
        acc.update(&slice?)?;
    }

    debug!(
        source = %source.source_name(),
        steps = acc.steps(),
        height = dims.height,
        width = dims.width,
        stride = source.stride(),
        "Aggregated time axis"
    );

    Ok(acc)
}

/// Reduce every time step of `source` with `mode`.
pub fn aggregate<D: DatasetHandle>(
    source: &GridSource<D>,
    mode: AggregationMode,
) -> GridResult<AggregateGrid> {
    let acc = run(source, mode == AggregationMode::Max)?;
    Ok(acc.finish(mode))
}

/// Compute the sum and max grids in a single pass.
pub fn aggregate_sum_max<D: DatasetHandle>(
    source: &GridSource<D>,
) -> GridResult<(AggregateGrid, AggregateGrid)> {
    let acc = run(source, true)?;
    Ok((acc.finish(AggregationMode::Sum), acc.finish(AggregationMode::Max)))
}
