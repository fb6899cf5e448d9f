//! Core types for grid aggregation.

use serde::{Deserialize, Serialize};

/// How the time axis is reduced to one value per cell.
///
/// - **Mean**: average over the valid samples (heatmap default)
/// - **Sum**: running total of valid samples (monthly totals for ranking)
/// - **Max**: largest valid sample (peak daily value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    #[default]
    Mean,
    Sum,
    Max,
}

impl AggregationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMode::Mean => "mean",
            AggregationMode::Sum => "sum",
            AggregationMode::Max => "max",
        }
    }
}

impl std::str::FromStr for AggregationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" | "avg" | "average" => Ok(AggregationMode::Mean),
            "sum" | "total" => Ok(AggregationMode::Sum),
            "max" | "maximum" => Ok(AggregationMode::Max),
            other => Err(format!("unknown aggregation mode '{}'", other)),
        }
    }
}

impl std::fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 2D grid of per-cell aggregates with the number of valid samples behind each.
///
/// Cells without any valid sample hold `0.0` and a count of zero; values are
/// never NaN or infinite.
#[derive(Debug, Clone)]
pub struct AggregateGrid {
    /// Width in grid points (W′).
    pub width: usize,
    /// Height in grid points (H′).
    pub height: usize,
    /// Row-major aggregate values.
    pub values: Vec<f64>,
    /// Row-major count of valid samples per cell.
    pub valid_count: Vec<u32>,
    /// Reduction that produced the values.
    pub mode: AggregationMode,
    /// Number of time steps consumed.
    pub time_steps: usize,
}

impl AggregateGrid {
    #[inline]
    fn index(&self, y: usize, x: usize) -> Option<usize> {
        (y < self.height && x < self.width).then(|| y * self.width + x)
    }

    /// Aggregate value at row `y`, column `x`.
    pub fn get(&self, y: usize, x: usize) -> Option<f64> {
        self.index(y, x).map(|i| self.values[i])
    }

    /// Number of valid samples at row `y`, column `x`.
    pub fn count(&self, y: usize, x: usize) -> Option<u32> {
        self.index(y, x).map(|i| self.valid_count[i])
    }

    /// Whether the cell had at least one valid sample.
    pub fn has_data(&self, y: usize, x: usize) -> bool {
        self.count(y, x).is_some_and(|c| c > 0)
    }

    /// Strictly positive aggregate values, in row-major order.
    pub fn positive_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter(|&v| v > 0.0)
    }

    /// Number of cells with at least one valid sample.
    pub fn cells_with_data(&self) -> usize {
        self.valid_count.iter().filter(|&&c| c > 0).count()
    }
}

/// A ranked cell of the point export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPoint {
    pub lat: f64,
    pub lon: f64,
    /// Total over the time axis; always > 0.
    pub sum_value: f64,
    /// Largest single time-step value.
    pub max_value: f64,
}
