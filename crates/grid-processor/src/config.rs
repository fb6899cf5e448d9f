//! Options for the heatmap and point export paths.
//!
//! Out-of-range values are corrected rather than rejected: strides are
//! floored to 1, percentiles clamped to [90, 99.99], caps raised to 100.

use grid_common::sanitize_stride;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::{clamp_percentile, DEFAULT_PERCENTILE};
use crate::topn::{sanitize_cap, DEFAULT_TOP_N};
use crate::types::AggregationMode;

/// Default spatial stride for the heatmap path.
pub const DEFAULT_HEATMAP_STRIDE: usize = 8;
/// Default spatial stride for the point path.
pub const DEFAULT_POINT_STRIDE: usize = 20;

/// Options for rendering a heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapOptions {
    /// Spatial stride (≥ 1).
    pub stride: usize,
    /// Normalization percentile, within [90, 99.99].
    pub percentile: f64,
    /// Time-axis reduction.
    pub mode: AggregationMode,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            stride: DEFAULT_HEATMAP_STRIDE,
            percentile: DEFAULT_PERCENTILE,
            mode: AggregationMode::Mean,
        }
    }
}

impl HeatmapOptions {
    /// Load options from environment variables.
    ///
    /// - `HEATMAP_STRIDE`
    /// - `HEATMAP_PERCENTILE`
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(val) = std::env::var("HEATMAP_STRIDE") {
            if let Ok(stride) = val.parse() {
                options = options.with_stride(stride);
            }
        }

        if let Ok(val) = std::env::var("HEATMAP_PERCENTILE") {
            if let Ok(percentile) = val.parse() {
                options = options.with_percentile(percentile);
            }
        }

        options
    }

    /// Set the stride, flooring invalid values to 1.
    pub fn with_stride(mut self, raw: f64) -> Self {
        self.stride = sanitize_stride(raw);
        if self.stride as f64 != raw {
            debug!(requested = raw, used = self.stride, "Corrected heatmap stride");
        }
        self
    }

    /// Set the percentile, clamping into [90, 99.99].
    pub fn with_percentile(mut self, raw: f64) -> Self {
        self.percentile = clamp_percentile(raw);
        if self.percentile != raw {
            debug!(requested = raw, used = self.percentile, "Corrected normalization percentile");
        }
        self
    }

    pub fn with_mode(mut self, mode: AggregationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Options for the ranked point export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointOptions {
    /// Spatial stride (≥ 1).
    pub stride: usize,
    /// Maximum number of points (≥ 100).
    pub top_n: usize,
}

impl Default for PointOptions {
    fn default() -> Self {
        Self {
            stride: DEFAULT_POINT_STRIDE,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl PointOptions {
    /// Load options from environment variables.
    ///
    /// - `CARBON_MONITOR_STRIDE`
    /// - `CARBON_MONITOR_TOP_N`
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(val) = std::env::var("CARBON_MONITOR_STRIDE") {
            if let Ok(stride) = val.parse() {
                options = options.with_stride(stride);
            }
        }

        if let Ok(val) = std::env::var("CARBON_MONITOR_TOP_N") {
            if let Ok(top_n) = val.parse() {
                options = options.with_top_n(top_n);
            }
        }

        options
    }

    /// Set the stride, flooring invalid values to 1.
    pub fn with_stride(mut self, raw: f64) -> Self {
        self.stride = sanitize_stride(raw);
        if self.stride as f64 != raw {
            debug!(requested = raw, used = self.stride, "Corrected point stride");
        }
        self
    }

    /// Set the cap, raising it to at least 100.
    pub fn with_top_n(mut self, raw: i64) -> Self {
        self.top_n = sanitize_cap(raw);
        if self.top_n as i64 != raw {
            debug!(requested = raw, used = self.top_n, "Corrected top-n cap");
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let heatmap = HeatmapOptions::default();
        assert_eq!(heatmap.stride, 8);
        assert_eq!(heatmap.percentile, 99.0);
        assert_eq!(heatmap.mode, AggregationMode::Mean);

        let points = PointOptions::default();
        assert_eq!(points.stride, 20);
        assert_eq!(points.top_n, 5000);
    }

    #[test]
    fn test_out_of_range_values_are_corrected() {
        let heatmap = HeatmapOptions::default().with_stride(0.0).with_percentile(150.0);
        assert_eq!(heatmap.stride, 1);
        assert_eq!(heatmap.percentile, 99.99);

        let heatmap = HeatmapOptions::default().with_stride(4.9).with_percentile(10.0);
        assert_eq!(heatmap.stride, 4);
        assert_eq!(heatmap.percentile, 90.0);

        let points = PointOptions::default().with_stride(-3.0).with_top_n(5);
        assert_eq!(points.stride, 1);
        assert_eq!(points.top_n, 100);
    }

    // Single test: the environment is shared by every test thread.
    #[test]
    fn test_from_env_overrides() {
        std::env::set_var("HEATMAP_STRIDE", "0.5");
        std::env::set_var("HEATMAP_PERCENTILE", "150");
        std::env::set_var("CARBON_MONITOR_STRIDE", "abc");
        std::env::set_var("CARBON_MONITOR_TOP_N", "10");

        let heatmap = HeatmapOptions::from_env();
        assert_eq!(heatmap.stride, 1);
        assert_eq!(heatmap.percentile, 99.99);

        let points = PointOptions::from_env();
        assert_eq!(points.stride, DEFAULT_POINT_STRIDE);
        assert_eq!(points.top_n, 100);

        std::env::set_var("HEATMAP_STRIDE", "4");
        std::env::set_var("HEATMAP_PERCENTILE", "95.5");
        std::env::set_var("CARBON_MONITOR_STRIDE", "12");
        std::env::set_var("CARBON_MONITOR_TOP_N", "2500");

        let heatmap = HeatmapOptions::from_env();
        assert_eq!((heatmap.stride, heatmap.percentile), (4, 95.5));
        let points = PointOptions::from_env();
        assert_eq!((points.stride, points.top_n), (12, 2500));

        // explicit values win over the environment
        let heatmap = HeatmapOptions::from_env().with_stride(2.0).with_percentile(97.0);
        assert_eq!((heatmap.stride, heatmap.percentile), (2, 97.0));
        let points = PointOptions::from_env().with_stride(3.0).with_top_n(700);
        assert_eq!((points.stride, points.top_n), (3, 700));

        for key in [
            "HEATMAP_STRIDE",
            "HEATMAP_PERCENTILE",
            "CARBON_MONITOR_STRIDE",
            "CARBON_MONITOR_TOP_N",
        ] {
            std::env::remove_var(key);
        }
        assert_eq!(HeatmapOptions::from_env(), HeatmapOptions::default());
        assert_eq!(PointOptions::from_env(), PointOptions::default());
    }
}
