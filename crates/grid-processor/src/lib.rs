//! Temporal aggregation, robust normalization and top-N ranking of
//! gridded emission data.
//!
//! # Architecture
//!
//! ```text
//! DatasetHandle (NetCDF, in-memory, ...)
//!      │
//!      ▼
//! GridSource (stride, one slice at a time)
//!      │
//!      ▼
//! aggregate() ──► AggregateGrid + valid counts
//!      │                     │
//!      ▼                     ▼
//! normalize()           select_top()
//!      │                     │
//!      ▼                     ▼
//! NormalizedGrid        Vec<RankedPoint>
//! (→ renderer)          (→ point sink)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{aggregate, normalize, AggregationMode, GridSource};
//!
//! let source = GridSource::new(dataset, 8);
//! let grid = aggregate(&source, AggregationMode::Mean)?;
//! let normalized = normalize(&grid, 99.0);
//! ```

pub mod aggregate;
pub mod config;
pub mod normalize;
pub mod source;
pub mod topn;
pub mod types;

// Re-export commonly used types at crate root
pub use aggregate::{aggregate, aggregate_sum_max, TemporalAggregator};
pub use config::{HeatmapOptions, PointOptions, DEFAULT_HEATMAP_STRIDE, DEFAULT_POINT_STRIDE};
pub use grid_common::{Coordinates, GridError, GridResult};
pub use normalize::{
    clamp_percentile, normalize, percentile_of, NormalizedGrid, DEFAULT_PERCENTILE,
    MAX_PERCENTILE, MIN_PERCENTILE,
};
pub use source::GridSource;
pub use topn::{sanitize_cap, select_top, DEFAULT_TOP_N, MIN_TOP_N};
pub use types::{AggregateGrid, AggregationMode, RankedPoint};
