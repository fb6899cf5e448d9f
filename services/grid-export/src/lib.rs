//! Grid export service library.
//!
//! Reads gridded emission datasets and produces either heatmap payloads
//! (for the map front end) or ranked point rows (for bulk loading).

pub mod heatmap;
pub mod points;
pub mod sink;

pub use heatmap::{render_files, render_heatmap, write_outputs, HeatmapOutputs, HeatmapRender};
pub use points::{export_points, rank_points};
pub use sink::{CsvPointSink, PointRow, PointSink};

use std::path::Path;

use anyhow::{Context, Result};
use netcdf_parser::{NetCdfDataset, VariableNames};

/// Open a NetCDF dataset, attaching the path to any error.
pub fn open_dataset(path: &Path, names: &VariableNames) -> Result<NetCdfDataset> {
    NetCdfDataset::open(path, names).with_context(|| format!("failed to open {}", path.display()))
}
