//! NetCDF reader for gridded emission datasets.
//!
//! Opens CF-style files holding a `(time, latitude, longitude)` data variable
//! plus 1D coordinate variables, and serves them through
//! [`grid_common::DatasetHandle`] one time step at a time.
//!
//! # Implementation Notes
//!
//! Reading goes through the `netcdf` crate (libnetcdf + HDF5). Only the
//! strided rows of the requested time step are fetched, so memory stays at
//! one downsampled slice regardless of the file size.
//!
//! Missing cells follow the CF conventions: `_FillValue`, then
//! `missing_value`, then the library default fill. When the variable is
//! packed (`scale_factor` / `add_offset`) the slice is reported with a
//! validity mask since unpacked values can no longer be compared against the
//! fill value.

pub mod dataset;
pub mod error;

pub use dataset::{silence_hdf5_errors, NetCdfDataset, VariableNames};
pub use error::{NetCdfError, NetCdfResult};
