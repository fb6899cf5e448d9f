//! Common types shared across the grid processing crates.
//!
//! - [`DatasetHandle`]: read-only access to a time×lat×lon grid
//! - [`RawSlice`]: one timestep as delivered by a dataset, either with an
//!   explicit fill value or with a validity mask
//! - [`Slice2D`]: a normalized slice where every unusable cell is NaN
//! - stride helpers shared by readers and aggregators

pub mod dataset;
pub mod error;
pub mod memory;
pub mod stride;

pub use dataset::{is_valid_reading, Coordinates, DatasetHandle, GridDims, RawSlice, Slice2D};
pub use error::{GridError, GridResult};
pub use memory::MemoryDataset;
pub use stride::{sanitize_stride, stride_2d, strided_len, strided_values};
