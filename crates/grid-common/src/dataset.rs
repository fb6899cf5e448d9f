//! Dataset access contract for time×lat×lon grids.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::stride::{strided_len, strided_values};

/// A reading is usable iff it is finite and non-negative.
#[inline]
pub fn is_valid_reading(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Dimensions of a 3D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    /// Number of time steps (T)
    pub time: usize,
    /// Number of latitude rows (H)
    pub height: usize,
    /// Number of longitude columns (W)
    pub width: usize,
}

impl GridDims {
    pub fn new(time: usize, height: usize, width: usize) -> Self {
        Self { time, height, width }
    }

    /// Dimensions after applying a spatial stride. The time axis is untouched.
    pub fn strided(&self, stride: usize) -> Self {
        Self {
            time: self.time,
            height: strided_len(self.height, stride),
            width: strided_len(self.width, stride),
        }
    }

    /// Number of spatial cells in one slice.
    pub fn cells(&self) -> usize {
        self.height * self.width
    }
}

/// Latitude and longitude vectors of a regular grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
}

impl Coordinates {
    pub fn new(lat: Vec<f64>, lon: Vec<f64>) -> Self {
        Self { lat, lon }
    }

    pub fn height(&self) -> usize {
        self.lat.len()
    }

    pub fn width(&self) -> usize {
        self.lon.len()
    }

    /// Coordinates strided identically to the data.
    pub fn strided(&self, stride: usize) -> Self {
        Self {
            lat: strided_values(&self.lat, stride),
            lon: strided_values(&self.lon, stride),
        }
    }

    /// `(lat, lon)` of the cell at row `y`, column `x`.
    pub fn point(&self, y: usize, x: usize) -> Option<(f64, f64)> {
        Some((*self.lat.get(y)?, *self.lon.get(x)?))
    }
}

/// One time step as delivered by a dataset.
///
/// Datasets mark missing cells either with a sentinel fill value or with a
/// separate mask. [`RawSlice::normalize`] folds both into NaN.
#[derive(Debug, Clone)]
pub enum RawSlice {
    /// Values where cells equal to `fill_value` are missing.
    WithFillValue {
        width: usize,
        height: usize,
        values: Vec<f64>,
        fill_value: Option<f64>,
    },
    /// Values with a parallel mask; `mask[i] == true` means the cell is usable.
    WithValidityMask {
        width: usize,
        height: usize,
        values: Vec<f64>,
        mask: Vec<bool>,
    },
}

impl RawSlice {
    pub fn width(&self) -> usize {
        match self {
            RawSlice::WithFillValue { width, .. } | RawSlice::WithValidityMask { width, .. } => {
                *width
            }
        }
    }

    pub fn height(&self) -> usize {
        match self {
            RawSlice::WithFillValue { height, .. } | RawSlice::WithValidityMask { height, .. } => {
                *height
            }
        }
    }

    /// Replace fill-valued and masked-out cells with NaN.
    pub fn normalize(self) -> GridResult<Slice2D> {
        match self {
            RawSlice::WithFillValue {
                width,
                height,
                mut values,
                fill_value,
            } => {
                check_len("values", values.len(), width, height)?;
                if let Some(fill) = fill_value {
                    for v in values.iter_mut() {
                        if *v == fill {
                            *v = f64::NAN;
                        }
                    }
                }
                Ok(Slice2D { width, height, values })
            }
            RawSlice::WithValidityMask {
                width,
                height,
                mut values,
                mask,
            } => {
                check_len("values", values.len(), width, height)?;
                check_len("mask", mask.len(), width, height)?;
                for (v, &ok) in values.iter_mut().zip(&mask) {
                    if !ok {
                        *v = f64::NAN;
                    }
                }
                Ok(Slice2D { width, height, values })
            }
        }
    }
}

fn check_len(what: &str, len: usize, width: usize, height: usize) -> GridResult<()> {
    if len != width * height {
        return Err(GridError::malformed(format!(
            "slice {} has {} cells, expected {}x{}",
            what, len, height, width
        )));
    }
    Ok(())
}

/// A normalized 2D slice (row-major). Unusable cells are NaN.
#[derive(Debug, Clone)]
pub struct Slice2D {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
}

impl Slice2D {
    /// `(value, is_valid)` for every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (f64, bool)> + '_ {
        self.values.iter().map(|&v| (v, is_valid_reading(v)))
    }

    pub fn get(&self, y: usize, x: usize) -> Option<f64> {
        if y >= self.height || x >= self.width {
            return None;
        }
        self.values.get(y * self.width + x).copied()
    }
}

/// Read-only access to a 3D time×lat×lon grid.
///
/// Implementations hand out one time step at a time so callers never hold
/// the whole volume. Any open resource is released when the handle drops.
pub trait DatasetHandle {
    /// Name reported in export metadata (usually the file name).
    fn source_name(&self) -> &str;

    /// Full-resolution dimensions.
    fn dims(&self) -> GridDims;

    /// Full-resolution latitude vector (length H).
    fn latitudes(&self) -> &[f64];

    /// Full-resolution longitude vector (length W).
    fn longitudes(&self) -> &[f64];

    /// Read time step `t` keeping every `stride`th row and column.
    fn read_slice(&self, t: usize, stride: usize) -> GridResult<RawSlice>;
}

impl<D: DatasetHandle + ?Sized> DatasetHandle for &D {
    fn source_name(&self) -> &str {
        (**self).source_name()
    }

    fn dims(&self) -> GridDims {
        (**self).dims()
    }

    fn latitudes(&self) -> &[f64] {
        (**self).latitudes()
    }

    fn longitudes(&self) -> &[f64] {
        (**self).longitudes()
    }

    fn read_slice(&self, t: usize, stride: usize) -> GridResult<RawSlice> {
        (**self).read_slice(t, stride)
    }
}
