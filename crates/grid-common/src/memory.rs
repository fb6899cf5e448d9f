//! In-memory dataset, used by tests and by callers that already hold the data.

use crate::dataset::{DatasetHandle, GridDims, RawSlice};
use crate::error::{GridError, GridResult};
use crate::stride::stride_2d;

/// How a [`MemoryDataset`] reports missing cells.
#[derive(Debug, Clone)]
enum Missing {
    Fill(Option<f64>),
    Mask(Vec<bool>),
}

/// A time×lat×lon grid held in a flat row-major buffer.
#[derive(Debug, Clone)]
pub struct MemoryDataset {
    name: String,
    dims: GridDims,
    lat: Vec<f64>,
    lon: Vec<f64>,
    values: Vec<f64>,
    missing: Missing,
}

impl MemoryDataset {
    /// Build a dataset from per-timestep slices, each `lat.len() * lon.len()` long.
    pub fn from_slices(
        name: impl Into<String>,
        lat: Vec<f64>,
        lon: Vec<f64>,
        slices: Vec<Vec<f64>>,
    ) -> GridResult<Self> {
        let dims = GridDims::new(slices.len(), lat.len(), lon.len());
        let mut values = Vec::with_capacity(dims.time * dims.cells());
        for (t, slice) in slices.into_iter().enumerate() {
            if slice.len() != dims.cells() {
                return Err(GridError::malformed(format!(
                    "time step {} has {} cells, expected {}",
                    t,
                    slice.len(),
                    dims.cells()
                )));
            }
            values.extend(slice);
        }

        Ok(Self {
            name: name.into(),
            dims,
            lat,
            lon,
            values,
            missing: Missing::Fill(None),
        })
    }

    /// Report cells equal to `fill` as missing.
    pub fn with_fill_value(mut self, fill: f64) -> Self {
        self.missing = Missing::Fill(Some(fill));
        self
    }

    /// Report missing cells through a mask laid out like the values
    /// (`true` = usable).
    pub fn with_mask(mut self, mask: Vec<bool>) -> GridResult<Self> {
        if mask.len() != self.values.len() {
            return Err(GridError::malformed(format!(
                "mask has {} cells, expected {}",
                mask.len(),
                self.values.len()
            )));
        }
        self.missing = Missing::Mask(mask);
        Ok(self)
    }
}

impl DatasetHandle for MemoryDataset {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn dims(&self) -> GridDims {
        self.dims
    }

    fn latitudes(&self) -> &[f64] {
        &self.lat
    }

    fn longitudes(&self) -> &[f64] {
        &self.lon
    }

    fn read_slice(&self, t: usize, stride: usize) -> GridResult<RawSlice> {
        if t >= self.dims.time {
            return Err(GridError::TimeOutOfRange {
                index: t,
                len: self.dims.time,
            });
        }

        let cells = self.dims.cells();
        let range = t * cells..(t + 1) * cells;
        let out = self.dims.strided(stride);
        let values = stride_2d(&self.values[range.clone()], self.dims.height, self.dims.width, stride);

        Ok(match &self.missing {
            Missing::Fill(fill_value) => RawSlice::WithFillValue {
                width: out.width,
                height: out.height,
                values,
                fill_value: *fill_value,
            },
            Missing::Mask(mask) => RawSlice::WithValidityMask {
                width: out.width,
                height: out.height,
                values,
                mask: stride_2d(&mask[range], self.dims.height, self.dims.width, stride),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> MemoryDataset {
        MemoryDataset::from_slices(
            "test.nc",
            vec![10.0, 20.0],
            vec![100.0, 110.0],
            vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_read_slice_by_time() {
        let ds = two_by_two();
        let slice = ds.read_slice(1, 1).unwrap().normalize().unwrap();
        assert_eq!(slice.values, vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_read_slice_strided() {
        let ds = two_by_two();
        let raw = ds.read_slice(0, 2).unwrap();
        assert_eq!((raw.width(), raw.height()), (1, 1));
        assert_eq!(raw.normalize().unwrap().values, vec![1.0]);
    }

    #[test]
    fn test_out_of_range_time() {
        let ds = two_by_two();
        assert!(matches!(
            ds.read_slice(2, 1),
            Err(GridError::TimeOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_mask_representation() {
        let ds = two_by_two()
            .with_mask(vec![true, false, true, true, true, true, true, false])
            .unwrap();
        let slice = ds.read_slice(1, 1).unwrap().normalize().unwrap();
        assert!(slice.values[3].is_nan());
        assert_eq!(slice.values[0], 5.0);
    }

    #[test]
    fn test_rejects_ragged_slices() {
        let result = MemoryDataset::from_slices("x", vec![0.0], vec![0.0, 1.0], vec![vec![1.0]]);
        assert!(result.is_err());
    }
}
