//! Strided, slice-at-a-time view over a dataset.

use grid_common::{Coordinates, DatasetHandle, GridDims, GridError, GridResult, Slice2D};

/// A dataset read at a fixed spatial stride.
///
/// Time steps are produced lazily by [`GridSource::slices`]; each slice is
/// normalized (fill and masked cells become NaN) and checked against the
/// strided dimensions before it is handed out.
#[derive(Debug)]
pub struct GridSource<D> {
    handle: D,
    stride: usize,
}

impl<D: DatasetHandle> GridSource<D> {
    /// Wrap `handle`. A stride of 0 is treated as 1.
    pub fn new(handle: D, stride: usize) -> Self {
        Self {
            handle,
            stride: stride.max(1),
        }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn source_name(&self) -> &str {
        self.handle.source_name()
    }

    /// Dimensions at native resolution.
    pub fn full_dims(&self) -> GridDims {
        self.handle.dims()
    }

    /// Dimensions after striding.
    pub fn dims(&self) -> GridDims {
        self.handle.dims().strided(self.stride)
    }

    pub fn time_steps(&self) -> usize {
        self.handle.dims().time
    }

    /// Coordinate vectors strided like the data.
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.handle.latitudes().to_vec(), self.handle.longitudes().to_vec())
            .strided(self.stride)
    }

    /// Read and normalize one time step.
    pub fn read(&self, t: usize) -> GridResult<Slice2D> {
        let slice = self.handle.read_slice(t, self.stride)?.normalize()?;
        let dims = self.dims();
        if slice.width != dims.width || slice.height != dims.height {
            return Err(GridError::malformed(format!(
                "time step {} of {} is {}x{}, expected {}x{}",
                t,
                self.source_name(),
                slice.height,
                slice.width,
                dims.height,
                dims.width
            )));
        }
        Ok(slice)
    }

    /// Iterate over all time steps in order.
    pub fn slices(&self) -> Slices<'_, D> {
        Slices { source: self, next: 0 }
    }

    pub fn into_inner(self) -> D {
        self.handle
    }
}

/// Iterator returned by [`GridSource::slices`].
pub struct Slices<'a, D> {
    source: &'a GridSource<D>,
    next: usize,
}

impl<D: DatasetHandle> Iterator for Slices<'_, D> {
    type Item = GridResult<Slice2D>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.source.time_steps() {
            return None;
        }
        let t = self.next;
        self.next += 1;
        Some(self.source.read(t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.source.time_steps().saturating_sub(self.next);
        (left, Some(left))
    }
}
