//! Test data generators for synthetic emission grids.
//!
//! Everything here is deterministic so assertions can rely on exact values.

use grid_common::MemoryDataset;

/// Evenly spaced latitudes from north to south, cell-centred.
pub fn create_latitudes(height: usize) -> Vec<f64> {
    let step = 180.0 / height.max(1) as f64;
    (0..height).map(|i| 90.0 - step * (i as f64 + 0.5)).collect()
}

/// Evenly spaced longitudes from west to east, cell-centred.
pub fn create_longitudes(width: usize) -> Vec<f64> {
    let step = 360.0 / width.max(1) as f64;
    (0..width).map(|i| -180.0 + step * (i as f64 + 0.5)).collect()
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Creates a heavy-tailed emission-like grid.
///
/// About half the cells are 0 (ocean, no sources); positive cells follow a
/// roughly Pareto-shaped distribution so a few cells are orders of magnitude
/// above the rest.
///
/// # Returns
///
/// A `Vec<f64>` in row-major order.
pub fn create_emission_grid(width: usize, height: usize, seed: u32) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let hash = simple_hash(col as u32, row as u32, seed);
            let value = if hash % 2 == 0 {
                0.0
            } else {
                // u in (0, 1]; 1/u^1.5 gives the long tail
                let u = ((hash >> 8) % 10_000 + 1) as f64 / 10_000.0;
                0.01 / u.powf(1.5)
            };
            data.push(value);
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Creates a grid with NaN at the given `(col, row)` positions and `value`
/// everywhere else.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    value: f64,
    nan_positions: &[(usize, usize)],
) -> Vec<f64> {
    let mut data = vec![value; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f64::NAN;
        }
    }
    data
}

/// Builds an in-memory dataset of `time` emission-like slices.
///
/// Each time step uses a different seed so cells vary day to day.
pub fn create_emission_dataset(time: usize, height: usize, width: usize, seed: u32) -> MemoryDataset {
    let slices = (0..time)
        .map(|t| create_emission_grid(width, height, seed.wrapping_add(t as u32)))
        .collect();
    MemoryDataset::from_slices(
        "synthetic_emissions.nc",
        create_latitudes(height),
        create_longitudes(width),
        slices,
    )
    .expect("generated slices match the coordinate vectors")
}

/// Builds an in-memory dataset where every time step is the same slice.
pub fn create_repeated_dataset(time: usize, height: usize, width: usize, slice: Vec<f64>) -> MemoryDataset {
    MemoryDataset::from_slices(
        "repeated.nc",
        create_latitudes(height),
        create_longitudes(width),
        vec![slice; time],
    )
    .expect("slice matches the coordinate vectors")
}
