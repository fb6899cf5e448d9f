//! Common test fixtures: small datasets with hand-checked results.

use grid_common::MemoryDataset;

/// File name of the monthly CarbonMonitor sample used by file-based tests.
pub const CARBON_MONITOR_SAMPLE: &str = "CarbonMonitor_total_y2024_m12.nc";

/// Two days over a 2×2 grid with a NaN and a negative reading.
///
/// ```text
/// day0 = [[1, 2], [3, -1]]
/// day1 = [[NaN, 2], [1, 1]]
/// ```
///
/// Mean over valid samples is `[[1, 2], [2, 1]]` with counts `[[1, 2], [2, 1]]`.
pub fn two_day_scenario() -> MemoryDataset {
    MemoryDataset::from_slices(
        "two_day.nc",
        vec![10.0, 0.0],
        vec![100.0, 110.0],
        vec![vec![1.0, 2.0, 3.0, -1.0], vec![f64::NAN, 2.0, 1.0, 1.0]],
    )
    .expect("fixture shape is consistent")
}

/// Same readings as [`two_day_scenario`] but with `-9999` as fill value
/// instead of NaN.
pub fn two_day_scenario_with_fill() -> MemoryDataset {
    MemoryDataset::from_slices(
        "two_day_fill.nc",
        vec![10.0, 0.0],
        vec![100.0, 110.0],
        vec![vec![1.0, 2.0, 3.0, -1.0], vec![-9999.0, 2.0, 1.0, 1.0]],
    )
    .expect("fixture shape is consistent")
    .with_fill_value(-9999.0)
}

/// Same readings as [`two_day_scenario`] but with a validity mask; the masked
/// cell carries a bogus large value that must be ignored.
pub fn two_day_scenario_with_mask() -> MemoryDataset {
    MemoryDataset::from_slices(
        "two_day_mask.nc",
        vec![10.0, 0.0],
        vec![100.0, 110.0],
        vec![vec![1.0, 2.0, 3.0, -1.0], vec![1.0e30, 2.0, 1.0, 1.0]],
    )
    .expect("fixture shape is consistent")
    .with_mask(vec![true, true, true, true, false, true, true, true])
    .expect("mask matches the values")
}

/// A `time`×`height`×`width` dataset of zeros.
pub fn all_zero_dataset(time: usize, height: usize, width: usize) -> MemoryDataset {
    crate::generators::create_repeated_dataset(time, height, width, vec![0.0; height * width])
}
