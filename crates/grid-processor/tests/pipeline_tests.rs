//! Integration tests for aggregation, normalization and top-N ranking.

use grid_common::{Coordinates, MemoryDataset};
use grid_processor::{
    aggregate, aggregate_sum_max, normalize, percentile_of, select_top, AggregateGrid,
    AggregationMode, GridSource, RankedPoint,
};
use test_utils::{
    all_zero_dataset, assert_approx_eq, create_constant_grid, create_emission_dataset,
    create_grid_with_nans, create_latitudes, create_longitudes, create_repeated_dataset,
    two_day_scenario, two_day_scenario_with_fill,
    two_day_scenario_with_mask,
};

// ============================================================================
// Helper functions
// ============================================================================

fn single_row(values: Vec<f64>) -> AggregateGrid {
    let n = values.len();
    AggregateGrid {
        width: n,
        height: 1,
        valid_count: vec![1; n],
        values,
        mode: AggregationMode::Sum,
        time_steps: 1,
    }
}

/// Full-sort reference ranking.
fn reference_top(sum: &[f64], cap: usize) -> Vec<f64> {
    let mut positive: Vec<f64> = sum.iter().copied().filter(|&v| v > 0.0).collect();
    positive.sort_by(|a, b| b.total_cmp(a));
    positive.truncate(cap);
    positive
}

// ============================================================================
// Stride tests
// ============================================================================

#[test]
fn test_strided_dims_are_ceiling() {
    let dataset = create_emission_dataset(1, 37, 53, 2);
    for stride in 1..=12 {
        let source = GridSource::new(&dataset, stride);
        let dims = source.dims();
        assert_eq!(dims.height, 37usize.div_ceil(stride), "stride {stride}");
        assert_eq!(dims.width, 53usize.div_ceil(stride), "stride {stride}");

        let grid = aggregate(&source, AggregationMode::Mean).unwrap();
        assert_eq!(grid.values.len(), dims.height * dims.width);

        let coords = source.coordinates();
        assert_eq!((coords.height(), coords.width()), (dims.height, dims.width));
    }
}

// ============================================================================
// Aggregation tests
// ============================================================================

#[test]
fn test_two_day_mean_scenario() {
    for dataset in [two_day_scenario(), two_day_scenario_with_fill(), two_day_scenario_with_mask()] {
        let grid = aggregate(&GridSource::new(dataset, 1), AggregationMode::Mean).unwrap();
        assert_eq!(grid.values, vec![1.0, 2.0, 2.0, 1.0]);
        assert_eq!(grid.valid_count, vec![1, 2, 2, 1]);
    }
}

#[test]
fn test_mean_never_nan_or_infinite() {
    let width = 6;
    let height = 4;
    // column 0 is NaN on every day
    let nans: Vec<(usize, usize)> = (0..height).map(|row| (0, row)).collect();
    let slice = create_grid_with_nans(width, height, 2.5, &nans);
    let dataset = MemoryDataset::from_slices(
        "nan.nc",
        create_latitudes(height),
        create_longitudes(width),
        vec![slice.clone(), slice],
    )
    .unwrap();

    let grid = aggregate(&GridSource::new(dataset, 1), AggregationMode::Mean).unwrap();
    assert!(grid.values.iter().all(|v| v.is_finite()));
    for row in 0..height {
        assert_eq!(grid.get(row, 0), Some(0.0));
        assert_eq!(grid.count(row, 0), Some(0));
        assert_eq!(grid.get(row, 1), Some(2.5));
    }
}

#[test]
fn test_sum_max_match_separate_passes() {
    let source = GridSource::new(create_emission_dataset(6, 12, 18, 9), 2);
    let (sum, max) = aggregate_sum_max(&source).unwrap();
    assert_eq!(sum.values, aggregate(&source, AggregationMode::Sum).unwrap().values);
    assert_eq!(max.values, aggregate(&source, AggregationMode::Max).unwrap().values);
}

// ============================================================================
// Normalization tests
// ============================================================================

#[test]
fn test_percentile_99_of_one_to_hundred() {
    let values: Vec<f64> = (1..=100).map(|v| v as f64).collect();
    let out = normalize(&single_row(values.clone()), 99.0);

    let scale = out.scale_value.unwrap();
    assert_approx_eq!(scale, 99.01, 1e-9);
    assert_approx_eq!(out.values[99], 1.0, 1e-3);
    assert!(out.values.iter().all(|&t| t <= 1.0));

    let mut copy = values;
    assert_eq!(percentile_of(&mut copy, 99.0), Some(scale));
}

#[test]
fn test_normalized_values_bounded() {
    let source = GridSource::new(create_emission_dataset(10, 30, 30, 4), 1);
    let grid = aggregate(&source, AggregationMode::Mean).unwrap();
    for p in [90.0, 95.0, 99.0, 99.99] {
        let out = normalize(&grid, p);
        assert!(out.scale_value.unwrap() > 0.0);
        assert!(out.values.iter().all(|&t| (0.0..=1.0).contains(&t)));
    }
}

#[test]
fn test_zero_grid_is_empty_signal() {
    let source = GridSource::new(all_zero_dataset(3, 5, 5), 1);
    let grid = aggregate(&source, AggregationMode::Mean).unwrap();
    let out = normalize(&grid, 99.0);
    assert!(out.is_absent());
    assert_eq!(out.values, vec![0.0; 25]);
}

#[test]
fn test_constant_grid_normalizes_to_one() {
    let dataset = create_repeated_dataset(3, 4, 5, create_constant_grid(5, 4, 2.5));
    let grid = aggregate(&GridSource::new(dataset, 1), AggregationMode::Mean).unwrap();
    let out = normalize(&grid, 99.0);
    assert_eq!(out.scale_value, Some(2.5));
    assert!(out.values.iter().all(|&t| t == 1.0));
}

#[test]
fn test_single_positive_cell_scales_to_itself() {
    let out = normalize(&single_row(vec![0.0, 0.0, 7.0, 0.0]), 99.0);
    assert_eq!(out.scale_value, Some(7.0));
    assert_eq!(out.values, vec![0.0, 0.0, 1.0, 0.0]);
}

// ============================================================================
// Top-N tests
// ============================================================================

#[test]
fn test_top_5000_of_10000_matches_full_sort() {
    let width = 100;
    let height = 100;
    // distinct positive sums so the ranking has no ties
    let values: Vec<f64> = (0..width * height)
        .map(|i| ((i * 7919) % (width * height)) as f64 + 1.0)
        .collect();
    let sum = AggregateGrid {
        width,
        height,
        valid_count: vec![1; width * height],
        values: values.clone(),
        mode: AggregationMode::Sum,
        time_steps: 1,
    };
    let max = AggregateGrid {
        mode: AggregationMode::Max,
        ..sum.clone()
    };
    let coords = Coordinates::new(create_latitudes(height), create_longitudes(width));

    let picked = select_top(&sum, &max, &coords, 5000).unwrap();
    let sums: Vec<f64> = picked.iter().map(|p| p.sum_value).collect();

    assert_eq!(picked.len(), 5000);
    assert_eq!(sums, reference_top(&values, 5000));
}

#[test]
fn test_top_n_length_is_min_of_cap_and_positive() {
    let source = GridSource::new(create_emission_dataset(2, 30, 40, 8), 1);
    let (sum, max) = aggregate_sum_max(&source).unwrap();
    let coords = source.coordinates();
    let positive = sum.positive_values().count();

    for cap in [100, 250, positive, positive + 500] {
        let picked = select_top(&sum, &max, &coords, cap).unwrap();
        assert_eq!(picked.len(), cap.min(positive), "cap {cap}");
        assert!(picked.windows(2).all(|w| w[0].sum_value >= w[1].sum_value));
    }
}

#[test]
fn test_cap_below_floor_is_raised() {
    let values: Vec<f64> = (1..=300).map(|v| v as f64).collect();
    let sum = single_row(values);
    let coords = Coordinates::new(vec![0.0], create_longitudes(300));
    let picked = select_top(&sum, &sum, &coords, 5).unwrap();
    assert_eq!(picked.len(), 100);
    assert_eq!(picked[0].sum_value, 300.0);
}

#[test]
fn test_ranked_points_carry_coordinates() {
    let dataset = two_day_scenario();
    let source = GridSource::new(dataset, 1);
    let (sum, max) = aggregate_sum_max(&source).unwrap();
    let picked = select_top(&sum, &max, &source.coordinates(), 100).unwrap();

    // sums [[1, 4], [4, 1]], maxima [[1, 2], [3, 1]]
    assert_eq!(picked.len(), 4);
    let top: Vec<RankedPoint> = picked[..2].to_vec();
    assert!(top.iter().all(|p| p.sum_value == 4.0));
    assert!(top.contains(&RankedPoint {
        lat: 10.0,
        lon: 110.0,
        sum_value: 4.0,
        max_value: 2.0,
    }));
    assert!(top.contains(&RankedPoint {
        lat: 0.0,
        lon: 100.0,
        sum_value: 4.0,
        max_value: 3.0,
    }));
}

#[test]
fn test_shape_mismatch_is_malformed() {
    let sum = single_row(vec![1.0, 2.0]);
    let max = single_row(vec![1.0, 2.0, 3.0]);
    let coords = Coordinates::new(vec![0.0], vec![0.0, 1.0]);
    assert!(matches!(
        select_top(&sum, &max, &coords, 100),
        Err(grid_processor::GridError::MalformedGrid(_))
    ));

    let bad_coords = Coordinates::new(vec![0.0, 1.0], vec![0.0, 1.0]);
    assert!(select_top(&sum, &sum, &bad_coords, 100).is_err());
}
