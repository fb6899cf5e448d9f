//! Tests for the heatmap and point export paths.

use std::path::PathBuf;

use grid_export::{
    export_points, rank_points, render_heatmap, write_outputs, CsvPointSink, HeatmapOutputs,
    PointRow, PointSink,
};
use grid_processor::{AggregationMode, HeatmapOptions, PointOptions};
use netcdf_parser::VariableNames;
use renderer::{ColorRamp, HeatmapPayload};
use test_utils::{
    all_zero_dataset, create_emission_dataset, require_test_file, temp_test_dir, two_day_scenario,
    two_day_scenario_with_mask, CARBON_MONITOR_SAMPLE,
};

// ============================================================================
// Heatmap tests
// ============================================================================

#[test]
fn test_heatmap_meta_matches_grid() {
    let options = HeatmapOptions::default().with_stride(3.0);
    let render = render_heatmap(
        create_emission_dataset(5, 31, 40, 11),
        &options,
        &ColorRamp::emissions_default(),
    )
    .unwrap();

    let meta = &render.payload.meta;
    assert_eq!((meta.grid_height, meta.grid_width), (11, 14));
    assert_eq!(meta.days_averaged, 5);
    assert_eq!(meta.stride, 3);
    assert_eq!(render.image.pixels.len(), 11 * 14 * 4);
    assert!(meta.scale_value.unwrap() > 0.0);
}

#[test]
fn test_heatmap_zero_signal_is_transparent() {
    let render = render_heatmap(
        all_zero_dataset(2, 3, 3),
        &HeatmapOptions::default().with_stride(1.0),
        &ColorRamp::emissions_default(),
    )
    .unwrap();

    assert!(render.payload.meta.scale_value.is_none());
    assert!(render.image.pixels.iter().all(|&b| b == 0));
}

#[test]
fn test_heatmap_mask_and_nan_agree() {
    let ramp = ColorRamp::emissions_default();
    let options = HeatmapOptions::default().with_stride(1.0);
    let nan = render_heatmap(two_day_scenario(), &options, &ramp).unwrap();
    let masked = render_heatmap(two_day_scenario_with_mask(), &options, &ramp).unwrap();
    assert_eq!(nan.image, masked.image);
    assert_eq!(nan.payload.meta.scale_value, masked.payload.meta.scale_value);
}

#[test]
fn test_heatmap_max_mode() {
    let options = HeatmapOptions::default()
        .with_stride(1.0)
        .with_mode(AggregationMode::Max);
    let render = render_heatmap(two_day_scenario(), &options, &ColorRamp::emissions_default()).unwrap();
    // max grid is [[1, 2], [3, 1]]; the brightest pixel is the 3
    let alphas: Vec<u8> = render.image.pixels.chunks_exact(4).map(|px| px[3]).collect();
    assert_eq!(alphas.iter().max(), Some(&alphas[2]));
}

#[test]
fn test_write_outputs_single_file() {
    let dir = temp_test_dir();
    let json_path = dir.path().join("out/two_day.json");
    let png_path = dir.path().join("two_day.png");

    let render = render_heatmap(
        two_day_scenario(),
        &HeatmapOptions::default().with_stride(1.0),
        &ColorRamp::emissions_default(),
    )
    .unwrap();

    let outputs = HeatmapOutputs {
        json: Some(json_path.clone()),
        png: Some(png_path.clone()),
        pretty: false,
    };
    let written = write_outputs(&[PathBuf::from("two_day.nc")], &[render.clone()], &outputs).unwrap();
    assert_eq!(written, vec![json_path.clone(), png_path.clone()]);

    let parsed = HeatmapPayload::from_json(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed, render.payload);

    let png = std::fs::read(&png_path).unwrap();
    assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
}

#[test]
fn test_write_outputs_several_files_use_stems() {
    let dir = temp_test_dir();
    let ramp = ColorRamp::emissions_default();
    let options = HeatmapOptions::default().with_stride(1.0);
    let renders = vec![
        render_heatmap(two_day_scenario(), &options, &ramp).unwrap(),
        render_heatmap(all_zero_dataset(1, 2, 2), &options, &ramp).unwrap(),
    ];
    let files = vec![
        PathBuf::from("/data/CarbonMonitor_total_y2024_m11.nc"),
        PathBuf::from("/data/CarbonMonitor_total_y2024_m12.nc"),
    ];

    let outputs = HeatmapOutputs {
        json: Some(dir.path().to_path_buf()),
        png: None,
        pretty: true,
    };
    let written = write_outputs(&files, &renders, &outputs).unwrap();
    assert_eq!(
        written,
        vec![
            dir.path().join("CarbonMonitor_total_y2024_m11.heatmap.json"),
            dir.path().join("CarbonMonitor_total_y2024_m12.heatmap.json"),
        ]
    );

    let second = std::fs::read_to_string(&written[1]).unwrap();
    assert!(!second.contains("scaleValue"));
}

// ============================================================================
// Point tests
// ============================================================================

#[test]
fn test_points_are_capped_and_sorted() {
    let options = PointOptions::default().with_stride(1.0).with_top_n(100);
    let rows = rank_points(create_emission_dataset(3, 40, 50, 5), "synthetic.nc", &options).unwrap();

    assert_eq!(rows.len(), 100);
    assert!(rows
        .windows(2)
        .all(|w| w[0].monthly_emission >= w[1].monthly_emission));
    assert!(rows.iter().all(|r| r.monthly_emission > 0.0));
    assert!(rows.iter().all(|r| r.max_daily_emission <= r.monthly_emission));
}

#[test]
fn test_points_for_zero_grid_are_empty() {
    let rows = rank_points(all_zero_dataset(2, 4, 4), "zero.nc", &PointOptions::default()).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_points_to_csv() {
    let rows = rank_points(
        two_day_scenario(),
        "two_day.nc",
        &PointOptions::default().with_stride(1.0),
    )
    .unwrap();

    let mut sink = CsvPointSink::new(Vec::new());
    sink.accept(&rows).unwrap();
    sink.finish().unwrap();
    let csv = String::from_utf8(sink.into_inner().unwrap()).unwrap();

    // sums: [[1, 4], [4, 1]]; -1 is not a valid reading
    let first = csv.lines().next().unwrap();
    assert!(first.starts_with("two_day.nc,"));
    assert!(first.ends_with(",4.0,2.0") || first.ends_with(",4.0,3.0"));
    assert_eq!(csv.lines().count(), 4);
}

#[test]
fn test_export_points_missing_file_writes_nothing() {
    let mut sink: Vec<PointRow> = Vec::new();
    let files = vec![PathBuf::from("/nonexistent/a.nc")];
    let result = export_points(
        &files,
        &VariableNames::default(),
        None,
        &PointOptions::default(),
        &mut sink,
    );
    assert!(result.is_err());
    assert!(sink.is_empty());
}

#[test]
fn test_export_points_carbon_monitor_sample() {
    let path = require_test_file!(CARBON_MONITOR_SAMPLE);

    let mut sink: Vec<PointRow> = Vec::new();
    let count = export_points(
        &[path],
        &VariableNames::default(),
        None,
        &PointOptions::default(),
        &mut sink,
    )
    .unwrap();

    assert_eq!(count, sink.len());
    assert!(count <= 5000);
    assert!(sink.iter().all(|r| r.dataset_file == CARBON_MONITOR_SAMPLE));
}
