//! Grid export CLI.
//!
//! `grid-export heatmap` writes a JSON heatmap payload per NetCDF file;
//! `grid-export points` writes the top-N emitting cells as CSV.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use grid_export::{export_points, render_files, write_outputs, CsvPointSink, HeatmapOutputs};
use grid_processor::{AggregationMode, HeatmapOptions, PointOptions};
use netcdf_parser::VariableNames;
use renderer::{style::RampStyle, ColorRamp};

#[derive(Parser, Debug)]
#[command(name = "grid-export")]
#[command(about = "Export gridded emission data as heatmaps and ranked points")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Data variable (time, lat, lon)
    #[arg(long, default_value = "emission", global = true)]
    variable: String,

    /// Latitude coordinate variable
    #[arg(long, default_value = "latitude", global = true)]
    lat_variable: String,

    /// Longitude coordinate variable
    #[arg(long, default_value = "longitude", global = true)]
    lon_variable: String,

    /// Worker threads when several files are given (default: one per core)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a heatmap payload for each file
    Heatmap(HeatmapArgs),
    /// Export the top-N emitting cells as CSV
    Points(PointsArgs),
}

#[derive(clap::Args, Debug)]
struct HeatmapArgs {
    /// NetCDF input file(s)
    #[arg(short, long = "file", required = true, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Spatial stride (overrides HEATMAP_STRIDE)
    #[arg(long, allow_negative_numbers = true)]
    stride: Option<f64>,

    /// Normalization percentile, 90 to 99.99 (overrides HEATMAP_PERCENTILE)
    #[arg(long, allow_negative_numbers = true)]
    percentile: Option<f64>,

    /// Time-axis reduction: mean, sum or max
    #[arg(long, default_value = "mean")]
    mode: AggregationMode,

    /// JSON ramp style file (default: built-in emissions ramp)
    #[arg(long)]
    ramp: Option<PathBuf>,

    /// Output file, or directory when several files are given
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// PNG preview file, or directory when several files are given
    #[arg(long)]
    png: Option<PathBuf>,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(clap::Args, Debug)]
struct PointsArgs {
    /// NetCDF input file(s)
    #[arg(short, long = "file", required = true, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Spatial stride (overrides CARBON_MONITOR_STRIDE)
    #[arg(long, allow_negative_numbers = true)]
    stride: Option<f64>,

    /// Maximum points per file, at least 100 (overrides CARBON_MONITOR_TOP_N)
    #[arg(long, allow_negative_numbers = true)]
    top_n: Option<i64>,

    /// Dataset label for every row (default: input file name)
    #[arg(long)]
    label: Option<String>,

    /// CSV output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a header row
    #[arg(long)]
    header: bool,
}

fn main() -> Result<()> {
    // Optional .env with HEATMAP_* / CARBON_MONITOR_* overrides
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing; stdout carries data, so logs go to stderr
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure worker threads")?;
    }

    let names = VariableNames {
        data: args.variable.clone(),
        latitude: args.lat_variable.clone(),
        longitude: args.lon_variable.clone(),
    };

    match args.command {
        Command::Heatmap(cmd) => run_heatmap(cmd, &names),
        Command::Points(cmd) => run_points(cmd, &names),
    }
}

fn run_heatmap(cmd: HeatmapArgs, names: &VariableNames) -> Result<()> {
    let mut options = HeatmapOptions::from_env().with_mode(cmd.mode);
    if let Some(stride) = cmd.stride {
        options = options.with_stride(stride);
    }
    if let Some(percentile) = cmd.percentile {
        options = options.with_percentile(percentile);
    }

    let ramp = match &cmd.ramp {
        Some(path) => RampStyle::from_file(path)
            .and_then(|style| style.to_ramp())
            .with_context(|| format!("failed to load ramp {}", path.display()))?,
        None => ColorRamp::emissions_default(),
    };

    info!(
        files = cmd.files.len(),
        stride = options.stride,
        percentile = options.percentile,
        mode = %options.mode,
        "Starting heatmap export"
    );

    let renders = render_files(&cmd.files, names, &options, &ramp)?;
    let outputs = HeatmapOutputs {
        json: cmd.output,
        png: cmd.png,
        pretty: cmd.pretty,
    };
    write_outputs(&cmd.files, &renders, &outputs)?;

    Ok(())
}

fn run_points(cmd: PointsArgs, names: &VariableNames) -> Result<()> {
    let mut options = PointOptions::from_env();
    if let Some(stride) = cmd.stride {
        options = options.with_stride(stride);
    }
    if let Some(top_n) = cmd.top_n {
        options = options.with_top_n(top_n);
    }

    let label = cmd.label.as_deref();

    let rows = match &cmd.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut sink = CsvPointSink::with_header(BufWriter::new(file), cmd.header);
            export_points(&cmd.files, names, label, &options, &mut sink)?
        }
        None => {
            let stdout = io::stdout();
            let mut sink = CsvPointSink::with_header(stdout.lock(), cmd.header);
            export_points(&cmd.files, names, label, &options, &mut sink)?
        }
    };

    info!(
        rows,
        stride = options.stride,
        top_n = options.top_n,
        "Exported emission points"
    );

    Ok(())
}
