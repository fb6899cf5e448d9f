//! Heatmap export: aggregate, normalize, paint, wrap in a payload.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use grid_common::DatasetHandle;
use grid_processor::{aggregate, normalize, GridSource, HeatmapOptions};
use netcdf_parser::VariableNames;
use rayon::prelude::*;
use renderer::{encode, encode_png, ColorRamp, HeatmapMeta, HeatmapPayload, RgbaImage};
use tracing::info;

use crate::open_dataset;

/// A rendered heatmap: the payload plus the bitmap it was built from.
#[derive(Debug, Clone)]
pub struct HeatmapRender {
    pub payload: HeatmapPayload,
    pub image: RgbaImage,
}

/// Build the heatmap for one dataset.
pub fn render_heatmap<D: DatasetHandle>(
    dataset: D,
    options: &HeatmapOptions,
    ramp: &ColorRamp,
) -> Result<HeatmapRender> {
    let source = GridSource::new(dataset, options.stride);
    let grid = aggregate(&source, options.mode)
        .with_context(|| format!("failed to aggregate {}", source.source_name()))?;
    let normalized = normalize(&grid, options.percentile);
    let image = encode(&normalized, ramp)?;

    let meta = HeatmapMeta::from_grid(source.source_name(), grid.time_steps, source.stride(), &normalized);

    info!(
        source = %meta.source,
        mode = %options.mode,
        width = meta.grid_width,
        height = meta.grid_height,
        days = meta.days_averaged,
        scale = ?meta.scale_value,
        "Rendered heatmap"
    );

    Ok(HeatmapRender {
        payload: HeatmapPayload::new(&image, meta),
        image,
    })
}

/// Render every file in parallel. Results keep the input order; any failure
/// fails the whole batch.
pub fn render_files(
    files: &[PathBuf],
    names: &VariableNames,
    options: &HeatmapOptions,
    ramp: &ColorRamp,
) -> Result<Vec<HeatmapRender>> {
    files
        .par_iter()
        .map(|path| {
            let dataset = open_dataset(path, names)?;
            render_heatmap(dataset, options, ramp)
                .with_context(|| format!("failed to render {}", path.display()))
        })
        .collect()
}

/// Where rendered outputs go.
#[derive(Debug, Clone, Default)]
pub struct HeatmapOutputs {
    /// JSON destination: a file for one input, a directory for several.
    /// `None` writes a single payload to stdout, or several into `.`.
    pub json: Option<PathBuf>,
    /// PNG destination: a file for one input, a directory for several.
    pub png: Option<PathBuf>,
    pub pretty: bool,
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("heatmap")
        .to_string()
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

/// Write the payloads (and optional PNG previews) for `renders`, which must
/// be in the same order as `files`. Returns the paths written.
pub fn write_outputs(
    files: &[PathBuf],
    renders: &[HeatmapRender],
    outputs: &HeatmapOutputs,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let many = files.len() > 1;

    for (input, render) in files.iter().zip(renders) {
        let json = if outputs.pretty {
            render.payload.to_json_pretty()?
        } else {
            render.payload.to_json()?
        };

        let json_path = match (&outputs.json, many) {
            (None, false) => None,
            (Some(path), false) => Some(path.clone()),
            (dir, true) => Some(
                dir.clone()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(format!("{}.heatmap.json", file_stem(input))),
            ),
        };

        match json_path {
            Some(path) => {
                write_file(&path, json.as_bytes())?;
                info!(path = %path.display(), bytes = json.len(), "Wrote heatmap payload");
                written.push(path);
            }
            None => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                writeln!(handle, "{}", json).context("failed to write payload to stdout")?;
            }
        }

        if let Some(png) = &outputs.png {
            let path = if many {
                png.join(format!("{}.png", file_stem(input)))
            } else {
                png.clone()
            };
            let bytes = encode_png(&render.image)?;
            write_file(&path, &bytes)?;
            info!(path = %path.display(), bytes = bytes.len(), "Wrote PNG preview");
            written.push(path);
        }
    }

    Ok(written)
}
