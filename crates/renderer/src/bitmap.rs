//! RGBA bitmap encoding of normalized grids.

use grid_processor::NormalizedGrid;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::gradient::ColorRamp;

/// Minimum rows per rayon task.
const ROWS_PER_TASK: usize = 16;

/// Row-major RGBA8 image. Pixel `(y, x)` starts at byte `(y * width + x) * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    /// Fully transparent image.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 4],
        }
    }

    pub fn pixel(&self, y: usize, x: usize) -> Option<[u8; 4]> {
        if y >= self.height || x >= self.width {
            return None;
        }
        let offset = (y * self.width + x) * 4;
        let px = self.pixels.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Number of pixels with non-zero alpha.
    pub fn visible_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] > 0).count()
    }
}

/// Paint `grid` with `ramp`.
///
/// A grid without signal yields an all-zero buffer of full length.
pub fn encode(grid: &NormalizedGrid, ramp: &ColorRamp) -> RenderResult<RgbaImage> {
    let (width, height) = (grid.width, grid.height);
    let expected = width * height;
    if grid.values.len() != expected {
        return Err(RenderError::SizeMismatch {
            expected,
            actual: grid.values.len(),
        });
    }

    let mut image = RgbaImage::blank(width, height);
    if grid.is_absent() || expected == 0 {
        return Ok(image);
    }

    image
        .pixels
        .par_chunks_mut(width * 4 * ROWS_PER_TASK)
        .zip(grid.values.par_chunks(width * ROWS_PER_TASK))
        .for_each(|(out, values)| {
            for (px, &t) in out.chunks_exact_mut(4).zip(values) {
                px.copy_from_slice(&ramp.pixel_at(t).to_array());
            }
        });

    debug!(
        width,
        height,
        visible = image.visible_pixels(),
        "Encoded heatmap bitmap"
    );

    Ok(image)
}
