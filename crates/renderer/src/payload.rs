//! JSON heatmap payload.
//!
//! ```json
//! {
//!   "image": {"width": 450, "height": 225, "rgbaBase64": "..."},
//!   "meta": {
//!     "source": "CarbonMonitor_total_y2024_m12.nc",
//!     "daysAveraged": 31,
//!     "stride": 8,
//!     "gridWidth": 450,
//!     "gridHeight": 225,
//!     "normalizationPercentile": 99.0,
//!     "scaleValue": 0.4213
//!   }
//! }
//! ```
//!
//! `scaleValue` is left out when the grid had no positive signal.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use grid_processor::NormalizedGrid;
use serde::{Deserialize, Serialize};

use crate::bitmap::RgbaImage;
use crate::error::{RenderError, RenderResult};

/// Encoded pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub width: usize,
    pub height: usize,
    pub rgba_base64: String,
}

impl ImagePayload {
    pub fn from_image(image: &RgbaImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            rgba_base64: STANDARD.encode(&image.pixels),
        }
    }

    /// Decode back to an image, checking the buffer length.
    pub fn decode(&self) -> RenderResult<RgbaImage> {
        let pixels = STANDARD
            .decode(&self.rgba_base64)
            .map_err(|e| RenderError::Encoding(format!("invalid base64 pixels: {}", e)))?;
        let expected = self.width * self.height * 4;
        if pixels.len() != expected {
            return Err(RenderError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(RgbaImage {
            width: self.width,
            height: self.height,
            pixels,
        })
    }
}

/// Provenance and scaling of a heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapMeta {
    pub source: String,
    pub days_averaged: usize,
    pub stride: usize,
    pub grid_width: usize,
    pub grid_height: usize,
    pub normalization_percentile: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_value: Option<f64>,
}

impl HeatmapMeta {
    /// Metadata for a normalized grid built from `days` time steps.
    pub fn from_grid(source: impl Into<String>, days: usize, stride: usize, grid: &NormalizedGrid) -> Self {
        Self {
            source: source.into(),
            days_averaged: days,
            stride,
            grid_width: grid.width,
            grid_height: grid.height,
            normalization_percentile: grid.percentile,
            scale_value: grid.scale_value,
        }
    }
}

/// Image plus metadata, as written for the map front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPayload {
    pub image: ImagePayload,
    pub meta: HeatmapMeta,
}

impl HeatmapPayload {
    pub fn new(image: &RgbaImage, meta: HeatmapMeta) -> Self {
        Self {
            image: ImagePayload::from_image(image),
            meta,
        }
    }

    pub fn to_json(&self) -> RenderResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> RenderResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
