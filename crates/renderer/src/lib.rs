//! Heatmap rendering for normalized emission grids.
//!
//! - Color ramps with an intensity-driven alpha channel
//! - RGBA bitmap encoding
//! - JSON heatmap payloads (base64 pixels plus metadata)
//! - RGBA PNG previews

pub mod bitmap;
pub mod error;
pub mod gradient;
pub mod payload;
pub mod png;
pub mod style;

pub use bitmap::{encode, RgbaImage};
pub use error::{RenderError, RenderResult};
pub use gradient::{Color, ColorRamp, ColorStop};
pub use payload::{HeatmapMeta, HeatmapPayload, ImagePayload};
pub use png::encode_png;
pub use style::RampStyle;
