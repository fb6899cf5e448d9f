//! Ramp styles loaded from JSON.
//!
//! ```json
//! {
//!   "name": "emissions",
//!   "stops": [
//!     {"position": 0.0, "color": "#040e24"},
//!     {"position": 1.0, "color": "#df382d"}
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};
use crate::gradient::{ColorRamp, ColorStop};

/// A named ramp definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RampStyle {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub stops: Vec<StyleStop>,
}

/// Color stop as written in a style file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleStop {
    pub position: f64,
    pub color: String,
}

impl RampStyle {
    /// Load a ramp style from a JSON string
    pub fn from_json(json_str: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load a ramp style from file
    pub fn from_file(path: impl AsRef<Path>) -> RenderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Build the ramp, validating colors and stop positions.
    pub fn to_ramp(&self) -> RenderResult<ColorRamp> {
        let stops = self
            .stops
            .iter()
            .map(|stop| {
                let (r, g, b) = hex_to_rgb(&stop.color).ok_or_else(|| {
                    RenderError::InvalidColor(format!(
                        "'{}' in style '{}' is not #rrggbb",
                        stop.color, self.name
                    ))
                })?;
                Ok(ColorStop::new(stop.position, r, g, b))
            })
            .collect::<RenderResult<Vec<_>>>()?;

        ColorRamp::new(stops)
    }
}

impl From<&ColorRamp> for RampStyle {
    fn from(ramp: &ColorRamp) -> Self {
        Self {
            name: "custom".to_string(),
            description: None,
            stops: ramp
                .stops()
                .iter()
                .map(|stop| StyleStop {
                    position: stop.position,
                    color: format!(
                        "#{:02x}{:02x}{:02x}",
                        stop.color.r, stop.color.g, stop.color.b
                    ),
                })
                .collect(),
        }
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#040e24"), Some((4, 14, 36)));
        assert_eq!(hex_to_rgb("DF382D"), Some((223, 56, 45)));
        assert_eq!(hex_to_rgb("#fff"), None);
        assert_eq!(hex_to_rgb("#gg0000"), None);
        assert_eq!(hex_to_rgb("#ééé"), None);
    }

    #[test]
    fn test_default_ramp_survives_style_conversion() {
        let ramp = ColorRamp::emissions_default();
        let style = RampStyle::from(&ramp);
        assert_eq!(style.stops[0].color, "#040e24");
        assert_eq!(style.to_ramp().unwrap(), ramp);
    }
}
