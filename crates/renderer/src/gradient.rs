//! Color ramps for normalized intensities.
//!
//! A ramp maps t ∈ [0, 1] to an RGB color by piecewise-linear interpolation
//! between ordered stops. [`ColorRamp::pixel_at`] adds the heatmap alpha
//! policy: near-zero intensities are fully transparent, the rest fade in
//! with t.

use crate::error::{RenderError, RenderResult};

/// Intensities below this render as a fully transparent pixel.
pub const TRANSPARENT_BELOW: f64 = 0.015;

const ALPHA_FLOOR: f64 = 0.18;
const ALPHA_SPAN: f64 = 0.82;
const ALPHA_EXPONENT: f64 = 0.9;

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// One ramp stop: a position in [0, 1] and the color at that position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub position: f64,
    pub color: Color,
}

impl ColorStop {
    pub fn new(position: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            position,
            color: Color::rgb(r, g, b),
        }
    }
}

/// Ordered color stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<ColorStop>,
}

impl ColorRamp {
    /// Build a ramp, checking that there is at least one stop and that
    /// positions are finite, within [0, 1] and non-decreasing.
    pub fn new(stops: Vec<ColorStop>) -> RenderResult<Self> {
        if stops.is_empty() {
            return Err(RenderError::invalid_ramp("ramp has no stops"));
        }

        for (i, stop) in stops.iter().enumerate() {
            if !stop.position.is_finite() || !(0.0..=1.0).contains(&stop.position) {
                return Err(RenderError::invalid_ramp(format!(
                    "stop {} has position {} outside [0, 1]",
                    i, stop.position
                )));
            }
        }

        if let Some(i) = stops
            .windows(2)
            .position(|pair| pair[1].position < pair[0].position)
        {
            return Err(RenderError::invalid_ramp(format!(
                "stop {} at {} comes before stop {} at {}",
                i + 1,
                stops[i + 1].position,
                i,
                stops[i].position
            )));
        }

        Ok(Self { stops })
    }

    /// Dark navy through teal and amber to red.
    pub fn emissions_default() -> Self {
        Self {
            stops: vec![
                ColorStop::new(0.0, 4, 14, 36),
                ColorStop::new(0.25, 21, 90, 162),
                ColorStop::new(0.5, 49, 178, 191),
                ColorStop::new(0.75, 240, 195, 67),
                ColorStop::new(1.0, 223, 56, 45),
            ],
        }
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Opaque color at intensity `t`.
    ///
    /// `t` is clamped to [0, 1] (NaN counts as 0). The first stop pair with
    /// `t <= p1` is interpolated; past the last stop the last color is used.
    /// Channels are truncated, not rounded.
    pub fn color_at(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t <= hi.position {
                let span = hi.position - lo.position;
                let f = if span == 0.0 {
                    0.0
                } else {
                    ((t - lo.position) / span).clamp(0.0, 1.0)
                };
                return interpolate_color(lo.color, hi.color, f);
            }
        }

        // Single stop, or t beyond the last stop.
        self.stops
            .last()
            .map(|stop| stop.color)
            .unwrap_or_default()
            .with_alpha(255)
    }

    /// Heatmap pixel for intensity `t`.
    ///
    /// Below [`TRANSPARENT_BELOW`] the pixel is all zeros. Otherwise the ramp
    /// color with `alpha = round(255 * (0.18 + 0.82 * t^0.9))`.
    pub fn pixel_at(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if t < TRANSPARENT_BELOW {
            return Color::transparent();
        }
        self.color_at(t).with_alpha(alpha_for(t))
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::emissions_default()
    }
}

/// Alpha for a visible intensity.
#[inline]
pub fn alpha_for(t: f64) -> u8 {
    let alpha = 255.0 * (ALPHA_FLOOR + ALPHA_SPAN * t.powf(ALPHA_EXPONENT));
    alpha.round().clamp(0.0, 255.0) as u8
}

/// Linear color interpolation; the result is opaque.
pub fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t) as u8;

    Color::rgb(
        channel(color1.r, color2.r),
        channel(color1.g, color2.g),
        channel(color1.b, color2.b),
    )
}
