//! Time-domain waveform trace.

use serde::{Deserialize, Serialize};

use crate::{Extent, Rgba, Surface};

/// How the trace is colored
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WaveformStyle {
    /// One continuous path in a single color
    #[default]
    Solid,
    /// Three sub-paths (first/middle/last third of the buffer) in band colors
    Banded,
}

/// Split points of the banded style, as fractions of the buffer
const BAND_SPLITS: [f32; 2] = [0.33, 0.66];

/// Alpha multiplier of the glow underlay relative to the trace color
const GLOW_ALPHA: f32 = 0.25;

pub struct WaveformRenderer {
    style: WaveformStyle,
    weight: f32,
    color: Rgba,
    band_colors: [Rgba; 3],
    /// Stroke weight of the soft underlay; 0 disables it
    glow_weight: f32,
    /// Reused across frames
    points: Vec<(f32, f32)>,
}

impl Default for WaveformRenderer {
    fn default() -> Self {
        Self::new(WaveformStyle::Solid, 2.0, Rgba::rgb8(100, 255, 100, 0.8))
    }
}

impl WaveformRenderer {
    pub fn new(style: WaveformStyle, weight: f32, color: Rgba) -> Self {
        Self {
            style,
            weight,
            color,
            band_colors: [
                Rgba::rgb8(255, 100, 100, 0.8),
                Rgba::rgb8(100, 255, 100, 0.8),
                Rgba::rgb8(100, 100, 255, 0.8),
            ],
            glow_weight: 0.0,
            points: Vec::new(),
        }
    }

    pub fn with_band_colors(mut self, band_colors: [Rgba; 3]) -> Self {
        self.band_colors = band_colors;
        self
    }

    /// Draw a wide, faint copy of each path beneath it
    pub fn with_glow(mut self, glow_weight: f32) -> Self {
        self.glow_weight = glow_weight.max(0.0);
        self
    }

    /// Stroke the trace, with every color's alpha scaled by `fade_alpha`.
    /// Fewer than two samples draws nothing.
    pub fn render<S: Surface + ?Sized>(
        &mut self,
        samples: &[u8],
        extent: Extent,
        fade_alpha: f32,
        surface: &mut S,
    ) {
        trace(samples, extent, &mut self.points);
        if self.points.len() < 2 {
            return;
        }

        match self.style {
            WaveformStyle::Solid => {
                self.stroke(surface, &self.points, self.color.scale_alpha(fade_alpha));
            }
            WaveformStyle::Banded => {
                let n = self.points.len();
                let bounds = [
                    0,
                    (n as f32 * BAND_SPLITS[0]).floor() as usize,
                    (n as f32 * BAND_SPLITS[1]).floor() as usize,
                    n,
                ];

                for (part, color) in self.band_colors.iter().enumerate() {
                    let start = bounds[part];
                    // Share the next segment's first point so the line stays continuous
                    let end = (bounds[part + 1] + 1).min(n);
                    if end.saturating_sub(start) < 2 {
                        continue;
                    }
                    self.stroke(surface, &self.points[start..end], color.scale_alpha(fade_alpha));
                }
            }
        }
    }

    fn stroke<S: Surface + ?Sized>(&self, surface: &mut S, points: &[(f32, f32)], color: Rgba) {
        if self.glow_weight > 0.0 {
            surface.stroke_polyline(points, self.glow_weight, color.scale_alpha(GLOW_ALPHA));
        }
        surface.stroke_polyline(points, self.weight, color);
    }
}

/// Map samples to surface points: x spreads evenly across the width,
/// 128 lands on the vertical center and 0/255 near the top/bottom edges.
pub fn trace(samples: &[u8], extent: Extent, out: &mut Vec<(f32, f32)>) {
    out.clear();
    if samples.is_empty() {
        return;
    }

    let slice_width = extent.width / samples.len() as f32;
    let half_height = extent.height / 2.0;

    out.extend(samples.iter().enumerate().map(|(i, &v)| {
        let normalized = (v as f32 - 128.0) / 128.0;
        (i as f32 * slice_width, normalized * half_height + half_height)
    }));
}
