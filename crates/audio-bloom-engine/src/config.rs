//! Engine tunables.
//!
//! Every field is optional so a partial `[engine]` table in the host's config
//! file only overrides what it names.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{BandLimits, ParticleSettings, Rgba, WaveformRenderer, WaveformStyle};

const DEFAULT_WAVEFORM_COLOR: &str = "#64ff64cc";
const DEFAULT_LOW_COLOR: &str = "#440154";
const DEFAULT_MID_COLOR: &str = "#21918c";
const DEFAULT_HIGH_COLOR: &str = "#fde725";
const DEFAULT_WAVEFORM_BAND_COLORS: [&str; 3] = ["#ff6464cc", "#64ff64cc", "#6464ffcc"];

/// Smallest accepted spawn divisor; keeps one band at most 255 particles per frame
const MIN_SPAWN_DIVISOR: f32 = 1.0;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EngineConfig {
    // Particles
    pub particle_lifetime_ms: Option<u64>,
    pub spawn_divisor: Option<f32>,
    pub particle_opacity: Option<f32>,
    pub particle_min_radius: Option<f32>,
    pub particle_radius_span: Option<f32>,
    pub particle_stroke_weight: Option<f32>,
    pub center_bias_draws: Option<u32>,

    // Fade-out
    pub fade_duration_ms: Option<u64>,

    // Waveform
    pub waveform_style: Option<WaveformStyle>,
    pub waveform_weight: Option<f32>,
    pub waveform_color: Option<String>,
    /// First, middle and last third of the banded trace
    pub waveform_band_colors: Option<[String; 3]>,
    pub waveform_glow_weight: Option<f32>,

    // Band colors (hex, `#rrggbb` or `#rrggbbaa`)
    pub low_color: Option<String>,
    pub mid_color: Option<String>,
    pub high_color: Option<String>,

    // Band edges in Hz
    pub low_max_hz: Option<f32>,
    pub mid_max_hz: Option<f32>,
    pub high_max_hz: Option<f32>,
}

impl EngineConfig {
    pub fn particle_lifetime(&self) -> Duration {
        Duration::from_millis(self.particle_lifetime_ms.unwrap_or(1500))
    }
    pub fn spawn_divisor(&self) -> f32 {
        self.spawn_divisor.unwrap_or(60.0).max(MIN_SPAWN_DIVISOR)
    }
    pub fn particle_opacity(&self) -> f32 {
        self.particle_opacity.unwrap_or(0.3).clamp(0.0, 1.0)
    }
    pub fn particle_min_radius(&self) -> f32 {
        // Radius must stay positive
        self.particle_min_radius.unwrap_or(2.0).max(0.1)
    }
    pub fn particle_radius_span(&self) -> f32 {
        self.particle_radius_span.unwrap_or(6.0).max(0.0)
    }
    pub fn particle_stroke_weight(&self) -> f32 {
        self.particle_stroke_weight.unwrap_or(2.0)
    }
    pub fn center_bias_draws(&self) -> u32 {
        self.center_bias_draws.unwrap_or(6).max(1)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms.unwrap_or(1500))
    }

    pub fn waveform_style(&self) -> WaveformStyle {
        self.waveform_style.unwrap_or_default()
    }
    pub fn waveform_weight(&self) -> f32 {
        self.waveform_weight.unwrap_or(2.0)
    }
    pub fn waveform_color(&self) -> Rgba {
        color_or(self.waveform_color.as_deref(), DEFAULT_WAVEFORM_COLOR)
    }

    pub fn waveform_band_colors(&self) -> [Rgba; 3] {
        let configured = self.waveform_band_colors.as_ref();
        std::array::from_fn(|i| {
            color_or(
                configured.map(|colors| colors[i].as_str()),
                DEFAULT_WAVEFORM_BAND_COLORS[i],
            )
        })
    }
    pub fn waveform_glow_weight(&self) -> f32 {
        self.waveform_glow_weight.unwrap_or(0.0).max(0.0)
    }

    /// Particle colors: low, mid, high
    pub fn band_colors(&self) -> [Rgba; 3] {
        [
            color_or(self.low_color.as_deref(), DEFAULT_LOW_COLOR),
            color_or(self.mid_color.as_deref(), DEFAULT_MID_COLOR),
            color_or(self.high_color.as_deref(), DEFAULT_HIGH_COLOR),
        ]
    }

    pub fn band_limits(&self) -> BandLimits {
        let defaults = BandLimits::default();
        BandLimits {
            low_max_hz: self.low_max_hz.unwrap_or(defaults.low_max_hz),
            mid_max_hz: self.mid_max_hz.unwrap_or(defaults.mid_max_hz),
            high_max_hz: self.high_max_hz.unwrap_or(defaults.high_max_hz),
        }
    }

    pub fn particle_settings(&self) -> ParticleSettings {
        ParticleSettings {
            lifetime: self.particle_lifetime(),
            spawn_divisor: self.spawn_divisor(),
            opacity: self.particle_opacity(),
            min_radius: self.particle_min_radius(),
            radius_span: self.particle_radius_span(),
            stroke_weight: self.particle_stroke_weight(),
            center_draws: self.center_bias_draws(),
            palette: self.band_colors(),
        }
    }

    pub fn waveform_renderer(&self) -> WaveformRenderer {
        WaveformRenderer::new(
            self.waveform_style(),
            self.waveform_weight(),
            self.waveform_color(),
        )
        .with_band_colors(self.waveform_band_colors())
        .with_glow(self.waveform_glow_weight())
    }
}

fn color_or(value: Option<&str>, fallback: &str) -> Rgba {
    if let Some(hex) = value {
        match Rgba::from_hex(hex) {
            Some(color) => return color,
            None => log::warn!("Ignoring invalid color {:?}, using {}", hex, fallback),
        }
    }
    Rgba::from_hex(fallback).unwrap_or(Rgba::WHITE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_particle_settings() {
        let config = EngineConfig::default();
        assert_eq!(config.particle_settings(), ParticleSettings::default());
        assert_eq!(config.fade_duration(), Duration::from_millis(1500));
        assert_eq!(config.band_limits(), BandLimits::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: EngineConfig = toml::from_str(
            r##"
            spawn_divisor = 40.0
            fade_duration_ms = 800
            waveform_style = "banded"
            high_color = "#ffffff"
            "##,
        )
        .unwrap();

        assert_eq!(config.spawn_divisor(), 40.0);
        assert_eq!(config.fade_duration(), Duration::from_millis(800));
        assert_eq!(config.waveform_style(), WaveformStyle::Banded);
        assert_eq!(config.band_colors()[2], Rgba::WHITE);
        assert_eq!(config.particle_lifetime(), Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid_color_falls_back() {
        let config = EngineConfig {
            low_color: Some("not-a-color".to_string()),
            ..Default::default()
        };
        assert_eq!(config.band_colors()[0], Rgba::rgb8(0x44, 0x01, 0x54, 1.0));
    }

    #[test]
    fn test_radius_stays_positive() {
        let config = EngineConfig {
            particle_min_radius: Some(-3.0),
            ..Default::default()
        };
        assert!(config.particle_min_radius() > 0.0);
    }

    #[test]
    fn test_spawn_divisor_has_floor() {
        let config: EngineConfig = toml::from_str("spawn_divisor = 1e-18").unwrap();
        assert_eq!(config.spawn_divisor(), 1.0);

        let config: EngineConfig = toml::from_str("spawn_divisor = -5.0").unwrap();
        assert_eq!(config.spawn_divisor(), 1.0);
    }

    #[test]
    fn test_waveform_band_colors_are_separate_from_particles() {
        let config = EngineConfig::default();
        assert_eq!(config.waveform_band_colors()[0], Rgba::rgb8(255, 100, 100, 0.8));
        assert_ne!(config.waveform_band_colors(), config.band_colors());

        let config: EngineConfig =
            toml::from_str(r##"waveform_band_colors = ["#ffffff", "bogus", "#000000"]"##).unwrap();
        assert_eq!(
            config.waveform_band_colors(),
            [Rgba::WHITE, Rgba::rgb8(100, 255, 100, 0.8), Rgba::BLACK]
        );
    }
}
