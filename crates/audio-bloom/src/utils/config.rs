//! Configuration file management.
//!
//! Handles loading and saving user preferences to `~/.audio-bloom.toml`.

use audio_bloom_engine::{analyser, EngineConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 3;

const CONFIG_TEMPLATE: &str = r##"# audio-bloom configuration file

# Timeout in seconds when switching audio devices (default: 3)
# device_timeout_secs = 3

# Last selected audio device (auto-saved)
# last_device = "Device Name"
# last_device_is_input = false

# =============================================================================
# Analysis
# =============================================================================

# transform_size = 2048           # FFT window; frequency bins = transform_size / 2
# smoothing = 0.8                 # Spectrum smoothing between frames (0-1)

# =============================================================================
# Engine
# =============================================================================

[engine]
# particle_lifetime_ms = 1500
# spawn_divisor = 60.0            # One particle per this much band amplitude (min 1)
# particle_opacity = 0.3
# particle_min_radius = 2.0
# particle_radius_span = 6.0      # Extra radius at full amplitude
# particle_stroke_weight = 2.0
# center_bias_draws = 6           # Higher = tighter clustering around the center
# fade_duration_ms = 1500
# waveform_style = "solid"        # "solid" or "banded"
# waveform_weight = 2.0
# waveform_color = "#64ff64cc"
# waveform_band_colors = ["#ff6464cc", "#64ff64cc", "#6464ffcc"]  # banded style thirds
# waveform_glow_weight = 0.0      # Width of a faint underlay stroke; 0 = off
# low_color = "#440154"
# mid_color = "#21918c"
# high_color = "#fde725"
# low_max_hz = 250.0
# mid_max_hz = 4000.0
# high_max_hz = 16000.0
"##;

#[derive(Serialize, Deserialize, Default)]
pub struct Config {
    pub last_device: Option<String>,
    pub last_device_is_input: Option<bool>,
    pub device_timeout_secs: Option<u64>,

    pub transform_size: Option<usize>,
    pub smoothing: Option<f32>,

    pub engine: Option<EngineConfig>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".audio-bloom.toml"))
    }

    pub fn load() -> Self {
        let path = match Self::path() {
            Some(p) => p,
            None => return Self::default(),
        };

        // Create template file if it doesn't exist
        if !path.exists() {
            match fs::write(&path, CONFIG_TEMPLATE) {
                Ok(()) => log::info!("Created config template at {:?}", path),
                Err(e) => log::warn!("Could not write config template {:?}: {}", path, e),
            }
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        Self::parse(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed config {:?}: {}", path, e);
            Self::default()
        })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn save(&self) {
        if let Some(path) = Self::path() {
            match toml::to_string(self) {
                Ok(content) => match fs::write(&path, &content) {
                    Ok(()) => log::info!("Config saved to {:?}", path),
                    Err(e) => log::warn!("Could not save config {:?}: {}", path, e),
                },
                Err(e) => log::warn!("Could not serialize config: {}", e),
            }
        }
    }

    pub fn set_device(&mut self, name: &str, is_input: bool) {
        self.last_device = Some(name.to_string());
        self.last_device_is_input = Some(is_input);
        self.save();
    }

    pub fn device_timeout_secs(&self) -> u64 {
        self.device_timeout_secs
            .unwrap_or(DEFAULT_DEVICE_TIMEOUT_SECS)
    }

    pub fn transform_size(&self) -> usize {
        self.transform_size
            .unwrap_or(analyser::DEFAULT_TRANSFORM_SIZE)
            .clamp(32, 32768)
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing.unwrap_or(analyser::DEFAULT_SMOOTHING)
    }

    /// Engine tunables (with defaults if the table is missing)
    pub fn engine(&self) -> EngineConfig {
        self.engine.clone().unwrap_or_default()
    }
}
