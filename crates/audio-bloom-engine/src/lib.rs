//! Audio-reactive rendering engine for audio-bloom
//!
//! This crate turns a pull-based audio analysis feed into frames: a waveform
//! trace plus a field of short-lived particles whose spawn rate and color
//! follow the low/mid/high band energy. It owns no window and no audio
//! pipeline; hosts supply a [`Surface`] to draw into and an [`AnalysisFeed`]
//! to read from, then drive [`Visualizer::on_refresh`] once per display tick.

pub mod analyser;
pub mod bands;
pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod extent;
pub mod fade;
pub mod feed;
pub mod particles;
pub mod scheduler;
pub mod surface;
pub mod visualizer;
pub mod waveform;

pub use analyser::SampleAnalyser;
pub use bands::{band_averages, band_averages_with, Band, BandAverages, BandLimits};
pub use clock::{Clock, ManualClock, SystemClock};
pub use color::Rgba;
pub use config::EngineConfig;
pub use error::{Result, SampleStream, VizError};
pub use extent::Extent;
pub use fade::{FadeController, FadeState};
pub use feed::AnalysisFeed;
pub use particles::{Particle, ParticleField, ParticleSettings};
pub use scheduler::{FrameHandle, FrameScheduler};
pub use surface::{Canvas, DrawCommand, Surface};
pub use visualizer::{FrameOutcome, Visualizer};
pub use waveform::{WaveformRenderer, WaveformStyle};
