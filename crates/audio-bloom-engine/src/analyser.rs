//! PCM to byte-array analysis front-end.
//!
//! Converts raw f32 samples into the two byte arrays an [`AnalysisFeed`]
//! serves: a time-domain buffer centered on 128 and smoothed, decibel-scaled
//! frequency magnitudes. Hosts wrap this around their capture buffer.
//!
//! [`AnalysisFeed`]: crate::AnalysisFeed

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Default transform size (at 44.1kHz: ~21.5 Hz bins)
pub const DEFAULT_TRANSFORM_SIZE: usize = 2048;

/// Default temporal smoothing between successive spectra
pub const DEFAULT_SMOOTHING: f32 = 0.8;

/// Decibel window mapped onto 0-255
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

pub struct SampleAnalyser {
    sample_rate: f32,
    transform_size: usize,
    smoothing: f32,

    // FFT resources (pre-allocated)
    fft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    window: Vec<f32>,

    // Smoothed linear magnitudes carried across calls
    smoothed: Vec<f32>,
}

impl SampleAnalyser {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_settings(sample_rate, DEFAULT_TRANSFORM_SIZE, DEFAULT_SMOOTHING)
    }

    /// `transform_size` is rounded up to at least 2; `smoothing` is clamped to 0.0-1.0
    pub fn with_settings(sample_rate: f32, transform_size: usize, smoothing: f32) -> Self {
        let transform_size = transform_size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(transform_size);

        Self {
            sample_rate,
            transform_size,
            smoothing: smoothing.clamp(0.0, 1.0),
            fft,
            fft_buffer: vec![Complex::new(0.0, 0.0); transform_size],
            window: blackman_window(transform_size),
            smoothed: vec![0.0; transform_size / 2],
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.reset();
    }

    pub fn transform_size(&self) -> usize {
        self.transform_size
    }

    /// Forget smoothing history (e.g. after switching sources)
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }

    /// Write the most recent `transform_size` samples as bytes.
    /// Missing history is padded with silence at the front.
    pub fn write_time_domain(&self, samples: &[f32], out: &mut Vec<u8>) {
        out.clear();
        let recent = &samples[samples.len().saturating_sub(self.transform_size)..];
        let padding = self.transform_size - recent.len();
        out.extend(std::iter::repeat(128u8).take(padding));
        out.extend(recent.iter().map(|&s| sample_to_byte(s)));
    }

    /// Run the windowed FFT over the most recent samples and write
    /// `transform_size / 2` smoothed magnitude bytes.
    pub fn write_frequency(&mut self, samples: &[f32], out: &mut Vec<u8>) {
        let n = self.transform_size;
        let recent = &samples[samples.len().saturating_sub(n)..];
        let padding = n - recent.len();

        // Apply window and fill buffer (reusing pre-allocated buffer)
        for i in 0..n {
            let sample = if i < padding { 0.0 } else { recent[i - padding] };
            self.fft_buffer[i] = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        let scale = 255.0 / (MAX_DECIBELS - MIN_DECIBELS);
        out.clear();
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[k].norm() / n as f32;
            *smoothed = self.smoothing * *smoothed + (1.0 - self.smoothing) * magnitude;

            let byte = if *smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                (scale * (db - MIN_DECIBELS)).floor().clamp(0.0, 255.0) as u8
            } else {
                0
            };
            out.push(byte);
        }
    }
}

fn sample_to_byte(sample: f32) -> u8 {
    if !sample.is_finite() {
        return 128;
    }
    (128.0 * (1.0 + sample)).floor().clamp(0.0, 255.0) as u8
}

fn blackman_window(n: usize) -> Vec<f32> {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    let tau = 2.0 * std::f32::consts::PI;

    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            a0 - a1 * (tau * x).cos() + a2 * (2.0 * tau * x).cos()
        })
        .collect()
}
