//! Audio device capture and stream management.
//!
//! Handles audio input from system devices using cpal, managing device enumeration,
//! stream creation, and a mono ring buffer holding the most recent samples.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use log::{error, info, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::utils::Config;

const FALLBACK_SAMPLE_RATE: f32 = 44100.0;

pub struct DeviceInfo {
    pub device: cpal::Device,
    pub name: String,
    pub is_input: bool,
}

pub struct SourcePipe {
    buffer: Arc<Mutex<Vec<f32>>>,
    capacity: usize,
    devices: Vec<DeviceInfo>,
    current_device: usize,
    sample_rate: f32,
    device_timeout: Duration,
    _stream: Option<Stream>,
}

impl SourcePipe {
    /// Open the last used device (or a sensible default), keeping `capacity` samples
    pub fn new(config: &Config, capacity: usize) -> Self {
        let devices = Self::collect_devices();
        let buffer = Arc::new(Mutex::new(vec![0.0; capacity]));
        let device_timeout = Duration::from_secs(config.device_timeout_secs());

        let start_index = config
            .last_device
            .as_ref()
            .and_then(|name| {
                let is_input = config.last_device_is_input.unwrap_or(false);
                devices
                    .iter()
                    .position(|d| d.name == *name && d.is_input == is_input)
            })
            .or_else(|| {
                // Prefer pipewire or pulse input devices (more reliable on Linux)
                devices
                    .iter()
                    .position(|d| d.is_input && d.name == "pipewire")
            })
            .or_else(|| devices.iter().position(|d| d.is_input && d.name == "pulse"))
            .or_else(|| {
                // Fall back to default output device for loopback capture
                let host = cpal::default_host();
                let default_output_name = host.default_output_device().and_then(|d| d.name().ok());
                default_output_name
                    .and_then(|name| devices.iter().position(|d| !d.is_input && d.name == name))
            })
            .unwrap_or(0);

        let opened = match devices.get(start_index) {
            Some(info) => {
                Self::build_stream(info, Arc::clone(&buffer), capacity, device_timeout)
            }
            None => {
                error!("No audio devices found!");
                None
            }
        };

        let (stream, sample_rate) = match opened {
            Some((stream, rate)) => {
                let info = &devices[start_index];
                let device_type = if info.is_input { "input" } else { "output" };
                info!(
                    "[{}] Selected: {} ({}, {} Hz)",
                    start_index, info.name, device_type, rate
                );
                (Some(stream), rate)
            }
            None => (None, FALLBACK_SAMPLE_RATE),
        };

        Self {
            buffer,
            capacity,
            devices,
            current_device: start_index,
            sample_rate,
            device_timeout,
            _stream: stream,
        }
    }

    pub fn list_devices() {
        info!("=== Audio Devices ===");
        for (idx, info) in Self::collect_devices().iter().enumerate() {
            let kind = if info.is_input { "input" } else { "output" };
            info!("  [{}] {} ({})", idx, info.name, kind);
        }
        info!("Use 0-9 (Shift for +10) to switch devices, Space to start/stop");
    }

    /// Inputs first, then outputs; indices match the number keys
    fn collect_devices() -> Vec<DeviceInfo> {
        let host = cpal::default_host();
        let inputs = host.input_devices().into_iter().flatten().map(|d| (d, true));
        let outputs = host.output_devices().into_iter().flatten().map(|d| (d, false));

        inputs
            .chain(outputs)
            .filter_map(|(device, is_input)| {
                let name = device.name().ok()?;
                Some(DeviceInfo {
                    device,
                    name,
                    is_input,
                })
            })
            .collect()
    }

    /// Get device config with timeout (the config call often hangs on bad devices)
    fn get_config_with_timeout(
        device: &Device,
        is_input: bool,
        timeout: Duration,
    ) -> Option<StreamConfig> {
        let device_clone = device.clone();

        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let config = if is_input {
                device_clone.default_input_config()
            } else {
                device_clone.default_output_config()
            };
            let _ = tx.send(config);
        });

        match rx.recv_timeout(timeout) {
            Ok(Ok(config)) => Some(config.into()),
            Ok(Err(e)) => {
                warn!("  Failed to get config: {}", e);
                None
            }
            Err(_) => {
                warn!("  Device config timed out after {:?}", timeout);
                None
            }
        }
    }

    fn build_stream(
        device_info: &DeviceInfo,
        audio_buffer: Arc<Mutex<Vec<f32>>>,
        capacity: usize,
        timeout: Duration,
    ) -> Option<(Stream, f32)> {
        let stream_config =
            Self::get_config_with_timeout(&device_info.device, device_info.is_input, timeout)?;
        let channels = (stream_config.channels as usize).max(1);
        let sample_rate = stream_config.sample_rate.0 as f32;

        let err_fn = |err| error!("Audio stream error: {}", err);

        let stream = device_info.device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let Ok(mut buffer) = audio_buffer.lock() else {
                    return;
                };
                buffer.extend(
                    data.chunks(channels)
                        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32),
                );
                let excess = buffer.len().saturating_sub(capacity);
                buffer.drain(..excess);
            },
            err_fn,
            None,
        );

        match stream {
            Ok(s) => {
                if let Err(e) = s.play() {
                    warn!("  Failed to play stream: {}", e);
                    return None;
                }
                Some((s, sample_rate))
            }
            Err(e) => {
                warn!("  Failed to build stream: {}", e);
                None
            }
        }
    }

    /// Attempts to select a device.
    /// Returns Some((device_name, success)) if a switch was attempted, None if index invalid.
    pub fn select_device(&mut self, index: usize) -> Option<(String, bool)> {
        let info = self.devices.get(index)?;
        if index == self.current_device && self._stream.is_some() {
            return Some((info.name.clone(), true));
        }

        let device_type = if info.is_input { "input" } else { "output" };
        let device_name = info.name.clone();
        let is_input = info.is_input;
        info!("[{}] Selecting: {} ({})", index, device_name, device_type);

        // Clear the buffer
        if let Ok(mut buf) = self.buffer.lock() {
            buf.iter_mut().for_each(|x| *x = 0.0);
        }

        let opened = Self::build_stream(
            info,
            Arc::clone(&self.buffer),
            self.capacity,
            self.device_timeout,
        );
        match opened {
            Some((stream, rate)) => {
                info!("  -> OK ({} Hz)", rate);
                self._stream = Some(stream);
                self.current_device = index;
                self.sample_rate = rate;

                // Save to config
                let mut config = Config::load();
                config.set_device(&device_name, is_input);

                Some((device_name, true))
            }
            None => {
                warn!("  -> FAILED");
                Some((device_name, false))
            }
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Run `f` over the captured samples, oldest first
    pub fn with_samples<R>(&self, f: impl FnOnce(&[f32]) -> R) -> R {
        let buffer = self
            .buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&buffer)
    }
}
