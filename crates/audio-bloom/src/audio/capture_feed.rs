//! Analysis feed backed by live device capture.

use audio_bloom_engine::{AnalysisFeed, SampleAnalyser};
use std::cell::RefCell;

use super::SourcePipe;

/// Serves the capture ring buffer to the engine as byte-valued
/// time-domain and frequency arrays.
pub struct CaptureFeed {
    pipe: RefCell<SourcePipe>,
    analyser: RefCell<SampleAnalyser>,
}

impl CaptureFeed {
    pub fn new(pipe: SourcePipe, transform_size: usize, smoothing: f32) -> Self {
        let analyser = SampleAnalyser::with_settings(pipe.sample_rate(), transform_size, smoothing);
        Self {
            pipe: RefCell::new(pipe),
            analyser: RefCell::new(analyser),
        }
    }

    /// Switch capture device; see [`SourcePipe::select_device`]
    pub fn select_device(&self, index: usize) -> Option<(String, bool)> {
        let result = self.pipe.borrow_mut().select_device(index);
        if let Some((_, true)) = result {
            let rate = self.pipe.borrow().sample_rate();
            self.analyser.borrow_mut().set_sample_rate(rate);
        }
        result
    }
}

impl AnalysisFeed for CaptureFeed {
    fn sample_rate(&self) -> f32 {
        self.analyser.borrow().sample_rate()
    }

    fn transform_size(&self) -> usize {
        self.analyser.borrow().transform_size()
    }

    fn time_domain_samples(&self, out: &mut Vec<u8>) {
        let analyser = self.analyser.borrow();
        self.pipe
            .borrow()
            .with_samples(|samples| analyser.write_time_domain(samples, out));
    }

    fn frequency_magnitudes(&self, out: &mut Vec<u8>) {
        let mut analyser = self.analyser.borrow_mut();
        self.pipe
            .borrow()
            .with_samples(|samples| analyser.write_frequency(samples, out));
    }
}
