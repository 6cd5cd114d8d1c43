//! Pull-based audio analysis feed contract
//!
//! The feed is owned by the host's audio pipeline. The engine keeps only a
//! weak reference and reads both arrays once per frame.

use crate::{SampleStream, VizError};

/// Source of per-frame analysis data.
///
/// Values are bytes: time-domain samples center on 128 (zero amplitude),
/// frequency magnitudes run from 0 (silent) to 255. Frequency bin `i`
/// represents `i * sample_rate / transform_size` Hz.
pub trait AnalysisFeed {
    /// Active sample rate in Hz
    fn sample_rate(&self) -> f32;

    /// Window length of the spectral transform
    fn transform_size(&self) -> usize;

    /// Replace `out` with the current time-domain samples
    /// (`transform_size` values expected).
    fn time_domain_samples(&self, out: &mut Vec<u8>);

    /// Replace `out` with the current frequency magnitudes
    /// (`transform_size / 2` values expected).
    fn frequency_magnitudes(&self, out: &mut Vec<u8>);

    fn expected_len(&self, stream: SampleStream) -> usize {
        match stream {
            SampleStream::TimeDomain => self.transform_size(),
            SampleStream::Frequency => self.transform_size() / 2,
        }
    }
}

/// Clamp a freshly read buffer to the length the feed advertises.
///
/// Oversized buffers are truncated; undersized ones are used as-is. Either
/// mismatch is returned so the caller can report it. An advertised length of
/// zero disables the check.
pub fn conform(samples: &mut Vec<u8>, expected: usize, stream: SampleStream) -> Option<VizError> {
    let actual = samples.len();
    if expected == 0 || actual == expected {
        return None;
    }
    if actual > expected {
        samples.truncate(expected);
    }
    Some(VizError::MalformedFeedData {
        stream,
        expected,
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conform_accepts_exact_length() {
        let mut samples = vec![128u8; 16];
        assert!(conform(&mut samples, 16, SampleStream::TimeDomain).is_none());
        assert_eq!(samples.len(), 16);
    }

    #[test]
    fn test_conform_truncates_oversized() {
        let mut samples = vec![7u8; 20];
        let err = conform(&mut samples, 16, SampleStream::Frequency);
        assert_eq!(samples.len(), 16);
        assert_eq!(
            err,
            Some(VizError::MalformedFeedData {
                stream: SampleStream::Frequency,
                expected: 16,
                actual: 20,
            })
        );
    }

    #[test]
    fn test_conform_keeps_undersized() {
        let mut samples = vec![7u8; 4];
        assert!(conform(&mut samples, 16, SampleStream::TimeDomain).is_some());
        assert_eq!(samples.len(), 4);
    }
}
