//! Low/mid/high band aggregation of a frequency magnitude array.

use serde::{Deserialize, Serialize};

/// Coarse frequency band driving particle spawn and color
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Mid,
    High,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Low, Band::Mid, Band::High];

    pub fn index(self) -> usize {
        match self {
            Band::Low => 0,
            Band::Mid => 1,
            Band::High => 2,
        }
    }
}

/// Upper band edges in Hz. Bins at or above `high_max_hz` are ignored.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BandLimits {
    pub low_max_hz: f32,
    pub mid_max_hz: f32,
    pub high_max_hz: f32,
}

impl Default for BandLimits {
    fn default() -> Self {
        Self {
            low_max_hz: 250.0,
            mid_max_hz: 4000.0,
            high_max_hz: 16000.0,
        }
    }
}

impl BandLimits {
    pub fn classify(&self, freq: f32) -> Option<Band> {
        if freq < self.low_max_hz {
            Some(Band::Low)
        } else if freq < self.mid_max_hz {
            Some(Band::Mid)
        } else if freq < self.high_max_hz {
            Some(Band::High)
        } else {
            None
        }
    }
}

/// Mean magnitude per band (0-255 scale); 0 when no bin falls in the band
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandAverages {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl BandAverages {
    pub fn get(&self, band: Band) -> f32 {
        match band {
            Band::Low => self.low,
            Band::Mid => self.mid,
            Band::High => self.high,
        }
    }
}

/// Band averages using the default 250 / 4000 / 16000 Hz edges
pub fn band_averages(magnitudes: &[u8], sample_rate: f32, transform_size: usize) -> BandAverages {
    band_averages_with(magnitudes, sample_rate, transform_size, &BandLimits::default())
}

pub fn band_averages_with(
    magnitudes: &[u8],
    sample_rate: f32,
    transform_size: usize,
    limits: &BandLimits,
) -> BandAverages {
    if transform_size == 0 || !sample_rate.is_finite() || sample_rate <= 0.0 {
        return BandAverages::default();
    }

    let bin_width = sample_rate / transform_size as f32;
    let mut sums = [0.0f32; 3];
    let mut counts = [0usize; 3];

    for (i, &value) in magnitudes.iter().enumerate() {
        let freq = i as f32 * bin_width;
        match limits.classify(freq) {
            Some(band) => {
                sums[band.index()] += value as f32;
                counts[band.index()] += 1;
            }
            // Bins only ascend from here
            None => break,
        }
    }

    let mean = |band: Band| {
        let i = band.index();
        if counts[i] > 0 {
            sums[i] / counts[i] as f32
        } else {
            0.0
        }
    };

    BandAverages {
        low: mean(Band::Low),
        mid: mean(Band::Mid),
        high: mean(Band::High),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_zero() {
        assert_eq!(band_averages(&[], 44100.0, 2048), BandAverages::default());
    }

    #[test]
    fn test_degenerate_transform_is_zero() {
        let mags = vec![200u8; 1024];
        assert_eq!(band_averages(&mags, 44100.0, 0), BandAverages::default());
        assert_eq!(band_averages(&mags, 0.0, 2048), BandAverages::default());
        assert_eq!(band_averages(&mags, f32::NAN, 2048), BandAverages::default());
    }

    #[test]
    fn test_uniform_magnitudes_average_to_value() {
        let mags = vec![120u8; 1024];
        let avg = band_averages(&mags, 44100.0, 2048);
        assert_eq!(avg.low, 120.0);
        assert_eq!(avg.mid, 120.0);
        assert_eq!(avg.high, 120.0);
    }

    #[test]
    fn test_bins_partition_by_frequency() {
        // 8 kHz / 16 = 500 Hz bins: bin 0 -> low, 1..8 -> mid, 8.. -> high
        let mut mags = vec![0u8; 8];
        mags[0] = 90;
        mags[1] = 30;
        mags[7] = 60;

        let avg = band_averages(&mags, 8000.0, 16);
        assert_eq!(avg.low, 90.0);
        assert_eq!(avg.mid, 90.0 / 7.0);
        assert_eq!(avg.high, 0.0);
    }

    #[test]
    fn test_band_with_no_bins_is_zero() {
        // 1 kHz bins: only bin 0 is low and nothing reaches 4 kHz
        let mags = vec![255u8; 3];
        let avg = band_averages(&mags, 2000.0, 2);
        assert_eq!(avg.low, 255.0);
        assert_eq!(avg.mid, 255.0);
        assert_eq!(avg.high, 0.0);
    }

    #[test]
    fn test_bins_above_limit_ignored() {
        // 24 kHz bins: bin 0 low, bin 1 ignored, rest ignored
        let mags = vec![255u8, 255, 255];
        let avg = band_averages(&mags, 48000.0, 2);
        assert_eq!(avg.low, 255.0);
        assert_eq!(avg.mid, 0.0);
        assert_eq!(avg.high, 0.0);
    }

    #[test]
    fn test_values_never_negative() {
        let mags: Vec<u8> = (0..1024).map(|i| (i % 256) as u8).collect();
        let avg = band_averages(&mags, 48000.0, 2048);
        for band in Band::ALL {
            assert!(avg.get(band) >= 0.0);
        }
    }
}
