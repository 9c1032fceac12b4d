//! Autocorrelation pitch tracking.
//!
//! Each analysis frame is searched over lags covering
//! [`PITCH_FLOOR_HZ`, `PITCH_CEILING_HZ`]; the lag with the largest raw
//! (unnormalized) autocorrelation wins. Frames where no lag correlates
//! positively are treated as unvoiced and left out of the statistics.

use super::{FRAME_HOP, FRAME_SIZE};
use serde::{Deserialize, Serialize};

/// Lowest pitch searched, in Hz. Sets the longest lag.
pub const PITCH_FLOOR_HZ: u32 = 80;

/// Highest pitch searched, in Hz. Sets the shortest lag.
pub const PITCH_CEILING_HZ: u32 = 800;

/// Aggregate pitch over all voiced frames, in Hz.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PitchStats {
    pub mean_hz: f64,
    /// Population standard deviation.
    pub stddev_hz: f64,
    /// `max - min`.
    pub range_hz: f64,
    pub voiced_frames: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct PitchEstimator {
    sample_rate: u32,
    frame_size: usize,
    hop_size: usize,
}

impl PitchEstimator {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            frame_size: FRAME_SIZE,
            hop_size: FRAME_HOP,
        }
    }

    /// Shortest lag searched. Never zero, so a lag always maps to a finite
    /// frequency even at very low sample rates.
    pub fn min_lag(&self) -> usize {
        ((self.sample_rate / PITCH_CEILING_HZ) as usize).max(1)
    }

    /// Longest lag searched, before the half-frame bound is applied.
    pub fn max_lag(&self) -> usize {
        (self.sample_rate / PITCH_FLOOR_HZ) as usize
    }

    /// Pitch of one frame in Hz, or `None` when no lag in range correlates
    /// positively.
    pub fn estimate(&self, frame: &[f32]) -> Option<f64> {
        let half = frame.len() as f64 / 2.0;
        let mut best_lag = 0usize;
        let mut best_corr = 0.0f64;

        let mut lag = self.min_lag();
        while lag <= self.max_lag() && (lag as f64) < half {
            let corr = frame
                .iter()
                .zip(&frame[lag..])
                .map(|(a, b)| f64::from(*a) * f64::from(*b))
                .sum::<f64>();

            if corr > best_corr {
                best_corr = corr;
                best_lag = lag;
            }
            lag += 1;
        }

        (best_lag > 0).then(|| f64::from(self.sample_rate) / best_lag as f64)
    }

    /// Per-frame pitch for every frame that starts strictly before
    /// `len - frame_size`; unvoiced frames are dropped.
    pub fn contour(&self, samples: &[f32]) -> Vec<f64> {
        let last_start = samples.len().saturating_sub(self.frame_size);
        (0..last_start)
            .step_by(self.hop_size)
            .filter_map(|start| self.estimate(&samples[start..start + self.frame_size]))
            .collect()
    }

    pub fn track(&self, samples: &[f32]) -> PitchStats {
        let pitches = self.contour(samples);
        if pitches.is_empty() {
            return PitchStats::default();
        }

        let n = pitches.len() as f64;
        let mean = pitches.iter().sum::<f64>() / n;
        let variance = pitches.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
        let max = pitches.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = pitches.iter().copied().fold(f64::INFINITY, f64::min);

        PitchStats {
            mean_hz: mean,
            stddev_hz: variance.sqrt(),
            range_hz: max - min,
            voiced_frames: pitches.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::DEFAULT_SAMPLE_RATE;

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect()
    }

    #[test]
    fn lag_bounds_follow_sample_rate() {
        let est = PitchEstimator::new(DEFAULT_SAMPLE_RATE);
        assert_eq!(est.min_lag(), 55);
        assert_eq!(est.max_lag(), 551);

        let low = PitchEstimator::new(400);
        assert_eq!(low.min_lag(), 1);
        assert_eq!(low.max_lag(), 5);
    }

    #[test]
    fn detects_sine_frequency_in_single_frame() {
        let est = PitchEstimator::new(DEFAULT_SAMPLE_RATE);
        for freq in [110.0f32, 220.0, 440.0] {
            let frame = sine(freq, DEFAULT_SAMPLE_RATE, FRAME_SIZE);
            let hz = est.estimate(&frame).expect("voiced");
            assert!(
                (hz - f64::from(freq)).abs() < 3.0,
                "expected ~{freq} Hz, got {hz}"
            );
        }
    }

    #[test]
    fn silent_frame_is_unvoiced() {
        let est = PitchEstimator::new(DEFAULT_SAMPLE_RATE);
        assert_eq!(est.estimate(&[0.0; FRAME_SIZE]), None);
    }

    #[test]
    fn short_frame_searches_no_lags() {
        let est = PitchEstimator::new(DEFAULT_SAMPLE_RATE);
        // Half of 100 samples is below the 55-sample minimum lag.
        assert_eq!(est.estimate(&sine(440.0, DEFAULT_SAMPLE_RATE, 100)), None);
    }

    #[test]
    fn buffer_no_longer_than_one_frame_yields_no_contour() {
        let est = PitchEstimator::new(DEFAULT_SAMPLE_RATE);
        let samples = sine(220.0, DEFAULT_SAMPLE_RATE, FRAME_SIZE);
        assert!(est.contour(&samples).is_empty());
        assert_eq!(est.track(&samples), PitchStats::default());
    }

    #[test]
    fn frames_start_every_hop() {
        let est = PitchEstimator::new(DEFAULT_SAMPLE_RATE);
        // Starts at 0, 512, 1024 and 1536, all strictly below 4096 - 2048.
        let samples = sine(220.0, DEFAULT_SAMPLE_RATE, 4096);
        assert_eq!(est.contour(&samples).len(), 4);
    }

    #[test]
    fn steady_tone_has_small_spread() {
        let est = PitchEstimator::new(DEFAULT_SAMPLE_RATE);
        let samples = sine(220.0, DEFAULT_SAMPLE_RATE, DEFAULT_SAMPLE_RATE as usize / 2);
        let stats = est.track(&samples);

        assert!(stats.voiced_frames > 30);
        assert!((stats.mean_hz - 220.0).abs() < 3.0, "mean {}", stats.mean_hz);
        assert!(stats.stddev_hz < 3.0);
        assert!(stats.range_hz < 6.0);
    }

    #[test]
    fn stats_span_two_tones() {
        let est = PitchEstimator::new(DEFAULT_SAMPLE_RATE);
        let mut samples = sine(110.0, DEFAULT_SAMPLE_RATE, 8192);
        samples.extend(sine(220.0, DEFAULT_SAMPLE_RATE, 8192));
        let stats = est.track(&samples);

        assert!(stats.range_hz > 100.0, "range {}", stats.range_hz);
        assert!(stats.stddev_hz > 10.0);
    }
}
