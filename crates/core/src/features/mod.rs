//! Fixed-size acoustic feature vector consumed by the emotion scorer.

use crate::audio::{AudioError, SampleBuffer};
use serde::{Deserialize, Serialize};

pub mod pitch;
pub mod spectral;
pub mod tempo;

pub use pitch::{PitchEstimator, PitchStats, PITCH_CEILING_HZ, PITCH_FLOOR_HZ};
pub use spectral::{
    spectral_centroid, spectral_rolloff, ANALYSIS_SIZE, DEFAULT_CENTROID, DEFAULT_ROLLOFF,
    ROLLOFF_FRACTION,
};
pub use tempo::{estimate_tempo, BEAT_ENERGY_RATIO, DEFAULT_TEMPO_BPM};

/// Frame length shared by pitch tracking and tempo estimation.
pub const FRAME_SIZE: usize = 2048;

/// Hop between successive frames.
pub const FRAME_HOP: usize = 512;

/// Pitch statistics are reported in kHz.
pub const PITCH_SCALE_HZ: f64 = 1000.0;

const LOG_TARGET: &str = "features";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    pub rms_energy: f64,
    pub zero_crossing_rate: f64,
    pub spectral_centroid: f64,
    /// kHz
    pub mean_pitch: f64,
    /// Standard deviation of pitch in kHz.
    pub pitch_variance: f64,
    /// kHz
    pub pitch_range: f64,
    pub spectral_rolloff: f64,
    /// Beats per minute.
    pub tempo: f64,
}

impl FeatureVector {
    pub const LEN: usize = 8;

    /// Values in their canonical order, `rms_energy` first and `tempo` last.
    pub fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.rms_energy,
            self.zero_crossing_rate,
            self.spectral_centroid,
            self.mean_pitch,
            self.pitch_variance,
            self.pitch_range,
            self.spectral_rolloff,
            self.tempo,
        ]
    }

    pub fn from_array(values: [f64; Self::LEN]) -> Self {
        let [rms_energy, zero_crossing_rate, spectral_centroid, mean_pitch, pitch_variance, pitch_range, spectral_rolloff, tempo] =
            values;
        Self {
            rms_energy,
            zero_crossing_rate,
            spectral_centroid,
            mean_pitch,
            pitch_variance,
            pitch_range,
            spectral_rolloff,
            tempo,
        }
    }
}

pub fn rms_energy(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|s| f64::from(*s).powi(2)).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Sign changes between neighbours over the sample count. Zero counts as
/// non-negative.
pub fn zero_crossing_rate(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    crossings as f64 / samples.len() as f64
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, buffer: &SampleBuffer) -> Result<FeatureVector, AudioError> {
        buffer.validate()?;
        let samples = buffer.samples();

        let pitch = PitchEstimator::new(buffer.sample_rate()).track(samples);
        if pitch.voiced_frames == 0 {
            tracing::debug!(target: LOG_TARGET, "no voiced frames, pitch statistics default to 0");
        }

        let features = FeatureVector {
            rms_energy: rms_energy(samples),
            zero_crossing_rate: zero_crossing_rate(samples),
            spectral_centroid: spectral_centroid(samples),
            mean_pitch: pitch.mean_hz / PITCH_SCALE_HZ,
            pitch_variance: pitch.stddev_hz / PITCH_SCALE_HZ,
            pitch_range: pitch.range_hz / PITCH_SCALE_HZ,
            spectral_rolloff: spectral_rolloff(samples),
            tempo: estimate_tempo(samples, buffer.sample_rate()),
        };

        tracing::debug!(
            target: LOG_TARGET,
            samples = samples.len(),
            voiced_frames = pitch.voiced_frames,
            ?features,
            "features extracted"
        );
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::DEFAULT_SAMPLE_RATE;

    fn buffer(samples: Vec<f32>) -> SampleBuffer {
        SampleBuffer::new(samples, DEFAULT_SAMPLE_RATE)
    }

    #[test]
    fn silence_takes_every_default() {
        let features = FeatureExtractor::new()
            .extract(&buffer(vec![0.0; DEFAULT_SAMPLE_RATE as usize]))
            .unwrap();

        assert_eq!(features.rms_energy, 0.0);
        assert_eq!(features.zero_crossing_rate, 0.0);
        assert_eq!(features.spectral_centroid, DEFAULT_CENTROID);
        assert_eq!(features.mean_pitch, 0.0);
        assert_eq!(features.pitch_variance, 0.0);
        assert_eq!(features.pitch_range, 0.0);
        assert_eq!(features.spectral_rolloff, DEFAULT_ROLLOFF);
        assert_eq!(features.tempo, 0.0);
    }

    #[test]
    fn empty_buffer_is_rejected() {
        let err = FeatureExtractor::new().extract(&buffer(Vec::new())).unwrap_err();
        assert_eq!(err, AudioError::Empty);
    }

    #[test]
    fn constant_positive_signal_never_crosses_zero() {
        let samples = vec![0.25f32; 5000];
        assert_eq!(zero_crossing_rate(&samples), 0.0);
        assert!((rms_energy(&samples) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn alternating_signal_crosses_on_every_pair() {
        let samples: Vec<f32> = (0..1000).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        assert_eq!(zero_crossing_rate(&samples), 999.0 / 1000.0);
    }

    #[test]
    fn zero_counts_as_non_negative() {
        assert_eq!(zero_crossing_rate(&[0.0, 0.0, -0.1, 0.0]), 0.5);
    }

    #[test]
    fn sine_features_land_in_expected_ranges() {
        let sr = DEFAULT_SAMPLE_RATE;
        let samples: Vec<f32> = (0..sr as usize)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / sr as f32).sin())
            .collect();
        let features = FeatureExtractor::new().extract(&buffer(samples)).unwrap();

        // RMS of a sine is amplitude / sqrt(2).
        assert!((features.rms_energy - 0.5 / 2f64.sqrt()).abs() < 1e-3);
        // Two crossings per period.
        assert!((features.zero_crossing_rate - 440.0 / sr as f64).abs() < 1e-3);
        assert!((features.mean_pitch - 0.220).abs() < 0.003);
        assert!(features.pitch_variance < 0.003);
        assert!(features.spectral_centroid > 0.3 && features.spectral_centroid < 0.7);
        assert!(features.spectral_rolloff > 0.0 && features.spectral_rolloff < 1.0);
    }

    #[test]
    fn array_order_is_canonical() {
        let values = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8];
        let features = FeatureVector::from_array(values);
        assert_eq!(features.rms_energy, 0.1);
        assert_eq!(features.pitch_variance, 0.5);
        assert_eq!(features.tempo, 0.8);
        assert_eq!(features.to_array(), values);
    }
}
