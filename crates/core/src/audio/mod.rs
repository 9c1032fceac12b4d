use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod pcm;
pub use pcm::{downmix, parse_f32le};

/// Sample rate the reference analyzer assumes for browser-decoded audio.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("sample buffer is empty")]
    Empty,

    #[error("sample rate must be > 0 Hz")]
    ZeroSampleRate,

    #[error("sample {index} is not a finite number")]
    NonFiniteSample { index: usize },

    #[error("invalid pcm input: {0}")]
    InvalidPcm(String),
}

/// Mono samples, nominally in `[-1, 1]`, plus the rate they were captured at.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds, `len / sample_rate`. Zero when the rate is zero.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs())
    }

    /// Rejects buffers no analysis stage can work with: empty, zero rate,
    /// or containing NaN / infinite samples.
    pub fn validate(&self) -> Result<(), AudioError> {
        if self.sample_rate == 0 {
            return Err(AudioError::ZeroSampleRate);
        }
        if self.samples.is_empty() {
            return Err(AudioError::Empty);
        }
        if let Some(index) = self.samples.iter().position(|s| !s.is_finite()) {
            return Err(AudioError::NonFiniteSample { index });
        }
        Ok(())
    }
}
