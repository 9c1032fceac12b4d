use crate::audio::DEFAULT_SAMPLE_RATE;
use crate::emotion::{ConfidencePolicy, DEFAULT_CONFIDENCE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const ENV_SEED: &str = "VOICE_EMOTION_SEED";
pub const ENV_CONFIDENCE_THRESHOLD: &str = "VOICE_EMOTION_CONFIDENCE_THRESHOLD";
pub const ENV_DELAY_MS: &str = "VOICE_EMOTION_DELAY_MS";

pub const DEFAULT_DELAY_MS: u64 = 0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleRate(u32);

impl SampleRate {
    pub fn new(hz: u32) -> Result<Self, ConfigError> {
        if hz == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        Ok(Self(hz))
    }

    pub fn hz(&self) -> u32 {
        self.0
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self(DEFAULT_SAMPLE_RATE)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceThreshold(f64);

impl ConfidenceThreshold {
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::ThresholdOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn policy(&self) -> ConfidencePolicy {
        ConfidencePolicy::new(self.0)
    }
}

impl Default for ConfidenceThreshold {
    fn default() -> Self {
        Self(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

/// Pause before a result is handed back: `base_ms` plus up to `jitter_ms`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessingDelay {
    pub base_ms: u64,
    pub jitter_ms: u64,
}

impl ProcessingDelay {
    pub fn new(base_ms: u64, jitter_ms: u64) -> Self {
        Self { base_ms, jitter_ms }
    }

    /// The 1.5 s + up to 1 s pacing the browser demo used.
    pub fn reference() -> Self {
        Self {
            base_ms: 1500,
            jitter_ms: 1000,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.base_ms == 0 && self.jitter_ms == 0
    }

    pub fn has_jitter(&self) -> bool {
        self.jitter_ms > 0
    }

    /// Delay for a unit draw in `[0, 1)`.
    pub fn duration_for(&self, draw: f64) -> Duration {
        let jitter = (self.jitter_ms as f64 * draw.clamp(0.0, 1.0)) as u64;
        Duration::from_millis(self.base_ms.saturating_add(jitter))
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalyzerConfig {
    pub sample_rate: SampleRate,
    pub confidence: ConfidenceThreshold,
    pub delay: ProcessingDelay,
    /// Fixed scorer seed. `None` seeds from the OS on every pipeline.
    pub seed: Option<u64>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be > 0 Hz")]
    ZeroSampleRate,
    #[error("confidence threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f64),
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: String, value: String },
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// CLI value if given, else the parsed environment variable, else `None`.
pub fn resolve_parsed<T: FromStr>(
    cli_value: Option<T>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<T>, ConfigError> {
    match cli_value {
        Some(v) => Ok(Some(v)),
        None => match env.var(env_key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidEnv {
                    key: env_key.to_owned(),
                    value: raw,
                }),
            None => Ok(None),
        },
    }
}

pub fn resolve_parsed_with_default<T: FromStr>(
    cli_value: Option<T>,
    env_key: &str,
    env: &impl Env,
    default: T,
) -> Result<T, ConfigError> {
    Ok(resolve_parsed(cli_value, env_key, env)?.unwrap_or(default))
}
