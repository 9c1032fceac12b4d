use crate::{
    audio::{AudioError, SampleBuffer},
    config::{AnalyzerConfig, ProcessingDelay},
    emotion::{
        ConfidencePolicy, EmotionLabel, EmotionReport, EmotionScorer, EmotionScores,
        RandomSource, StdRandom,
    },
    features::{FeatureExtractor, FeatureVector},
};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

const LOG_TARGET: &str = "pipeline";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmotionError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] AudioError),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub emotion: EmotionLabel,
    /// Probability of `emotion`.
    pub confidence: f64,
    pub probabilities: EmotionScores,
    pub features: FeatureVector,
    pub duration_secs: f64,
    pub created_at: SystemTime,
}

impl AnalysisResult {
    pub fn report(&self, policy: &ConfidencePolicy) -> EmotionReport {
        EmotionReport {
            emotion: self.emotion,
            confidence: self.confidence,
            is_confident: policy.is_confident(self.confidence),
            probabilities: self.probabilities,
        }
    }
}

pub trait EmotionAnalyzer: Send + Sync {
    fn analyze(&self, buffer: SampleBuffer) -> BoxFuture<'_, Result<AnalysisResult, EmotionError>>;
}

/// Buffer → features → scores → result.
///
/// The pipeline owns its random source; concurrent callers sharing one
/// pipeline take turns on it.
pub struct AnalysisPipeline<R> {
    extractor: FeatureExtractor,
    scorer: Mutex<EmotionScorer<R>>,
    delay: ProcessingDelay,
}

impl<R: RandomSource> AnalysisPipeline<R> {
    pub fn new(rng: R) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            scorer: Mutex::new(EmotionScorer::new(rng)),
            delay: ProcessingDelay::default(),
        }
    }

    pub fn with_delay(mut self, delay: ProcessingDelay) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> ProcessingDelay {
        self.delay
    }

    fn scorer(&self) -> MutexGuard<'_, EmotionScorer<R>> {
        // The scorer holds only generator state, which stays usable even
        // if another caller panicked mid-draw.
        self.scorer.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn pause(&self) -> Duration {
        let draw = if self.delay.has_jitter() {
            self.scorer().rng_mut().next_unit()
        } else {
            0.0
        };
        self.delay.duration_for(draw)
    }

    /// Runs every stage synchronously, without the processing delay.
    pub fn run(&self, buffer: &SampleBuffer) -> Result<AnalysisResult, EmotionError> {
        buffer.validate()?;

        let features = self.extractor.extract(buffer)?;
        let probabilities = self.scorer().score(&features);
        let (emotion, confidence) = probabilities.primary();

        tracing::debug!(
            target: LOG_TARGET,
            %emotion,
            confidence,
            samples = buffer.len(),
            sample_rate = buffer.sample_rate(),
            "analysis complete"
        );

        Ok(AnalysisResult {
            emotion,
            confidence,
            probabilities,
            features,
            duration_secs: buffer.duration_secs(),
            created_at: SystemTime::now(),
        })
    }
}

impl AnalysisPipeline<StdRandom> {
    /// Seeded from `config.seed` when set, from the OS otherwise.
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRandom::seeded(seed),
            None => StdRandom::from_os(),
        };
        Self::new(rng).with_delay(config.delay)
    }
}

impl<R: RandomSource + 'static> EmotionAnalyzer for AnalysisPipeline<R> {
    fn analyze(&self, buffer: SampleBuffer) -> BoxFuture<'_, Result<AnalysisResult, EmotionError>> {
        async move {
            let result = self.run(&buffer)?;

            if !self.delay.is_zero() {
                let pause = self.pause();
                tracing::trace!(target: LOG_TARGET, ?pause, "pacing result");
                tokio::time::sleep(pause).await;
            }

            Ok(result)
        }
        .boxed()
    }
}

/// One-shot analysis with a freshly OS-seeded generator.
pub fn analyze(samples: Vec<f32>, sample_rate: u32) -> Result<AnalysisResult, EmotionError> {
    AnalysisPipeline::new(StdRandom::from_os()).run(&SampleBuffer::new(samples, sample_rate))
}
