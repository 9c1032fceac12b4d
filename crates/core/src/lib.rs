#![deny(warnings)]

pub mod audio;
pub mod config;
pub mod emotion;
pub mod features;
pub mod pipeline;

pub use audio::{AudioError, SampleBuffer};
pub use emotion::{EmotionLabel, EmotionReport, EmotionScores};
pub use features::{FeatureExtractor, FeatureVector};
pub use pipeline::{analyze, AnalysisPipeline, AnalysisResult, EmotionAnalyzer, EmotionError};
