use super::{EmotionLabel, EmotionScores};
use serde::{Deserialize, Serialize};

/// Threshold the classification service applies before calling a
/// prediction confident.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Caller-side rule deciding whether a winning score is trustworthy.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConfidencePolicy {
    pub threshold: f64,
}

impl ConfidencePolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn is_confident(&self, confidence: f64) -> bool {
        confidence >= self.threshold
    }
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Shape handed to the UI / network layer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EmotionReport {
    pub emotion: EmotionLabel,
    pub confidence: f64,
    #[serde(alias = "isConfident")]
    pub is_confident: bool,
    pub probabilities: EmotionScores,
}

impl EmotionReport {
    pub fn new(scores: EmotionScores, policy: &ConfidencePolicy) -> Self {
        let (emotion, confidence) = scores.primary();
        Self {
            emotion,
            confidence,
            is_confident: policy.is_confident(confidence),
            probabilities: scores,
        }
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
