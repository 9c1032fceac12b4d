mod random;
mod report;
mod scorer;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use random::{ConstantRandom, RandomSource, ScriptedRandom, StdRandom};
pub use report::{ConfidencePolicy, EmotionReport, DEFAULT_CONFIDENCE_THRESHOLD};
pub use scorer::{EmotionScorer, SCORE_FLOOR};

/// Declaration order is the canonical order used for iteration and tie-breaks.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Neutral,
    Calm,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgust,
    Surprised,
}

impl EmotionLabel {
    pub const COUNT: usize = 8;

    pub const ALL: [EmotionLabel; Self::COUNT] = [
        EmotionLabel::Neutral,
        EmotionLabel::Calm,
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Fearful,
        EmotionLabel::Disgust,
        EmotionLabel::Surprised,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Calm => "calm",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Angry => "angry",
            EmotionLabel::Fearful => "fearful",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Surprised => "surprised",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoresError {
    #[error("missing probability for {0}")]
    MissingLabel(EmotionLabel),
}

/// One score per [`EmotionLabel`], indexed in canonical order.
///
/// Serializes as a map with all eight labels as keys.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(
    into = "BTreeMap<EmotionLabel, f64>",
    try_from = "BTreeMap<EmotionLabel, f64>"
)]
pub struct EmotionScores([f64; EmotionLabel::COUNT]);

impl EmotionScores {
    pub fn from_array(values: [f64; EmotionLabel::COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, label: EmotionLabel) -> f64 {
        self.0[label.index()]
    }

    pub fn set(&mut self, label: EmotionLabel, value: f64) {
        self.0[label.index()] = value;
    }

    pub fn add(&mut self, label: EmotionLabel, amount: f64) {
        self.0[label.index()] += amount;
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f64)> + '_ {
        EmotionLabel::ALL.iter().map(move |l| (*l, self.get(*l)))
    }

    /// Highest-scoring label. On ties the label earliest in canonical
    /// order wins.
    pub fn primary(&self) -> (EmotionLabel, f64) {
        let mut best = (EmotionLabel::ALL[0], self.0[0]);
        for (label, score) in self.iter().skip(1) {
            if score > best.1 {
                best = (label, score);
            }
        }
        best
    }
}

impl From<EmotionScores> for BTreeMap<EmotionLabel, f64> {
    fn from(scores: EmotionScores) -> Self {
        scores.iter().collect()
    }
}

impl TryFrom<BTreeMap<EmotionLabel, f64>> for EmotionScores {
    type Error = ScoresError;

    fn try_from(map: BTreeMap<EmotionLabel, f64>) -> Result<Self, Self::Error> {
        let mut scores = EmotionScores::default();
        for label in EmotionLabel::ALL {
            let value = map.get(&label).ok_or(ScoresError::MissingLabel(label))?;
            scores.set(label, *value);
        }
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_matches_declaration() {
        for (i, label) in EmotionLabel::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
        }
        assert!(EmotionLabel::Neutral < EmotionLabel::Surprised);
    }

    #[test]
    fn primary_picks_maximum() {
        let scores = EmotionScores::from_array([0.1, 0.1, 0.1, 0.3, 0.1, 0.1, 0.1, 0.1]);
        assert_eq!(scores.primary(), (EmotionLabel::Sad, 0.3));
    }

    #[test]
    fn primary_breaks_ties_by_canonical_order() {
        let scores = EmotionScores::from_array([0.1, 0.1, 0.1, 0.25, 0.1, 0.1, 0.0, 0.25]);
        assert_eq!(scores.primary().0, EmotionLabel::Sad);

        let flat = EmotionScores::from_array([0.125; 8]);
        assert_eq!(flat.primary(), (EmotionLabel::Neutral, 0.125));

        let late = EmotionScores::from_array([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.5]);
        assert_eq!(late.primary().0, EmotionLabel::Disgust);
    }

    #[test]
    fn labels_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&EmotionLabel::Surprised).unwrap(),
            "\"surprised\""
        );
        assert_eq!(EmotionLabel::Disgust.to_string(), "disgust");
    }

    #[test]
    fn scores_serialize_as_full_map_in_canonical_order() {
        let scores = EmotionScores::from_array([0.3, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1]);
        let json = serde_json::to_string(&scores).unwrap();
        assert!(json.starts_with("{\"neutral\":0.3,\"calm\":0.1,"), "{json}");
        assert!(json.ends_with("\"surprised\":0.1}"), "{json}");

        let back: EmotionScores = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scores);
    }

    #[test]
    fn scores_with_missing_label_fail_to_deserialize() {
        let err = serde_json::from_str::<EmotionScores>("{\"neutral\":1.0}").unwrap_err();
        assert!(err.to_string().contains("calm"), "{err}");
    }
}
