//! Heuristic feature → emotion scoring.
//!
//! Every label starts from a random base, then rule blocks gated on feature
//! thresholds add to fixed subsets of labels. Some addends are drawn from a
//! range, others are constant. A final bucketed draw gives one label an
//! extra bump before the scores are normalized.
//!
//! Draw order, which scripted sources rely on: the eight bases in
//! canonical label order, then the energy block's ranged addends in the
//! order they are listed below, then the bucket draw.

use super::{EmotionLabel, EmotionScores, RandomSource};
use super::EmotionLabel::*;
use crate::features::FeatureVector;

const LOG_TARGET: &str = "emotion::scorer";

/// No label is ever reported below this probability.
pub const SCORE_FLOOR: f64 = 0.01;

const BASE_RANGE: (f64, f64) = (0.05, 0.15);

const HIGH_ENERGY: f64 = 0.1;
const MEDIUM_ENERGY: f64 = 0.05;
const HIGH_ZCR: f64 = 0.1;
const LOW_ZCR: f64 = 0.05;
const HIGH_PITCH: f64 = 0.3;
const MEDIUM_PITCH: f64 = 0.15;
const HIGH_PITCH_SPREAD: f64 = 0.1;
const BRIGHT_CENTROID: f64 = 0.7;
const DARK_CENTROID: f64 = 0.3;
const FAST_TEMPO_BPM: f64 = 140.0;
const SLOW_TEMPO_BPM: f64 = 80.0;

/// Labels for each equal-width bucket of the final draw.
const BUCKET_LABELS: [EmotionLabel; 8] = [
    Happy, Sad, Angry, Fearful, Surprised, Disgust, Calm, Neutral,
];
const BUCKET_BOOST: f64 = 0.3;

pub struct EmotionScorer<R> {
    rng: R,
}

impl<R: RandomSource> EmotionScorer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Normalized probabilities for `features`. Draws fresh randomness on
    /// every call, so repeated calls differ unless the source is fixed.
    pub fn score(&mut self, features: &FeatureVector) -> EmotionScores {
        let raw = self.raw_scores(features);
        let scores = normalize(raw);
        tracing::trace!(target: LOG_TARGET, ?raw, ?scores, "scored features");
        scores
    }

    /// Scores after every rule block, before normalization.
    pub fn raw_scores(&mut self, f: &FeatureVector) -> EmotionScores {
        let mut s = EmotionScores::default();
        for label in EmotionLabel::ALL {
            s.set(label, self.rng.uniform(BASE_RANGE.0, BASE_RANGE.1));
        }

        if f.rms_energy > HIGH_ENERGY {
            self.boost(&mut s, Angry, 0.4, 0.6);
            self.boost(&mut s, Happy, 0.3, 0.5);
            self.boost(&mut s, Surprised, 0.25, 0.4);
            self.boost(&mut s, Fearful, 0.2, 0.3);
        } else if f.rms_energy > MEDIUM_ENERGY {
            self.boost(&mut s, Happy, 0.2, 0.35);
            self.boost(&mut s, Neutral, 0.25, 0.4);
            self.boost(&mut s, Disgust, 0.15, 0.25);
        } else {
            self.boost(&mut s, Calm, 0.4, 0.6);
            self.boost(&mut s, Sad, 0.35, 0.55);
            self.boost(&mut s, Neutral, 0.2, 0.35);
        }

        if f.zero_crossing_rate > HIGH_ZCR {
            add_all(&mut s, &[(Fearful, 0.3), (Surprised, 0.25), (Angry, 0.2)]);
        } else if f.zero_crossing_rate < LOW_ZCR {
            add_all(&mut s, &[(Calm, 0.25), (Sad, 0.2)]);
        }

        if f.mean_pitch > HIGH_PITCH {
            add_all(&mut s, &[(Surprised, 0.35), (Fearful, 0.3), (Happy, 0.25)]);
        } else if f.mean_pitch > MEDIUM_PITCH {
            add_all(&mut s, &[(Happy, 0.2), (Neutral, 0.15), (Angry, 0.1)]);
        } else {
            add_all(&mut s, &[(Sad, 0.3), (Angry, 0.25), (Calm, 0.2)]);
        }

        if f.pitch_variance > HIGH_PITCH_SPREAD {
            add_all(&mut s, &[(Angry, 0.25), (Fearful, 0.2), (Surprised, 0.15)]);
        } else {
            add_all(&mut s, &[(Calm, 0.2), (Neutral, 0.15)]);
        }

        if f.spectral_centroid > BRIGHT_CENTROID {
            add_all(&mut s, &[(Angry, 0.2), (Fearful, 0.15)]);
        } else if f.spectral_centroid < DARK_CENTROID {
            add_all(&mut s, &[(Sad, 0.2), (Calm, 0.15)]);
        }

        if f.tempo > FAST_TEMPO_BPM {
            add_all(&mut s, &[(Angry, 0.2), (Surprised, 0.15)]);
        } else if f.tempo < SLOW_TEMPO_BPM {
            add_all(&mut s, &[(Sad, 0.25), (Calm, 0.2)]);
        }

        let bucket = bucket_for(self.rng.next_unit());
        s.add(BUCKET_LABELS[bucket], BUCKET_BOOST);

        s
    }

    fn boost(&mut self, scores: &mut EmotionScores, label: EmotionLabel, low: f64, high: f64) {
        let amount = self.rng.uniform(low, high);
        scores.add(label, amount);
    }
}

fn add_all(scores: &mut EmotionScores, boosts: &[(EmotionLabel, f64)]) {
    for (label, amount) in boosts {
        scores.add(*label, *amount);
    }
}

fn bucket_for(draw: f64) -> usize {
    let buckets = BUCKET_LABELS.len();
    ((draw * buckets as f64) as usize).min(buckets - 1)
}

/// Divides by the total, then raises anything under [`SCORE_FLOOR`] to it.
/// The floor is applied after division, so the result can sum to slightly
/// more than 1.
pub fn normalize(raw: EmotionScores) -> EmotionScores {
    let total = raw.total();
    let mut out = EmotionScores::default();
    for (label, value) in raw.iter() {
        out.set(label, (value / total).max(SCORE_FLOOR));
    }
    out
}
