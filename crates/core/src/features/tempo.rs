use super::{FRAME_HOP, FRAME_SIZE, LOG_TARGET};

/// A frame must carry this multiple of the mean frame energy to count as a beat.
pub const BEAT_ENERGY_RATIO: f64 = 1.5;

/// Tempo reported when no frame fits in the buffer.
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// Sum of squares for every frame starting strictly before `len - FRAME_SIZE`.
pub fn frame_energies(samples: &[f32]) -> Vec<f64> {
    let last_start = samples.len().saturating_sub(FRAME_SIZE);
    (0..last_start)
        .step_by(FRAME_HOP)
        .map(|start| {
            samples[start..start + FRAME_SIZE]
                .iter()
                .map(|s| f64::from(*s).powi(2))
                .sum()
        })
        .collect()
}

/// Frames whose energy exceeds [`BEAT_ENERGY_RATIO`] times the mean and is
/// a strict local maximum. The first and last frame never count.
pub fn count_beats(energies: &[f64]) -> usize {
    if energies.len() < 3 {
        return 0;
    }
    let mean = energies.iter().sum::<f64>() / energies.len() as f64;
    let threshold = mean * BEAT_ENERGY_RATIO;

    energies
        .windows(3)
        .filter(|w| w[1] > threshold && w[1] > w[0] && w[1] > w[2])
        .count()
}

/// Beats per minute over the whole buffer.
pub fn estimate_tempo(samples: &[f32], sample_rate: u32) -> f64 {
    let energies = frame_energies(samples);
    let duration = if sample_rate == 0 {
        0.0
    } else {
        samples.len() as f64 / f64::from(sample_rate)
    };

    if energies.is_empty() || duration <= 0.0 {
        tracing::debug!(
            target: LOG_TARGET,
            frames = energies.len(),
            "no tempo frames, defaulting to {DEFAULT_TEMPO_BPM} bpm"
        );
        return DEFAULT_TEMPO_BPM;
    }

    let beats = count_beats(&energies);
    beats as f64 / duration * 60.0
}
