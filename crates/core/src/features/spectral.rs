//! Spectral-shape stand-ins.
//!
//! Both estimates run over the first [`ANALYSIS_SIZE`] raw time-domain
//! samples, treating `|sample[i]|` as if it were the magnitude of bin `i`.
//! No transform is taken. The scorer's centroid thresholds assume these
//! time-domain values.

use super::LOG_TARGET;

/// Number of leading samples the centroid and rolloff look at.
pub const ANALYSIS_SIZE: usize = 1024;

/// Fraction of total squared magnitude that defines the rolloff point.
pub const ROLLOFF_FRACTION: f64 = 0.85;

/// Centroid reported when the analyzed prefix is silent.
pub const DEFAULT_CENTROID: f64 = 0.5;

/// Rolloff reported when the threshold is never reached.
pub const DEFAULT_ROLLOFF: f64 = 1.0;

fn analysis_prefix(samples: &[f32]) -> &[f32] {
    &samples[..samples.len().min(ANALYSIS_SIZE)]
}

/// Magnitude-weighted mean index of the prefix, divided by
/// [`ANALYSIS_SIZE`].
pub fn spectral_centroid(samples: &[f32]) -> f64 {
    let (weighted, total) = analysis_prefix(samples).iter().enumerate().fold(
        (0.0f64, 0.0f64),
        |(weighted, total), (i, s)| {
            let magnitude = f64::from(s.abs());
            (weighted + i as f64 * magnitude, total + magnitude)
        },
    );

    if total > 0.0 {
        (weighted / total) / ANALYSIS_SIZE as f64
    } else {
        tracing::debug!(target: LOG_TARGET, "silent analysis prefix, centroid defaults to {DEFAULT_CENTROID}");
        DEFAULT_CENTROID
    }
}

/// Smallest `i / n` at which the running sum of squares reaches
/// [`ROLLOFF_FRACTION`] of the prefix total, `n` being the prefix length.
pub fn spectral_rolloff(samples: &[f32]) -> f64 {
    let prefix = analysis_prefix(samples);
    let energy: Vec<f64> = prefix.iter().map(|s| f64::from(*s).powi(2)).collect();
    let total: f64 = energy.iter().sum();

    if total > 0.0 {
        let threshold = ROLLOFF_FRACTION * total;
        let mut cumulative = 0.0;
        for (i, e) in energy.iter().enumerate() {
            cumulative += e;
            if cumulative >= threshold {
                return i as f64 / prefix.len() as f64;
            }
        }
    }

    tracing::debug!(target: LOG_TARGET, "rolloff threshold not reached, defaults to {DEFAULT_ROLLOFF}");
    DEFAULT_ROLLOFF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_prefix_uses_defaults() {
        let silence = vec![0.0f32; 4096];
        assert_eq!(spectral_centroid(&silence), DEFAULT_CENTROID);
        assert_eq!(spectral_rolloff(&silence), DEFAULT_ROLLOFF);
    }

    #[test]
    fn centroid_of_constant_prefix_is_midpoint() {
        // Mean index of 0..1024 is 511.5.
        let flat = vec![0.5f32; 2048];
        let centroid = spectral_centroid(&flat);
        assert!((centroid - 511.5 / 1024.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_only_reads_the_prefix() {
        let mut samples = vec![0.0f32; 2048];
        samples[10] = 1.0;
        samples[1500] = 1.0;
        assert!((spectral_centroid(&samples) - 10.0 / 1024.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_of_short_buffer_still_divides_by_analysis_size() {
        let samples = [0.0f32, 0.0, 0.0, 1.0];
        assert!((spectral_centroid(&samples) - 3.0 / 1024.0).abs() < 1e-12);
    }

    #[test]
    fn rolloff_of_single_impulse_is_its_position() {
        let mut samples = vec![0.0f32; 1024];
        samples[512] = 1.0;
        assert_eq!(spectral_rolloff(&samples), 0.5);
    }

    #[test]
    fn rolloff_of_flat_prefix_sits_near_fraction() {
        // 85% of 100 equal bins is reached at index 84 (85 bins summed).
        let flat = vec![0.5f32; 100];
        assert_eq!(spectral_rolloff(&flat), 0.84);
    }
}
