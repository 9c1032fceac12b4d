use crate::audio::AudioError;

/// Interprets raw little-endian `f32` PCM bytes.
pub fn parse_f32le(raw: &[u8]) -> Result<Vec<f32>, AudioError> {
    if !raw.len().is_multiple_of(4usize) {
        return Err(AudioError::InvalidPcm(format!(
            "f32le byte length must be multiple of 4, got {}",
            raw.len()
        )));
    }
    let mut out = Vec::with_capacity(raw.len() / 4);
    for chunk in raw.chunks_exact(4) {
        out.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    Ok(out)
}

/// Averages interleaved frames down to a single channel.
pub fn downmix(interleaved: &[f32], channels: u16) -> Result<Vec<f32>, AudioError> {
    let channels = usize::from(channels);
    if channels == 0 {
        return Err(AudioError::InvalidPcm("channel count must be > 0".to_owned()));
    }
    if channels == 1 {
        return Ok(interleaved.to_vec());
    }
    if !interleaved.len().is_multiple_of(channels) {
        return Err(AudioError::InvalidPcm(format!(
            "{} samples do not split into {channels}-channel frames",
            interleaved.len()
        )));
    }

    let scale = 1.0 / channels as f32;
    Ok(interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect())
}
