use base64::Engine;
use bytes::Bytes;

/// Sample rate the conversation service consumes and produces.
pub const CONVAI_PCM16_SAMPLE_RATE: u32 = 16_000;

/// Converts captured f32 samples into the little-endian PCM16 bytes the
/// conversation transport sends upstream. Samples outside [-1.0, 1.0] are
/// clamped.
pub fn capture_frame_to_pcm16(samples: &[f32]) -> Bytes {
    let mut pcm16 = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let value = (sample * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        pcm16.extend_from_slice(&value.to_le_bytes());
    }
    Bytes::from(pcm16)
}

/// Decodes a base64 PCM16 agent audio payload into f32 samples for playback,
/// normalized to [-1.0, 1.0]. An undecodable payload yields no samples.
pub fn agent_audio_to_samples(audio_base_64: &str) -> Vec<f32> {
    match base64::engine::general_purpose::STANDARD.decode(audio_base_64) {
        Ok(pcm16_bytes) => pcm16_bytes
            .chunks_exact(2)
            .map(|chunk| {
                let value = i16::from_le_bytes([chunk[0], chunk[1]]);
                (value as f32 / 32768.0).clamp(-1.0, 1.0)
            })
            .collect(),
        Err(error) => {
            tracing::error!(%error, "failed to decode agent audio payload");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_capture_frame_known_values() {
        // 0.5 * 32768 = 16384 = 0x4000 little endian
        let frame = capture_frame_to_pcm16(&[0.5, 0.0]);
        assert_eq!(&frame[..], &[0x00, 0x40, 0x00, 0x00]);
    }

    #[test]
    fn test_capture_frame_clamps_out_of_range_samples() {
        let frame = capture_frame_to_pcm16(&[2.0, -2.0]);
        let high = i16::from_le_bytes([frame[0], frame[1]]);
        let low = i16::from_le_bytes([frame[2], frame[3]]);
        assert_eq!(high, i16::MAX);
        assert_eq!(low, i16::MIN);
    }

    #[test]
    fn test_agent_audio_known_values() {
        // [16384, -32768] as little-endian PCM16.
        let encoded =
            base64::engine::general_purpose::STANDARD.encode([0x00u8, 0x40, 0x00, 0x80]);
        let samples = agent_audio_to_samples(&encoded);

        assert_eq!(samples.len(), 2);
        assert_abs_diff_eq!(samples[0], 0.5, epsilon = 0.0001);
        assert_abs_diff_eq!(samples[1], -1.0, epsilon = 0.0001);
    }

    #[test]
    fn test_agent_audio_invalid_base64_is_empty() {
        assert!(agent_audio_to_samples("not base64!").is_empty());
        assert!(agent_audio_to_samples("").is_empty());
    }

    #[test]
    fn test_agent_audio_ignores_trailing_odd_byte() {
        let encoded = base64::engine::general_purpose::STANDARD.encode([0x00u8, 0x40, 0x01]);
        let samples = agent_audio_to_samples(&encoded);
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_round_trip() {
        let original = vec![0.1f32, -0.7, 0.0, 0.99];
        let frame = capture_frame_to_pcm16(&original);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&frame);
        let decoded = agent_audio_to_samples(&encoded);

        assert_eq!(decoded.len(), original.len());
        for (a, b) in original.iter().zip(decoded.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 0.001);
        }
    }
}
