//! WAV ingestion and normalization.
//!
//! The feature extractor is hard-pinned to one input format: 16 kHz, 16-bit
//! signed PCM, mono or stereo. Anything else is rejected up front with the
//! specific violated precondition; no resampling or bit-depth conversion is
//! attempted. Stereo input is downmixed to mono, and the result is zero-padded
//! to the 30-second analysis window when shorter.

use std::path::Path;

/// Required input sample rate in Hz.
pub const SAMPLE_RATE: u32 = 16000;

/// Analysis window length in seconds.
pub const CHUNK_SECONDS: usize = 30;

/// Minimum sample count handed to the feature extractor.
pub const CHUNK_SAMPLES: usize = SAMPLE_RATE as usize * CHUNK_SECONDS;

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("failed to read WAV file: {0}")]
    Open(#[from] hound::Error),
    #[error("expected mono or stereo audio, found {0} channels")]
    Channels(u16),
    #[error("expected {SAMPLE_RATE} Hz sample rate, found {0} Hz")]
    SampleRate(u32),
    #[error("expected 16-bit signed PCM, found {bits}-bit {format:?}")]
    BitDepth {
        bits: u16,
        format: hound::SampleFormat,
    },
}

/// Read a WAV file into a normalized mono sample buffer.
///
/// Mono samples map to `s / 32768.0`; stereo frames are downmixed as
/// `(left + right) / 65536.0`, summed in integer width before the float
/// divide. The buffer is padded with trailing zeros up to [`CHUNK_SAMPLES`]
/// when shorter and never truncated when longer. A zero-length clip is valid
/// and yields an all-zero window.
pub fn read_wav_samples(wav_path: &Path) -> Result<Vec<f32>, AudioError> {
    let mut reader = hound::WavReader::open(wav_path)?;
    let spec = reader.spec();

    if spec.channels != 1 && spec.channels != 2 {
        return Err(AudioError::Channels(spec.channels));
    }
    if spec.sample_rate != SAMPLE_RATE {
        return Err(AudioError::SampleRate(spec.sample_rate));
    }
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        return Err(AudioError::BitDepth {
            bits: spec.bits_per_sample,
            format: spec.sample_format,
        });
    }

    let pcm: Vec<i16> = reader
        .samples::<i16>()
        .collect::<Result<_, _>>()
        .map_err(AudioError::Open)?;

    let mut samples: Vec<f32> = if spec.channels == 1 {
        pcm.iter().map(|&s| s as f32 / 32768.0).collect()
    } else {
        pcm.chunks_exact(2)
            .map(|frame| (frame[0] as i32 + frame[1] as i32) as f32 / 65536.0)
            .collect()
    };

    log::debug!(
        "Read {} frames ({:.2}s) from {:?}, {} channel(s)",
        samples.len(),
        samples.len() as f32 / SAMPLE_RATE as f32,
        wav_path,
        spec.channels
    );

    if samples.len() < CHUNK_SAMPLES {
        samples.resize(CHUNK_SAMPLES, 0.0);
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_wav(name: &str, spec: hound::WavSpec, pcm: &[i16]) -> PathBuf {
        let dir = std::env::temp_dir().join("whisper_lite_audio_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for &s in pcm {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    fn pcm_spec(channels: u16, sample_rate: u32, bits: u16) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: bits,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn test_mono_normalization_and_padding() {
        let path = write_wav(
            "mono.wav",
            pcm_spec(1, SAMPLE_RATE, 16),
            &[0, 16384, -16384, i16::MAX, i16::MIN],
        );
        let samples = read_wav_samples(&path).unwrap();

        assert_eq!(samples.len(), CHUNK_SAMPLES);
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[1], 0.5);
        assert_eq!(samples[2], -0.5);
        assert_eq!(samples[3], 32767.0 / 32768.0);
        assert_eq!(samples[4], -1.0);
        assert!(samples[5..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_stereo_downmix() {
        let path = write_wav(
            "stereo.wav",
            pcm_spec(2, SAMPLE_RATE, 16),
            // Frames: (1000, 3000), (-2000, 2000), (i16::MIN, i16::MIN)
            &[1000, 3000, -2000, 2000, i16::MIN, i16::MIN],
        );
        let samples = read_wav_samples(&path).unwrap();

        assert_eq!(samples[0], 4000.0 / 65536.0);
        assert_eq!(samples[1], 0.0);
        assert_eq!(samples[2], -1.0);
        assert_eq!(samples.len(), CHUNK_SAMPLES);
    }

    #[test]
    fn test_long_clip_not_truncated() {
        let pcm = vec![100i16; CHUNK_SAMPLES + 10];
        let path = write_wav("long.wav", pcm_spec(1, SAMPLE_RATE, 16), &pcm);
        let samples = read_wav_samples(&path).unwrap();
        assert_eq!(samples.len(), CHUNK_SAMPLES + 10);
    }

    #[test]
    fn test_empty_clip_pads_to_window() {
        let path = write_wav("empty.wav", pcm_spec(1, SAMPLE_RATE, 16), &[]);
        let samples = read_wav_samples(&path).unwrap();
        assert_eq!(samples.len(), CHUNK_SAMPLES);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_wrong_channel_count_rejected() {
        let path = write_wav("three_ch.wav", pcm_spec(3, SAMPLE_RATE, 16), &[0, 0, 0]);
        match read_wav_samples(&path) {
            Err(AudioError::Channels(3)) => {}
            other => panic!("expected Channels(3), got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_sample_rate_rejected() {
        let path = write_wav("slow.wav", pcm_spec(1, 8000, 16), &[0]);
        match read_wav_samples(&path) {
            Err(AudioError::SampleRate(8000)) => {}
            other => panic!("expected SampleRate(8000), got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_bit_depth_rejected() {
        let dir = std::env::temp_dir().join("whisper_lite_audio_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("eight_bit.wav");
        let mut writer = hound::WavWriter::create(&path, pcm_spec(1, SAMPLE_RATE, 8)).unwrap();
        writer.write_sample(0i8).unwrap();
        writer.finalize().unwrap();

        match read_wav_samples(&path) {
            Err(AudioError::BitDepth { bits: 8, .. }) => {}
            other => panic!("expected BitDepth, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_rejected() {
        let path = PathBuf::from("/nonexistent/whisper_lite/missing.wav");
        match read_wav_samples(&path) {
            Err(AudioError::Open(_)) => {}
            other => panic!("expected Open, got {:?}", other),
        }
    }
}
