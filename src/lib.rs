//! # whisper-lite
//!
//! The self-contained front end of a Whisper TFLite transcription pipeline:
//! resource bundle parsing, audio ingestion, and greedy token decoding. The
//! spectral transform and the neural inference runtime stay outside the crate
//! and plug in through the [`FeatureExtractor`] and [`InferenceEngine`]
//! traits.
//!
//! ## Pipeline
//!
//! ```text
//! WAV file → read_wav_samples → FeatureExtractor → InferenceEngine → decode_tokens
//!                                      ↑ FilterBank        Vocabulary ↑
//!                                      └──── parse_bundle (once) ─────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use whisper_lite::WhisperPipeline;
//!
//! static BUNDLE: &[u8] = include_bytes!("../models/tflt_vocab_mel.bin");
//!
//! let mut pipeline = WhisperPipeline::new(BUNDLE, extractor, engine)?;
//! let text = pipeline.transcribe_file(Path::new("audio.wav"))?;
//! println!("{text}");
//! # Ok::<(), whisper_lite::WhisperError>(())
//! ```
//!
//! ## Audio Requirements
//!
//! Input audio files must be:
//! - WAV format
//! - 16 kHz sample rate
//! - 16-bit signed PCM samples
//! - Mono or stereo (stereo is downmixed to mono)
//!
//! Any deviation is rejected with the specific violated precondition; no
//! resampling or format conversion is performed. Clips shorter than the
//! 30-second analysis window are zero-padded.
//!
//! ## Resource Bundle
//!
//! The mel filter bank and token vocabulary ship as one binary blob guarded by
//! the `"tflt"` magic constant; see [`bundle`] for the wire format. Parsing is
//! a pure function of the bytes and every read is bounds-checked.

pub mod audio;
pub mod bundle;
pub mod decoder;
pub mod features;
pub mod inference;
pub mod pipeline;

pub use audio::{read_wav_samples, AudioError, CHUNK_SAMPLES, CHUNK_SECONDS, SAMPLE_RATE};
pub use bundle::{encode_bundle, parse_bundle, BundleError, FilterBank, Vocabulary};
pub use decoder::decode_tokens;
pub use features::{FeatureExtractor, MelParams};
pub use inference::InferenceEngine;
pub use pipeline::{WhisperError, WhisperPipeline};
