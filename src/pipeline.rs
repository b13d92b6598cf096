//! End-to-end transcription pipeline.
//!
//! Wires the core components around the two external collaborators:
//! ingest audio → compute features → run inference → decode tokens. The
//! resource bundle is parsed once at construction; the resulting
//! `FilterBank`/`Vocabulary` pair is immutable for the pipeline's lifetime.

use std::path::Path;

use crate::audio::{self, AudioError};
use crate::bundle::{parse_bundle, BundleError, FilterBank, Vocabulary};
use crate::decoder::decode_tokens;
use crate::features::{FeatureExtractor, MelParams};
use crate::inference::InferenceEngine;

#[derive(thiserror::Error, Debug)]
pub enum WhisperError {
    #[error("invalid resource bundle: {0}")]
    Bundle(#[from] BundleError),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error("feature extraction failed: {0}")]
    FeatureExtraction(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("inference failed: {0}")]
    Inference(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl WhisperError {
    /// Process exit status for this failure, one distinct small integer per
    /// cause. `0` is reserved for success.
    pub fn exit_code(&self) -> i32 {
        match self {
            WhisperError::Bundle(_) => 2,
            WhisperError::Audio(AudioError::Open(_)) => 3,
            WhisperError::Audio(AudioError::Channels(_)) => 4,
            WhisperError::Audio(AudioError::SampleRate(_)) => 5,
            WhisperError::Audio(AudioError::BitDepth { .. }) => 6,
            WhisperError::FeatureExtraction(_) => 7,
            WhisperError::Inference(_) => 8,
        }
    }
}

/// Transcription pipeline over external feature-extraction and inference
/// collaborators.
#[derive(Debug)]
pub struct WhisperPipeline<F, E> {
    filters: FilterBank,
    vocab: Vocabulary,
    mel_params: MelParams,
    extractor: F,
    engine: E,
}

impl<F, E> WhisperPipeline<F, E>
where
    F: FeatureExtractor,
    E: InferenceEngine,
{
    /// Parse the resource bundle and assemble the pipeline.
    ///
    /// The bundle is typically embedded at build time with `include_bytes!`.
    pub fn new(bundle_bytes: &[u8], extractor: F, engine: E) -> Result<Self, WhisperError> {
        let (filters, vocab) = parse_bundle(bundle_bytes)?;
        let mel_params = MelParams {
            n_mel: filters.n_mel as usize,
            ..MelParams::default()
        };
        Ok(Self {
            filters,
            vocab,
            mel_params,
            extractor,
            engine,
        })
    }

    /// The vocabulary parsed from the bundle.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Override the end-of-text sentinel (the bundle does not store it).
    pub fn set_token_eot(&mut self, token_eot: i32) {
        self.vocab.token_eot = token_eot;
    }

    /// The filter bank parsed from the bundle.
    pub fn filters(&self) -> &FilterBank {
        &self.filters
    }

    /// Transcribe a WAV file.
    pub fn transcribe_file(&mut self, wav_path: &Path) -> Result<String, WhisperError> {
        let samples = audio::read_wav_samples(wav_path)?;
        self.transcribe_samples(&samples)
    }

    /// Transcribe an already-normalized sample buffer (16 kHz mono f32,
    /// padded to the analysis window).
    pub fn transcribe_samples(&mut self, samples: &[f32]) -> Result<String, WhisperError> {
        // 1. Mel features
        let features = self
            .extractor
            .extract(samples, &self.mel_params, &self.filters)
            .map_err(WhisperError::FeatureExtraction)?;
        log::debug!(
            "Feature matrix: [{}, {}]",
            features.nrows(),
            features.ncols()
        );

        // 2. Flatten into the engine's fixed input tensor, zero-padded when
        // the clip produced fewer frames than the tensor holds.
        let mut input = vec![0.0f32; self.engine.input_len()];
        let flat: Vec<f32> = features.iter().copied().collect();
        let copy_len = flat.len().min(input.len());
        input[..copy_len].copy_from_slice(&flat[..copy_len]);

        // 3. Inference
        let ids = self
            .engine
            .infer(&input)
            .map_err(WhisperError::Inference)?;
        log::debug!("Engine returned {} ids", ids.len());

        // 4. Greedy decode
        Ok(decode_tokens(&ids, &self.vocab))
    }
}
