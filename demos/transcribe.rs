//! Pipeline wiring demo.
//!
//! Runs the full front end over a resource bundle and a WAV file with
//! placeholder collaborators: the extractor returns an empty-frame matrix and
//! the engine replays the reference token sequence from the original Android
//! example. Swap in real implementations of `FeatureExtractor` and
//! `InferenceEngine` to transcribe actual speech.
//!
//! Usage: `cargo run --example transcribe <bundle.bin> <audio.wav>`

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use ndarray::Array2;
use whisper_lite::{
    FeatureExtractor, FilterBank, InferenceEngine, MelParams, WhisperPipeline,
};

struct ZeroExtractor;

impl FeatureExtractor for ZeroExtractor {
    fn extract(
        &self,
        samples: &[f32],
        params: &MelParams,
        _filters: &FilterBank,
    ) -> Result<Array2<f32>, Box<dyn Error + Send + Sync>> {
        Ok(Array2::zeros((params.n_mel, samples.len() / params.hop_length)))
    }
}

struct ReplayEngine;

impl InferenceEngine for ReplayEngine {
    fn input_len(&self) -> usize {
        80 * 3000
    }

    fn infer(&mut self, _features: &[f32]) -> Result<Vec<i32>, Box<dyn Error + Send + Sync>> {
        // Output of the reference model for its bundled clip.
        Ok(vec![
            50257, 50362, 1770, 13, 2264, 346, 353, 318, 262, 46329, 286, 262, 3504, 6097, 11,
            290, 356, 389, 9675, 284, 7062, 50256,
        ])
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let bundle_path = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "models/tflt_vocab_mel.bin".to_string()),
    );
    let wav_path = PathBuf::from(
        std::env::args()
            .nth(2)
            .unwrap_or_else(|| "samples/jfk.wav".to_string()),
    );

    let bundle = match std::fs::read(&bundle_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("failed to read bundle {:?}: {}", bundle_path, e);
            return ExitCode::from(2);
        }
    };

    println!("Loading bundle: {:?}", bundle_path);
    let load_start = Instant::now();
    let mut pipeline = match WhisperPipeline::new(&bundle, ZeroExtractor, ReplayEngine) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(e.exit_code() as u8);
        }
    };
    println!(
        "Bundle parsed in {:.2?}: {}x{} filter bank, {} tokens",
        load_start.elapsed(),
        pipeline.filters().n_mel,
        pipeline.filters().n_fft,
        pipeline.vocab().len()
    );

    println!("Transcribing file: {:?}", wav_path);
    let transcribe_start = Instant::now();
    match pipeline.transcribe_file(&wav_path) {
        Ok(text) => {
            println!("Transcription completed in {:.2?}", transcribe_start.elapsed());
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
