//! Feature extractor collaborator boundary.
//!
//! The mel spectrogram itself (FFT, windowing, filter application) is computed
//! by an external collaborator; this crate only defines the contract it must
//! satisfy and supplies it with correct inputs: the normalized sample buffer,
//! the spectral parameters, and the filter bank parsed from the resource
//! bundle.

use ndarray::Array2;

use crate::audio::SAMPLE_RATE;
use crate::bundle::FilterBank;

/// Spectral transform parameters, Whisper defaults.
#[derive(Debug, Clone)]
pub struct MelParams {
    pub sample_rate: u32,
    /// FFT window size in samples.
    pub n_fft: usize,
    /// Hop between consecutive frames in samples.
    pub hop_length: usize,
    /// Number of mel bands; must match the filter bank's `n_mel`.
    pub n_mel: usize,
    /// Worker thread count for the extractor.
    pub n_threads: usize,
}

impl Default for MelParams {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            n_fft: 400,
            hop_length: 160,
            n_mel: 80,
            n_threads: 1,
        }
    }
}

/// External mel spectrogram computation.
///
/// Implementations consume the normalized sample buffer and return a feature
/// matrix of shape `(n_mel, n_frames)`. Failure surfaces as an error, never as
/// a partial matrix.
pub trait FeatureExtractor {
    fn extract(
        &self,
        samples: &[f32],
        params: &MelParams,
        filters: &FilterBank,
    ) -> Result<Array2<f32>, Box<dyn std::error::Error + Send + Sync>>;
}
