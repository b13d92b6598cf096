//! Inference engine collaborator boundary.
//!
//! The neural network runtime (model loading, tensor graph execution) lives
//! outside this crate. The contract is narrow: the engine accepts a float
//! buffer sized exactly to its fixed input tensor and returns the integer id
//! sequence from its fixed output tensor.

/// External neural inference over a flattened feature buffer.
pub trait InferenceEngine {
    /// Flattened length of the engine's fixed input tensor
    /// (`n_mel * n_frames` for Whisper-shaped models).
    fn input_len(&self) -> usize;

    /// Run inference. `features` is exactly [`input_len`](Self::input_len)
    /// floats; the returned ids are sized to the engine's fixed output tensor.
    fn infer(
        &mut self,
        features: &[f32],
    ) -> Result<Vec<i32>, Box<dyn std::error::Error + Send + Sync>>;
}
