//! Inference backend abstraction

use crate::{config::PipelineConfig, error::Result};
use ndarray::Array4;

// Use instant crate for cross-platform time compatibility
use instant::Duration;

/// Trait for inference backends
///
/// This is the adapter boundary of the pipeline: a single normalized tensor
/// in, a single raw probability tensor out. The pipeline depends only on the
/// shape contract, never on how inference runs; backends may wrap a local
/// ONNX session, a remote service, or a stub for testing. Implementations
/// holding a shared session must synchronize internally; the `&mut self`
/// receiver otherwise guarantees exclusive use per pipeline.
pub trait InferenceBackend {
    /// Initialize the backend with the given configuration
    ///
    /// Returns the model loading time when a model was actually loaded.
    ///
    /// # Errors
    /// - Backend initialization failures
    /// - Model loading or validation errors
    fn initialize(&mut self, config: &PipelineConfig) -> Result<Option<Duration>>;

    /// Run inference on the input tensor
    ///
    /// # Errors
    /// - Backend not initialized
    /// - Model inference failures
    /// - Invalid input tensor dimensions
    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>>;

    /// Get the expected input shape for this backend
    fn input_shape(&self) -> (usize, usize, usize, usize);

    /// Get the expected output shape for this backend
    fn output_shape(&self) -> (usize, usize, usize, usize);

    /// Check if backend is initialized
    fn is_initialized(&self) -> bool;

    /// Short backend name for logs and result metadata
    fn name(&self) -> &'static str;
}
