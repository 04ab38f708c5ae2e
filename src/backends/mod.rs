//! Inference backend implementations
//!
//! The `onnx` module provides local ONNX Runtime inference behind the `onnx`
//! cargo feature; `test_utils` provides mock backends so pipelines can be
//! exercised without model files.

#[cfg(feature = "onnx")]
pub mod onnx;
pub mod test_utils;

#[cfg(feature = "onnx")]
pub use onnx::OnnxBackend;
pub use test_utils::MockInferenceBackend;
