#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! # bgrm — background removal pipeline
//!
//! A Rust library for removing image backgrounds with RMBG-style
//! segmentation models. Given a decoded image and an inference backend, the
//! pipeline prepares a fixed-size normalized tensor, runs inference,
//! reconstructs a full-resolution alpha mask from the model output and
//! composites it onto the original pixels, producing an RGBA image with a
//! transparent background.
//!
//! ## Features
//!
//! - **Exact RMBG-1.4 preprocessing**: 1024x1024 Lanczos resize, per-channel
//!   mean 0.5 / std 0.5 normalization, NCHW layout (all configurable)
//! - **Pluggable inference**: the [`InferenceBackend`] trait decouples the
//!   pipeline from the runtime; an ONNX Runtime backend ships behind the
//!   `onnx` feature, and mock backends support testing without model files
//! - **Deterministic compositing**: color channels preserved byte-for-byte,
//!   alpha taken pixel-for-pixel from the mask
//! - **Injected progress reporting**: stage events flow to a
//!   [`ProgressReporter`] of the caller's choosing
//!
//! ## Quick start
//!
#![cfg_attr(feature = "onnx", doc = "```rust,no_run")]
#![cfg_attr(not(feature = "onnx"), doc = "```rust,ignore")]
//! use bgrm::{OnnxBackend, PipelineConfig, RemovalPipeline};
//!
//! # fn example() -> anyhow::Result<()> {
//! let backend = Box::new(OnnxBackend::from_file("rmbg.onnx"));
//! let mut pipeline = RemovalPipeline::new(PipelineConfig::default(), backend)?;
//!
//! let image = image::open("input.jpg")?;
//! let result = pipeline.process_image(&image)?;
//! result.save_png("output.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing without a model
//!
//! ```rust
//! use bgrm::{backends::MockInferenceBackend, PipelineConfig, RemovalPipeline};
//!
//! # fn example() -> anyhow::Result<()> {
//! let backend = Box::new(MockInferenceBackend::constant(1.0));
//! let mut pipeline = RemovalPipeline::new(PipelineConfig::default(), backend)?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod compositor;
pub mod config;
pub mod error;
pub mod inference;
pub mod mask;
pub mod preprocess;
pub mod processor;
pub mod services;
pub mod types;

// Public API exports
#[cfg(feature = "onnx")]
pub use backends::OnnxBackend;
pub use compositor::Compositor;
pub use config::{
    ExecutionProvider, OutputFormat, PipelineConfig, PipelineConfigBuilder, PreprocessingConfig,
};
pub use error::{RemovalError, Result};
pub use inference::InferenceBackend;
pub use mask::{MaskReconstructor, MaskStatistics, SegmentationMask};
pub use preprocess::TensorPreparer;
pub use processor::RemovalPipeline;
pub use services::{
    ConsoleProgressReporter, NoOpProgressReporter, ProcessingStage, ProgressReporter,
    ProgressTracker, ProgressUpdate,
};
pub use types::{ProcessingMetadata, ProcessingTimings, RemovalResult};

/// Remove the background from a decoded image with the given backend
///
/// Convenience wrapper constructing a one-shot [`RemovalPipeline`]. Callers
/// processing many images should build a pipeline once and reuse it so the
/// model is loaded a single time.
///
/// # Errors
/// Backend initialization failures and any pipeline stage error.
pub fn remove_background_from_image(
    image: &image::DynamicImage,
    backend: Box<dyn InferenceBackend>,
    config: &PipelineConfig,
) -> Result<RemovalResult> {
    let mut pipeline = RemovalPipeline::new(config.clone(), backend)?;
    pipeline.process_image(image)
}

/// Remove the background from encoded image bytes with the given backend
///
/// Decodes the bytes (JPEG, PNG, WebP) and delegates to
/// [`remove_background_from_image`].
///
/// # Errors
/// `RemovalError::InvalidImage` for undecodable bytes, plus the failure
/// modes of [`remove_background_from_image`].
pub fn remove_background_from_bytes(
    image_bytes: &[u8],
    backend: Box<dyn InferenceBackend>,
    config: &PipelineConfig,
) -> Result<RemovalResult> {
    let mut pipeline = RemovalPipeline::new(config.clone(), backend)?;
    pipeline.process_bytes(image_bytes)
}
