//! Removal pipeline orchestrator
//!
//! Sequences the four pipeline stages for one image: tensor preparation,
//! inference, mask reconstruction and compositing. Each stage runs to
//! completion before the next starts and any failure aborts the job with the
//! failing stage's error; a half-composited image is worse than no output.

use crate::{
    compositor::Compositor,
    config::PipelineConfig,
    error::{RemovalError, Result},
    inference::InferenceBackend,
    mask::MaskReconstructor,
    preprocess::TensorPreparer,
    services::{NoOpProgressReporter, ProcessingStage, ProgressReporter, ProgressTracker},
    types::{ProcessingMetadata, ProcessingTimings, RemovalResult},
};
use image::DynamicImage;
use instant::Instant;
use tracing::{debug, info, instrument, span, Level};

/// Background removal pipeline for single images
///
/// Owns an initialized inference backend and runs one image at a time; there
/// is no shared mutable state between pipelines, so batch drivers may run
/// one pipeline per worker without locking.
pub struct RemovalPipeline {
    config: PipelineConfig,
    backend: Box<dyn InferenceBackend>,
    tracker: ProgressTracker,
    model_load_ms: u64,
}

impl RemovalPipeline {
    /// Create a pipeline, initializing the backend eagerly
    ///
    /// The backend's model is loaded here rather than on the first
    /// `process_image` call, so construction carries the load latency and
    /// processing does not.
    ///
    /// # Errors
    /// Returns `RemovalError::InvalidConfig` for invalid configuration or an
    /// `InferenceBackend` error when backend initialization fails.
    pub fn new(config: PipelineConfig, backend: Box<dyn InferenceBackend>) -> Result<Self> {
        Self::with_reporter(config, backend, Box::new(NoOpProgressReporter))
    }

    /// Create a pipeline with an injected progress reporter
    ///
    /// Stage events are always emitted through a single code path; the
    /// reporter decides whether to render them.
    ///
    /// # Errors
    /// Same failure modes as [`RemovalPipeline::new`].
    pub fn with_reporter(
        config: PipelineConfig,
        mut backend: Box<dyn InferenceBackend>,
        reporter: Box<dyn ProgressReporter>,
    ) -> Result<Self> {
        config.validate()?;

        info!(backend = backend.name(), "Initializing removal pipeline");
        let load_time = backend.initialize(&config)?;
        let model_load_ms = load_time.map_or(0, |d| d.as_millis() as u64);
        debug!(model_load_ms, "Backend initialized");

        Ok(Self {
            config,
            backend,
            tracker: ProgressTracker::new(reporter),
            model_load_ms,
        })
    }

    /// Remove the background from a decoded image
    ///
    /// Runs the full stage sequence and returns the composited RGBA result
    /// at the original resolution, together with the mask and timings.
    ///
    /// # Errors
    /// Propagates the failing stage's error unchanged: `InvalidImage`,
    /// `InferenceBackend`, `MaskDimension` or `DimensionMismatch`.
    #[instrument(
        skip(self, image),
        fields(
            backend = self.backend.name(),
            dimensions = %format!("{}x{}", image.width(), image.height())
        )
    )]
    pub fn process_image(&mut self, image: &DynamicImage) -> Result<RemovalResult> {
        let mut timings = ProcessingTimings {
            model_load_ms: self.model_load_ms,
            ..ProcessingTimings::default()
        };
        let total_start = Instant::now();
        let original_dimensions = (image.width(), image.height());
        self.tracker.restart();

        // Stage 1: image -> normalized NCHW tensor
        self.tracker.report_stage(ProcessingStage::Preprocessing);
        let preprocess_start = Instant::now();
        let input_tensor = {
            let _span = span!(Level::DEBUG, "preprocessing").entered();
            TensorPreparer::prepare(image, &self.config.preprocessing)
                .map_err(|e| self.fail(ProcessingStage::Preprocessing, e))?
        };
        timings.preprocessing_ms = preprocess_start.elapsed().as_millis() as u64;

        // Stage 2: inference
        self.tracker.report_stage(ProcessingStage::Inference);
        let inference_start = Instant::now();
        let output_tensor = {
            let _span = span!(Level::INFO, "inference", backend = self.backend.name()).entered();
            self.backend
                .infer(&input_tensor)
                .map_err(|e| self.fail(ProcessingStage::Inference, e))?
        };
        timings.inference_ms = inference_start.elapsed().as_millis() as u64;

        // Stage 3: raw output -> mask at original resolution
        self.tracker.report_stage(ProcessingStage::MaskReconstruction);
        let postprocess_start = Instant::now();
        let mask = MaskReconstructor::reconstruct(&output_tensor, original_dimensions)
            .map_err(|e| self.fail(ProcessingStage::MaskReconstruction, e))?;

        // Stage 4: merge mask into the original pixels
        self.tracker.report_stage(ProcessingStage::Compositing);
        let result_image = Compositor::composite(image, &mask)
            .map_err(|e| self.fail(ProcessingStage::Compositing, e))?;
        timings.postprocessing_ms = postprocess_start.elapsed().as_millis() as u64;

        timings.total_ms = total_start.elapsed().as_millis() as u64;
        self.tracker.report_stage(ProcessingStage::Completed);
        self.tracker.report_completion(&timings);
        info!(total_ms = timings.total_ms, "Image processed");

        let mut metadata = ProcessingMetadata::new(self.backend.name().to_string());
        metadata.timings = timings;

        Ok(RemovalResult::new(
            result_image,
            mask,
            original_dimensions,
            metadata,
        ))
    }

    /// Remove the background from encoded image bytes
    ///
    /// Decodes via the image crate, then delegates to [`process_image`].
    ///
    /// # Errors
    /// Decode failures surface as `RemovalError::InvalidImage`; processing
    /// failures as in [`process_image`].
    ///
    /// [`process_image`]: RemovalPipeline::process_image
    pub fn process_bytes(&mut self, image_bytes: &[u8]) -> Result<RemovalResult> {
        let image = image::load_from_memory(image_bytes).map_err(|e| {
            RemovalError::invalid_image(format!("failed to decode image from bytes: {e}"))
        })?;
        self.process_image(&image)
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Check whether the owned backend is initialized
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.backend.is_initialized()
    }

    fn fail(&self, stage: ProcessingStage, error: RemovalError) -> RemovalError {
        self.tracker.report_error(stage, &error.to_string());
        error
    }
}
