//! Progress reporting service
//!
//! Separates progress reporting from the pipeline logic: the pipeline always
//! emits stage events through a single code path, and the injected reporter
//! decides whether and how to render them.

use crate::types::ProcessingTimings;
use instant::Instant;

/// Progress stages during background removal processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Preprocessing image into the inference tensor
    Preprocessing,
    /// Running model inference
    Inference,
    /// Reconstructing the full-resolution mask from model output
    MaskReconstruction,
    /// Compositing the alpha mask onto the original image
    Compositing,
    /// Processing completed
    Completed,
}

impl ProcessingStage {
    /// Get a human-readable description of the processing stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::Preprocessing => "Resizing and normalizing image",
            ProcessingStage::Inference => "Removing background",
            ProcessingStage::MaskReconstruction => "Creating mask",
            ProcessingStage::Compositing => "Applying mask",
            ProcessingStage::Completed => "Complete",
        }
    }

    /// Get the typical progress percentage for this stage
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        match self {
            ProcessingStage::Preprocessing => 15,
            ProcessingStage::Inference => 70,
            ProcessingStage::MaskReconstruction => 85,
            ProcessingStage::Compositing => 95,
            ProcessingStage::Completed => 100,
        }
    }
}

/// Progress update containing stage and timing information
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Current processing stage
    pub stage: ProcessingStage,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Human-readable stage description
    pub description: String,
    /// Elapsed time since processing started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    /// Create a new progress update
    #[must_use]
    pub fn new(stage: ProcessingStage, start_time: Instant) -> Self {
        Self {
            progress: stage.progress_percentage(),
            description: stage.description().to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
        }
    }
}

/// Trait for reporting progress during background removal operations
///
/// A single-method capability plus completion/error notifications; no
/// inheritance hierarchy is needed. Implementations must not block
/// indefinitely.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress update
    fn report_progress(&self, update: ProgressUpdate);

    /// Report processing completion with final timings
    fn report_completion(&self, timings: &ProcessingTimings);

    /// Report an error during processing
    fn report_error(&self, stage: ProcessingStage, error: &str);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {}

    fn report_completion(&self, _timings: &ProcessingTimings) {}

    fn report_error(&self, _stage: ProcessingStage, _error: &str) {}
}

/// Progress reporter that forwards stage events to the log facade
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if self.verbose {
            log::info!(
                "[{:3}%] {} ({}ms elapsed)",
                update.progress,
                update.description,
                update.elapsed_ms
            );
        } else {
            log::debug!("{}", update.description);
        }
    }

    fn report_completion(&self, timings: &ProcessingTimings) {
        log::info!(
            "Background removed in {}ms (preprocess {}ms, inference {}ms, postprocess {}ms)",
            timings.total_ms,
            timings.preprocessing_ms,
            timings.inference_ms,
            timings.postprocessing_ms
        );
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        log::error!("Failed during '{}': {}", stage.description(), error);
    }
}

/// Tracks per-job progress state and forwards events to a reporter
pub struct ProgressTracker {
    reporter: Box<dyn ProgressReporter>,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a tracker around the given reporter, starting the clock now
    #[must_use]
    pub fn new(reporter: Box<dyn ProgressReporter>) -> Self {
        Self {
            reporter,
            start_time: Instant::now(),
        }
    }

    /// Restart the clock for a new job
    pub fn restart(&mut self) {
        self.start_time = Instant::now();
    }

    /// Report entering a processing stage
    pub fn report_stage(&self, stage: ProcessingStage) {
        self.reporter
            .report_progress(ProgressUpdate::new(stage, self.start_time));
    }

    /// Report successful completion with final timings
    pub fn report_completion(&self, timings: &ProcessingTimings) {
        self.reporter.report_completion(timings);
    }

    /// Report a stage failure
    pub fn report_error(&self, stage: ProcessingStage, error: &str) {
        self.reporter.report_error(stage, error);
    }
}
