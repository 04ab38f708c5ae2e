//! Configuration types for the removal pipeline

use crate::error::{RemovalError, Result};
use serde::{Deserialize, Serialize};

/// Execution provider options for the ONNX backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionProvider {
    /// Auto-detect best available provider (CUDA > `CoreML` > CPU)
    Auto,
    /// CPU execution (always available)
    Cpu,
    /// NVIDIA CUDA GPU acceleration
    Cuda,
    /// Apple Silicon GPU acceleration
    CoreMl,
}

impl Default for ExecutionProvider {
    fn default() -> Self {
        Self::Auto
    }
}

impl std::fmt::Display for ExecutionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda => write!(f, "cuda"),
            Self::CoreMl => write!(f, "coreml"),
        }
    }
}

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    Png,
    /// Raw RGBA8 pixel data (4 bytes per pixel)
    Rgba8,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

/// Model-specific preprocessing parameters
///
/// The defaults match the RMBG-1.4 model: 1024x1024 input, per-channel
/// mean 0.5 / std 0.5 (yielding values in roughly [-1, 1]). These are
/// configuration rather than constants, but the defaults must be kept
/// exactly to stay output-compatible with that model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Model input size as [width, height]
    pub target_size: [u32; 2],
    /// Per-channel normalization mean (RGB order)
    pub normalization_mean: [f32; 3],
    /// Per-channel normalization standard deviation (RGB order)
    pub normalization_std: [f32; 3],
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            target_size: [1024, 1024],
            normalization_mean: [0.5, 0.5, 0.5],
            normalization_std: [0.5, 0.5, 0.5],
        }
    }
}

/// Configuration for a removal pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Preprocessing parameters of the segmentation model
    pub preprocessing: PreprocessingConfig,

    /// Execution provider for the inference backend
    pub execution_provider: ExecutionProvider,

    /// Output format for encoded results
    pub output_format: OutputFormat,

    /// Number of intra-op threads for inference (0 = auto)
    pub intra_threads: usize,

    /// Number of inter-op threads for inference (0 = auto)
    pub inter_threads: usize,

    /// Enable debug mode (additional logging and validation)
    pub debug: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            preprocessing: PreprocessingConfig::default(),
            execution_provider: ExecutionProvider::default(),
            output_format: OutputFormat::default(),
            intra_threads: 0,
            inter_threads: 0,
            debug: false,
        }
    }
}

impl PipelineConfig {
    /// Create a new pipeline configuration builder
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns `RemovalError::InvalidConfig` for a zero target size or a
    /// non-positive normalization std (division by zero during prepare).
    pub fn validate(&self) -> Result<()> {
        let [width, height] = self.preprocessing.target_size;
        if width == 0 || height == 0 {
            return Err(RemovalError::invalid_config(format!(
                "target size must be non-zero, got {width}x{height}"
            )));
        }
        if self.preprocessing.normalization_std.iter().any(|&s| s <= 0.0) {
            return Err(RemovalError::invalid_config(
                "normalization std must be positive for all channels",
            ));
        }
        Ok(())
    }
}

/// Builder for `PipelineConfig`
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    #[must_use]
    pub fn preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.config.preprocessing = preprocessing;
        self
    }

    #[must_use]
    pub fn execution_provider(mut self, provider: ExecutionProvider) -> Self {
        self.config.execution_provider = provider;
        self
    }

    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    #[must_use]
    pub fn intra_threads(mut self, threads: usize) -> Self {
        self.config.intra_threads = threads;
        self
    }

    #[must_use]
    pub fn inter_threads(mut self, threads: usize) -> Self {
        self.config.inter_threads = threads;
        self
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build the pipeline configuration
    ///
    /// # Errors
    /// Returns `RemovalError::InvalidConfig` when validation fails.
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preprocessing_matches_rmbg() {
        let config = PreprocessingConfig::default();
        assert_eq!(config.target_size, [1024, 1024]);
        assert_eq!(config.normalization_mean, [0.5, 0.5, 0.5]);
        assert_eq!(config.normalization_std, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_builder_chain() {
        let config = PipelineConfig::builder()
            .execution_provider(ExecutionProvider::Cpu)
            .intra_threads(4)
            .debug(true)
            .build()
            .unwrap();

        assert_eq!(config.execution_provider, ExecutionProvider::Cpu);
        assert_eq!(config.intra_threads, 4);
        assert!(config.debug);
    }

    #[test]
    fn test_zero_target_size_rejected() {
        let result = PipelineConfig::builder()
            .preprocessing(PreprocessingConfig {
                target_size: [0, 1024],
                ..PreprocessingConfig::default()
            })
            .build();
        assert!(matches!(result, Err(RemovalError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_std_rejected() {
        let result = PipelineConfig::builder()
            .preprocessing(PreprocessingConfig {
                normalization_std: [0.5, 0.0, 0.5],
                ..PreprocessingConfig::default()
            })
            .build();
        assert!(matches!(result, Err(RemovalError::InvalidConfig(_))));
    }
}
