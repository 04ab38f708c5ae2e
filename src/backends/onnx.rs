//! ONNX Runtime inference backend
//!
//! Runs a segmentation model through `ort` with execution provider selection
//! (CPU, CUDA, CoreML). The backend is caller-constructed from an explicit
//! model file path and loads its session during `initialize`; there is no
//! lazy global session state.

use crate::config::{ExecutionProvider, PipelineConfig};
use crate::error::{RemovalError, Result};
use crate::inference::InferenceBackend;
use instant::Duration;
use ndarray::Array4;
use ort::execution_providers::{
    CUDAExecutionProvider, CoreMLExecutionProvider, ExecutionProvider as OrtExecutionProvider,
};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::path::{Path, PathBuf};

/// ONNX Runtime backend for running background removal models
#[derive(Debug)]
pub struct OnnxBackend {
    model_path: PathBuf,
    session: Option<Session>,
    initialized: bool,
}

impl OnnxBackend {
    /// Create a backend for the model at the given path
    ///
    /// The session is not loaded until `initialize` is called, giving the
    /// caller control over when the (potentially slow) model load happens.
    #[must_use]
    pub fn from_file<P: AsRef<Path>>(model_path: P) -> Self {
        Self {
            model_path: model_path.as_ref().to_path_buf(),
            session: None,
            initialized: false,
        }
    }

    /// Drop the loaded session, returning the backend to its created state
    pub fn close(&mut self) {
        self.session = None;
        self.initialized = false;
    }

    /// List execution providers with availability status
    #[must_use]
    pub fn list_providers() -> Vec<(String, bool)> {
        let cuda_available =
            OrtExecutionProvider::is_available(&CUDAExecutionProvider::default()).unwrap_or(false);
        let coreml_available =
            OrtExecutionProvider::is_available(&CoreMLExecutionProvider::default())
                .unwrap_or(false);

        vec![
            ("CPU".to_string(), true),
            ("CUDA".to_string(), cuda_available),
            ("CoreML".to_string(), coreml_available),
        ]
    }

    fn load_session(&mut self, config: &PipelineConfig) -> Result<Duration> {
        let load_start = instant::Instant::now();

        let mut session_builder = Session::builder()
            .map_err(|e| RemovalError::inference(format!("Failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                RemovalError::inference(format!("Failed to set optimization level: {e}"))
            })?;

        session_builder = match config.execution_provider {
            ExecutionProvider::Auto => {
                let mut providers = Vec::new();

                let cuda_provider = CUDAExecutionProvider::default();
                if OrtExecutionProvider::is_available(&cuda_provider).unwrap_or(false) {
                    log::info!("CUDA execution provider is available and will be used");
                    providers.push(cuda_provider.build());
                }

                let coreml_provider = CoreMLExecutionProvider::default();
                if OrtExecutionProvider::is_available(&coreml_provider).unwrap_or(false) {
                    log::info!("CoreML execution provider is available and will be used");
                    providers.push(coreml_provider.with_subgraphs(true).build());
                }

                if providers.is_empty() {
                    log::debug!("No hardware acceleration available, using CPU");
                    session_builder
                } else {
                    session_builder
                        .with_execution_providers(providers)
                        .map_err(|e| {
                            RemovalError::inference(format!(
                                "Failed to set auto execution providers: {e}"
                            ))
                        })?
                }
            },
            ExecutionProvider::Cpu => {
                log::info!("Using CPU execution provider");
                session_builder
            },
            ExecutionProvider::Cuda => {
                let cuda_provider = CUDAExecutionProvider::default();
                if OrtExecutionProvider::is_available(&cuda_provider).unwrap_or(false) {
                    log::info!("Using CUDA execution provider");
                    session_builder
                        .with_execution_providers([cuda_provider.build()])
                        .map_err(|e| {
                            RemovalError::inference_with_provider(
                                "cuda",
                                "Session setup",
                                &e.to_string(),
                            )
                        })?
                } else {
                    log::warn!("CUDA requested but not available, falling back to CPU");
                    session_builder
                }
            },
            ExecutionProvider::CoreMl => {
                let coreml_provider = CoreMLExecutionProvider::default().with_subgraphs(true);
                if OrtExecutionProvider::is_available(&CoreMLExecutionProvider::default())
                    .unwrap_or(false)
                {
                    log::info!("Using CoreML execution provider");
                    session_builder
                        .with_execution_providers([coreml_provider.build()])
                        .map_err(|e| {
                            RemovalError::inference_with_provider(
                                "coreml",
                                "Session setup",
                                &e.to_string(),
                            )
                        })?
                } else {
                    log::warn!("CoreML requested but not available, falling back to CPU");
                    session_builder
                }
            },
        };

        let intra_threads = if config.intra_threads > 0 {
            config.intra_threads
        } else {
            std::thread::available_parallelism()
                .map(std::num::NonZero::get)
                .unwrap_or(8)
        };
        let inter_threads = if config.inter_threads > 0 {
            config.inter_threads
        } else {
            (intra_threads / 4).max(1)
        };

        let session = session_builder
            .with_parallel_execution(true)
            .map_err(|e| {
                RemovalError::inference(format!("Failed to enable parallel execution: {e}"))
            })?
            .with_intra_threads(intra_threads)
            .map_err(|e| RemovalError::inference(format!("Failed to set intra threads: {e}")))?
            .with_inter_threads(inter_threads)
            .map_err(|e| RemovalError::inference(format!("Failed to set inter threads: {e}")))?
            .commit_from_file(&self.model_path)
            .map_err(|e| {
                RemovalError::inference(format!(
                    "Failed to load model '{}': {e}",
                    self.model_path.display()
                ))
            })?;

        let load_time = load_start.elapsed();
        log::info!(
            "Model loaded from '{}' in {:.0}ms ({intra_threads} intra / {inter_threads} inter threads)",
            self.model_path.display(),
            load_time.as_secs_f64() * 1000.0
        );

        self.session = Some(session);
        self.initialized = true;
        Ok(load_time)
    }
}

impl InferenceBackend for OnnxBackend {
    fn initialize(&mut self, config: &PipelineConfig) -> Result<Option<Duration>> {
        if self.initialized {
            return Ok(None);
        }
        let load_time = self.load_session(config)?;
        Ok(Some(load_time))
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| RemovalError::inference("ONNX session not initialized"))?;

        log::debug!("Starting inference with input shape {:?}", input.dim());

        let input_value = Value::from_array(input.clone())
            .map_err(|e| RemovalError::inference(format!("Failed to convert input tensor: {e}")))?;

        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| RemovalError::inference(format!("ONNX inference failed: {e}")))?;

        // Positional access to the first output avoids tensor name coupling.
        let keys: Vec<_> = outputs.keys().collect();
        let first_key = keys
            .first()
            .ok_or_else(|| RemovalError::inference("Model produced no output tensors"))?;
        let output_tensor = outputs
            .get(first_key)
            .ok_or_else(|| RemovalError::inference("First output tensor not found"))?
            .try_extract_array::<f32>()
            .map_err(|e| RemovalError::inference(format!("Failed to extract output tensor: {e}")))?;

        let output_shape = output_tensor.shape();
        if output_shape.len() != 4 {
            return Err(RemovalError::inference(format!(
                "Expected 4D output tensor, got {}D",
                output_shape.len()
            )));
        }

        let dims = (
            output_shape.first().copied().unwrap_or(1),
            output_shape.get(1).copied().unwrap_or(1),
            output_shape.get(2).copied().unwrap_or(1),
            output_shape.get(3).copied().unwrap_or(1),
        );
        let output_data = output_tensor.view().to_owned();
        Array4::from_shape_vec(dims, output_data.into_raw_vec_and_offset().0)
            .map_err(|e| RemovalError::inference(format!("Failed to reshape output tensor: {e}")))
    }

    fn input_shape(&self) -> (usize, usize, usize, usize) {
        (1, 3, 1024, 1024)
    }

    fn output_shape(&self) -> (usize, usize, usize, usize) {
        (1, 1, 1024, 1024)
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_creation_is_lazy() {
        let backend = OnnxBackend::from_file("nonexistent.onnx");
        assert!(!backend.is_initialized());
    }

    #[test]
    fn test_initialize_missing_model_fails() {
        let mut backend = OnnxBackend::from_file("definitely/not/a/model.onnx");
        let result = backend.initialize(&PipelineConfig::default());
        assert!(matches!(result, Err(RemovalError::InferenceBackend(_))));
    }

    #[test]
    fn test_close_resets_state() {
        let mut backend = OnnxBackend::from_file("model.onnx");
        backend.close();
        assert!(!backend.is_initialized());
    }

    #[test]
    fn test_list_providers_includes_cpu() {
        let providers = OnnxBackend::list_providers();
        assert!(providers.iter().any(|(name, available)| name == "CPU" && *available));
    }
}
