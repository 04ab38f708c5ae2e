//! Mock inference backends for testing
//!
//! These implement the `InferenceBackend` trait without requiring a model
//! file or ONNX Runtime, so pipeline behavior can be tested deterministically.

use crate::{
    config::PipelineConfig,
    error::{RemovalError, Result},
    inference::InferenceBackend,
};
use instant::Duration;
use ndarray::Array4;
use std::sync::{Arc, Mutex};

/// Mock inference backend with configurable behavior
#[derive(Debug, Clone)]
pub struct MockInferenceBackend {
    initialized: bool,
    /// Constant probability emitted for every output pixel
    output_value: f32,
    /// Spatial size of the emitted output (height, width)
    output_size: (usize, usize),
    /// Whether to simulate initialization failure
    should_fail_init: bool,
    /// Whether to simulate inference failure
    should_fail_inference: bool,
    /// Call history for verification in tests
    call_history: Arc<Mutex<Vec<String>>>,
}

impl MockInferenceBackend {
    /// Create a mock backend emitting a constant probability everywhere
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self {
            initialized: false,
            output_value: value,
            output_size: (1024, 1024),
            should_fail_init: false,
            should_fail_inference: false,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock backend whose output resolution differs from the input
    #[must_use]
    pub fn constant_with_output_size(value: f32, height: usize, width: usize) -> Self {
        let mut backend = Self::constant(value);
        backend.output_size = (height, width);
        backend
    }

    /// Create a mock backend that fails during initialization
    #[must_use]
    pub fn failing_init() -> Self {
        let mut backend = Self::constant(0.0);
        backend.should_fail_init = true;
        backend
    }

    /// Create a mock backend that fails during inference
    #[must_use]
    pub fn failing_inference() -> Self {
        let mut backend = Self::constant(0.0);
        backend.should_fail_inference = true;
        backend
    }

    /// Get the call history for verification in tests
    #[must_use]
    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock().unwrap().clone()
    }

    fn record_call(&self, method: &str) {
        if let Ok(mut history) = self.call_history.lock() {
            history.push(method.to_string());
        }
    }
}

impl InferenceBackend for MockInferenceBackend {
    fn initialize(&mut self, _config: &PipelineConfig) -> Result<Option<Duration>> {
        self.record_call("initialize");

        if self.should_fail_init {
            return Err(RemovalError::inference(
                "mock backend initialization failed",
            ));
        }

        self.initialized = true;
        Ok(Some(Duration::from_millis(1)))
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array4<f32>> {
        self.record_call("infer");

        if !self.initialized {
            return Err(RemovalError::inference("mock backend not initialized"));
        }
        if self.should_fail_inference {
            return Err(RemovalError::inference("mock inference failed"));
        }

        let batch = input.shape().first().copied().unwrap_or(1);
        let (height, width) = self.output_size;
        Ok(Array4::from_elem(
            (batch, 1, height, width),
            self.output_value,
        ))
    }

    fn input_shape(&self) -> (usize, usize, usize, usize) {
        (1, 3, 1024, 1024)
    }

    fn output_shape(&self) -> (usize, usize, usize, usize) {
        (1, 1, self.output_size.0, self.output_size.1)
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
