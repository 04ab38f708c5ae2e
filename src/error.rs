//! Error types for background removal operations

use thiserror::Error;

/// Result type alias for background removal operations
pub type Result<T> = std::result::Result<T, RemovalError>;

/// Error taxonomy for the removal pipeline
///
/// The `Display` output of the pipeline-stage variants is prefixed with the
/// stage-specific error name so that a formatted failure reason identifies
/// which stage failed without further context.
#[derive(Error, Debug)]
pub enum RemovalError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors from the image crate
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Degenerate or undecodable input image
    #[error("InvalidImageError: {0}")]
    InvalidImage(String),

    /// Inference backend unavailable or returned a malformed result
    #[error("InferenceBackendError: {0}")]
    InferenceBackend(String),

    /// Backend output violated the mask shape contract
    #[error("MaskDimensionError: {0}")]
    MaskDimension(String),

    /// Compositor inputs disagree on dimensions; a programming-contract
    /// violation between pipeline stages, not a user error
    #[error("DimensionMismatchError: {0}")]
    DimensionMismatch(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RemovalError {
    /// Create a new invalid-image error
    pub fn invalid_image<S: Into<String>>(msg: S) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Create a new inference backend error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::InferenceBackend(msg.into())
    }

    /// Create a new mask dimension error
    pub fn mask_dimension<S: Into<String>>(msg: S) -> Self {
        Self::MaskDimension(msg.into())
    }

    /// Create a dimension mismatch error from the two disagreeing extents
    pub fn dimension_mismatch(image: (u32, u32), mask: (u32, u32)) -> Self {
        Self::DimensionMismatch(format!(
            "image is {}x{} but mask is {}x{}",
            image.0, image.1, mask.0, mask.1
        ))
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an inference error with execution provider context
    pub fn inference_with_provider(provider: &str, operation: &str, error: &str) -> Self {
        Self::InferenceBackend(format!(
            "{operation} failed using '{provider}' provider: {error}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RemovalError::invalid_config("test config error");
        assert!(matches!(err, RemovalError::InvalidConfig(_)));

        let err = RemovalError::invalid_image("zero-sized input");
        assert!(matches!(err, RemovalError::InvalidImage(_)));
    }

    #[test]
    fn test_stage_error_prefixes() {
        assert_eq!(
            RemovalError::invalid_image("0x0 input").to_string(),
            "InvalidImageError: 0x0 input"
        );
        assert_eq!(
            RemovalError::inference("session closed").to_string(),
            "InferenceBackendError: session closed"
        );
        assert_eq!(
            RemovalError::mask_dimension("expected 4D tensor").to_string(),
            "MaskDimensionError: expected 4D tensor"
        );
        assert_eq!(
            RemovalError::dimension_mismatch((500, 300), (1024, 1024)).to_string(),
            "DimensionMismatchError: image is 500x300 but mask is 1024x1024"
        );
    }

    #[test]
    fn test_inference_error_with_provider() {
        let err = RemovalError::inference_with_provider("cuda", "Model inference", "out of memory");
        let msg = err.to_string();
        assert!(msg.starts_with("InferenceBackendError:"));
        assert!(msg.contains("cuda"));
        assert!(msg.contains("out of memory"));
    }
}
