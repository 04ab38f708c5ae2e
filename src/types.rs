//! Core result and metadata types

use crate::{config::OutputFormat, error::Result, mask::SegmentationMask};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result of a background removal operation
#[derive(Debug, Clone)]
pub struct RemovalResult {
    /// The composited RGBA image with background removed
    pub image: RgbaImage,

    /// The segmentation mask used for removal, at original resolution
    pub mask: SegmentationMask,

    /// Original image dimensions
    pub original_dimensions: (u32, u32),

    /// Processing metadata
    pub metadata: ProcessingMetadata,
}

impl RemovalResult {
    /// Create a new removal result
    #[must_use]
    pub fn new(
        image: RgbaImage,
        mask: SegmentationMask,
        original_dimensions: (u32, u32),
        metadata: ProcessingMetadata,
    ) -> Self {
        Self {
            image,
            mask,
            original_dimensions,
            metadata,
        }
    }

    /// Get image dimensions
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Save the result as PNG with alpha channel
    ///
    /// PNG is the lossless transparency-preserving format the pipeline
    /// targets; lossy formats would discard the alpha channel.
    ///
    /// # Errors
    /// Fails on file I/O or encoding errors.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Get the image as encoded bytes in the specified format
    ///
    /// # Errors
    /// Fails on encoding errors.
    pub fn to_bytes(&self, format: OutputFormat) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Png => {
                let mut buffer = Vec::new();
                let mut cursor = std::io::Cursor::new(&mut buffer);
                self.image.write_to(&mut cursor, image::ImageFormat::Png)?;
                Ok(buffer)
            },
            OutputFormat::Rgba8 => Ok(self.image.as_raw().clone()),
        }
    }

    /// Get detailed timing breakdown
    #[must_use]
    pub fn timings(&self) -> &ProcessingTimings {
        &self.metadata.timings
    }
}

/// Detailed timing breakdown for one removal job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Model loading time (reported once by the backend at initialization)
    pub model_load_ms: u64,

    /// Image preprocessing (resize, normalize, tensor conversion)
    pub preprocessing_ms: u64,

    /// Inference execution
    pub inference_ms: u64,

    /// Postprocessing (mask reconstruction, alpha compositing)
    pub postprocessing_ms: u64,

    /// Total end-to-end processing time
    pub total_ms: u64,
}

impl ProcessingTimings {
    /// Fraction of total time spent in inference
    #[must_use]
    pub fn inference_ratio(&self) -> f64 {
        if self.total_ms == 0 {
            0.0
        } else {
            self.inference_ms as f64 / self.total_ms as f64
        }
    }
}

/// Metadata about the processing operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    /// Detailed timing breakdown
    pub timings: ProcessingTimings,

    /// Name of the backend used for inference
    pub backend_name: String,
}

impl ProcessingMetadata {
    /// Create new processing metadata
    #[must_use]
    pub fn new(backend_name: String) -> Self {
        Self {
            timings: ProcessingTimings::default(),
            backend_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn small_result() -> RemovalResult {
        let image: RgbaImage = ImageBuffer::from_pixel(2, 2, image::Rgba([9, 8, 7, 255]));
        let mask = SegmentationMask::new(vec![255; 4], (2, 2));
        RemovalResult::new(image, mask, (2, 2), ProcessingMetadata::new("mock".to_string()))
    }

    #[test]
    fn test_png_bytes_round_trip() {
        let result = small_result();
        let bytes = result.to_bytes(OutputFormat::Png).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [9, 8, 7, 255]);
    }

    #[test]
    fn test_rgba8_bytes_are_raw_pixels() {
        let result = small_result();
        let bytes = result.to_bytes(OutputFormat::Rgba8).unwrap();
        assert_eq!(bytes.len(), 2 * 2 * 4);
        assert_eq!(&bytes[0..4], &[9, 8, 7, 255]);
    }

    #[test]
    fn test_inference_ratio() {
        let timings = ProcessingTimings {
            inference_ms: 50,
            total_ms: 100,
            ..ProcessingTimings::default()
        };
        assert!((timings.inference_ratio() - 0.5).abs() < 1e-9);
        assert!((ProcessingTimings::default().inference_ratio()).abs() < 1e-9);
    }
}
