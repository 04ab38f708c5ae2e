//! Segmentation mask type and tensor-to-mask reconstruction

use crate::error::{RemovalError, Result};
use image::{ImageBuffer, Luma, Rgba};
use ndarray::Array4;
use serde::{Deserialize, Serialize};

/// Grayscale segmentation mask
///
/// Per-pixel foreground probability scaled to byte range (0 = background,
/// 255 = foreground), stored row-major at a known width and height.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationMask {
    /// Mask data as grayscale values (0-255)
    pub data: Vec<u8>,

    /// Mask dimensions (width, height)
    pub dimensions: (u32, u32),
}

impl SegmentationMask {
    /// Create a new segmentation mask
    #[must_use]
    pub fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        Self { data, dimensions }
    }

    /// Create mask from a grayscale image
    #[must_use]
    pub fn from_image(image: &ImageBuffer<Luma<u8>, Vec<u8>>) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.as_raw().clone(), (width, height))
    }

    /// Convert mask to a grayscale image
    ///
    /// # Errors
    /// Fails if the stored data length disagrees with the dimensions.
    pub fn to_image(&self) -> Result<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let (width, height) = self.dimensions;
        ImageBuffer::from_raw(width, height, self.data.clone()).ok_or_else(|| {
            RemovalError::mask_dimension(format!(
                "mask data length {} does not match {width}x{height}",
                self.data.len()
            ))
        })
    }

    /// Set the alpha channel of an RGBA image from this mask, in place
    ///
    /// # Errors
    /// Returns `RemovalError::DimensionMismatch` when the dimensions differ;
    /// the mask is never resampled implicitly.
    pub fn apply_to_image(&self, image: &mut ImageBuffer<Rgba<u8>, Vec<u8>>) -> Result<()> {
        if image.dimensions() != self.dimensions {
            return Err(RemovalError::dimension_mismatch(
                image.dimensions(),
                self.dimensions,
            ));
        }

        for (pixel, &alpha) in image.pixels_mut().zip(self.data.iter()) {
            pixel[3] = alpha;
        }
        Ok(())
    }

    /// Resize the mask to new dimensions with the high-quality filter
    ///
    /// # Errors
    /// Fails when the mask data is inconsistent with its dimensions.
    pub fn resize(&self, new_width: u32, new_height: u32) -> Result<SegmentationMask> {
        let current = self.to_image()?;
        let resized = image::imageops::resize(
            &current,
            new_width,
            new_height,
            image::imageops::FilterType::Lanczos3,
        );
        Ok(SegmentationMask::from_image(&resized))
    }

    /// Get mask statistics
    #[must_use]
    pub fn statistics(&self) -> MaskStatistics {
        let total_pixels = self.data.len();
        let foreground_pixels = self.data.iter().filter(|&&v| v > 127).count();
        let background_pixels = total_pixels - foreground_pixels;

        MaskStatistics {
            total_pixels,
            foreground_pixels,
            background_pixels,
            foreground_ratio: foreground_pixels as f32 / total_pixels.max(1) as f32,
        }
    }
}

/// Statistics about a segmentation mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskStatistics {
    pub total_pixels: usize,
    pub foreground_pixels: usize,
    pub background_pixels: usize,
    pub foreground_ratio: f32,
}

/// Converts raw model output tensors into full-resolution alpha masks
pub struct MaskReconstructor;

impl MaskReconstructor {
    /// Reconstruct a mask sized to the original image from the raw output
    ///
    /// Drops the batch and channel dimensions, scales the probabilities
    /// (assumed in [0, 1]) to byte range, then resamples with Lanczos3 to
    /// exactly `original_dimensions` so mask edges align with the original
    /// pixel grid instead of the model's internal resolution.
    ///
    /// # Errors
    /// Returns `RemovalError::MaskDimension` when the raw output is not a
    /// single-channel batch-of-one tensor or has a zero-sized dimension.
    pub fn reconstruct(
        raw_output: &Array4<f32>,
        original_dimensions: (u32, u32),
    ) -> Result<SegmentationMask> {
        let shape = raw_output.shape();
        let (batch, channels) = (
            shape.first().copied().unwrap_or(0),
            shape.get(1).copied().unwrap_or(0),
        );
        let raw_height = shape.get(2).copied().unwrap_or(0);
        let raw_width = shape.get(3).copied().unwrap_or(0);

        if batch != 1 || channels != 1 {
            return Err(RemovalError::mask_dimension(format!(
                "expected output shape (1, 1, H, W), got {shape:?}"
            )));
        }
        if raw_width == 0 || raw_height == 0 {
            return Err(RemovalError::mask_dimension(format!(
                "output has zero-sized spatial dimensions: {shape:?}"
            )));
        }

        // Squeeze to 2-D and scale to byte range before resampling, matching
        // the model's reference post-processing.
        let plane = raw_output.index_axis(ndarray::Axis(0), 0);
        let plane = plane.index_axis(ndarray::Axis(0), 0);
        let raw_data: Vec<u8> = plane
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 255.0) as u8)
            .collect();

        let raw_mask: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(raw_width as u32, raw_height as u32, raw_data).ok_or_else(
                || {
                    RemovalError::mask_dimension(format!(
                        "output plane does not match {raw_width}x{raw_height}"
                    ))
                },
            )?;

        let (orig_width, orig_height) = original_dimensions;
        let resized = image::imageops::resize(
            &raw_mask,
            orig_width,
            orig_height,
            image::imageops::FilterType::Lanczos3,
        );

        Ok(SegmentationMask::from_image(&resized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_creation() {
        let mask = SegmentationMask::new(vec![255, 128, 0, 255], (2, 2));
        assert_eq!(mask.dimensions, (2, 2));
        assert_eq!(mask.data.len(), 4);
    }

    #[test]
    fn test_mask_statistics() {
        let mask = SegmentationMask::new(vec![255, 255, 0, 0], (2, 2));
        let stats = mask.statistics();
        assert_eq!(stats.total_pixels, 4);
        assert_eq!(stats.foreground_pixels, 2);
        assert_eq!(stats.background_pixels, 2);
        assert!((stats.foreground_ratio - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_reconstruct_matches_original_dimensions() {
        // Raw resolutions both above and below the target must land on the
        // exact original size.
        for (raw_w, raw_h) in [(1024, 1024), (64, 64), (320, 240)] {
            let raw = Array4::<f32>::ones((1, 1, raw_h, raw_w));
            let mask = MaskReconstructor::reconstruct(&raw, (500, 300)).unwrap();
            assert_eq!(mask.dimensions, (500, 300));
            assert_eq!(mask.data.len(), 500 * 300);
        }
    }

    #[test]
    fn test_reconstruct_scales_probabilities_to_bytes() {
        let raw = Array4::<f32>::from_elem((1, 1, 16, 16), 1.0);
        let mask = MaskReconstructor::reconstruct(&raw, (16, 16)).unwrap();
        assert!(mask.data.iter().all(|&v| v == 255));

        let raw = Array4::<f32>::zeros((1, 1, 16, 16));
        let mask = MaskReconstructor::reconstruct(&raw, (16, 16)).unwrap();
        assert!(mask.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_reconstruct_clamps_out_of_range_values() {
        let raw = Array4::<f32>::from_elem((1, 1, 8, 8), 1.5);
        let mask = MaskReconstructor::reconstruct(&raw, (8, 8)).unwrap();
        assert!(mask.data.iter().all(|&v| v == 255));

        let raw = Array4::<f32>::from_elem((1, 1, 8, 8), -0.5);
        let mask = MaskReconstructor::reconstruct(&raw, (8, 8)).unwrap();
        assert!(mask.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_reconstruct_rejects_bad_shapes() {
        let multi_channel = Array4::<f32>::zeros((1, 3, 32, 32));
        assert!(matches!(
            MaskReconstructor::reconstruct(&multi_channel, (10, 10)),
            Err(RemovalError::MaskDimension(_))
        ));

        let batched = Array4::<f32>::zeros((2, 1, 32, 32));
        assert!(matches!(
            MaskReconstructor::reconstruct(&batched, (10, 10)),
            Err(RemovalError::MaskDimension(_))
        ));

        let empty = Array4::<f32>::zeros((1, 1, 0, 32));
        assert!(matches!(
            MaskReconstructor::reconstruct(&empty, (10, 10)),
            Err(RemovalError::MaskDimension(_))
        ));
    }

    #[test]
    fn test_apply_to_image_requires_matching_dimensions() {
        let mask = SegmentationMask::new(vec![255; 4], (2, 2));
        let mut image: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::new(3, 3);

        let result = mask.apply_to_image(&mut image);
        assert!(matches!(result, Err(RemovalError::DimensionMismatch(_))));
    }

    #[test]
    fn test_mask_resize_round_trip() {
        let mask = SegmentationMask::new(vec![200; 64 * 64], (64, 64));
        let resized = mask.resize(30, 20).unwrap();
        assert_eq!(resized.dimensions, (30, 20));
    }
}
