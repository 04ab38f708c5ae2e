//! Image-to-tensor preprocessing for segmentation inference

use crate::{
    config::PreprocessingConfig,
    error::{RemovalError, Result},
};
use image::DynamicImage;
use ndarray::Array4;

/// Converts decoded images into the fixed-shape tensor the model expects
pub struct TensorPreparer;

impl TensorPreparer {
    /// Preprocess an image into a normalized NCHW inference tensor
    ///
    /// The steps mirror the RMBG preprocessing exactly, and their order
    /// matters: Lanczos3 resize to the model input size, scale to [0, 1],
    /// HWC to CHW transpose, per-channel `(v - mean) / std`, then a leading
    /// batch dimension of 1. The resize is a plain stretch; the model
    /// tolerates aspect distortion and the mask is stretched back the same
    /// way on reconstruction.
    ///
    /// # Errors
    /// Returns `RemovalError::InvalidImage` for a zero-area input, which
    /// cannot be resampled.
    #[allow(clippy::indexing_slicing)] // tensor pre-allocated to the resized extent
    pub fn prepare(image: &DynamicImage, config: &PreprocessingConfig) -> Result<Array4<f32>> {
        let (orig_width, orig_height) = (image.width(), image.height());
        if orig_width == 0 || orig_height == 0 {
            return Err(RemovalError::invalid_image(format!(
                "cannot resample a {orig_width}x{orig_height} image"
            )));
        }

        let [target_width, target_height] = config.target_size;
        let rgb_image = image.to_rgb8();

        // Lanczos keeps edge detail the mask quality depends on; nearest or
        // bilinear filters visibly degrade thin structures like hair.
        let resized = image::imageops::resize(
            &rgb_image,
            target_width,
            target_height,
            image::imageops::FilterType::Lanczos3,
        );

        let mean = config.normalization_mean;
        let std = config.normalization_std;
        let mut tensor =
            Array4::<f32>::zeros((1, 3, target_height as usize, target_width as usize));

        for (y, row) in resized.rows().enumerate() {
            for (x, pixel) in row.enumerate() {
                tensor[[0, 0, y, x]] = (f32::from(pixel[0]) / 255.0 - mean[0]) / std[0];
                tensor[[0, 1, y, x]] = (f32::from(pixel[1]) / 255.0 - mean[1]) / std[1];
                tensor[[0, 2, y, x]] = (f32::from(pixel[2]) / 255.0 - mean[2]) / std[2];
            }
        }

        Ok(tensor)
    }
}
