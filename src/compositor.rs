//! Alpha-mask compositing onto the original image

use crate::{
    error::{RemovalError, Result},
    mask::SegmentationMask,
};
use image::{DynamicImage, RgbaImage};

/// Merges a full-resolution alpha mask into the original image
pub struct Compositor;

impl Compositor {
    /// Produce the final RGBA image from the original pixels and the mask
    ///
    /// Color channels are copied unchanged and the alpha channel is taken
    /// pixel-for-pixel from the mask. No blending and no premultiplication;
    /// alpha is a hard per-pixel opacity, and RGB is preserved even under
    /// fully transparent pixels so the composite is reversible.
    ///
    /// # Errors
    /// Returns `RemovalError::DimensionMismatch` when mask and image
    /// dimensions disagree. That is a contract violation between pipeline
    /// stages; the compositor never resamples implicitly.
    pub fn composite(original: &DynamicImage, mask: &SegmentationMask) -> Result<RgbaImage> {
        let dimensions = (original.width(), original.height());
        if dimensions != mask.dimensions {
            return Err(RemovalError::dimension_mismatch(dimensions, mask.dimensions));
        }

        let mut result = original.to_rgba8();
        mask.apply_to_image(&mut result)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn rgb_image(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, Rgb(color));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_opaque_mask_preserves_rgb() {
        let original = rgb_image(4, 3, [12, 34, 56]);
        let mask = SegmentationMask::new(vec![255; 12], (4, 3));

        let result = Compositor::composite(&original, &mask).unwrap();
        for pixel in result.pixels() {
            assert_eq!(pixel.0, [12, 34, 56, 255]);
        }
    }

    #[test]
    fn test_transparent_mask_keeps_rgb_unchanged() {
        let original = rgb_image(4, 3, [12, 34, 56]);
        let mask = SegmentationMask::new(vec![0; 12], (4, 3));

        let result = Compositor::composite(&original, &mask).unwrap();
        for pixel in result.pixels() {
            assert_eq!(pixel.0, [12, 34, 56, 0]);
        }
    }

    #[test]
    fn test_alpha_taken_per_pixel() {
        let original = rgb_image(2, 1, [100, 100, 100]);
        let mask = SegmentationMask::new(vec![17, 250], (2, 1));

        let result = Compositor::composite(&original, &mask).unwrap();
        assert_eq!(result.get_pixel(0, 0).0[3], 17);
        assert_eq!(result.get_pixel(1, 0).0[3], 250);
    }

    #[test]
    fn test_mismatched_dimensions_fail() {
        let original = rgb_image(4, 4, [0, 0, 0]);
        let mask = SegmentationMask::new(vec![255; 6], (3, 2));

        let result = Compositor::composite(&original, &mask);
        assert!(matches!(result, Err(RemovalError::DimensionMismatch(_))));
    }

    #[test]
    fn test_rgba_input_alpha_is_replaced() {
        let rgba: RgbaImage = ImageBuffer::from_pixel(2, 2, image::Rgba([1, 2, 3, 99]));
        let original = DynamicImage::ImageRgba8(rgba);
        let mask = SegmentationMask::new(vec![200; 4], (2, 2));

        let result = Compositor::composite(&original, &mask).unwrap();
        for pixel in result.pixels() {
            assert_eq!(pixel.0, [1, 2, 3, 200]);
        }
    }
}
