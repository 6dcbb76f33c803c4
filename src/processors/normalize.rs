//! Image normalization for the pneumonia classifier.
//!
//! Turns an arbitrary encoded image into the exact tensor the model was
//! trained against: 224x224 spatial resolution, three RGB channels, values
//! scaled into [0, 1], with a leading batch dimension of one.

use image::imageops::FilterType;
use ndarray::Array4;
use tracing::debug;

use crate::core::constants::{
    MODEL_INPUT_CHANNELS, MODEL_INPUT_HEIGHT, MODEL_INPUT_WIDTH, PIXEL_SCALE,
};
use crate::core::{AnalysisError, BufferLedger, NormalizedTensor};

/// Normalizes encoded X-ray images into model input tensors.
///
/// The normalizer has no configurable parameters: resolution, channel count,
/// and value scale are dictated by the model's fixed input signature (see
/// [`crate::core::constants`]). It is cheap to clone; clones share the same
/// buffer ledger.
#[derive(Debug, Clone, Default)]
pub struct XrayNormalizer {
    ledger: BufferLedger,
}

impl XrayNormalizer {
    /// Creates a normalizer with a fresh buffer ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// The ledger tracking buffers minted by this normalizer.
    pub fn ledger(&self) -> &BufferLedger {
        &self.ledger
    }

    /// Decodes, resizes, and scales an encoded image into a model input.
    ///
    /// The input bytes are consumed transiently and never retained. Alpha
    /// channels are discarded; grayscale inputs are expanded to RGB.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Decode`] if the bytes are not a decodable
    /// image, and a tensor error if the pixel buffer cannot be shaped
    /// (which would indicate a bug, not bad input).
    pub fn normalize(&self, image_bytes: &[u8]) -> Result<NormalizedTensor, AnalysisError> {
        let decoded = image::load_from_memory(image_bytes).map_err(AnalysisError::Decode)?;
        let (src_width, src_height) = (decoded.width(), decoded.height());

        // Resample (not crop) to the model resolution. Triangle filtering
        // matches the bilinear resampling the model saw during preprocessing.
        let resized = decoded.resize_exact(MODEL_INPUT_WIDTH, MODEL_INPUT_HEIGHT, FilterType::Triangle);
        let rgb = resized.to_rgb8();

        let height = MODEL_INPUT_HEIGHT as usize;
        let width = MODEL_INPUT_WIDTH as usize;
        let mut data = vec![0.0f32; height * width * MODEL_INPUT_CHANNELS];

        for y in 0..MODEL_INPUT_HEIGHT {
            for x in 0..MODEL_INPUT_WIDTH {
                let pixel = rgb.get_pixel(x, y);
                for c in 0..MODEL_INPUT_CHANNELS {
                    let dst_idx =
                        (y as usize * width + x as usize) * MODEL_INPUT_CHANNELS + c;
                    data[dst_idx] = pixel[c] as f32 * PIXEL_SCALE;
                }
            }
        }

        let tensor = Array4::from_shape_vec((1, height, width, MODEL_INPUT_CHANNELS), data)?;

        debug!(
            src_width,
            src_height,
            tensor_shape = ?tensor.shape(),
            "normalized image into model input"
        );

        Ok(NormalizedTensor::new(tensor, self.ledger.track()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(img: &image::DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn solid_rgb_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        encode_png(&image::DynamicImage::ImageRgb8(img))
    }

    #[test]
    fn test_normalize_produces_fixed_shape_in_unit_range() {
        let normalizer = XrayNormalizer::new();
        let bytes = solid_rgb_png(500, 500, [128, 128, 128]);

        let tensor = normalizer.normalize(&bytes).unwrap();
        assert_eq!(tensor.shape(), [1, 224, 224, 3]);
        assert!(tensor.view().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_normalize_scales_channel_values() {
        let normalizer = XrayNormalizer::new();
        let bytes = solid_rgb_png(64, 64, [51, 102, 255]);

        let tensor = normalizer.normalize(&bytes).unwrap();
        let view = tensor.view();
        assert!((view[[0, 0, 0, 0]] - 51.0 / 255.0).abs() < 1e-6);
        assert!((view[[0, 112, 112, 1]] - 102.0 / 255.0).abs() < 1e-6);
        assert!((view[[0, 223, 223, 2]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_discards_alpha_channel() {
        let normalizer = XrayNormalizer::new();
        let img = RgbaImage::from_pixel(300, 200, Rgba([200, 100, 50, 10]));
        let bytes = encode_png(&image::DynamicImage::ImageRgba8(img));

        let tensor = normalizer.normalize(&bytes).unwrap();
        assert_eq!(tensor.shape(), [1, 224, 224, 3]);
        let view = tensor.view();
        assert!((view[[0, 100, 100, 0]] - 200.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_expands_grayscale_to_rgb() {
        let normalizer = XrayNormalizer::new();
        let img = image::GrayImage::from_pixel(100, 100, image::Luma([77]));
        let bytes = encode_png(&image::DynamicImage::ImageLuma8(img));

        let tensor = normalizer.normalize(&bytes).unwrap();
        let view = tensor.view();
        for c in 0..3 {
            assert!((view[[0, 50, 50, c]] - 77.0 / 255.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_normalize_rejects_corrupt_bytes() {
        let normalizer = XrayNormalizer::new();
        let err = normalizer.normalize(b"not an image at all").unwrap_err();
        assert_eq!(err.kind(), crate::core::ErrorKind::DecodeFailed);
        // A failed decode never allocates a tensor.
        assert_eq!(normalizer.ledger().live(), 0);
    }

    #[test]
    fn test_tensor_buffers_settle_after_drop() {
        let normalizer = XrayNormalizer::new();
        let bytes = solid_rgb_png(128, 96, [10, 20, 30]);

        let tensor = normalizer.normalize(&bytes).unwrap();
        assert_eq!(normalizer.ledger().live(), 1);
        drop(tensor);
        assert_eq!(normalizer.ledger().live(), 0);
    }
}
