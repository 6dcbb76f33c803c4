//! Constants fixed by the trained model's input signature.
//!
//! The classifier was trained against a fixed 224x224 RGB input with pixel
//! values scaled into [0, 1]. Any deviation produces silently wrong inference
//! rather than an error, which is why none of these are configurable.

/// Input height expected by the classifier, in pixels.
pub const MODEL_INPUT_HEIGHT: u32 = 224;

/// Input width expected by the classifier, in pixels.
pub const MODEL_INPUT_WIDTH: u32 = 224;

/// Number of input channels expected by the classifier (RGB).
pub const MODEL_INPUT_CHANNELS: usize = 3;

/// Scale applied to 8-bit channel values to map them into [0, 1].
pub const PIXEL_SCALE: f32 = 1.0 / 255.0;

/// Decision boundary on the raw sigmoid score.
///
/// The boundary is inclusive: a score of exactly 0.5 classifies positive.
pub const PNEUMONIA_THRESHOLD: f32 = 0.5;

/// Well-known location of the serialized classifier artifact.
pub const DEFAULT_MODEL_PATH: &str = "models/pneumonia_xray.onnx";
