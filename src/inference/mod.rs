//! Inference against the pneumonia classifier.
//!
//! The [`Classifier`] trait is the seam between the pipeline and the
//! underlying runtime: production uses [`OrtClassifier`] over ONNX Runtime,
//! tests substitute stubs. [`infer`] is the single entry point for a forward
//! pass and owns the input tensor for the duration of the call.

pub mod loader;
mod ort_classifier;

pub use loader::{ClassifierFactory, ModelLoader, OrtClassifierFactory};
pub use ort_classifier::OrtClassifier;

use ndarray::ArrayView4;
use tracing::debug;

use crate::core::{AnalysisError, NormalizedTensor};

/// Raw sigmoid output for the positive class, in [0, 1].
pub type RawScore = f32;

/// A loaded binary classifier with a single sigmoid output.
///
/// Implementations must be safe to share across concurrent inference calls;
/// if the underlying runtime is not reentrant, the implementation serializes
/// calls internally (as [`OrtClassifier`] does with its session lock).
pub trait Classifier: Send + Sync {
    /// Runs one forward pass over a `[1, 224, 224, 3]` input and returns the
    /// positive-class sigmoid score.
    fn run(&self, input: ArrayView4<'_, f32>) -> Result<RawScore, AnalysisError>;
}

/// Runs exactly one forward pass and extracts the scalar score.
///
/// Takes the tensor by value: the input buffer is released when this call
/// returns, on success and on every failure path alike. Output buffers
/// created by the classifier are scoped inside [`Classifier::run`].
///
/// # Errors
///
/// Returns [`AnalysisError::Inference`] if the forward pass fails or the
/// extracted score is not a finite probability.
pub fn infer(model: &dyn Classifier, tensor: NormalizedTensor) -> Result<RawScore, AnalysisError> {
    let score = model.run(tensor.view())?;

    if !score.is_finite() {
        return Err(AnalysisError::inference_msg(format!(
            "classifier produced a non-finite score: {score}"
        )));
    }

    debug!(score, "forward pass complete");
    Ok(score)
}
