//! ONNX Runtime implementation of the pneumonia classifier.

use ndarray::ArrayView4;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use super::{Classifier, RawScore};
use crate::core::AnalysisError;

/// A binary sigmoid classifier backed by an ONNX Runtime session.
///
/// The session is held behind a mutex because `Session::run` requires
/// exclusive access. Concurrent inference calls serialize through the lock;
/// callers are expected to run them on a blocking pool rather than on the
/// task that awaits the result.
pub struct OrtClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    model_name: String,
    model_path: PathBuf,
}

impl std::fmt::Debug for OrtClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtClassifier")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_name", &self.model_name)
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl OrtClassifier {
    /// Deserializes the model artifact at `model_path` into a live session.
    ///
    /// Input and output tensor names are discovered from the session rather
    /// than configured; the model contract is a single input and a single
    /// `[1, 1]` sigmoid output.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ModelUnavailable`] if the artifact cannot be
    /// read or deserialized, or if it declares no inputs or outputs.
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = model_path.as_ref();
        let session = Session::builder()
            .and_then(|b| b.with_log_level(LogLevel::Error))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| {
                AnalysisError::model_unavailable(
                    format!("failed to create session from '{}'", path.display()),
                    e,
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                AnalysisError::model_unavailable_msg(format!(
                    "model at '{}' declares no inputs",
                    path.display()
                ))
            })?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                AnalysisError::model_unavailable_msg(format!(
                    "model at '{}' declares no outputs",
                    path.display()
                ))
            })?;

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        debug!(
            model = %model_name,
            input = %input_name,
            output = %output_name,
            "classifier session ready"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            model_name,
            model_path: path.to_path_buf(),
        })
    }

    /// The model name derived from the artifact file stem.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// The path the artifact was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Classifier for OrtClassifier {
    fn run(&self, input: ArrayView4<'_, f32>) -> Result<RawScore, AnalysisError> {
        let input_shape = input.shape().to_vec();

        let input_tensor = TensorRef::from_array_view(input).map_err(|e| {
            AnalysisError::inference(
                format!(
                    "failed to convert input tensor with shape {:?} for model '{}'",
                    input_shape, self.model_name
                ),
                e,
            )
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session_guard = self.session.lock().map_err(|_| {
            AnalysisError::inference_msg(format!(
                "failed to acquire session lock for model '{}'",
                self.model_name
            ))
        })?;

        // The output map lives in this scope; its buffers are released when
        // the call returns, on success and on every error path.
        let outputs = session_guard.run(inputs).map_err(|e| {
            AnalysisError::inference(
                format!(
                    "forward pass failed for model '{}' with input '{}' -> output '{}'",
                    self.model_name, self.input_name, self.output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                AnalysisError::inference(
                    format!(
                        "failed to extract output tensor '{}' as f32 for model '{}'",
                        self.output_name, self.model_name
                    ),
                    e,
                )
            })?;

        if **output_shape != [1, 1] {
            return Err(AnalysisError::inference_msg(format!(
                "model '{}' produced output shape {:?}, expected [1, 1] sigmoid output",
                self.model_name, output_shape
            )));
        }

        Ok(output_data[0])
    }
}
