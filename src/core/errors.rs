//! Error types for the analysis pipeline.
//!
//! Every failure in the pipeline is terminal for the invocation that raised
//! it: nothing is retried automatically and no partial result is returned.
//! Callers that face an operator (UI, report surface) should show
//! [`AnalysisError::user_message`] and keep the detailed chain for logs.

use thiserror::Error;

/// Coarse failure category surfaced to the caller.
///
/// The pipeline deliberately collapses internal detail into these three
/// categories so that nothing implementation-specific leaks into a
/// clinical-facing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The model artifact could not be fetched or deserialized.
    ModelUnavailable,
    /// The input bytes are not a decodable image.
    DecodeFailed,
    /// The forward pass or score extraction failed.
    InferenceFailed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ModelUnavailable => write!(f, "model unavailable"),
            ErrorKind::DecodeFailed => write!(f, "decode failed"),
            ErrorKind::InferenceFailed => write!(f, "inference failed"),
        }
    }
}

/// Errors raised by the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The classifier artifact could not be loaded. The model cache stays
    /// empty after this error, so a later invocation retries the load.
    #[error("model unavailable: {context}")]
    ModelUnavailable {
        /// What the loader was doing when it failed.
        context: String,
        /// The underlying load error, when one exists.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The input bytes could not be decoded as an image.
    #[error("image decode")]
    Decode(#[source] image::ImageError),

    /// The forward pass or score extraction failed.
    #[error("inference failed: {context}")]
    Inference {
        /// What the engine was doing when it failed.
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A tensor could not be shaped as required.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),
}

impl AnalysisError {
    /// Creates a `ModelUnavailable` error wrapping an underlying cause.
    pub fn model_unavailable(
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ModelUnavailable {
            context: context.into(),
            source: Some(Box::new(error)),
        }
    }

    /// Creates a `ModelUnavailable` error from a bare description.
    pub fn model_unavailable_msg(context: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            context: context.into(),
            source: None,
        }
    }

    /// Creates an `Inference` error wrapping an underlying cause.
    pub fn inference(
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            context: context.into(),
            source: Some(Box::new(error)),
        }
    }

    /// Creates an `Inference` error from a bare description.
    pub fn inference_msg(context: impl Into<String>) -> Self {
        Self::Inference {
            context: context.into(),
            source: None,
        }
    }

    /// The coarse category this error collapses to at the caller boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ModelUnavailable { .. } => ErrorKind::ModelUnavailable,
            Self::Decode(_) => ErrorKind::DecodeFailed,
            Self::Inference { .. } | Self::Tensor(_) => ErrorKind::InferenceFailed,
        }
    }

    /// A short operator-facing message with no implementation detail.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::ModelUnavailable => "Analysis is unavailable right now. Please try again.",
            ErrorKind::DecodeFailed => "The uploaded file could not be read as an image.",
            ErrorKind::InferenceFailed => "Analysis failed. Please try again.",
        }
    }
}

impl From<image::ImageError> for AnalysisError {
    fn from(error: image::ImageError) -> Self {
        Self::Decode(error)
    }
}
