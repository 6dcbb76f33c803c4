//! The analysis pipeline: model readiness, normalization, inference, and
//! interpretation, chained as one structured async call.

pub mod interpret;

pub use interpret::{AnalysisResult, interpret};

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::AnalysisError;
use crate::inference::{self, ModelLoader, OrtClassifierFactory};
use crate::processors::XrayNormalizer;

/// One completed analysis, correlated to the request that produced it.
///
/// The `request_id` lets a caller that issued overlapping analyses discard
/// stale arrivals instead of displaying them.
#[derive(Debug, Clone, Copy)]
pub struct Analysis {
    /// Identifier minted when the analysis was requested.
    pub request_id: Uuid,
    /// The interpreted classification.
    pub result: AnalysisResult,
    /// When the analysis completed.
    pub analyzed_at: DateTime<Utc>,
}

/// The pipeline entry point.
///
/// Holds the only cross-invocation state: the lazily loaded classifier
/// handle (read-only once loaded) and the normalizer's buffer ledger.
/// Each `analyze` call gets its own tensor and output buffers, so
/// independent analyses may run concurrently.
#[derive(Debug)]
pub struct XrayAnalyzer {
    loader: ModelLoader,
    normalizer: XrayNormalizer,
}

impl XrayAnalyzer {
    /// Creates an analyzer around an explicitly constructed loader.
    pub fn new(loader: ModelLoader) -> Self {
        Self {
            loader,
            normalizer: XrayNormalizer::new(),
        }
    }

    /// Creates an analyzer that loads the ONNX artifact from the well-known
    /// default path on first use.
    pub fn with_default_model() -> Self {
        Self::new(ModelLoader::new(OrtClassifierFactory::at_default_path()))
    }

    /// The loader backing this analyzer.
    pub fn loader(&self) -> &ModelLoader {
        &self.loader
    }

    /// Number of normalized tensors currently alive. Zero whenever no
    /// analysis is in flight.
    pub fn live_tensors(&self) -> usize {
        self.normalizer.ledger().live()
    }

    /// Analyzes one encoded X-ray image.
    ///
    /// Stages run strictly in sequence (model readiness, normalization,
    /// forward pass, interpretation) with the long-running work on the
    /// blocking pool so the awaiting task stays responsive. The image bytes
    /// are consumed and not retained.
    ///
    /// # Errors
    ///
    /// Any stage failure resolves the whole invocation; see
    /// [`AnalysisError::kind`] for the coarse category to surface.
    pub async fn analyze(&self, image_bytes: Vec<u8>) -> Result<Analysis, AnalysisError> {
        let request_id = Uuid::new_v4();
        debug!(%request_id, input_len = image_bytes.len(), "analysis requested");

        let model = self.loader.ensure_model().await?;

        let normalizer = self.normalizer.clone();
        let tensor = task::spawn_blocking(move || normalizer.normalize(&image_bytes))
            .await
            .map_err(|e| AnalysisError::inference("normalization task failed", e))??;

        let score = task::spawn_blocking(move || inference::infer(model.as_ref(), tensor))
            .await
            .map_err(|e| AnalysisError::inference("inference task failed", e))??;

        let result = interpret(score);
        info!(
            %request_id,
            has_pneumonia = result.has_pneumonia,
            confidence = result.confidence,
            "analysis complete"
        );

        Ok(Analysis {
            request_id,
            result,
            analyzed_at: Utc::now(),
        })
    }
}
