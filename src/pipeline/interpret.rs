//! Raw score interpretation.
//!
//! The decision boundary and the confidence-flip rule live here and nowhere
//! else; presentation code consumes [`AnalysisResult`] without re-deriving
//! either. The policy is part of the API contract, not a tunable.

use serde::{Deserialize, Serialize};

use crate::core::constants::PNEUMONIA_THRESHOLD;
use crate::inference::RawScore;

/// The interpreted outcome of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Whether the classifier calls the image positive for pneumonia.
    pub has_pneumonia: bool,
    /// Probability of the *predicted* class, always in [0.5, 1.0].
    ///
    /// Equals the raw score for a positive call and `1 - score` for a
    /// negative one, so it always reads as "how sure the model is about the
    /// label it gave" regardless of polarity.
    pub confidence: f32,
}

/// Thresholds a raw sigmoid score into a label and directional confidence.
///
/// Pure and total. The boundary is inclusive on the positive side: a score
/// of exactly 0.5 classifies positive.
pub fn interpret(score: RawScore) -> AnalysisResult {
    let has_pneumonia = score >= PNEUMONIA_THRESHOLD;
    let confidence = if has_pneumonia { score } else { 1.0 - score };

    AnalysisResult {
        has_pneumonia,
        confidence,
    }
}
