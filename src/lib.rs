//! # MediScan
//!
//! AI-assisted pneumonia screening for chest X-ray images using ONNX models.
//!
//! An operator submits one encoded X-ray image and receives a binary
//! pneumonia classification with a confidence score, plus an optional
//! printable diagnostic report. The crate is the analysis pipeline only:
//! upload UI, dialogs, and the print surface are external callers.
//!
//! ## Pipeline
//!
//! image bytes → [`processors::XrayNormalizer`] → `[1, 224, 224, 3]` tensor
//! → [`inference::infer`] → raw sigmoid score → [`pipeline::interpret`] →
//! [`pipeline::AnalysisResult`] → (optionally) [`report::compose`].
//!
//! The classifier artifact is loaded lazily, once per process, through a
//! single-flight [`inference::ModelLoader`]; a failed load is not cached, so
//! the next request retries.
//!
//! ## Modules
//!
//! * [`core`] - model-contract constants, error handling, tensor ownership
//! * [`processors`] - image decode and normalization
//! * [`inference`] - classifier trait, ONNX Runtime backend, model loading
//! * [`pipeline`] - the async analysis entry point and score interpretation
//! * [`report`] - printable diagnostic report composition
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use mediscan::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = XrayAnalyzer::with_default_model();
//!
//!     let image_bytes = std::fs::read("xray.png")?;
//!     let analysis = analyzer.analyze(image_bytes.clone()).await?;
//!     println!(
//!         "pneumonia: {} ({:.0}% confident)",
//!         analysis.result.has_pneumonia,
//!         analysis.result.confidence * 100.0
//!     );
//!
//!     let patient = PatientRecord {
//!         first_name: "Jane".into(),
//!         last_name: "Doe".into(),
//!         date_of_birth: chrono::NaiveDate::from_ymd_opt(1984, 3, 9).unwrap(),
//!         gender: "Female".into(),
//!         physician_name: "Dr. A. Osler".into(),
//!         additional_notes: None,
//!     };
//!     let image = ReportImage::from_encoded_bytes(&image_bytes)?;
//!     let report = mediscan::report::compose(
//!         &analysis.result,
//!         &patient,
//!         &image,
//!         Utc::now().date_naive(),
//!     );
//!     std::fs::write("report.html", report.html())?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod inference;
pub mod pipeline;
pub mod processors;
pub mod report;

/// Prelude module for convenient imports.
///
/// Brings the pipeline entry point, its result types, and the report types
/// into scope with a single use statement:
///
/// ```rust
/// use mediscan::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{AnalysisError, ErrorKind};
    pub use crate::inference::{ModelLoader, OrtClassifierFactory};
    pub use crate::pipeline::{Analysis, AnalysisResult, XrayAnalyzer, interpret};
    pub use crate::report::{PatientRecord, Report, ReportImage};
}
