//! Core types shared across the analysis pipeline: model-contract constants,
//! error handling, and tensor ownership.

pub mod constants;
pub mod errors;
pub mod tensor;

pub use errors::{AnalysisError, ErrorKind};
pub use tensor::{BufferLedger, NormalizedTensor, Tensor4D};
