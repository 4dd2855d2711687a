//! Public error type for line reading

use thiserror::Error;

use crate::vision::ocr::EngineError;

/// Error surfaced by [`crate::OcrClient`]
///
/// Image decoding problems and engine failures collapse into the same kind.
/// The underlying description is kept in the message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OcrError {
    #[error("OCR processing failed: {0}")]
    ProcessingFailed(String),
}

impl From<EngineError> for OcrError {
    fn from(err: EngineError) -> Self {
        OcrError::ProcessingFailed(err.to_string())
    }
}
