//! OCR engine seam
//!
//! The engine is a black box that turns a decoded image into per-token
//! records laid out as parallel arrays, the same shape Tesseract's TSV/data
//! output has.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Anything that can run text detection on a decoded image
pub trait OcrEngine {
    /// Run recognition, forwarding `config` to the engine untouched
    fn image_to_data(&self, image: &DynamicImage, config: &str) -> Result<EngineOutput, EngineError>;
}

/// Raw per-token engine output as parallel arrays
///
/// All arrays are expected to have the same length. Consumers walk the
/// shortest one if that contract is broken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOutput {
    pub text: Vec<String>,
    pub line_num: Vec<i32>,
    pub left: Vec<i32>,
    pub top: Vec<i32>,
    pub width: Vec<i32>,
    pub height: Vec<i32>,
}

impl EngineOutput {
    /// Append one token record
    pub fn push(&mut self, text: impl Into<String>, line_num: i32, left: i32, top: i32, width: i32, height: i32) {
        self.text.push(text.into());
        self.line_num.push(line_num);
        self.left.push(left);
        self.top.push(top);
        self.width.push(width);
        self.height.push(height);
    }

    /// Number of complete records
    pub fn len(&self) -> usize {
        [
            self.text.len(),
            self.line_num.len(),
            self.left.len(),
            self.top.len(),
            self.width.len(),
            self.height.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Errors raised while decoding the image or running the engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unbalanced quotes in engine config '{config}'")]
    Config { config: String },

    #[error("tesseract exited with status {}: {stderr}", exit_code(.code))]
    Exit { code: Option<i32>, stderr: String },

    #[error("malformed TSV at line {line}: {reason}")]
    Tsv { line: usize, reason: String },
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}
