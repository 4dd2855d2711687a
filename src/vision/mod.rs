//! Vision/OCR Layer
//!
//! Reads text lines out of encoded images. The engine reports individual
//! words tagged with a line index; this layer stitches them back into lines
//! with one bounding polygon each.

pub mod lines;
pub mod ocr;
pub mod ocr_preprocess;
pub mod tesseract;

pub use lines::{
    group_lines, LineAggregator, LineGroup, Lines, PixelBox, Polygon, TextLine, TokenDetection,
};
pub use ocr::{EngineError, EngineOutput, OcrEngine};
pub use ocr_preprocess::decode_image;
pub use tesseract::TesseractEngine;

use std::iter::FusedIterator;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::{OcrConfig, Preprocessing, DEFAULT_TESSERACT_CONFIG};
use crate::error::OcrError;

/// Client for reading text lines from an image
///
/// Holds no per-call state, so one client can serve any number of reads.
#[derive(Debug, Clone)]
pub struct OcrClient<E = TesseractEngine> {
    engine: E,
    engine_config: String,
    preprocessing: Preprocessing,
}

impl Default for OcrClient<TesseractEngine> {
    fn default() -> Self {
        Self::with_engine(TesseractEngine::default(), DEFAULT_TESSERACT_CONFIG)
    }
}

impl OcrClient<TesseractEngine> {
    /// Create a client backed by tesseract with the default engine mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tesseract-backed client from configuration
    pub fn from_config(config: &OcrConfig) -> Self {
        let engine = TesseractEngine::new(config.tesseract_cmd.clone())
            .with_language(config.language.clone());
        Self::with_engine(engine, config.tesseract_config.clone())
            .with_preprocessing(config.preprocessing.clone())
    }
}

impl<E: OcrEngine> OcrClient<E> {
    /// Create a client around any engine
    pub fn with_engine(engine: E, engine_config: impl Into<String>) -> Self {
        Self {
            engine,
            engine_config: engine_config.into(),
            preprocessing: Preprocessing::default(),
        }
    }

    /// Set image preprocessing applied after decoding
    pub fn with_preprocessing(mut self, preprocessing: Preprocessing) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    /// Get the engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Get the engine configuration string
    pub fn engine_config(&self) -> &str {
        &self.engine_config
    }

    /// Read text lines from encoded image bytes
    ///
    /// Nothing runs until the returned iterator is first pulled. A decoding or
    /// engine failure is reported by that first pull as
    /// [`OcrError::ProcessingFailed`], after which the iterator is exhausted.
    pub fn read_text<'a>(&'a self, image: &'a [u8]) -> TextLines<'a, E> {
        TextLines {
            state: State::Pending { client: self, image },
        }
    }

    /// Read every line at once
    pub fn read_lines(&self, image: &[u8]) -> Result<Vec<TextLine>, OcrError> {
        self.read_text(image).collect()
    }

    fn recognize(&self, image: &[u8]) -> Result<EngineOutput, OcrError> {
        let start = Instant::now();

        let output = decode_image(image, &self.preprocessing)
            .map_err(EngineError::from)
            .and_then(|decoded| self.engine.image_to_data(&decoded, &self.engine_config))
            .map_err(|e| {
                warn!("OCR engine invocation failed: {}", e);
                OcrError::from(e)
            })?;

        debug!(
            "OCR engine returned {} records in {:?}",
            output.len(),
            start.elapsed()
        );

        Ok(output)
    }
}

/// Lazy sequence of lines produced by [`OcrClient::read_text`]
///
/// Forward-only and not restartable. Reading the same image again needs a
/// fresh call.
pub struct TextLines<'a, E> {
    state: State<'a, E>,
}

enum State<'a, E> {
    Pending { client: &'a OcrClient<E>, image: &'a [u8] },
    Yielding(Lines),
    Done,
}

impl<E: OcrEngine> Iterator for TextLines<'_, E> {
    type Item = Result<TextLine, OcrError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::Pending { client, image } => match client.recognize(image) {
                    Ok(output) => self.state = State::Yielding(group_lines(output)),
                    Err(e) => return Some(Err(e)),
                },
                State::Yielding(mut lines) => {
                    let line = lines.next()?;
                    self.state = State::Yielding(lines);
                    return Some(Ok(line));
                }
                State::Done => return None,
            }
        }
    }
}

impl<E: OcrEngine> FusedIterator for TextLines<'_, E> {}
