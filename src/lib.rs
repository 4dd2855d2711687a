//! OCR line reader
//!
//! Turns per-word OCR output into text lines, each anchored to a single
//! bounding polygon in image pixel coordinates.
//!
//! # Example
//! ```no_run
//! use ocr_line_reader::OcrClient;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OcrClient::new();
//! let image = std::fs::read("diagram.png")?;
//!
//! for line in client.read_text(&image) {
//!     let line = line?;
//!     println!("{} at {:?}", line.text, line.polygon);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod vision;

pub use config::{OcrConfig, Preprocessing};
pub use error::OcrError;
pub use vision::{OcrClient, OcrEngine, Polygon, TesseractEngine, TextLine, TextLines};
