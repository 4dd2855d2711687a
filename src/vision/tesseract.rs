//! Tesseract OCR backend
//!
//! Runs the `tesseract` executable on a temporary PNG and reads its TSV
//! report, which carries one row per page, block, paragraph, line and word.

use image::{DynamicImage, ImageFormat};
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tracing::debug;

use super::ocr::{EngineError, EngineOutput, OcrEngine};

/// Columns in tesseract's TSV output
const TSV_COLUMNS: usize = 12;

const COL_LINE_NUM: usize = 4;
const COL_LEFT: usize = 6;
const COL_TOP: usize = 7;
const COL_WIDTH: usize = 8;
const COL_HEIGHT: usize = 9;
const COL_TEXT: usize = 11;

/// Tesseract engine wrapper
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: String,
    language: Option<String>,
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractEngine {
    /// Create an engine that runs the given executable
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            language: None,
        }
    }

    /// Set the recognition language(s), e.g. "eng" or "eng+deu"
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    /// Get the executable name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the configured language, if any
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Arguments passed to tesseract for one run
    ///
    /// The config string is split with shell quoting rules, so quoted values
    /// such as `-c tessedit_char_whitelist="AB CD"` stay one argument.
    fn command_args(&self, image_path: &Path, config: &str) -> Result<Vec<OsString>, EngineError> {
        let config_args = shlex::split(config).ok_or_else(|| EngineError::Config {
            config: config.to_string(),
        })?;

        let mut args: Vec<OsString> = vec![image_path.into(), "stdout".into()];
        if let Some(language) = &self.language {
            args.push("-l".into());
            args.push(language.into());
        }
        args.extend(config_args.into_iter().map(OsString::from));
        args.push("tsv".into());
        Ok(args)
    }
}

impl OcrEngine for TesseractEngine {
    fn image_to_data(&self, image: &DynamicImage, config: &str) -> Result<EngineOutput, EngineError> {
        debug!(
            "Tesseract: Processing {}x{} image with config '{}'",
            image.width(),
            image.height(),
            config
        );

        let mut file = tempfile::Builder::new()
            .prefix("ocr-line-reader-")
            .suffix(".png")
            .tempfile()?;
        image.write_to(&mut file, ImageFormat::Png)?;
        file.flush()?;

        let args = self.command_args(file.path(), config)?;

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        let data = parse_tsv(&tsv)?;

        debug!("Tesseract: Found {} records", data.len());

        Ok(data)
    }
}

/// Parse tesseract TSV output into parallel arrays
///
/// The header row is skipped. Rows above word level have no text and are
/// kept as empty tokens.
pub fn parse_tsv(tsv: &str) -> Result<EngineOutput, EngineError> {
    let mut output = EngineOutput::default();

    for (idx, row) in tsv.lines().enumerate() {
        let line = idx + 1;
        if row.trim().is_empty() || row.starts_with("level") {
            continue;
        }

        let fields: Vec<&str> = row.splitn(TSV_COLUMNS, '\t').collect();
        if fields.len() < COL_TEXT {
            return Err(EngineError::Tsv {
                line,
                reason: format!("expected {} columns, found {}", TSV_COLUMNS, fields.len()),
            });
        }

        let number = |col: usize| -> Result<i32, EngineError> {
            fields[col].trim().parse::<i32>().map_err(|e| EngineError::Tsv {
                line,
                reason: format!("column {} ('{}'): {}", col + 1, fields[col], e),
            })
        };

        output.push(
            fields.get(COL_TEXT).copied().unwrap_or_default(),
            number(COL_LINE_NUM)?,
            number(COL_LEFT)?,
            number(COL_TOP)?,
            number(COL_WIDTH)?,
            number(COL_HEIGHT)?,
        );
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\t\
left\ttop\twidth\theight\tconf\ttext\n\
1\t1\t0\t0\t0\t0\t0\t0\t200\t60\t-1\t\n\
4\t1\t1\t1\t1\t0\t10\t5\t70\t10\t-1\t\n\
5\t1\t1\t1\t1\t1\t10\t5\t30\t10\t96.5\ttest\n\
5\t1\t1\t1\t1\t2\t50\t5\t30\t10\t95.1\ttext\n\
4\t1\t1\t1\t2\t0\t90\t25\t60\t10\t-1\t\n\
5\t1\t1\t1\t2\t1\t90\t25\t60\t10\t91.0\ttest_text_2\n";

    #[test]
    fn test_parse_tsv_keeps_every_row() {
        let output = parse_tsv(SAMPLE_TSV).unwrap();
        assert_eq!(output.len(), 6);
        assert_eq!(output.text[0], "");
        assert_eq!(output.text[2], "test");
        assert_eq!(output.line_num, vec![0, 1, 1, 1, 2, 2]);
        assert_eq!(output.left[5], 90);
        assert_eq!(output.width[5], 60);
    }

    #[test]
    fn test_parse_tsv_feeds_line_grouping() {
        let output = parse_tsv(SAMPLE_TSV).unwrap();
        let lines: Vec<_> = crate::vision::lines::group_lines(output)
            .map(|l| l.into_pair())
            .collect();
        assert_eq!(
            lines,
            vec![
                ("test text".to_string(), [[10, 5], [80, 5], [80, 15], [10, 15]]),
                ("test_text_2".to_string(), [[90, 25], [150, 25], [150, 35], [90, 35]]),
            ]
        );
    }

    #[test]
    fn test_parse_tsv_header_only() {
        let header = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\t\
                      left\ttop\twidth\theight\tconf\ttext\n";
        assert!(parse_tsv(header).unwrap().is_empty());
        assert!(parse_tsv("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_tsv_missing_text_column() {
        let output = parse_tsv("2\t1\t1\t0\t0\t0\t3\t4\t5\t6\t-1").unwrap();
        assert_eq!(output.text, vec![String::new()]);
        assert_eq!(output.top, vec![4]);
    }

    #[test]
    fn test_parse_tsv_rejects_short_rows() {
        let err = parse_tsv("5\t1\t1\n").unwrap_err();
        assert!(matches!(err, EngineError::Tsv { line: 1, .. }));
    }

    #[test]
    fn test_parse_tsv_rejects_non_numeric_geometry() {
        let err = parse_tsv("5\t1\t1\t1\t1\t1\tten\t5\t30\t10\t96\tword").unwrap_err();
        assert!(err.to_string().contains("column 7"));
    }

    fn args_as_strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_command_args_forward_config_unchanged() {
        let engine = TesseractEngine::default().with_language(Some("eng".to_string()));
        let args = engine
            .command_args(Path::new("/tmp/page.png"), "--oem 3 --psm 6")
            .unwrap();
        assert_eq!(
            args_as_strings(args),
            vec!["/tmp/page.png", "stdout", "-l", "eng", "--oem", "3", "--psm", "6", "tsv"]
        );
    }

    #[test]
    fn test_command_args_keep_quoted_values_together() {
        let engine = TesseractEngine::default();
        let args = engine
            .command_args(
                Path::new("/tmp/page.png"),
                "--psm 6 -c tessedit_char_whitelist=\"AB CD\"",
            )
            .unwrap();
        assert_eq!(
            args_as_strings(args),
            vec![
                "/tmp/page.png",
                "stdout",
                "--psm",
                "6",
                "-c",
                "tessedit_char_whitelist=AB CD",
                "tsv",
            ]
        );
    }

    #[test]
    fn test_unbalanced_quotes_are_config_error() {
        let engine = TesseractEngine::default();
        let err = engine
            .command_args(Path::new("/tmp/page.png"), "-c tessedit_char_whitelist=\"AB")
            .unwrap_err();
        assert!(matches!(err, EngineError::Config { .. }));

        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let err = engine.image_to_data(&image, "--psm 6 '").unwrap_err();
        assert!(matches!(err, EngineError::Config { .. }));
    }

    #[test]
    fn test_missing_executable_is_spawn_error() {
        let engine = TesseractEngine::new("definitely-not-a-real-tesseract-binary");
        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let err = engine.image_to_data(&image, "--psm 6").unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }
}
