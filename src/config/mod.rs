//! Reader Configuration
//!
//! Engine settings stored in TOML format, with environment overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Engine mode string used when nothing else is configured
pub const DEFAULT_TESSERACT_CONFIG: &str = "--oem 3 --psm 6";

/// Environment variable overriding the tesseract executable
pub const ENV_TESSERACT_CMD: &str = "OCR_TESSERACT_CMD";
/// Environment variable overriding the engine mode string
pub const ENV_TESSERACT_CONFIG: &str = "OCR_TESSERACT_CONFIG";
/// Environment variable overriding the recognition language
pub const ENV_LANGUAGE: &str = "OCR_LANGUAGE";

/// OCR reader settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable name or path
    pub tesseract_cmd: String,
    /// Page segmentation and engine mode flags, passed through verbatim
    pub tesseract_config: String,
    /// Recognition language(s), e.g. "eng" or "eng+deu"
    pub language: Option<String>,
    /// Image preprocessing before recognition
    pub preprocessing: Preprocessing,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".to_string(),
            tesseract_config: DEFAULT_TESSERACT_CONFIG.to_string(),
            language: None,
            preprocessing: Preprocessing::default(),
        }
    }
}

impl OcrConfig {
    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(cmd) = lookup(ENV_TESSERACT_CMD).filter(|v| !v.trim().is_empty()) {
            self.tesseract_cmd = cmd;
        }
        if let Some(config) = lookup(ENV_TESSERACT_CONFIG) {
            self.tesseract_config = config;
        }
        if let Some(language) = lookup(ENV_LANGUAGE) {
            self.language = Some(language).filter(|v| !v.trim().is_empty());
        }
    }
}

/// Optional image filters applied after decoding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preprocessing {
    /// Master switch for the filters below
    pub enabled: bool,
    /// Convert to grayscale
    pub grayscale: bool,
    /// Invert colors
    pub invert: bool,
}

/// Get the configuration directory
pub fn config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "ocrlinereader", "OcrLineReader")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<OcrConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: OcrConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &OcrConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load configuration from the default location or fall back to defaults,
/// then apply environment overrides
pub fn load_or_default() -> OcrConfig {
    let mut config = config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok()
        .filter(|path| path.exists())
        .and_then(|path| match load_config(&path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                Some(config)
            }
            Err(e) => {
                warn!("Ignoring unreadable configuration: {:#}", e);
                None
            }
        })
        .unwrap_or_else(|| {
            info!("Using default configuration");
            OcrConfig::default()
        });

    config.apply_env();
    config
}
