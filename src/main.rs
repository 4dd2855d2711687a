//! ocr-lines - print the text lines tesseract finds in an image

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ocr_line_reader::config::{self, OcrConfig};
use ocr_line_reader::OcrClient;

/// Read text lines and their bounding polygons from an image
#[derive(Parser, Debug)]
#[command(name = "ocr-lines")]
#[command(version, about = "Reconstruct text lines from per-word OCR output")]
struct Args {
    /// Image file to read (PNG, JPEG, ...)
    image: PathBuf,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Engine mode flags passed to tesseract, e.g. "--oem 3 --psm 6"
    #[arg(long)]
    tesseract_config: Option<String>,

    /// Recognition language(s), e.g. "eng+deu"
    #[arg(short, long)]
    lang: Option<String>,

    /// Print lines as a JSON array
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(tesseract_config) = args.tesseract_config {
        config.tesseract_config = tesseract_config;
    }
    if let Some(lang) = args.lang {
        config.language = Some(lang);
    }

    let image = std::fs::read(&args.image)
        .with_context(|| format!("Failed to read image {}", args.image.display()))?;

    info!("Reading text from {:?}", args.image);
    let client = OcrClient::from_config(&config);

    if args.json {
        let lines = client.read_lines(&image)?;
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(());
    }

    let mut count = 0;
    for line in client.read_text(&image) {
        let line = line?;
        println!("{}\t{:?}", line.text, line.polygon);
        count += 1;
    }
    info!("Found {} lines", count);

    Ok(())
}

/// Load an explicit configuration file, or the default one if present
fn load_config(path: Option<&std::path::Path>) -> Result<OcrConfig> {
    match path {
        Some(path) => {
            let mut config = config::load_config(path)?;
            config.apply_env();
            info!("Loaded configuration from {:?}", path);
            Ok(config)
        }
        None => Ok(config::load_or_default()),
    }
}
