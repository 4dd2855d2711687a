//! Image decoding and optional preprocessing ahead of OCR
//!
//! Input bytes may be any format the `image` crate understands. Everything is
//! normalised to 8-bit RGB before it reaches the engine.

use image::DynamicImage;
use tracing::debug;

use crate::config::Preprocessing;

/// Decode encoded image bytes and apply preprocessing settings
pub fn decode_image(bytes: &[u8], settings: &Preprocessing) -> Result<DynamicImage, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    debug!(
        "Decoded {}x{} image ({:?})",
        decoded.width(),
        decoded.height(),
        decoded.color()
    );

    let rgb = DynamicImage::ImageRgb8(decoded.into_rgb8());
    Ok(apply_preprocessing(rgb, settings))
}

/// Apply preprocessing filters based on settings
pub fn apply_preprocessing(mut image: DynamicImage, settings: &Preprocessing) -> DynamicImage {
    if !settings.enabled {
        return image;
    }

    debug!(
        "OCR preprocessing enabled: grayscale={}, invert={}",
        settings.grayscale, settings.invert
    );

    if settings.grayscale {
        image = image.grayscale();
    }

    // Light text on dark backgrounds reads better inverted
    if settings.invert {
        image.invert();
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(pixel: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(8, 4, Rgba(pixel));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_normalises_to_rgb() {
        let image = decode_image(&png_bytes([10, 20, 30, 255]), &Preprocessing::default()).unwrap();
        assert_eq!(image.color(), ColorType::Rgb8);
        assert_eq!((image.width(), image.height()), (8, 4));
        assert_eq!(image.to_rgb8().get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = decode_image(b"not an image", &Preprocessing::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_disabled_preprocessing_is_noop() {
        let settings = Preprocessing {
            enabled: false,
            grayscale: true,
            invert: true,
        };
        let image = decode_image(&png_bytes([200, 0, 0, 255]), &settings).unwrap();
        assert_eq!(image.to_rgb8().get_pixel(1, 1).0, [200, 0, 0]);
    }

    #[test]
    fn test_grayscale_and_invert() {
        let settings = Preprocessing {
            enabled: true,
            grayscale: true,
            invert: true,
        };
        let image = decode_image(&png_bytes([255, 255, 255, 255]), &settings).unwrap();
        assert_eq!(image.color(), ColorType::L8);
        assert_eq!(image.to_luma8().get_pixel(0, 0).0, [0]);
    }
}
