//! Image decoding and encoding
//!
//! Thin layer over the `image` crate that restricts the pipeline to JPEG and
//! PNG and keeps the detected source format next to the decoded pixels.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};

use crate::artifact::{MIME_JPEG, MIME_PNG};
use crate::error::{AppError, Result};

/// Quality used when no explicit JPEG quality is requested
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Formats the pipeline accepts and produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
}

impl SourceFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            SourceFormat::Jpeg => MIME_JPEG,
            SourceFormat::Png => MIME_PNG,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "jpg",
            SourceFormat::Png => "png",
        }
    }

    /// Short codec name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "JPG",
            SourceFormat::Png => "PNG",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            SourceFormat::Jpeg => ImageFormat::Jpeg,
            SourceFormat::Png => ImageFormat::Png,
        }
    }
}

/// Decoded image together with the format it came from
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub pixels: DynamicImage,
    pub format: SourceFormat,
}

impl RasterImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Encoder settings
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// JPEG quality 1-100; ignored for PNG
    pub quality: Option<u8>,
}

/// Identify the format from magic bytes without decoding.
pub fn detect_format(bytes: &[u8]) -> Result<SourceFormat> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => Ok(SourceFormat::Jpeg),
        Ok(ImageFormat::Png) => Ok(SourceFormat::Png),
        Ok(other) => Err(AppError::UnsupportedFormat(format!("{:?}", other))),
        Err(_) => Err(AppError::Decode("Failed to decode image".to_string())),
    }
}

/// Decode with automatic format detection.
pub fn decode_image(bytes: &[u8]) -> Result<RasterImage> {
    let format = detect_format(bytes)?;
    let pixels = image::load_from_memory_with_format(bytes, format.image_format())
        .map_err(|e| {
            tracing::debug!("Image decode failed: {}", e);
            AppError::Decode("Failed to decode image".to_string())
        })?;

    Ok(RasterImage { pixels, format })
}

/// Decode strictly as `expected`; bytes of any other codec are rejected.
pub fn decode_image_as(bytes: &[u8], expected: SourceFormat) -> Result<RasterImage> {
    let pixels = image::load_from_memory_with_format(bytes, expected.image_format())
        .map_err(|e| {
            tracing::debug!("Strict {} decode failed: {}", expected.label(), e);
            AppError::Decode(format!("Failed to decode {}", expected.label()))
        })?;

    Ok(RasterImage {
        pixels,
        format: expected,
    })
}

/// Encode `image` as `format`.
///
/// JPEG has no alpha channel, so translucent pixels are flattened against
/// black first.
pub fn encode_image(
    image: &DynamicImage,
    format: SourceFormat,
    options: EncodeOptions,
) -> std::result::Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    match format {
        SourceFormat::Jpeg => {
            let quality = options.quality.unwrap_or(DEFAULT_JPEG_QUALITY).clamp(1, 100);
            let flattened = flatten_alpha(image);
            let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            encoder.encode_image(&flattened)?;
        }
        SourceFormat::Png => {
            image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        }
    }
    Ok(buf)
}

/// Composite onto an opaque black canvas.
///
/// Each channel is premultiplied by alpha, so fully transparent pixels become
/// black and opaque pixels are unchanged.
pub fn flatten_alpha(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let scale = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
        image::Rgb([scale(r), scale(g), scale(b)])
    })
}
