//! Image transform operations
//!
//! Each operation takes the uploaded bytes, decodes them, transforms the
//! pixels and returns the encoded artifact. All of them are synchronous and
//! are expected to run on a blocking worker.

use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};

use super::codec::{
    decode_image, decode_image_as, encode_image, EncodeOptions, RasterImage, SourceFormat,
};
use super::color::{detect_background_color, is_color_match, Rgba16Image};
use crate::artifact::{ConversionResult, MIME_PDF, MIME_PNG};
use crate::error::{AppError, Result};
use crate::pdf::builder::{PageImage, SinglePageDocument};

/// Quality applied when the request omits one or gives an invalid value
pub const DEFAULT_COMPRESS_QUALITY: u8 = 50;

/// JPEG quality of images embedded into PDFs
pub const PDF_IMAGE_QUALITY: u8 = 90;

/// Left and top margin of the embedded image, in millimetres
pub const PDF_IMAGE_MARGIN_MM: f32 = 10.0;

/// Width of the embedded image, in millimetres
pub const PDF_IMAGE_WIDTH_MM: f32 = 190.0;

// ============================================================================
// Parameter parsing
// ============================================================================

/// Parse a compression quality, substituting the default when absent or
/// outside 1-100.
pub fn parse_quality(value: Option<&str>) -> u8 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|q| (1..=100).contains(q))
        .map(|q| q as u8)
        .unwrap_or(DEFAULT_COMPRESS_QUALITY)
}

/// Parse a target dimension; invalid or negative values coerce to 0.
pub fn parse_dimension(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Resolve the output size, deriving a zero dimension from the other one so
/// the aspect ratio is kept.
pub fn target_dimensions(source: (u32, u32), requested: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    match requested {
        (0, 0) => source,
        (0, h) => {
            let w = (u64::from(src_w) * u64::from(h) + u64::from(src_h) / 2) / u64::from(src_h.max(1));
            (w.clamp(1, u64::from(u32::MAX)) as u32, h)
        }
        (w, 0) => {
            let h = (u64::from(src_h) * u64::from(w) + u64::from(src_w) / 2) / u64::from(src_w.max(1));
            (w, h.clamp(1, u64::from(u32::MAX)) as u32)
        }
        exact => exact,
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Strictly decode `from` and re-encode as `to` with default settings.
pub fn convert(bytes: &[u8], from: SourceFormat, to: SourceFormat) -> Result<ConversionResult> {
    let image = decode_image_as(bytes, from)?;

    let data = encode_image(&image.pixels, to, EncodeOptions::default())
        .map_err(|e| AppError::transform(encode_context(to), e))?;

    tracing::debug!(
        from = from.label(),
        to = to.label(),
        width = image.width(),
        height = image.height(),
        "Converted image"
    );

    Ok(ConversionResult::new(
        data,
        to.content_type(),
        format!("converted.{}", to.extension()),
    ))
}

/// Re-encode in the detected format; `quality` only affects JPEG output.
pub fn compress(bytes: &[u8], quality: u8) -> Result<ConversionResult> {
    let image = decode_image(bytes)?;

    let data = encode_image(
        &image.pixels,
        image.format,
        EncodeOptions {
            quality: Some(quality),
        },
    )
    .map_err(|e| AppError::transform("Failed to compress image", e))?;

    tracing::debug!(
        format = image.format.label(),
        quality,
        input_bytes = bytes.len(),
        output_bytes = data.len(),
        "Compressed image"
    );

    Ok(ConversionResult::new(
        data,
        image.format.content_type(),
        format!("compressed.{}", image.format.extension()),
    ))
}

/// Resample with Lanczos3 to the requested size.
///
/// At least one of `width`/`height` must be positive; a zero keeps the
/// aspect ratio.
pub fn resize(bytes: &[u8], width: u32, height: u32, max_pixels: u64) -> Result<ConversionResult> {
    if width == 0 && height == 0 {
        return Err(AppError::input(
            "At least one of width or height must be a positive integer",
        ));
    }

    let image = decode_image(bytes)?;
    let (w, h) = target_dimensions((image.width(), image.height()), (width, height));
    if u64::from(w) * u64::from(h) > max_pixels {
        return Err(AppError::input(format!(
            "Target size {}x{} exceeds the limit of {} pixels",
            w, h, max_pixels
        )));
    }

    let resized = resize_raster(&image, width, height);

    let data = encode_image(&resized, image.format, EncodeOptions::default())
        .map_err(|e| AppError::transform("Failed to encode resized image", e))?;

    Ok(ConversionResult::new(
        data,
        image.format.content_type(),
        format!("resized.{}", image.format.extension()),
    ))
}

pub fn resize_raster(image: &RasterImage, width: u32, height: u32) -> DynamicImage {
    let (w, h) = target_dimensions((image.width(), image.height()), (width, height));
    tracing::debug!(
        from_width = image.width(),
        from_height = image.height(),
        to_width = w,
        to_height = h,
        "Resizing image"
    );
    image.pixels.resize_exact(w, h, FilterType::Lanczos3)
}

/// Make every pixel matching the detected edge background transparent.
/// Output is always PNG.
pub fn make_background_transparent(bytes: &[u8]) -> Result<ConversionResult> {
    let image = decode_image(bytes)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(AppError::input("Image has no pixels"));
    }

    let masked = remove_background(&image.pixels.to_rgba16());
    let data = encode_image(
        &DynamicImage::ImageRgba8(masked),
        SourceFormat::Png,
        EncodeOptions::default(),
    )
    .map_err(|e| AppError::transform("Failed to encode PNG", e))?;

    Ok(ConversionResult::new(data, MIME_PNG, "transparent.png"))
}

/// Chroma-key the grid against its own background color.
pub fn remove_background(source: &Rgba16Image) -> RgbaImage {
    let (width, height) = source.dimensions();
    let Some(background) = detect_background_color(source) else {
        return RgbaImage::new(width, height);
    };
    let key = background.color.to_rgba16();

    tracing::debug!(
        color = ?background.color,
        samples = background.count,
        "Detected background color"
    );

    let mut cleared = 0usize;
    let output = RgbaImage::from_fn(width, height, |x, y| {
        let pixel = *source.get_pixel(x, y);
        if is_color_match(pixel, key) {
            cleared += 1;
            Rgba([0, 0, 0, 0])
        } else {
            let [r, g, b, a] = pixel.0;
            Rgba([(r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8, (a >> 8) as u8])
        }
    });

    tracing::debug!(cleared, total = u64::from(width) * u64::from(height), "Removed background");
    output
}

/// Embed the image into a single A4 page.
pub fn image_to_pdf(bytes: &[u8]) -> Result<ConversionResult> {
    let image = decode_image(bytes)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(AppError::input("Image has no pixels"));
    }

    // encode_image flattens alpha against black for JPEG output
    let jpeg = encode_image(
        &image.pixels,
        SourceFormat::Jpeg,
        EncodeOptions {
            quality: Some(PDF_IMAGE_QUALITY),
        },
    )
    .map_err(|e| AppError::transform("Failed to encode image", e))?;

    let mut document = SinglePageDocument::a4();
    document.place_image(
        PageImage {
            jpeg,
            pixel_width: image.width(),
            pixel_height: image.height(),
        },
        PDF_IMAGE_MARGIN_MM,
        PDF_IMAGE_MARGIN_MM,
        PDF_IMAGE_WIDTH_MM,
        None,
    );

    let data = document
        .render()
        .map_err(|e| AppError::transform("Failed to generate PDF", e))?;

    Ok(ConversionResult::new(data, MIME_PDF, "converted.pdf"))
}

fn encode_context(format: SourceFormat) -> &'static str {
    match format {
        SourceFormat::Jpeg => "Failed to encode JPG",
        SourceFormat::Png => "Failed to encode PNG",
    }
}
