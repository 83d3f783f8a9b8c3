//! Image routes
//!
//! - POST /convert/jpg-to-png - JPEG to PNG
//! - POST /convert/png-to-jpg - PNG to JPEG
//! - POST /convert/to-pdf - JPEG/PNG to a single A4 page
//! - POST /compress - re-encode at `quality` (1-100, default 50)
//! - POST /resize - scale to `width` x `height`, 0 keeps aspect ratio
//! - POST /transparent - make the border color transparent

use axum::extract::{Multipart, State};

use super::run_blocking;
use crate::artifact::ConversionResult;
use crate::error::Result;
use crate::imaging::transform;
use crate::imaging::SourceFormat;
use crate::state::AppState;
use crate::upload::UploadForm;

const IMAGE_FIELD: &str = "image";

pub async fn jpg_to_png(multipart: Multipart) -> Result<ConversionResult> {
    let upload = UploadForm::read(multipart).await?.require_file(IMAGE_FIELD)?;
    run_blocking("jpg-to-png", move || {
        transform::convert(&upload.data, SourceFormat::Jpeg, SourceFormat::Png)
    })
    .await
}

pub async fn png_to_jpg(multipart: Multipart) -> Result<ConversionResult> {
    let upload = UploadForm::read(multipart).await?.require_file(IMAGE_FIELD)?;
    run_blocking("png-to-jpg", move || {
        transform::convert(&upload.data, SourceFormat::Png, SourceFormat::Jpeg)
    })
    .await
}

pub async fn image_to_pdf(multipart: Multipart) -> Result<ConversionResult> {
    let upload = UploadForm::read(multipart).await?.require_file(IMAGE_FIELD)?;
    run_blocking("to-pdf", move || transform::image_to_pdf(&upload.data)).await
}

pub async fn compress(multipart: Multipart) -> Result<ConversionResult> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.require_file(IMAGE_FIELD)?;
    let quality = transform::parse_quality(form.value("quality"));

    run_blocking("compress", move || transform::compress(&upload.data, quality)).await
}

pub async fn resize(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ConversionResult> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.require_file(IMAGE_FIELD)?;
    let width = transform::parse_dimension(form.value("width"));
    let height = transform::parse_dimension(form.value("height"));
    let max_pixels = state.config().images.max_output_pixels;

    run_blocking("resize", move || {
        transform::resize(&upload.data, width, height, max_pixels)
    })
    .await
}

pub async fn transparent(multipart: Multipart) -> Result<ConversionResult> {
    let upload = UploadForm::read(multipart).await?.require_file(IMAGE_FIELD)?;
    run_blocking("transparent", move || {
        transform::make_background_transparent(&upload.data)
    })
    .await
}
