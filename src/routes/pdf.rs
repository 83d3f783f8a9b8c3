//! PDF routes
//!
//! - POST /merge-pdfs - two or more `pdfs` files into one
//! - POST /split-pdf - `pdf` by `mode=pages&pages=..` or `mode=count&count=..`
//! - POST /compress-pdf - lossless rewrite of `pdf`

use axum::extract::{Multipart, State};

use super::run_blocking;
use crate::artifact::ConversionResult;
use crate::error::Result;
use crate::pdf::{operations, SplitMode};
use crate::state::AppState;
use crate::upload::UploadForm;

pub async fn merge_pdfs(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ConversionResult> {
    let uploads = UploadForm::read(multipart).await?.take_files("pdfs");
    let engine = state.engine();
    let root = state.workspace_root().to_path_buf();

    run_blocking("merge-pdfs", move || {
        operations::merge_pdfs(engine.as_ref(), &root, uploads)
    })
    .await
}

pub async fn split_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ConversionResult> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form.require_file("pdf")?;
    let mode = SplitMode::from_form(form.value("mode"), form.value("pages"), form.value("count"))?;
    let engine = state.engine();
    let root = state.workspace_root().to_path_buf();

    run_blocking("split-pdf", move || {
        operations::split_pdf(engine.as_ref(), &root, upload, mode)
    })
    .await
}

pub async fn compress_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ConversionResult> {
    let upload = UploadForm::read(multipart).await?.require_file("pdf")?;
    let engine = state.engine();
    let root = state.workspace_root().to_path_buf();

    run_blocking("compress-pdf", move || {
        operations::compress_pdf(engine.as_ref(), &root, upload)
    })
    .await
}
