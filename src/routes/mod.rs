//! HTTP routes
//!
//! Every operation route is a `POST` taking `multipart/form-data`. Handlers
//! buffer the form, then run the synchronous operation on tokio's blocking
//! pool inside a span carrying a fresh request id.

pub mod health;
pub mod images;
pub mod pdf;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::artifact::ConversionResult;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Build the route table with the configured body-size ceiling.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config().uploads.max_body_bytes;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/convert/jpg-to-png", post(images::jpg_to_png))
        .route("/convert/png-to-jpg", post(images::png_to_jpg))
        .route("/convert/to-pdf", post(images::image_to_pdf))
        .route("/compress", post(images::compress))
        .route("/resize", post(images::resize))
        .route("/transparent", post(images::transparent))
        .route("/merge-pdfs", post(pdf::merge_pdfs))
        .route("/split-pdf", post(pdf::split_pdf))
        .route("/compress-pdf", post(pdf::compress_pdf))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Run a synchronous operation on the blocking pool.
pub(crate) async fn run_blocking<F>(operation: &'static str, f: F) -> Result<ConversionResult>
where
    F: FnOnce() -> Result<ConversionResult> + Send + 'static,
{
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("operation", %request_id, operation);

    let result = tokio::task::spawn_blocking(move || span.in_scope(f))
        .await
        .map_err(|e| AppError::Internal(format!("{} task failed: {}", operation, e)))?;

    match &result {
        Ok(artifact) => tracing::debug!(
            %request_id,
            operation,
            size = artifact.data.len(),
            filename = %artifact.filename,
            "Operation complete"
        ),
        Err(e) => tracing::debug!(%request_id, operation, "Operation failed: {}", e),
    }
    result
}
