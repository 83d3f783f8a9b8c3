//! File conversion server
//!
//! A stateless HTTP service that converts, compresses, resizes and
//! background-strips JPEG/PNG images, renders images to single-page PDFs and
//! merges, splits and compresses PDF documents. Nothing outlives a request:
//! artifacts are returned as the response body and every temporary file lives
//! in a request-scoped workspace.
//!
//! # Modules
//!
//! - `imaging`: image codecs, background detection and pixel transforms
//! - `pdf`: document engine and the workspace-backed PDF operations
//! - `routes`: axum handlers
//! - `archive`: zip packaging of split results

pub mod archive;
pub mod artifact;
pub mod config;
pub mod error;
pub mod imaging;
pub mod pdf;
pub mod routes;
pub mod state;
pub mod upload;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
pub use state::AppState;

/// Build the complete application with request tracing, panic recovery and
/// CORS applied.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors);

    routes::router(state)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
