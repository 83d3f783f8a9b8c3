//! Conversion results
//!
//! Every operation hands back a [`ConversionResult`]: the produced bytes, the
//! MIME type and a suggested download name.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_ZIP: &str = "application/zip";

/// Output artifact of a conversion, never persisted beyond the response
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub data: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

impl ConversionResult {
    pub fn new(data: Vec<u8>, content_type: &'static str, filename: impl Into<String>) -> Self {
        Self {
            data,
            content_type,
            filename: filename.into(),
        }
    }

    fn content_disposition(&self) -> String {
        // Quotes and control characters would break the header value
        let name: String = self
            .filename
            .chars()
            .filter(|c| !c.is_control() && *c != '"')
            .collect();
        format!("attachment; filename=\"{}\"", name)
    }
}

impl IntoResponse for ConversionResult {
    fn into_response(self) -> Response {
        let disposition = self.content_disposition();
        let length = self.data.len();

        let mut response = Response::new(Body::from(self.data));
        *response.status_mut() = StatusCode::OK;
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static(self.content_type),
        );
        headers.insert(header::CONTENT_LENGTH, header::HeaderValue::from(length));
        match header::HeaderValue::from_str(&disposition) {
            Ok(value) => {
                headers.insert(header::CONTENT_DISPOSITION, value);
            }
            Err(e) => {
                tracing::warn!("Dropping Content-Disposition for {:?}: {}", disposition, e);
                headers.insert(
                    header::CONTENT_DISPOSITION,
                    header::HeaderValue::from_static("attachment"),
                );
            }
        }
        response
    }
}
