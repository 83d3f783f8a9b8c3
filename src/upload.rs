//! Multipart upload extraction
//!
//! Buffers a `multipart/form-data` body into file parts and plain values.
//! The body-size ceiling is enforced by `DefaultBodyLimit` while the fields
//! are read, so an oversized upload fails here before any work starts.

use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use crate::error::{AppError, Result};

/// A file part of a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            data,
        }
    }
}

/// A fully read multipart form
#[derive(Debug, Default)]
pub struct UploadForm {
    files: Vec<UploadedFile>,
    values: HashMap<String, String>,
}

impl UploadForm {
    /// Read every field of the request body.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();
            let file_name = field.file_name().map(|s| s.to_string());

            match file_name {
                Some(file_name) => {
                    let data = field.bytes().await.map_err(multipart_error)?;
                    tracing::debug!(
                        field = %name,
                        file_name = %file_name,
                        size = data.len(),
                        "Received file part"
                    );
                    form.files.push(UploadedFile::new(name, file_name, data.to_vec()));
                }
                None => {
                    let value = field.text().await.map_err(multipart_error)?;
                    form.values.entry(name).or_insert(value);
                }
            }
        }

        Ok(form)
    }

    /// The first file sent under `field`.
    pub fn require_file(&mut self, field: &str) -> Result<UploadedFile> {
        let index = self
            .files
            .iter()
            .position(|f| f.field == field)
            .ok_or_else(|| AppError::input("Failed to get uploaded file"))?;
        Ok(self.files.remove(index))
    }

    /// Every file sent under `field`, in upload order.
    pub fn take_files(&mut self, field: &str) -> Vec<UploadedFile> {
        let (matching, rest) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|f| f.field == field);
        self.files = rest;
        matching
    }

    /// The first plain value sent under `field`, trimmed.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(|v| v.trim())
    }

    #[cfg(test)]
    pub(crate) fn from_parts(files: Vec<UploadedFile>, values: &[(&str, &str)]) -> Self {
        Self {
            files,
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        tracing::debug!("Failed to read multipart body: {}", err);
        AppError::input("Error parsing form data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(field: &str, name: &str) -> UploadedFile {
        UploadedFile::new(field, name, name.as_bytes().to_vec())
    }

    #[test]
    fn test_require_file_missing() {
        let mut form = UploadForm::from_parts(vec![file("other", "a.png")], &[]);
        let err = form.require_file("image").unwrap_err();
        assert_eq!(err.to_string(), "Failed to get uploaded file");
    }

    #[test]
    fn test_take_files_keeps_order() {
        let mut form = UploadForm::from_parts(
            vec![
                file("pdfs", "b.pdf"),
                file("image", "x.png"),
                file("pdfs", "a.pdf"),
            ],
            &[],
        );
        let names: Vec<_> = form
            .take_files("pdfs")
            .into_iter()
            .map(|f| f.file_name)
            .collect();
        assert_eq!(names, vec!["b.pdf", "a.pdf"]);
        assert!(form.take_files("pdfs").is_empty());
        assert_eq!(form.require_file("image").unwrap().file_name, "x.png");
    }

    #[test]
    fn test_value_is_trimmed() {
        let form = UploadForm::from_parts(vec![], &[("mode", " pages "), ("count", "")]);
        assert_eq!(form.value("mode"), Some("pages"));
        assert_eq!(form.value("count"), Some(""));
        assert_eq!(form.value("width"), None);
    }
}
