//! PDF document operations
//!
//! Request-level orchestration around a [`DocumentEngine`]: validate the
//! form, persist uploads into a fresh [`Workspace`], run the engine, read the
//! artifact back and remove the workspace. Every early return drops the
//! workspace, so nothing outlives the request.

use std::path::{Path, PathBuf};

use super::engine::DocumentEngine;
use super::pages::parse_page_ranges;
use super::workspace::{base_file_name, Workspace};
use crate::archive::archive_directory;
use crate::artifact::{ConversionResult, MIME_PDF, MIME_ZIP};
use crate::error::{AppError, Result};
use crate::upload::UploadedFile;

/// The split source lives apart from its outputs, whatever the client named it
const INPUT_DIR: &str = "input";
const PARTS_DIR: &str = "parts";

/// How `/split-pdf` should cut the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMode {
    /// Cut before each of these 1-based pages
    Pages(Vec<u32>),
    /// Consecutive groups of this many pages
    Count(usize),
}

impl SplitMode {
    /// Interpret the `mode`, `pages` and `count` form values.
    pub fn from_form(mode: Option<&str>, pages: Option<&str>, count: Option<&str>) -> Result<Self> {
        match mode.map(str::trim) {
            Some("pages") => {
                let ranges = pages
                    .and_then(|p| parse_page_ranges(p).ok())
                    .ok_or_else(|| AppError::input("Invalid page ranges"))?;
                let points = ranges
                    .into_iter()
                    .map(|p| u32::try_from(p).ok().filter(|p| *p > 0))
                    .collect::<Option<Vec<u32>>>()
                    .ok_or_else(|| AppError::input("Invalid page ranges"))?;
                Ok(SplitMode::Pages(points))
            }
            Some("count") => count
                .and_then(|c| c.trim().parse::<usize>().ok())
                .filter(|c| *c >= 1)
                .map(SplitMode::Count)
                .ok_or_else(|| AppError::input("Invalid page count")),
            _ => Err(AppError::input("Invalid split mode")),
        }
    }
}

/// Merge two or more uploads, in order, into `merged.pdf`.
pub fn merge_pdfs(
    engine: &dyn DocumentEngine,
    workspace_root: &Path,
    uploads: Vec<UploadedFile>,
) -> Result<ConversionResult> {
    if uploads.len() < 2 {
        return Err(AppError::input("at least two PDF files are required"));
    }

    let workspace = Workspace::create(workspace_root, "pdfmerge-")?;

    // Indexed subdirectories keep uploads with the same name apart
    let mut inputs: Vec<PathBuf> = Vec::with_capacity(uploads.len());
    for (index, upload) in uploads.iter().enumerate() {
        let dir = workspace.subdir(&format!("inputs/{}", index))?;
        inputs.push(workspace.persist_in(&dir, &upload.file_name, &upload.data)?);
    }

    let output = workspace.path().join("merged.pdf");
    engine
        .merge(&inputs, &output)
        .map_err(|e| AppError::library("Error merging PDFs", e))?;

    let data = workspace.read(&output)?;
    workspace.close()?;

    tracing::info!(inputs = inputs.len(), size = data.len(), "Merged PDFs");
    Ok(ConversionResult::new(data, MIME_PDF, "merged.pdf"))
}

/// Split an upload and package the parts as `split_pdfs.zip`.
pub fn split_pdf(
    engine: &dyn DocumentEngine,
    workspace_root: &Path,
    upload: UploadedFile,
    mode: SplitMode,
) -> Result<ConversionResult> {
    let workspace = Workspace::create(workspace_root, "pdfsplit-")?;
    let input_dir = workspace.subdir(INPUT_DIR)?;
    let input = workspace.persist_in(&input_dir, &upload.file_name, &upload.data)?;
    let parts_dir = workspace.subdir(PARTS_DIR)?;

    let parts = match &mode {
        SplitMode::Pages(points) => engine.split_by_pages(&input, &parts_dir, points),
        SplitMode::Count(span) => {
            engine.split_by_stride(&input, &parts_dir, &base_file_name(&upload.file_name), *span)
        }
    }
    .map_err(|e| AppError::library("Error splitting PDF", e))?;

    let data = archive_directory(&parts_dir)?;
    workspace.close()?;

    tracing::info!(?mode, parts = parts.len(), size = data.len(), "Split PDF");
    Ok(ConversionResult::new(data, MIME_ZIP, "split_pdfs.zip"))
}

/// Losslessly shrink an upload into `compressed_<original name>`.
pub fn compress_pdf(
    engine: &dyn DocumentEngine,
    workspace_root: &Path,
    upload: UploadedFile,
) -> Result<ConversionResult> {
    let workspace = Workspace::create(workspace_root, "pdfcompress-")?;
    let input = workspace.persist(&upload.file_name, &upload.data)?;

    let filename = format!("compressed_{}", base_file_name(&upload.file_name));
    let output = workspace.path().join(&filename);
    engine
        .optimize(&input, &output)
        .map_err(|e| AppError::library("Error compressing PDF", e))?;

    let data = workspace.read(&output)?;
    workspace.close()?;

    tracing::info!(
        original_size = upload.data.len(),
        size = data.len(),
        "Compressed PDF"
    );
    Ok(ConversionResult::new(data, MIME_PDF, filename))
}
