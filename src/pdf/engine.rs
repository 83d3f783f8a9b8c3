//! Document engine
//!
//! The file-level PDF capabilities the operations rely on. [`LopdfEngine`]
//! is the production implementation; the trait keeps the workspace
//! orchestration independent of it.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{merge, optimize, split};

/// Document engine failures
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document has no pages")]
    EmptyDocument,

    #[error("page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("page span must be at least 1")]
    InvalidSpan,

    #[error("at least two documents are required to merge, got {0}")]
    NotEnoughDocuments(usize),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// File-based PDF operations
pub trait DocumentEngine: Send + Sync {
    /// Concatenate `inputs` in order into `output`.
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> EngineResult<()>;

    /// Cut `input` before each page in `split_points`, writing one file per
    /// span into `output_dir`.
    fn split_by_pages(
        &self,
        input: &Path,
        output_dir: &Path,
        split_points: &[u32],
    ) -> EngineResult<Vec<PathBuf>>;

    /// Write consecutive groups of `span` pages into `output_dir`, naming
    /// the files after `original_name`.
    fn split_by_stride(
        &self,
        input: &Path,
        output_dir: &Path,
        original_name: &str,
        span: usize,
    ) -> EngineResult<Vec<PathBuf>>;

    /// Rewrite `input` into a smaller `output`.
    fn optimize(&self, input: &Path, output: &Path) -> EngineResult<()>;
}

/// Pure-Rust engine backed by `lopdf`
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfEngine;

impl DocumentEngine for LopdfEngine {
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> EngineResult<()> {
        merge::merge_files(inputs, output)
    }

    fn split_by_pages(
        &self,
        input: &Path,
        output_dir: &Path,
        split_points: &[u32],
    ) -> EngineResult<Vec<PathBuf>> {
        let stem = file_stem(input);
        split::split_at_pages(input, output_dir, &stem, split_points)
    }

    fn split_by_stride(
        &self,
        input: &Path,
        output_dir: &Path,
        original_name: &str,
        span: usize,
    ) -> EngineResult<Vec<PathBuf>> {
        let stem = file_stem(Path::new(original_name));
        split::split_by_span(input, output_dir, &stem, span)
    }

    fn optimize(&self, input: &Path, output: &Path) -> EngineResult<()> {
        optimize::optimize_file(input, output)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document")
        .to_string()
}
