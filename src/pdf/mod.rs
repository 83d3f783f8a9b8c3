//! PDF handling
//!
//! - `builder`: single-page documents wrapping a JPEG (image-to-PDF)
//! - `engine`: the [`DocumentEngine`] trait and its lopdf implementation
//! - `operations`: merge, split and compress requests over a workspace
//! - `pages`: page list parsing for split requests

pub mod builder;
pub mod engine;
pub mod merge;
pub mod operations;
pub mod optimize;
pub mod pages;
pub mod split;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{DocumentEngine, EngineError, LopdfEngine};
pub use operations::{compress_pdf, merge_pdfs, split_pdf, SplitMode};
pub use pages::{parse_page_ranges, PageRangeError};
pub use workspace::Workspace;
