//! PDF optimization
//!
//! Lossless rewrite: unreferenced objects and empty streams are dropped, ids
//! are compacted and uncompressed streams are deflated.

use std::path::Path;

use lopdf::Document;

use super::engine::{EngineError, EngineResult};

/// Optimize the document at `input` and write the result to `output`.
pub fn optimize_file(input: &Path, output: &Path) -> EngineResult<()> {
    let original_size = std::fs::metadata(input)?.len();
    let doc = Document::load(input)?;
    let mut optimized = optimize_document(doc)?;
    optimized.save(output)?;

    let optimized_size = std::fs::metadata(output)?.len();
    tracing::debug!(
        original_size,
        optimized_size,
        output = %output.display(),
        "Optimized PDF"
    );
    Ok(())
}

/// Optimize a loaded document in place and hand it back.
pub fn optimize_document(mut doc: Document) -> EngineResult<Document> {
    if doc.get_pages().is_empty() {
        return Err(EngineError::EmptyDocument);
    }

    let pruned = doc.prune_objects();
    let empty = doc.delete_zero_length_streams();
    doc.renumber_objects();
    doc.compress();

    tracing::trace!(
        pruned = pruned.len(),
        empty_streams = empty.len(),
        "Removed unused objects"
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{page_texts, sample_pdf};
    use lopdf::{Dictionary, Object, Stream};

    #[test]
    fn test_optimize_drops_unreferenced_objects() {
        let mut doc = Document::load_mem(&sample_pdf(2, "o")).unwrap();
        doc.add_object(Stream::new(Dictionary::new(), vec![b'x'; 4096]));
        let before = doc.objects.len();

        let optimized = optimize_document(doc).unwrap();
        assert!(optimized.objects.len() < before);
        assert!(optimized.objects.values().all(|o| match o {
            Object::Stream(s) => s.content.len() < 4096,
            _ => true,
        }));
    }

    #[test]
    fn test_optimize_preserves_pages() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        std::fs::write(&input, sample_pdf(3, "k")).unwrap();

        optimize_file(&input, &output).unwrap();

        let reopened = Document::load(&output).unwrap();
        assert_eq!(page_texts(&reopened), vec!["k 1", "k 2", "k 3"]);
    }

    #[test]
    fn test_optimize_rejects_invalid_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        std::fs::write(&input, b"%PDF-garbage").unwrap();

        assert!(optimize_file(&input, &output).is_err());
        assert!(!output.exists());
    }
}
