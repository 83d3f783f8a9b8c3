//! PDF splitting
//!
//! Both split flavours reduce to writing page spans: each span is produced
//! from a clone of the source whose page tree is cut down to the span.

use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId};

use super::engine::{EngineError, EngineResult};
use super::merge::inline_inherited_attributes;

/// Inclusive, 1-based page span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    pub from: u32,
    pub to: u32,
}

impl PageSpan {
    /// `<stem>_<n>.pdf` for single pages, `<stem>_<from>-<to>.pdf` otherwise
    pub fn file_name(&self, stem: &str) -> String {
        if self.from == self.to {
            format!("{}_{}.pdf", stem, self.from)
        } else {
            format!("{}_{}-{}.pdf", stem, self.from, self.to)
        }
    }
}

/// Spans produced by cutting before each split point.
///
/// Points are sorted and deduplicated; point 1 starts the first span anyway.
/// Points past the last page are rejected.
pub fn spans_at_points(page_count: u32, split_points: &[u32]) -> EngineResult<Vec<PageSpan>> {
    if page_count == 0 {
        return Err(EngineError::EmptyDocument);
    }

    let mut points: Vec<u32> = split_points.to_vec();
    points.sort_unstable();
    points.dedup();

    if let Some(&page) = points.iter().find(|&&p| p == 0 || p > page_count) {
        return Err(EngineError::PageOutOfRange { page, page_count });
    }

    let mut spans = Vec::with_capacity(points.len() + 1);
    let mut from = 1;
    for point in points.into_iter().filter(|&p| p > 1) {
        spans.push(PageSpan { from, to: point - 1 });
        from = point;
    }
    spans.push(PageSpan {
        from,
        to: page_count,
    });
    Ok(spans)
}

/// Consecutive spans of `span` pages; the last one may be shorter.
pub fn spans_by_stride(page_count: u32, span: usize) -> EngineResult<Vec<PageSpan>> {
    if span == 0 {
        return Err(EngineError::InvalidSpan);
    }
    if page_count == 0 {
        return Err(EngineError::EmptyDocument);
    }

    let step = u32::try_from(span).unwrap_or(u32::MAX);
    let mut spans = Vec::new();
    let mut from = 1u32;
    while from <= page_count {
        let to = from.saturating_add(step - 1).min(page_count);
        spans.push(PageSpan { from, to });
        if to == page_count {
            break;
        }
        from = to + 1;
    }
    Ok(spans)
}

/// Split `input` before every page in `split_points`.
pub fn split_at_pages(
    input: &Path,
    output_dir: &Path,
    stem: &str,
    split_points: &[u32],
) -> EngineResult<Vec<PathBuf>> {
    let doc = Document::load(input)?;
    let spans = spans_at_points(page_count(&doc), split_points)?;
    write_spans(&doc, &spans, output_dir, stem)
}

/// Split `input` into groups of `span` pages.
pub fn split_by_span(
    input: &Path,
    output_dir: &Path,
    stem: &str,
    span: usize,
) -> EngineResult<Vec<PathBuf>> {
    let doc = Document::load(input)?;
    let spans = spans_by_stride(page_count(&doc), span)?;
    write_spans(&doc, &spans, output_dir, stem)
}

fn page_count(doc: &Document) -> u32 {
    doc.get_pages().len() as u32
}

fn write_spans(
    doc: &Document,
    spans: &[PageSpan],
    output_dir: &Path,
    stem: &str,
) -> EngineResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(spans.len());
    for span in spans {
        let mut part = extract_span(doc, *span);
        let path = output_dir.join(span.file_name(stem));
        part.save(&path)?;
        written.push(path);
    }

    tracing::debug!(
        parts = written.len(),
        output_dir = %output_dir.display(),
        "Split PDF"
    );
    Ok(written)
}

/// Copy of `doc` holding only the pages in `span`.
///
/// The kept pages are hung directly off the root page tree node and
/// everything no longer reachable is pruned.
pub fn extract_span(doc: &Document, span: PageSpan) -> Document {
    let mut part = doc.clone();
    inline_inherited_attributes(&mut part);

    let kept: Vec<ObjectId> = part
        .get_pages()
        .range(span.from..=span.to)
        .map(|(_, id)| *id)
        .collect();

    let root_pages = part
        .catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference);

    if let Ok(root_id) = root_pages {
        for page_id in &kept {
            if let Ok(page) = part.get_dictionary_mut(*page_id) {
                page.set("Parent", Object::Reference(root_id));
            }
        }
        if let Ok(root) = part.get_dictionary_mut(root_id) {
            root.set(
                "Kids",
                Object::Array(kept.iter().copied().map(Object::Reference).collect()),
            );
            root.set("Count", Object::Integer(kept.len() as i64));
        }
    }

    part.prune_objects();
    part.renumber_objects();
    part.compress();
    part
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{page_texts, sample_pdf, sample_pdf_with_inherited_mediabox};

    #[test]
    fn test_spans_at_points() {
        assert_eq!(
            spans_at_points(6, &[2, 4]).unwrap(),
            vec![
                PageSpan { from: 1, to: 1 },
                PageSpan { from: 2, to: 3 },
                PageSpan { from: 4, to: 6 },
            ]
        );
    }

    #[test]
    fn test_spans_at_points_sorts_and_dedups() {
        assert_eq!(
            spans_at_points(5, &[4, 1, 4, 3]).unwrap(),
            vec![
                PageSpan { from: 1, to: 2 },
                PageSpan { from: 3, to: 3 },
                PageSpan { from: 4, to: 5 },
            ]
        );
    }

    #[test]
    fn test_spans_at_points_out_of_range() {
        assert!(matches!(
            spans_at_points(3, &[2, 9]),
            Err(EngineError::PageOutOfRange { page: 9, page_count: 3 })
        ));
    }

    #[test]
    fn test_spans_by_stride() {
        assert_eq!(
            spans_by_stride(5, 2).unwrap(),
            vec![
                PageSpan { from: 1, to: 2 },
                PageSpan { from: 3, to: 4 },
                PageSpan { from: 5, to: 5 },
            ]
        );
        assert_eq!(spans_by_stride(4, 10).unwrap(), vec![PageSpan { from: 1, to: 4 }]);
        assert!(matches!(spans_by_stride(4, 0), Err(EngineError::InvalidSpan)));
        assert!(matches!(spans_by_stride(0, 1), Err(EngineError::EmptyDocument)));
    }

    #[test]
    fn test_stride_span_count_is_ceiling() {
        for pages in 3..=12u32 {
            let spans = spans_by_stride(pages, 2).unwrap();
            assert_eq!(spans.len() as u32, pages.div_ceil(2));
        }
    }

    #[test]
    fn test_span_file_names() {
        assert_eq!(PageSpan { from: 3, to: 3 }.file_name("doc"), "doc_3.pdf");
        assert_eq!(PageSpan { from: 1, to: 4 }.file_name("doc"), "doc_1-4.pdf");
    }

    #[test]
    fn test_extract_span_keeps_requested_pages() {
        let doc = Document::load_mem(&sample_pdf(5, "p")).unwrap();
        let mut part = extract_span(&doc, PageSpan { from: 2, to: 4 });

        let mut bytes = Vec::new();
        part.save_to(&mut bytes).unwrap();
        let reopened = Document::load_mem(&bytes).unwrap();
        assert_eq!(page_texts(&reopened), vec!["p 2", "p 3", "p 4"]);
    }

    #[test]
    fn test_extract_span_keeps_inherited_mediabox() {
        let doc = Document::load_mem(&sample_pdf_with_inherited_mediabox(3)).unwrap();
        let part = extract_span(&doc, PageSpan { from: 2, to: 2 });

        let pages = part.get_pages();
        assert_eq!(pages.len(), 1);
        let page = part.get_dictionary(pages[&1]).unwrap();
        assert!(page.has(b"MediaBox"));
    }

    #[test]
    fn test_split_by_span_writes_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("book.pdf");
        std::fs::write(&input, sample_pdf(5, "b")).unwrap();
        let out = dir.path().join("parts");
        std::fs::create_dir(&out).unwrap();

        let written = split_by_span(&input, &out, "book", 2).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["book_1-2.pdf", "book_3-4.pdf", "book_5.pdf"]);

        let last = Document::load(&written[2]).unwrap();
        assert_eq!(page_texts(&last), vec!["b 5"]);
    }

    #[test]
    fn test_split_single_pages_of_long_document() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("long.pdf");
        std::fs::write(&input, sample_pdf(300, "l")).unwrap();
        let out = dir.path().join("parts");
        std::fs::create_dir(&out).unwrap();

        let started = std::time::Instant::now();
        let written = split_by_span(&input, &out, "long", 1).unwrap();
        let elapsed = started.elapsed();

        assert_eq!(written.len(), 300);
        assert!(
            elapsed < std::time::Duration::from_secs(20),
            "splitting 300 pages took {:?}",
            elapsed
        );

        let middle = Document::load(&written[149]).unwrap();
        assert_eq!(page_texts(&middle), vec!["l 150"]);
    }
}
