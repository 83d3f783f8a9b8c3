//! PDF merging
//!
//! Concatenates documents by renumbering each one into a disjoint object id
//! range, keeping every object except the catalogs, page trees and outlines,
//! and building a fresh page tree over all pages in input order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::engine::{EngineError, EngineResult};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Object types replaced by the merged document's own structure
const STRUCTURAL_TYPES: [&[u8]; 4] = [b"Catalog", b"Pages", b"Outlines", b"Outline"];

/// Merge the files at `inputs`, in order, into `output`.
pub fn merge_files(inputs: &[PathBuf], output: &Path) -> EngineResult<()> {
    if inputs.len() < 2 {
        return Err(EngineError::NotEnoughDocuments(inputs.len()));
    }

    let documents = inputs
        .iter()
        .map(Document::load)
        .collect::<Result<Vec<_>, _>>()?;

    let mut merged = merge_documents(documents)?;
    merged.save(output)?;

    tracing::debug!(
        inputs = inputs.len(),
        pages = merged.get_pages().len(),
        output = %output.display(),
        "Merged PDFs"
    );
    Ok(())
}

/// Merge loaded documents in order.
pub fn merge_documents(documents: Vec<Document>) -> EngineResult<Document> {
    let mut next_id = 1;
    let mut version = String::from("1.5");
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        inline_inherited_attributes(&mut doc);
        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        if doc.version > version {
            version = doc.version.clone();
        }

        page_ids.extend(doc.get_pages().into_values());
        objects.extend(doc.objects);
    }

    if page_ids.is_empty() {
        return Err(EngineError::EmptyDocument);
    }

    let mut merged = Document::with_version(version);
    merged.objects = objects
        .into_iter()
        .filter(|(_, object)| !is_structural(object))
        .collect();
    merged.max_id = next_id;

    let pages_id = merged.new_object_id();
    for page_id in &page_ids {
        if let Ok(page) = merged.get_dictionary_mut(*page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(page_ids.len() as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().copied().map(Object::Reference).collect()),
        ),
    ]);
    merged.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = merged.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    merged.trailer.set("Root", Object::Reference(catalog_id));

    // Drop whatever only the discarded catalogs referenced
    merged.prune_objects();
    merged.renumber_objects();
    merged.compress();

    Ok(merged)
}

fn is_structural(object: &Object) -> bool {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return false,
    };
    match dict.get(b"Type") {
        Ok(Object::Name(name)) => STRUCTURAL_TYPES.contains(&name.as_slice()),
        _ => false,
    }
}

/// Copy inherited attributes onto each page so pages survive losing their
/// original page tree.
pub(super) fn inline_inherited_attributes(doc: &mut Document) {
    for page_id in doc.get_pages().into_values() {
        let Ok(page) = doc.get_dictionary(page_id) else {
            continue;
        };

        let inherited: Vec<(&[u8], Object)> = INHERITABLE_KEYS
            .iter()
            .filter(|key| !page.has(**key))
            .filter_map(|key| find_inherited(doc, page, key).map(|value| (*key, value)))
            .collect();

        if inherited.is_empty() {
            continue;
        }
        if let Ok(page) = doc.get_dictionary_mut(page_id) {
            for (key, value) in inherited {
                page.set(key.to_vec(), value);
            }
        }
    }
}

fn find_inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    // Guard against cyclic Parent chains in malformed files
    let mut depth = 0;
    while let Some(id) = parent {
        if depth > 64 {
            break;
        }
        let node = doc.get_dictionary(id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }
    None
}
