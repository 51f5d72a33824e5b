// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document merge engine: concatenate PDFs in order using `lopdf`.
//
// Each source page is deep-copied, together with every object it references,
// into a fresh document whose page tree lists the pages in source order.
// Attributes a page inherits from its page-tree ancestors (resources, boxes,
// rotation) are materialised on the copied page, since the ancestors
// themselves are not carried over.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bindery_core::MissingSourcePolicy;
use bindery_core::error::{BuildError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, instrument, warn};

use crate::output;

/// Page attributes that may be inherited from the page tree (ISO 32000 §7.7.3.4).
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed, cyclic /Parent chains.
const MAX_TREE_DEPTH: usize = 64;

/// Result of one merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    /// Number of sources that made it into the output.
    pub sources_merged: usize,
    /// Sources left out under [`MissingSourcePolicy::Skip`].
    pub skipped: Vec<PathBuf>,
    /// Pages in the output. `None` when a lone source was copied verbatim.
    pub page_count: Option<usize>,
}

/// Concatenates PDF files into one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentMerger {
    missing: MissingSourcePolicy,
}

impl DocumentMerger {
    pub fn new(missing: MissingSourcePolicy) -> Self {
        Self { missing }
    }

    /// Merge `sources` in order into `target`.
    ///
    /// A single surviving source is copied byte for byte; no PDF parsing
    /// happens on that path.
    #[instrument(skip_all, fields(sources = sources.len(), target = %target.display()))]
    pub fn merge<P: AsRef<Path>>(&self, sources: &[P], target: &Path) -> Result<MergeSummary> {
        let mut present: Vec<&Path> = Vec::with_capacity(sources.len());
        let mut skipped = Vec::new();

        for source in sources {
            let source = source.as_ref();
            if source.exists() {
                present.push(source);
                continue;
            }
            match self.missing {
                MissingSourcePolicy::Fail => return Err(BuildError::not_found(source)),
                MissingSourcePolicy::Skip => {
                    warn!(source = %source.display(), "Source vanished, skipping");
                    skipped.push(source.to_path_buf());
                }
            }
        }

        match present.as_slice() {
            [] => Err(BuildError::Merge("no sources left to merge".into())),
            [only] => {
                let bytes = output::copy_atomically(only, target)?;
                debug!(bytes, "Single source copied");
                Ok(MergeSummary {
                    sources_merged: 1,
                    skipped,
                    page_count: None,
                })
            }
            many => {
                let (mut merged, page_count) = merge_documents(many)?;

                let mut buffer = Vec::new();
                merged.save_to(&mut buffer).map_err(|err| {
                    BuildError::Merge(format!("failed to serialise merged PDF: {}", err))
                })?;
                output::write_atomically(target, &buffer)?;

                info!(
                    sources = many.len(),
                    pages = page_count,
                    bytes = buffer.len(),
                    "Merge complete"
                );
                Ok(MergeSummary {
                    sources_merged: many.len(),
                    skipped,
                    page_count: Some(page_count),
                })
            }
        }
    }
}

/// Count the pages of a PDF file.
pub fn page_count(path: &Path) -> Result<usize> {
    let document = load(path)?;
    Ok(document.get_pages().len())
}

fn load(path: &Path) -> Result<Document> {
    Document::load(path).map_err(|err| {
        BuildError::Merge(format!("failed to open {}: {}", path.display(), err))
    })
}

/// Build a new document containing every page of `sources`, in order.
fn merge_documents(sources: &[&Path]) -> Result<(Document, usize)> {
    let mut target = Document::with_version("1.7");
    let pages_id = target.new_object_id();
    let mut kids: Vec<Object> = Vec::new();

    for source_path in sources {
        let source = load(source_path)?;
        let source_pages = source.get_pages();
        debug!(source = %source_path.display(), pages = source_pages.len(), "Appending source");

        let mut copier = PageCopier::new(&source, &mut target);
        copier.reserve_pages(source_pages.values().copied());
        // `get_pages` is keyed by 1-based page number, so iteration is in page order.
        for page_id in source_pages.values() {
            let copied = copier.copy_page(*page_id, pages_id)?;
            kids.push(Object::Reference(copied));
        }
    }

    if kids.is_empty() {
        return Err(BuildError::Merge("sources contain no pages".into()));
    }

    let page_count = kids.len();
    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(page_count as i64));
    pages.set("Kids", Object::Array(kids));
    target.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = target.add_object(Object::Dictionary(catalog));
    target.trailer.set("Root", Object::Reference(catalog_id));

    Ok((target, page_count))
}

/// Copies pages out of one source document, sharing objects referenced from
/// several pages instead of duplicating them.
struct PageCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    /// Source object id -> target object id.
    copied: HashMap<ObjectId, ObjectId>,
}

impl<'a> PageCopier<'a> {
    fn new(source: &'a Document, target: &'a mut Document) -> Self {
        Self {
            source,
            target,
            copied: HashMap::new(),
        }
    }

    /// Assign target ids to `pages` up front, so links and destinations
    /// pointing at a later page of the same source resolve to its copy.
    fn reserve_pages(&mut self, pages: impl IntoIterator<Item = ObjectId>) {
        for page_id in pages {
            let new_id = self.target.new_object_id();
            self.copied.insert(page_id, new_id);
        }
    }

    /// Copy one page under the page-tree node `parent`, returning its new id.
    fn copy_page(&mut self, page_id: ObjectId, parent: ObjectId) -> Result<ObjectId> {
        let source = self.source;
        let page = source.get_dictionary(page_id).map_err(|err| {
            BuildError::Merge(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        // Registered before the body is copied so annotations pointing back at
        // their page (/P) resolve to the copy.
        let new_id = match self.copied.get(&page_id) {
            Some(reserved) => *reserved,
            None => {
                let new_id = self.target.new_object_id();
                self.copied.insert(page_id, new_id);
                new_id
            }
        };

        let mut dict = self.copy_dictionary(page);
        for key in INHERITABLE_KEYS {
            if dict.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(source, page, key) {
                let value = self.copy_object(value);
                dict.set(key.to_vec(), value);
            }
        }
        dict.set("Parent", Object::Reference(parent));

        self.target.objects.insert(new_id, Object::Dictionary(dict));
        Ok(new_id)
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            // The page's place in the tree is set by the caller.
            if key.as_slice() == b"Parent" && is_page_dictionary(dict) {
                continue;
            }
            let value = self.copy_object(value);
            copy.set(key.clone(), value);
        }
        copy
    }

    fn copy_object(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(id) => self.copy_reference(*id),
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dict)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.copy_object(item)).collect())
            }
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.copy_dictionary(&stream.dict);
                Object::Stream(copy)
            }
            other => other.clone(),
        }
    }

    fn copy_reference(&mut self, id: ObjectId) -> Object {
        if let Some(new_id) = self.copied.get(&id) {
            return Object::Reference(*new_id);
        }

        let source = self.source;
        let referenced = match source.get_object(id) {
            Ok(object) => object,
            Err(err) => {
                warn!(?id, %err, "Cannot resolve reference, using Null");
                return Object::Null;
            }
        };

        // Pages of this source were reserved above. Anything else in the page
        // tree would drag unrelated pages along.
        if matches!(referenced, Object::Dictionary(dict) if is_page_tree_node(dict)) {
            return Object::Null;
        }

        let new_id = self.target.new_object_id();
        self.copied.insert(id, new_id);
        let copy = self.copy_object(referenced);
        self.target.objects.insert(new_id, copy);
        Object::Reference(new_id)
    }
}

fn type_name(dict: &Dictionary) -> Option<&[u8]> {
    match dict.get(b"Type") {
        Ok(Object::Name(name)) => Some(name.as_slice()),
        _ => None,
    }
}

fn is_page_dictionary(dict: &Dictionary) -> bool {
    type_name(dict) == Some(b"Page".as_slice())
}

fn is_page_tree_node(dict: &Dictionary) -> bool {
    matches!(type_name(dict), Some(b"Page") | Some(b"Pages"))
}

/// Look `key` up on the ancestors of `page`, nearest first.
fn inherited_attribute<'d>(doc: &'d Document, page: &'d Dictionary, key: &[u8]) -> Option<&'d Object> {
    let mut parent = page.get(b"Parent").ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent.as_reference().ok()?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        parent = node.get(b"Parent").ok()?;
    }
    None
}
