//! # Tiddler Stores
//!
//! A store is the in-memory collection of every tiddler in one wiki file,
//! bound to the encoding it was read from. Two encodings exist:
//!
//! | format | TiddlyWiki | container | on save |
//! |---|---|---|---|
//! | [`FileFormat::Json`] | 5.2.0 and later | `<script class="tiddlywiki-tiddler-store">` holding a JSON array | whole array regenerated |
//! | [`FileFormat::Div`] | 5.1.23 and earlier | `<div id="storeArea">` with one child element per tiddler | changed elements replaced, new ones appended |
//!
//! Both implement [`TiddlerStore`]. The trait's provided methods cover the
//! query side (`get`, `search`, ...); each store supplies `insert`, which is
//! where the Div store does its change tracking, and `save`.
//!
//! ## Identity
//!
//! The effective title is the key. [`TiddlerStore::get`] hands out references
//! and callers edit owned copies, so `add` also replaces the entry a copy was
//! taken from (same [origin title](Tiddler::origin_title)). That makes a rename
//! (`get` → set `title` → `add`) behave as delete-plus-insert. Fresh tiddlers
//! have no origin and only ever replace by title, so reusing a renamed
//! tiddler's old title creates a second tiddler.

pub mod div;
pub mod filter;
pub mod json;

use std::path::{Path, PathBuf};

use tiddlyparse_markup::{Document, Element, NodePath};

use crate::error::WikiError;
use crate::models::Tiddler;
use crate::writer::{self, SpliceAnchor};

pub use div::DivStore;
pub use filter::{FieldFilter, FieldMatch};
pub use json::JsonStore;

/// The on-disk encoding of a wiki.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// One element per tiddler; TiddlyWiki 5.1.23 and earlier.
    Div,
    /// A JSON array in a script element; TiddlyWiki 5.2.0 and later.
    Json,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Div => write!(f, "div"),
            FileFormat::Json => write!(f, "json"),
        }
    }
}

/// Common contract of both store encodings.
pub trait TiddlerStore {
    fn fileformat(&self) -> FileFormat;

    /// The wiki file this store was read from and saves to.
    fn path(&self) -> &Path;

    /// Tracked tiddlers in store order.
    fn tiddlers(&self) -> &[Tiddler];

    /// Insert or replace `tiddler`; see [`TiddlerStore::add`].
    fn insert(&mut self, tiddler: Tiddler, track_modified: bool);

    /// Write the store back into its file.
    fn save(&self) -> Result<(), WikiError>;

    fn get(&self, title: &str) -> Option<&Tiddler> {
        self.tiddlers().iter().find(|t| t.title() == title)
    }

    /// Like [`TiddlerStore::get`], but a missing title is an error.
    fn tiddler(&self, title: &str) -> Result<&Tiddler, WikiError> {
        self.get(title)
            .ok_or_else(|| WikiError::TiddlerNotFound(title.to_string()))
    }

    /// A copy of the tiddler with this title, or a new one that is not in
    /// the store until passed to [`TiddlerStore::add`].
    fn get_or_create(&self, title: &str) -> Tiddler {
        self.get(title)
            .cloned()
            .unwrap_or_else(|| Tiddler::new(title))
    }

    /// Insert `tiddler`, replacing any tiddler with the same title or, when
    /// both were read from the document, the same origin. A replaced tiddler's position is not kept: the new one
    /// goes to the end.
    fn add(&mut self, tiddler: Tiddler) {
        self.insert(tiddler, true);
    }

    /// [`TiddlerStore::add`] without marking the tiddler as changed, for
    /// putting back a tiddler that does not need rewriting.
    fn add_untracked(&mut self, tiddler: Tiddler) {
        self.insert(tiddler, false);
    }

    /// Tiddlers matching every filter, in store order.
    fn search(&self, filters: &[FieldFilter]) -> Vec<&Tiddler> {
        self.tiddlers()
            .iter()
            .filter(|t| filters.iter().all(|f| f.matches(t)))
            .collect()
    }

    fn len(&self) -> usize {
        self.tiddlers().len()
    }

    fn is_empty(&self) -> bool {
        self.tiddlers().is_empty()
    }

    fn iter(&self) -> std::slice::Iter<'_, Tiddler> {
        self.tiddlers().iter()
    }
}

/// Remove every tiddler sharing identity with `tiddler`, append it, and
/// return what was removed.
pub(crate) fn replace_tiddler(tiddlers: &mut Vec<Tiddler>, tiddler: Tiddler) -> Vec<Tiddler> {
    let mut removed = Vec::new();
    let mut index = 0;
    while index < tiddlers.len() {
        let existing = &tiddlers[index];
        let same_origin = existing.origin_title().is_some()
            && existing.origin_title() == tiddler.origin_title();
        if existing.title() == tiddler.title() || same_origin {
            removed.push(tiddlers.remove(index));
        } else {
            index += 1;
        }
    }
    tiddlers.push(tiddler);
    removed
}

/// The parsed file a store is bound to.
#[derive(Debug, Clone)]
pub(crate) struct SourceFile {
    pub path: PathBuf,
    pub document: Document,
    pub container: NodePath,
    pub anchor: SpliceAnchor,
}

impl SourceFile {
    pub fn new(path: PathBuf, document: Document, container: NodePath) -> Self {
        let anchor = SpliceAnchor::locate(&document, &container);
        Self {
            path,
            document,
            container,
            anchor,
        }
    }

    pub fn container(&self) -> Result<&Element, WikiError> {
        self.document.element(&self.container).ok_or_else(|| {
            WikiError::Inconsistent("container element is missing from the document".to_string())
        })
    }

    /// Wrap `content` in the container's original start and end tags.
    pub fn wrap_container(&self, content: &str) -> Result<String, WikiError> {
        let container = self.container()?;
        let mut markup = String::with_capacity(content.len() + 128);
        markup.push_str(self.document.slice(container.start_tag));
        markup.push_str(content);
        if let Some(end_tag) = container.end_tag {
            markup.push_str(self.document.slice(end_tag));
        }
        Ok(markup)
    }

    /// Splice rendered container markup into the file.
    pub fn write(&self, rendered: &str) -> Result<(), WikiError> {
        writer::write(&self.path, self.document.source(), &self.anchor, rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn titles(tiddlers: &[Tiddler]) -> Vec<&str> {
        tiddlers.iter().map(Tiddler::title).collect()
    }

    fn loaded(title: &str) -> Tiddler {
        Tiddler::from_stored([("title", title)].into_iter().collect()).unwrap()
    }

    #[test]
    fn replace_appends_new_title() {
        let mut tiddlers = vec![Tiddler::new("A"), Tiddler::new("B")];
        let removed = replace_tiddler(&mut tiddlers, Tiddler::new("C"));
        assert!(removed.is_empty());
        assert_eq!(titles(&tiddlers), vec!["A", "B", "C"]);
    }

    #[test]
    fn replace_moves_same_title_to_end() {
        let mut tiddlers = vec![Tiddler::new("A"), Tiddler::new("B")];
        let mut updated = Tiddler::new("A");
        updated.set("text", "x").unwrap();

        let removed = replace_tiddler(&mut tiddlers, updated);

        assert_eq!(removed.len(), 1);
        assert_eq!(titles(&tiddlers), vec!["B", "A"]);
        assert_eq!(tiddlers[1].text(), "x");
    }

    #[test]
    fn replace_removes_renamed_source() {
        let mut tiddlers = vec![loaded("Old"), loaded("B")];
        let mut renamed = tiddlers[0].clone();
        renamed.set("title", "New").unwrap();

        replace_tiddler(&mut tiddlers, renamed);

        assert_eq!(titles(&tiddlers), vec!["B", "New"]);
    }

    #[test]
    fn fresh_tiddler_with_old_title_keeps_renamed_one() {
        let mut tiddlers = vec![loaded("A")];
        let mut renamed = tiddlers[0].clone();
        renamed.set("title", "C").unwrap();
        replace_tiddler(&mut tiddlers, renamed);

        let removed = replace_tiddler(&mut tiddlers, Tiddler::new("A"));

        assert!(removed.is_empty());
        assert_eq!(titles(&tiddlers), vec!["C", "A"]);
    }

    #[test]
    fn fresh_tiddlers_never_match_by_origin() {
        let mut tiddlers = vec![Tiddler::new("A")];
        let mut renamed = Tiddler::new("B");
        renamed.set("title", "C").unwrap();

        replace_tiddler(&mut tiddlers, renamed);

        assert_eq!(titles(&tiddlers), vec!["A", "C"]);
    }

    #[test]
    fn file_format_display() {
        assert_eq!(FileFormat::Div.to_string(), "div");
        assert_eq!(FileFormat::Json.to_string(), "json");
    }
}
