//! Div tiddler store (TiddlyWiki 5.1.23 and earlier).
//!
//! The container is `<div id="storeArea">`. Each child element is one tiddler:
//! its attributes are the fields and its `<pre>` child holds the text.
//!
//! ```html
//! <div id="storeArea">
//! <div created="20210101000000000" title="$:/isEncrypted">
//! <pre>no</pre>
//! </div>
//! </div>
//! ```
//!
//! Unlike the JSON store, saving does not regenerate the whole container.
//! Untouched elements are copied from the source byte for byte, so the store
//! keeps a change log:
//!
//! - **modified**: an added tiddler bound to an element of the original
//!   container, either through its origin title or, for a fresh tiddler, by
//!   taking the title of an element no other tiddler holds. That element is
//!   re-rendered in place.
//! - **new**: anything else. Rendered and appended before the end tag.
//! - **displaced**: an original element whose tiddler was replaced by a
//!   different tiddler taking its title. It is dropped on save so no two
//!   elements share a title.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tiddlyparse_markup::{Document, Element, Node, NodePath};

use super::{FileFormat, SourceFile, TiddlerStore, replace_tiddler};
use crate::error::WikiError;
use crate::models::{Fields, Tiddler};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Change {
    /// Effective title when added.
    title: String,
    /// Title of the original element to replace; `None` appends.
    element: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DivStore {
    source: SourceFile,
    tiddlers: Vec<Tiddler>,
    original_titles: HashSet<String>,
    changes: Vec<Change>,
    displaced: Vec<String>,
}

impl DivStore {
    pub fn load(path: PathBuf, document: Document, container: NodePath) -> Result<Self, WikiError> {
        let source = SourceFile::new(path, document, container);
        let tiddlers = source
            .container()?
            .child_elements()
            .enumerate()
            .map(|(index, element)| tiddler_from_element(&source.document, index, element))
            .collect::<Result<Vec<_>, _>>()?;
        let original_titles = tiddlers
            .iter()
            .filter_map(|t| t.origin_title().map(str::to_string))
            .collect();

        log::debug!(
            "Loaded {} tiddlers from div store in {}",
            tiddlers.len(),
            source.path.display()
        );
        Ok(Self {
            source,
            tiddlers,
            original_titles,
            changes: Vec::new(),
            displaced: Vec::new(),
        })
    }

    /// Titles of new and modified tiddlers, oldest change first.
    pub fn changes(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.title.as_str()).collect()
    }

    fn tracked(&self, change: &Change) -> Result<&Tiddler, WikiError> {
        let found = match &change.element {
            Some(element) => self.element_holder(element),
            None => self.get(&change.title),
        };
        found.ok_or_else(|| {
            WikiError::Inconsistent(format!(
                "changed tiddler {:?} is not in the store",
                change.title
            ))
        })
    }

    /// The tiddler written into original element `element`.
    fn element_holder(&self, element: &str) -> Option<&Tiddler> {
        self.tiddlers
            .iter()
            .find(|t| t.origin_title() == Some(element))
            .or_else(|| {
                self.changes
                    .iter()
                    .find(|c| c.element.as_deref() == Some(element))
                    .and_then(|c| self.get(&c.title))
            })
    }

    /// The original element `tiddler` is written into, if any.
    fn element_for(&self, tiddler: &Tiddler) -> Option<String> {
        match tiddler.origin_title() {
            Some(origin) => self
                .original_titles
                .contains(origin)
                .then(|| origin.to_string()),
            None => {
                let title = tiddler.title();
                let free = self.original_titles.contains(title)
                    && !self.changes.iter().any(|c| c.element.as_deref() == Some(title))
                    && !self.tiddlers.iter().any(|t| t.origin_title() == Some(title));
                free.then(|| title.to_string())
            }
        }
    }

    /// The complete container element as it will be written.
    pub fn render_container(&self) -> Result<String, WikiError> {
        let document = &self.source.document;
        let container = self.source.container()?;

        let modified: Vec<&Change> = self.changes.iter().filter(|c| c.element.is_some()).collect();
        let mut replaced: HashSet<&str> = HashSet::new();
        let mut out = String::with_capacity(container.span.len());
        out.push_str(document.slice(container.start_tag));

        // Whitespace after a dropped element goes with it
        let mut after_dropped = false;
        for child in &container.children {
            match child {
                Node::Element(element) => {
                    after_dropped = false;
                    match element.attr("title") {
                        Some(title) if self.displaced.iter().any(|d| d == title) => {
                            log::warn!("Dropping element of displaced tiddler {title:?}");
                            after_dropped = true;
                        }
                        Some(title) if !replaced.contains(title) => {
                            match modified.iter().find(|c| c.element.as_deref() == Some(title)) {
                                Some(change) => {
                                    out.push_str(&render_tiddler(self.tracked(change)?));
                                    replaced.insert(title);
                                }
                                None => out.push_str(document.slice(element.span)),
                            }
                        }
                        _ => out.push_str(document.slice(element.span)),
                    }
                }
                Node::Text(text) => {
                    let raw = document.slice(text.span);
                    if after_dropped && raw.trim().is_empty() {
                        after_dropped = false;
                        continue;
                    }
                    after_dropped = false;
                    out.push_str(raw);
                }
            }
        }

        if let Some(missing) = modified
            .iter()
            .filter_map(|c| c.element.as_deref())
            .find(|element| !replaced.contains(element))
        {
            return Err(WikiError::Inconsistent(format!(
                "no element titled {missing:?} in the store area"
            )));
        }

        for change in self.changes.iter().filter(|c| c.element.is_none()) {
            out.push_str(&render_tiddler(self.tracked(change)?));
            out.push('\n');
        }

        if let Some(end_tag) = container.end_tag {
            out.push_str(document.slice(end_tag));
        }
        Ok(out)
    }
}

fn tiddler_from_element(
    document: &Document,
    index: usize,
    element: &Element,
) -> Result<Tiddler, WikiError> {
    let titled = element
        .attributes
        .iter()
        .any(|a| a.name == "title" && a.value.is_some());
    if !titled {
        return Err(WikiError::Structure(format!(
            "element {index} in the store area has no title attribute"
        )));
    }

    let mut fields: Fields = element
        .attributes
        .iter()
        .map(|a| (a.name.clone(), a.value.clone().unwrap_or_default()))
        .collect();
    let text = element
        .child_elements()
        .find(|child| child.name == "pre")
        .map(|pre| document.text_content(pre))
        .unwrap_or_default();
    fields.insert("text", text);

    Tiddler::from_stored(fields)
}

/// Markup for one tiddler element.
pub fn render_tiddler(tiddler: &Tiddler) -> String {
    let mut out = String::from("<div");
    for (name, value) in tiddler.fields() {
        if name == "text" {
            continue;
        }
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }
    out.push_str(">\n<pre>");
    out.push_str(&escape(tiddler.text()));
    out.push_str("</pre>\n</div>");
    out
}

/// `&`, `<`, `>` and `"` become entities; apostrophes stay literal.
fn escape(value: &str) -> std::borrow::Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

impl TiddlerStore for DivStore {
    fn fileformat(&self) -> FileFormat {
        FileFormat::Div
    }

    fn path(&self) -> &Path {
        &self.source.path
    }

    fn tiddlers(&self) -> &[Tiddler] {
        &self.tiddlers
    }

    fn insert(&mut self, tiddler: Tiddler, track_modified: bool) {
        let title = tiddler.title().to_string();
        let removed = replace_tiddler(&mut self.tiddlers, tiddler);

        // Elements held by the removed tiddlers are free again
        let mut released = Vec::new();
        for old in &removed {
            let element = old
                .origin_title()
                .filter(|origin| self.original_titles.contains(*origin))
                .map(str::to_string)
                .or_else(|| {
                    self.changes
                        .iter()
                        .find(|c| c.title == old.title())
                        .and_then(|c| c.element.clone())
                });
            self.changes.retain(|c| c.title != old.title());
            released.extend(element);
        }

        let element = self.tiddlers.last().and_then(|added| self.element_for(added));
        for key in released {
            if Some(&key) == element.as_ref() || self.displaced.contains(&key) {
                continue;
            }
            log::debug!("Tiddler {title:?} displaces original {key:?}");
            self.displaced.push(key);
        }

        if !track_modified {
            if let Some(key) = element {
                // Untouched: the element keeps its source markup
                self.displaced.retain(|d| *d != key);
            }
            return;
        }
        if let Some(key) = &element {
            self.displaced.retain(|d| d != key);
        }
        self.changes
            .retain(|c| c.title != title && (element.is_none() || c.element != element));
        self.changes.push(Change { title, element });
    }

    fn save(&self) -> Result<(), WikiError> {
        let rendered = self.render_container()?;
        log::debug!(
            "Saving {} changed and {} displaced tiddlers to {}",
            self.changes.len(),
            self.displaced.len(),
            self.source.path.display()
        );
        self.source.write(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use tiddlyparse_markup::parse;

    const STORE: &str = "<body>\n<div id=\"storeArea\" style=\"display:none;\">\n<div created=\"1\" title=\"A\">\n<pre>alpha &amp; more</pre>\n</div>\n<div title=\"B\" tags=\"x\">\n<pre>beta</pre>\n</div>\n</div>\n<div id=\"after\"></div>\n</body>\n";

    fn load(html: &str) -> Result<DivStore, WikiError> {
        let document = parse(html);
        let container = document.find(|e| e.attr("id") == Some("storeArea")).unwrap();
        DivStore::load(PathBuf::from("wiki.html"), document, container)
    }

    #[fixture]
    fn store() -> DivStore {
        load(STORE).unwrap()
    }

    fn original_container() -> &'static str {
        let start = STORE.find("<div id=\"storeArea\"").unwrap();
        let end = STORE.find("\n<div id=\"after\"").unwrap();
        &STORE[start..end]
    }

    #[rstest]
    fn loads_attributes_and_pre_text(store: DivStore) {
        assert_eq!(store.len(), 2);
        let a = store.tiddler("A").unwrap();
        assert_eq!(
            a.fields(),
            vec![("created", "1"), ("title", "A"), ("text", "alpha & more")]
        );
    }

    #[test]
    fn missing_pre_reads_empty_text() {
        let store = load("<div id=\"storeArea\"><div title=\"A\"></div></div><p></p>").unwrap();
        assert_eq!(store.tiddler("A").unwrap().text(), "");
    }

    #[rstest]
    #[case("<div id=\"storeArea\"><div created=\"1\"><pre></pre></div></div>")]
    #[case("<div id=\"storeArea\"><div title><pre></pre></div></div>")]
    fn element_without_title_is_a_structure_error(#[case] html: &str) {
        assert!(matches!(load(html), Err(WikiError::Structure(_))));
    }

    #[rstest]
    fn unchanged_store_renders_original_markup(store: DivStore) {
        assert_eq!(store.render_container().unwrap(), original_container());
    }

    #[rstest]
    fn untracked_add_keeps_original_markup(mut store: DivStore) {
        let mut a = store.get_or_create("A");
        a.set("text", "changed").unwrap();
        store.add_untracked(a);

        assert!(store.changes().is_empty());
        assert_eq!(store.render_container().unwrap(), original_container());
    }

    #[test]
    fn render_tiddler_escapes_attributes_and_text() {
        let mut tiddler = Tiddler::new("Tom's <\"quote\">");
        tiddler.set("text", "a < b && c > d").unwrap();
        tiddler.set("tags", "[[x y]]").unwrap();

        insta::assert_snapshot!(render_tiddler(&tiddler), @r#"
        <div title="Tom's &lt;&quot;quote&quot;&gt;" tags="[[x y]]">
        <pre>a &lt; b &amp;&amp; c &gt; d</pre>
        </div>
        "#);
    }

    #[rstest]
    fn modified_tiddler_is_replaced_in_place(mut store: DivStore) {
        let mut a = store.get_or_create("A");
        a.set("text", "new text").unwrap();
        store.add(a);

        assert_eq!(store.changes(), vec!["A"]);
        insta::assert_snapshot!(store.render_container().unwrap(), @r#"
        <div id="storeArea" style="display:none;">
        <div created="1" title="A">
        <pre>new text</pre>
        </div>
        <div title="B" tags="x">
        <pre>beta</pre>
        </div>
        </div>
        "#);
    }

    #[rstest]
    fn new_tiddler_is_appended(mut store: DivStore) {
        let mut c = store.get_or_create("C");
        c.set("text", "gamma").unwrap();
        store.add(c);

        assert_eq!(store.changes(), vec!["C"]);
        insta::assert_snapshot!(store.render_container().unwrap(), @r#"
        <div id="storeArea" style="display:none;">
        <div created="1" title="A">
        <pre>alpha &amp; more</pre>
        </div>
        <div title="B" tags="x">
        <pre>beta</pre>
        </div>
        <div title="C">
        <pre>gamma</pre>
        </div>
        </div>
        "#);
    }

    #[rstest]
    fn renamed_tiddler_replaces_its_source_element(mut store: DivStore) {
        let mut a = store.get_or_create("A");
        a.set("title", "Renamed").unwrap();
        store.add(a);

        assert!(store.get("A").is_none());
        assert_eq!(store.changes(), vec!["Renamed"]);
        let rendered = store.render_container().unwrap();
        assert!(rendered.contains("<div created=\"1\" title=\"Renamed\">\n<pre>alpha &amp; more</pre>\n</div>\n<div title=\"B\""));
        assert!(!rendered.contains("title=\"A\""));
    }

    #[rstest]
    fn taking_an_original_title_drops_its_element(mut store: DivStore) {
        let mut a = store.get_or_create("A");
        a.set("title", "B").unwrap();
        store.add(a);

        assert_eq!(store.len(), 1);
        assert_eq!(store.tiddler("B").unwrap().text(), "alpha & more");
        insta::assert_snapshot!(store.render_container().unwrap(), @r#"
        <div id="storeArea" style="display:none;">
        <div created="1" title="B">
        <pre>alpha &amp; more</pre>
        </div>
        </div>
        "#);
    }

    #[rstest]
    fn re_adding_a_displaced_title_restores_its_element(mut store: DivStore) {
        let mut a = store.get_or_create("A");
        a.set("title", "B").unwrap();
        store.add(a);
        let mut b = Tiddler::new("B");
        b.set("text", "fresh").unwrap();
        store.add(b);

        assert_eq!(store.changes(), vec!["B"]);
        insta::assert_snapshot!(store.render_container().unwrap(), @r#"
        <div id="storeArea" style="display:none;">
        <div title="B">
        <pre>fresh</pre>
        </div>
        </div>
        "#);
    }

    #[rstest]
    fn old_title_of_renamed_tiddler_is_a_new_tiddler(mut store: DivStore) {
        let mut a = store.get_or_create("A");
        a.set("title", "C").unwrap();
        store.add(a);
        let mut fresh = store.get_or_create("A");
        fresh.set("text", "again").unwrap();
        store.add(fresh);

        assert_eq!(store.len(), 3);
        assert_eq!(store.changes(), vec!["C", "A"]);
        insta::assert_snapshot!(store.render_container().unwrap(), @r#"
        <div id="storeArea" style="display:none;">
        <div created="1" title="C">
        <pre>alpha &amp; more</pre>
        </div>
        <div title="B" tags="x">
        <pre>beta</pre>
        </div>
        <div title="A">
        <pre>again</pre>
        </div>
        </div>
        "#);
    }

    #[rstest]
    fn fresh_tiddler_with_an_unclaimed_title_replaces_in_place(mut store: DivStore) {
        let mut a = Tiddler::new("A");
        a.set("text", "fresh").unwrap();
        store.add(a);

        assert_eq!(store.changes(), vec!["A"]);
        insta::assert_snapshot!(store.render_container().unwrap(), @r#"
        <div id="storeArea" style="display:none;">
        <div title="A">
        <pre>fresh</pre>
        </div>
        <div title="B" tags="x">
        <pre>beta</pre>
        </div>
        </div>
        "#);
    }

    #[rstest]
    fn changes_collapse_to_latest_position(mut store: DivStore) {
        store.add(Tiddler::new("C"));
        let a = store.get_or_create("A");
        store.add(a);
        let c = store.get_or_create("C");
        store.add(c);

        assert_eq!(store.changes(), vec!["A", "C"]);
        assert_eq!(store.len(), 3);
    }

    #[rstest]
    fn re_add_keeps_length(mut store: DivStore) {
        let before = store.len();
        let b = store.get_or_create("B");
        store.add(b);
        assert_eq!(store.len(), before);
    }
}
