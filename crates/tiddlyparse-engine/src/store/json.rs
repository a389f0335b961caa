//! JSON tiddler store (TiddlyWiki 5.2.0 and later).
//!
//! The container is a `<script class="tiddlywiki-tiddler-store">` whose body
//! is a JSON array with one object per tiddler. On save the whole array is
//! regenerated in the layout TiddlyWiki itself writes:
//!
//! ```text
//! [
//! {"title":"$:/core","type":"application/json","text":"..."},
//! {"title":"$:/isEncrypted","text":"no"}
//! ]
//! ```
//!
//! Objects are sorted by lowercased title, one per line, and every `<` is
//! written as `\u003C` so the script body can never close itself early.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tiddlyparse_markup::{Document, NodePath};

use super::{FileFormat, SourceFile, TiddlerStore, replace_tiddler};
use crate::error::WikiError;
use crate::models::{Fields, Tiddler};

#[derive(Debug, Clone)]
pub struct JsonStore {
    source: SourceFile,
    tiddlers: Vec<Tiddler>,
}

impl JsonStore {
    pub fn load(path: PathBuf, document: Document, container: NodePath) -> Result<Self, WikiError> {
        let source = SourceFile::new(path, document, container);
        let body = source.document.text_content(source.container()?);
        let records: Vec<Value> = serde_json::from_str(&body)?;

        let tiddlers = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| tiddler_from_record(index, record))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Loaded {} tiddlers from JSON store in {}",
            tiddlers.len(),
            source.path.display()
        );
        Ok(Self { source, tiddlers })
    }

    /// The new script body.
    pub fn render_body(&self) -> Result<String, WikiError> {
        let mut sorted: Vec<&Tiddler> = self.tiddlers.iter().collect();
        sorted.sort_by_cached_key(|t| t.title().to_lowercase());

        let lines = sorted
            .into_iter()
            .map(|t| serde_json::to_string(&t.to_json()))
            .collect::<Result<Vec<_>, _>>()?;

        let body = format!("[\n{}\n]", lines.join(",\n"));
        Ok(body.replace('<', "\\u003C"))
    }

    /// The complete container element as it will be written.
    pub fn render_container(&self) -> Result<String, WikiError> {
        self.source.wrap_container(&self.render_body()?)
    }
}

fn tiddler_from_record(index: usize, record: Value) -> Result<Tiddler, WikiError> {
    let Value::Object(object) = record else {
        return Err(WikiError::Structure(format!(
            "entry {index} of the tiddler array is not an object"
        )));
    };
    let fields = fields_from_object(index, object)?;
    Tiddler::from_stored(fields)
        .map_err(|_| WikiError::Structure(format!("entry {index} has no title")))
}

fn fields_from_object(index: usize, object: Map<String, Value>) -> Result<Fields, WikiError> {
    object
        .into_iter()
        .map(|(name, value)| match value {
            Value::String(value) => Ok((name, value)),
            other => Err(WikiError::Structure(format!(
                "field {name:?} of entry {index} is not a string: {other}"
            ))),
        })
        .collect()
}

impl TiddlerStore for JsonStore {
    fn fileformat(&self) -> FileFormat {
        FileFormat::Json
    }

    fn path(&self) -> &Path {
        &self.source.path
    }

    fn tiddlers(&self) -> &[Tiddler] {
        &self.tiddlers
    }

    fn insert(&mut self, tiddler: Tiddler, _track_modified: bool) {
        replace_tiddler(&mut self.tiddlers, tiddler);
    }

    fn save(&self) -> Result<(), WikiError> {
        let rendered = self.render_container()?;
        log::debug!(
            "Saving {} tiddlers to {}",
            self.tiddlers.len(),
            self.source.path.display()
        );
        self.source.write(&rendered)
    }
}
