//! Store format detection.
//!
//! The JSON container is looked for first: a 5.2.x file still carries an
//! (empty) `storeArea` div for backwards compatibility, so finding the div
//! alone says nothing about the format.

use tiddlyparse_markup::{Document, NodePath};

use crate::store::FileFormat;

/// Class of the `<script>` holding the JSON tiddler array.
pub const JSON_STORE_CLASS: &str = "tiddlywiki-tiddler-store";

/// Id of the `<div>` holding one element per tiddler.
pub const DIV_STORE_ID: &str = "storeArea";

/// A located tiddler container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Json(NodePath),
    Div(NodePath),
}

impl Container {
    pub fn fileformat(&self) -> FileFormat {
        match self {
            Container::Json(_) => FileFormat::Json,
            Container::Div(_) => FileFormat::Div,
        }
    }
}

/// Find the tiddler container; `None` if the document is not a wiki.
pub fn detect(document: &Document) -> Option<Container> {
    let container = document
        .find(|e| e.name == "script" && e.has_class(JSON_STORE_CLASS))
        .map(Container::Json)
        .or_else(|| {
            document
                .find(|e| e.name == "div" && e.attr("id") == Some(DIV_STORE_ID))
                .map(Container::Div)
        });

    match &container {
        Some(found) => log::debug!("Detected {} store", found.fileformat()),
        None => log::debug!("No tiddler store found"),
    }
    container
}
