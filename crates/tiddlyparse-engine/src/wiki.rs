use std::path::Path;

use crate::error::WikiError;
use crate::models::Tiddler;
use crate::store::{DivStore, FileFormat, JsonStore, TiddlerStore};

/// A parsed wiki of either format.
#[derive(Debug, Clone)]
pub enum Wiki {
    Json(JsonStore),
    Div(DivStore),
}

impl Wiki {
    fn store(&self) -> &dyn TiddlerStore {
        match self {
            Wiki::Json(store) => store,
            Wiki::Div(store) => store,
        }
    }

    fn store_mut(&mut self) -> &mut dyn TiddlerStore {
        match self {
            Wiki::Json(store) => store,
            Wiki::Div(store) => store,
        }
    }

    /// Pending change titles; the JSON format does not track changes.
    pub fn changes(&self) -> Option<Vec<&str>> {
        match self {
            Wiki::Json(_) => None,
            Wiki::Div(store) => Some(store.changes()),
        }
    }
}

impl TiddlerStore for Wiki {
    fn fileformat(&self) -> FileFormat {
        self.store().fileformat()
    }

    fn path(&self) -> &Path {
        self.store().path()
    }

    fn tiddlers(&self) -> &[Tiddler] {
        self.store().tiddlers()
    }

    fn insert(&mut self, tiddler: Tiddler, track_modified: bool) {
        self.store_mut().insert(tiddler, track_modified);
    }

    fn save(&self) -> Result<(), WikiError> {
        self.store().save()
    }
}
