//! # tiddlyparse-engine
//!
//! Read and edit the tiddlers inside a single-file TiddlyWiki, then write them
//! back without disturbing a byte of the rest of the file.
//!
//! ```text
//! wiki.html → tiddlyparse_markup::parse → detect → JsonStore | DivStore → Wiki
//!                                                        │
//!                              save: render container ───┴──→ writer::splice → wiki.html
//! ```
//!
//! Both TiddlyWiki encodings are supported; see [`store`] for how they
//! differ. Everything outside the tiddler container (the application code,
//! styles, boot scripts) is copied verbatim by the [`writer`].
//!
//! ```no_run
//! use tiddlyparse_engine::{FieldFilter, TiddlerStore, parse};
//!
//! let mut wiki = parse("wiki.html")?;
//! let mut note = wiki.get_or_create("Shopping");
//! note.set("text", "milk")?;
//! note.set("tags", "Todo")?;
//! wiki.add(note);
//! wiki.save()?;
//!
//! for tiddler in wiki.search(&[FieldFilter::eq("tags", "Todo")]) {
//!     println!("{}", tiddler.title());
//! }
//! # Ok::<(), tiddlyparse_engine::WikiError>(())
//! ```

pub mod detect;
pub mod error;
pub mod io;
pub mod models;
pub mod store;
pub mod wiki;
pub mod writer;

use std::path::Path;

pub use detect::{Container, detect};
pub use error::WikiError;
pub use models::{Fields, RESERVED_PREFIX, Tiddler};
pub use store::{DivStore, FieldFilter, FieldMatch, FileFormat, JsonStore, TiddlerStore};
pub use wiki::Wiki;

/// Version of this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Read a wiki file and build the store for its format.
pub fn parse(path: impl AsRef<Path>) -> Result<Wiki, WikiError> {
    let path = path.as_ref();
    let source = io::read_file(path)?;
    parse_str(path, &source)
}

/// Like [`parse`], for a file already in memory. `path` is where
/// [`TiddlerStore::save`] will write.
pub fn parse_str(path: impl AsRef<Path>, source: &str) -> Result<Wiki, WikiError> {
    let path = path.as_ref().to_path_buf();
    let document = tiddlyparse_markup::parse(source);
    match detect(&document) {
        Some(Container::Json(container)) => {
            Ok(Wiki::Json(JsonStore::load(path, document, container)?))
        }
        Some(Container::Div(container)) => {
            Ok(Wiki::Div(DivStore::load(path, document, container)?))
        }
        None => Err(WikiError::FormatNotRecognized { path }),
    }
}
