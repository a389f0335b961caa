//! Round-trip writer.
//!
//! Saving never re-serializes the document. The store renders only its
//! container element; the writer copies the original source line by line and
//! swaps the container's bytes for the new markup:
//!
//! ```text
//! line < L0        copied verbatim
//! line L0          source[..C0] + rendered container
//! L0 < line < L1   dropped (old container)
//! line L1          skipped sibling text + source[C1..]
//! line > L1        copied verbatim
//! ```
//!
//! `(L0, C0)` is where the container starts and `(L1, C1)` is where the next
//! sibling *element* starts. Text, whitespace and comments between the two are
//! carried over from the source exactly. When nothing in the container
//! changed, the output is therefore byte-identical to the input.

use std::path::Path;

use tiddlyparse_markup::{Document, Node, NodePath, SourcePos};
use xi_rope::Rope;

use crate::error::WikiError;
use crate::io;

/// Where the container sits in the source, resolved once at load time.
///
/// Positions are optional: a document the writer cannot splice still loads
/// and can be queried, and only `save` reports the problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceAnchor {
    /// Start of the container element.
    pub start: Option<SourcePos>,
    /// Start of the first element after the container under the same parent.
    pub next: Option<SourcePos>,
    /// Source text of the non-element siblings between the two.
    pub skipped: String,
}

impl SpliceAnchor {
    pub fn locate(document: &Document, container: &NodePath) -> Self {
        let start = document
            .element(container)
            .and_then(|element| document.position(element.span.start));

        let mut skipped = String::new();
        let mut next = None;
        for sibling in document.following_siblings(container) {
            match sibling {
                Node::Element(element) => {
                    next = document.position(element.span.start);
                    break;
                }
                Node::Text(text) => skipped.push_str(document.slice(text.span)),
            }
        }

        Self {
            start,
            next,
            skipped,
        }
    }
}

/// Build the new file contents with the container replaced by `rendered`.
pub fn splice(source: &str, anchor: &SpliceAnchor, rendered: &str) -> Result<String, WikiError> {
    let start = anchor
        .start
        .ok_or_else(|| WikiError::Boundary("container has no source position".to_string()))?;
    let next = anchor.next.ok_or_else(|| {
        WikiError::Boundary("no element follows the container in the document".to_string())
    })?;
    if next < start {
        return Err(WikiError::Boundary(format!(
            "next element at {next} precedes container at {start}"
        )));
    }
    log::trace!("Splicing container {start} .. {next}");

    let rope = Rope::from(source);
    let mut out = String::with_capacity(source.len() + rendered.len());

    for (index, line) in rope.lines_raw(..).enumerate() {
        let number = index + 1;
        if number < start.line || number > next.line {
            out.push_str(&line);
            continue;
        }
        if number == start.line {
            let prefix = line.get(..start.column).ok_or_else(|| {
                WikiError::Boundary(format!("column {} is outside line {number}", start.column))
            })?;
            out.push_str(prefix);
            out.push_str(rendered);
        }
        if number == next.line {
            let suffix = line.get(next.column..).ok_or_else(|| {
                WikiError::Boundary(format!("column {} is outside line {number}", next.column))
            })?;
            out.push_str(&anchor.skipped);
            out.push_str(suffix);
        }
    }

    Ok(out)
}

/// Splice `rendered` into `source` and atomically replace the file at `path`.
///
/// Boundary problems are reported before the filesystem is touched.
pub fn write(
    path: &Path,
    source: &str,
    anchor: &SpliceAnchor,
    rendered: &str,
) -> Result<(), WikiError> {
    let output = splice(source, anchor, rendered)?;
    io::write_atomic(path, &output)
}
