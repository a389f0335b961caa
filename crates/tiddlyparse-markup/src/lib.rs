//! # tiddlyparse-markup
//!
//! A small, lossless HTML reader for machine-written documents such as
//! single-file wikis.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Lexer → Tokens → TreeBuilder → Document
//!               (Logos)                        (Elements + Text spans)
//! ```
//!
//! The lexer ([`lexer`]) splits the input into tags, comments, declarations
//! and text without losing a byte. The parser ([`parser`]) nests those tokens
//! into [`Element`]s and [`Text`] nodes. Nodes never copy text: they hold
//! [`Span`]s into the source the [`Document`] owns, and the document maps any
//! offset to a [`SourcePos`] (line and column).
//!
//! That is all a round-trip editor needs: find the element that holds the
//! data, read it, and know exactly which bytes of the original file it
//! occupied.
//!
//! ## Quick Start
//!
//! ```
//! use tiddlyparse_markup::parse;
//!
//! let doc = parse("<body>\n<div id=\"storeArea\"><div title=\"A\"></div></div>\n</body>");
//!
//! let path = doc.find(|e| e.attr("id") == Some("storeArea")).unwrap();
//! let store = doc.element(&path).unwrap();
//!
//! assert_eq!(store.child_elements().count(), 1);
//! assert_eq!(doc.position(store.span.start).unwrap().line, 2);
//! assert_eq!(doc.slice(store.span), "<div id=\"storeArea\"><div title=\"A\"></div></div>");
//! ```
//!
//! ## What It Is Not
//!
//! This is not an HTML5-conformant tree builder. There is no implied end tag
//! handling, no foster parenting and no character reference decoding outside
//! attribute values and [`Document::text_content`].

pub mod lexer;
pub mod node;
pub mod parser;
pub mod position;
pub mod span;

pub use node::{Attribute, Element, Node, NodePath, Text, TextKind};
pub use parser::{Document, parse};
pub use position::{LineIndex, SourcePos};
pub use span::Span;
