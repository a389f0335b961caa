//! # Parser - Building the Element Tree
//!
//! Turns the token stream from [`lex`](crate::lexer::lex) into a tree of
//! [`Node`]s. The builder is deliberately forgiving, in the spirit of a
//! browser: it never fails, it just does something sensible.
//!
//! - An end tag closes the nearest open element with the same name, closing
//!   anything opened inside it on the way.
//! - An end tag that matches nothing open is kept as a
//!   [`TextKind::StrayMarkup`] node so its bytes remain accounted for.
//! - Elements still open at the end of input end there.
//! - Void elements (`br`, `meta`, ...) and `/>` start tags never have children.
//!
//! No implied-end-tag rules (such as `<p>` closing a previous `<p>`) are
//! applied; wiki files are machine written and well nested.

use crate::lexer::{MarkupKind, Token, lex};
use crate::node::{Attribute, Element, Node, NodePath, Text, TextKind};
use crate::position::{LineIndex, SourcePos};
use crate::span::Span;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// A parsed HTML document that owns its source text.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    children: Vec<Node>,
    lines: LineIndex,
}

impl Document {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Top-level nodes.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The exact source text of a span.
    pub fn slice(&self, span: Span) -> &str {
        &self.source[span.start..span.end]
    }

    /// Line/column of a byte offset, `None` past the end of the source.
    pub fn position(&self, offset: usize) -> Option<SourcePos> {
        self.lines.position(offset)
    }

    /// First element in document order (depth-first, pre-order) matching
    /// `predicate`.
    pub fn find(&self, predicate: impl Fn(&Element) -> bool) -> Option<NodePath> {
        let mut path = Vec::new();
        find_in(&self.children, &predicate, &mut path).then_some(NodePath(path))
    }

    pub fn node(&self, path: &NodePath) -> Option<&Node> {
        let (first, rest) = path.0.split_first()?;
        let mut node = self.children.get(*first)?;
        for index in rest {
            let Node::Element(element) = node else {
                return None;
            };
            node = element.children.get(*index)?;
        }
        Some(node)
    }

    pub fn element(&self, path: &NodePath) -> Option<&Element> {
        self.node(path).and_then(Node::as_element)
    }

    /// Nodes after `path` under the same parent.
    pub fn following_siblings(&self, path: &NodePath) -> &[Node] {
        let Some(index) = path.index() else {
            return &[];
        };
        let siblings = match path.parent() {
            Some(parent) if !parent.0.is_empty() => match self.element(&parent) {
                Some(element) => element.children.as_slice(),
                None => return &[],
            },
            _ => self.children.as_slice(),
        };
        siblings.get(index + 1..).unwrap_or(&[])
    }

    /// Text content of an element and its descendants.
    ///
    /// Character data is entity-decoded; raw text (script bodies) is returned
    /// verbatim; comments and other markup are skipped.
    pub fn text_content(&self, element: &Element) -> String {
        let mut out = String::new();
        self.collect_text(&element.children, &mut out);
        out
    }

    fn collect_text(&self, nodes: &[Node], out: &mut String) {
        for node in nodes {
            match node {
                Node::Element(element) => self.collect_text(&element.children, out),
                Node::Text(text) => match text.kind {
                    TextKind::Data => {
                        out.push_str(&html_escape::decode_html_entities(self.slice(text.span)))
                    }
                    TextKind::Raw => out.push_str(self.slice(text.span)),
                    TextKind::Comment | TextKind::Declaration | TextKind::StrayMarkup => {}
                },
            }
        }
    }
}

fn find_in(
    nodes: &[Node],
    predicate: &impl Fn(&Element) -> bool,
    path: &mut Vec<usize>,
) -> bool {
    for (index, node) in nodes.iter().enumerate() {
        let Node::Element(element) = node else {
            continue;
        };
        path.push(index);
        if predicate(element) || find_in(&element.children, predicate, path) {
            return true;
        }
        path.pop();
    }
    false
}

/// Parse a complete document.
pub fn parse(input: &str) -> Document {
    let tokens = lex(input);
    let mut builder = TreeBuilder::default();
    for token in &tokens {
        builder.push(token);
    }
    Document {
        source: input.to_string(),
        children: builder.finish(input.len()),
        lines: LineIndex::new(input),
    }
}

/// Stack-based tree construction from tokens.
#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn push(&mut self, token: &Token<'_>) {
        match token.kind {
            MarkupKind::StartTag => self.start_element(token),
            MarkupKind::EndTag => self.end_element(token),
            MarkupKind::Text => self.text(TextKind::Data, token.span),
            MarkupKind::RawText => self.text(TextKind::Raw, token.span),
            MarkupKind::Comment => self.text(TextKind::Comment, token.span),
            MarkupKind::Declaration => self.text(TextKind::Declaration, token.span),
        }
    }

    fn finish(mut self, end: usize) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close_top(end, None);
        }
        self.root
    }

    fn attach(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn text(&mut self, kind: TextKind, span: Span) {
        self.attach(Node::Text(Text { kind, span }));
    }

    fn start_element(&mut self, token: &Token<'_>) {
        let name = token.tag_name().unwrap_or_default();
        let element = Element {
            attributes: parse_attributes(token.text, name.len()),
            name,
            children: Vec::new(),
            span: token.span,
            start_tag: token.span,
            end_tag: None,
        };
        if token.is_self_closing() || VOID_ELEMENTS.contains(&element.name.as_str()) {
            self.attach(Node::Element(element));
        } else {
            self.open.push(element);
        }
    }

    fn end_element(&mut self, token: &Token<'_>) {
        let name = token.tag_name().unwrap_or_default();
        let Some(depth) = self.open.iter().rposition(|e| e.name == name) else {
            self.text(TextKind::StrayMarkup, token.span);
            return;
        };
        while self.open.len() > depth + 1 {
            self.close_top(token.span.start, None);
        }
        self.close_top(token.span.end, Some(token.span));
    }

    fn close_top(&mut self, end: usize, end_tag: Option<Span>) {
        if let Some(mut element) = self.open.pop() {
            element.span.end = end;
            element.end_tag = end_tag;
            self.attach(Node::Element(element));
        }
    }
}

/// Parse the attributes of a start tag.
///
/// `name_len` is the byte length of the tag name following `<`. Names are
/// lowercased and values entity-decoded. A repeated attribute keeps its first
/// position and takes the last value.
fn parse_attributes(tag: &str, name_len: usize) -> Vec<Attribute> {
    let inner = tag
        .get(1 + name_len..)
        .unwrap_or("")
        .trim_end_matches('>');
    let bytes = inner.as_bytes();
    let mut attributes: Vec<Attribute> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() || bytes[i] == b'/' {
            i += 1;
            continue;
        }

        let name_start = i;
        i += 1;
        while i < bytes.len() && !matches!(bytes[i], b'=' | b'/') && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let name = inner[name_start..i].to_ascii_lowercase();

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        let mut value = None;
        if j < bytes.len() && bytes[j] == b'=' {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            let raw = match bytes.get(j) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let start = j + 1;
                    let end = inner[start..]
                        .find(quote as char)
                        .map_or(inner.len(), |k| start + k);
                    j = (end + 1).min(inner.len());
                    &inner[start..end]
                }
                _ => {
                    let start = j;
                    while j < bytes.len() && !bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    &inner[start..j]
                }
            };
            value = Some(html_escape::decode_html_entities(raw).into_owned());
            i = j;
        }

        match attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => attributes.push(Attribute { name, value }),
        }
    }

    attributes
}
