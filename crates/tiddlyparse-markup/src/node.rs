//! Element tree types.

use crate::span::Span;

/// A child of the document root or of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Element(element) => element.span,
            Node::Text(text) => text.span,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }
}

/// What kind of non-element content a [`Text`] node holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKind {
    /// Character data; entities are decoded when read as text.
    Data,
    /// Body of a raw text element such as `script`; read verbatim.
    Raw,
    Comment,
    Declaration,
    /// An end tag that closed nothing.
    StrayMarkup,
}

/// Non-element content, stored as a span into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Text {
    pub kind: TextKind,
    pub span: Span,
}

/// An attribute with its lowercased name and entity-decoded value.
///
/// Valueless attributes (`<input disabled>`) have `value: None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name.
    pub name: String,
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// The whole element, from `<` of the start tag to the end of its end tag
    /// (or to where it was implicitly closed).
    pub span: Span,
    pub start_tag: Span,
    pub end_tag: Option<Span>,
}

impl Element {
    /// Value of an attribute; valueless attributes read as `""`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    /// True if the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    /// Direct child elements, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }
}

/// Address of a node: child indices from the document root down.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn parent(&self) -> Option<NodePath> {
        let (_, parent) = self.0.split_last()?;
        Some(NodePath(parent.to_vec()))
    }

    pub fn index(&self) -> Option<usize> {
        self.0.last().copied()
    }
}
