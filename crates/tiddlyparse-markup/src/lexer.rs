//! # Lexer - Tokenizing HTML Source
//!
//! Breaks a document into tag, comment, declaration and text tokens using the
//! [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte of the input appears in exactly one token. Nothing is skipped,
//! normalized or decoded here, which is what lets the writer copy untouched
//! regions of a wiki file back out byte for byte:
//!
//! ```
//! use tiddlyparse_markup::lexer::lex;
//!
//! let input = "<p class=\"x\">Hello &amp; bye</p>\n";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Raw Text Elements
//!
//! The bodies of `script`, `style`, `textarea` and `title` are not markup:
//! a `<` inside a script is just a character. Logos is context-free, so
//! [`lex`] handles these itself: after a start tag for one of them it emits
//! everything up to the matching close tag as a single [`MarkupKind::RawText`]
//! token and moves the Logos cursor past it.

use logos::{Lexer, Logos};

use crate::span::Span;

/// Elements whose content is raw text up to the matching close tag.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Token kinds produced by the Logos lexer.
///
/// Tags are matched by their opening characters and finished by a callback
/// that scans to the closing `>` while respecting quoted attribute values.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"")]
pub enum TokenKind {
    /// `<name ...>`
    #[regex(r"<[a-zA-Z]", finish_tag)]
    StartTag,

    /// `</name ...>`
    #[regex(r"</[a-zA-Z]", finish_tag)]
    EndTag,

    /// `<!...>`, `<!-- ... -->` or `<?...>`
    #[regex(r"<[!?]", finish_declaration)]
    Declaration,

    /// Character data between tags
    #[regex(r"[^<]+")]
    Text,
}

/// Public token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkupKind {
    StartTag,
    EndTag,
    Comment,
    Declaration,
    Text,
    RawText,
}

/// A lexed token with its kind, text slice and byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: MarkupKind,
    pub text: &'a str,
    pub span: Span,
}

impl Token<'_> {
    /// Lowercased element name of a start or end tag.
    pub fn tag_name(&self) -> Option<String> {
        let rest = match self.kind {
            MarkupKind::StartTag => self.text.strip_prefix('<')?,
            MarkupKind::EndTag => self.text.strip_prefix("</")?,
            _ => return None,
        };
        let name: String = rest
            .chars()
            .take_while(|c| !c.is_whitespace() && *c != '/' && *c != '>')
            .collect();
        Some(name.to_ascii_lowercase())
    }

    /// True for `<br/>`-style start tags.
    pub fn is_self_closing(&self) -> bool {
        self.kind == MarkupKind::StartTag && self.text.ends_with("/>")
    }
}

/// Scan to the `>` that ends a tag, skipping over quoted values.
fn finish_tag(lex: &mut Lexer<TokenKind>) -> bool {
    let mut quote: Option<u8> = None;
    for (i, b) in lex.remainder().bytes().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => {
                lex.bump(i + 1);
                return true;
            }
            None => {}
        }
    }
    // Unterminated tag: the opening characters fall back to text.
    false
}

fn finish_declaration(lex: &mut Lexer<TokenKind>) -> bool {
    let rest = lex.remainder();
    let consumed = if lex.slice() == "<!" && rest.starts_with("--") {
        rest[2..].find("-->").map(|i| i + 2 + 3)
    } else {
        rest.find('>').map(|i| i + 1)
    };
    lex.bump(consumed.unwrap_or(rest.len()));
    true
}

/// Byte index of the `</name` that closes a raw text element, if any.
fn find_close_tag(rest: &str, name: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut from = 0;
    while let Some(i) = rest[from..].find("</") {
        let at = from + i;
        let name_end = at + 2 + name.len();
        if name_end <= bytes.len()
            && bytes[at + 2..name_end].eq_ignore_ascii_case(name.as_bytes())
            && bytes
                .get(name_end)
                .is_none_or(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
        {
            return Some(at);
        }
        from = at + 2;
    }
    None
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        let text = lexer.slice();
        let kind = match result {
            Ok(TokenKind::StartTag) => MarkupKind::StartTag,
            Ok(TokenKind::EndTag) => MarkupKind::EndTag,
            Ok(TokenKind::Declaration) if text.starts_with("<!--") => MarkupKind::Comment,
            Ok(TokenKind::Declaration) => MarkupKind::Declaration,
            Ok(TokenKind::Text) => MarkupKind::Text,
            // A `<` that opens nothing is plain text
            Err(()) => MarkupKind::Text,
        };
        let token = Token { kind, text, span };

        let raw_element = token
            .tag_name()
            .filter(|name| kind == MarkupKind::StartTag && RAW_TEXT_ELEMENTS.contains(&name.as_str()));
        tokens.push(token);

        if let Some(name) = raw_element
            && !text.ends_with("/>")
        {
            let rest = lexer.remainder();
            let len = find_close_tag(rest, &name).unwrap_or(rest.len());
            if len > 0 {
                let start = span.end;
                tokens.push(Token {
                    kind: MarkupKind::RawText,
                    text: &rest[..len],
                    span: Span::new(start, start + len),
                });
                lexer.bump(len);
            }
        }
    }

    tokens
}
