//! Byte offset to line/column conversion.
//!
//! Lines are split on `\n` only; a `\r` before it stays part of the line. This
//! matches how the round-trip writer walks the source line by line, so a
//! [`SourcePos`] can be used directly as a cut point in that walk.

/// A position in the source: 1-based line, 0-based byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePos {
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for SourcePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Start offsets of every line in a text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Position of `offset`, or `None` when it lies past the end of the text.
    ///
    /// The end-of-text offset itself is a valid position.
    pub fn position(&self, offset: usize) -> Option<SourcePos> {
        if offset > self.len {
            return None;
        }
        let line = self.line_starts.partition_point(|&start| start <= offset);
        Some(SourcePos {
            line,
            column: offset - self.line_starts[line - 1],
        })
    }
}
