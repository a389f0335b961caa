//! Field filters for [`TiddlerStore::search`](super::TiddlerStore::search).

use crate::models::Tiddler;

/// How a field value is tested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMatch {
    /// The field has a non-empty value.
    Present,
    /// The field value equals this string exactly.
    Equals(String),
}

/// A condition on one tiddler field.
///
/// A search matches a tiddler only if every filter holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub matcher: FieldMatch,
}

impl FieldFilter {
    pub fn present(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            matcher: FieldMatch::Present,
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            matcher: FieldMatch::Equals(value.into()),
        }
    }

    pub fn matches(&self, tiddler: &Tiddler) -> bool {
        let value = tiddler.get(&self.field);
        match &self.matcher {
            FieldMatch::Present => !value.is_empty(),
            FieldMatch::Equals(expected) => value == expected,
        }
    }
}
