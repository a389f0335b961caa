use crate::error::WikiError;

/// Field names starting with this prefix cannot be set on a tiddler.
pub const RESERVED_PREFIX: &str = "__";

/// An insertion-ordered string map.
///
/// Tiddlers carry a handful of fields, so a vector with linear lookup keeps
/// order for free and stays cheaper than hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a value; an existing key keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

/// A single titled note in a wiki.
///
/// Field values come from two layers:
///
/// - **stored** values, exactly as read from the document, never changed;
/// - **overrides**, set at runtime through [`Tiddler::set`].
///
/// Reads consult the overrides first. [`Tiddler::fields`] merges both layers
/// keeping the stored field order, so a tiddler written back without changes
/// serializes exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tiddler {
    stored: Fields,
    overrides: Fields,
    /// Stored title of a tiddler read from a document.
    origin: Option<String>,
}

impl Tiddler {
    /// A fresh tiddler that is not part of any document yet.
    pub fn new(title: impl Into<String>) -> Self {
        let mut overrides = Fields::new();
        overrides.insert("title", title);
        Self {
            stored: Fields::new(),
            overrides,
            origin: None,
        }
    }

    /// A tiddler read from a document.
    ///
    /// Fails when the stored fields carry no `title`.
    pub fn from_stored(stored: Fields) -> Result<Self, WikiError> {
        let origin = stored
            .get("title")
            .ok_or_else(|| WikiError::Structure("tiddler has no title field".to_string()))?
            .to_string();
        Ok(Self {
            stored,
            overrides: Fields::new(),
            origin: Some(origin),
        })
    }

    /// Effective value of a field; unset fields read as `""`.
    pub fn get(&self, name: &str) -> &str {
        self.overrides
            .get(name)
            .or_else(|| self.stored.get(name))
            .unwrap_or("")
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), WikiError> {
        if name.starts_with(RESERVED_PREFIX) {
            return Err(WikiError::ReservedField(name.to_string()));
        }
        self.overrides.insert(name, value);
        Ok(())
    }

    pub fn title(&self) -> &str {
        self.get("title")
    }

    pub fn text(&self) -> &str {
        self.get("text")
    }

    /// The stored title for tiddlers read from a document; `None` for
    /// tiddlers made with [`Tiddler::new`]. Unaffected by renames.
    pub fn origin_title(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// True if any field has been set since the tiddler was created or read.
    pub fn is_dirty(&self) -> bool {
        self.overrides
            .iter()
            .any(|(name, value)| self.stored.get(name) != Some(value))
    }

    pub fn stored_values(&self) -> &Fields {
        &self.stored
    }

    pub fn overrides(&self) -> &Fields {
        &self.overrides
    }

    /// All effective fields: stored order first, then fields only set at
    /// runtime in the order they were first set.
    pub fn fields(&self) -> Vec<(&str, &str)> {
        let mut fields: Vec<(&str, &str)> = self
            .stored
            .iter()
            .map(|(name, value)| (name, self.overrides.get(name).unwrap_or(value)))
            .collect();
        fields.extend(
            self.overrides
                .iter()
                .filter(|(name, _)| !self.stored.contains(name)),
        );
        fields
    }

    /// Fields as a JSON object, preserving [`Tiddler::fields`] order.
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.fields()
            .into_iter()
            .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
            .collect()
    }
}
