// crates/captions-core/src/core/content.rs
// ============================================================================
// Module: Captions Content Model
// Description: Content documents, sections, and dotted key lookup.
// Purpose: Represent one locale's localized text as a tree of named sections.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`ContentDocument`] maps section names to [`Section`] trees. Leaves are
//! string templates that may contain `{name}` placeholders; branches nest
//! further mappings. The JSON wire form is a top-level object of section name
//! to object, for example `{"common": {"save": "Guardar"}}`.
//!
//! Keys are addressed with `.`-separated paths whose first segment names the
//! section. A path resolves only when it ends on a string leaf.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Separator between key path segments.
pub const KEY_SEPARATOR: char = '.';

// ============================================================================
// SECTION: Types
// ============================================================================

/// Node in a content tree.
///
/// # Invariants
/// - Only [`ContentNode::Text`] leaves terminate a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentNode {
    /// String template leaf.
    Text(String),
    /// Nested mapping.
    Branch(BTreeMap<String, Self>),
}

/// Named sub-tree of a content document.
pub type Section = BTreeMap<String, ContentNode>;

/// Full content for one locale.
///
/// # Invariants
/// - Section names are unique; keys are unique within each mapping.
/// - Every top-level value is a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDocument {
    /// Sections keyed by name.
    sections: BTreeMap<String, Section>,
}

/// Content document decoding errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Payload is not a JSON object of section mappings.
    #[error("malformed content document: {0}")]
    Malformed(String),
    /// Document could not be encoded.
    #[error("content document encoding failed: {0}")]
    Encode(String),
}

// ============================================================================
// SECTION: Document Operations
// ============================================================================

impl ContentDocument {
    /// Creates an empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sections: BTreeMap::new(),
        }
    }

    /// Decodes a document from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] when the payload is not a JSON
    /// object whose values are string or object trees.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        serde_json::from_slice(bytes).map_err(|err| DocumentError::Malformed(err.to_string()))
    }

    /// Encodes the document as compact JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Encode`] when serialization fails.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, DocumentError> {
        serde_json::to_vec(self).map_err(|err| DocumentError::Encode(err.to_string()))
    }

    /// Returns true when the document has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Returns the number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns a section by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Returns true when the named section is present.
    #[must_use]
    pub fn contains_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Iterates section names in sorted order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Inserts or replaces a section.
    pub fn insert_section(&mut self, name: impl Into<String>, section: Section) {
        self.sections.insert(name.into(), section);
    }

    /// Returns a copy holding only the named sections that exist here.
    #[must_use]
    pub fn retain_sections<'a, I>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut filtered = Self::new();
        for name in names {
            if let Some(section) = self.sections.get(name) {
                filtered.sections.insert(name.to_string(), section.clone());
            }
        }
        filtered
    }

    /// Resolves a dotted key path to a string leaf.
    ///
    /// Returns `None` when any segment is missing, any segment is empty, or the
    /// path ends on a branch.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut segments = key.split(KEY_SEPARATOR);
        let section = self.sections.get(segments.next()?)?;
        let mut node = section.get(segments.next()?)?;
        for segment in segments {
            match node {
                ContentNode::Branch(children) => node = children.get(segment)?,
                ContentNode::Text(_) => return None,
            }
        }
        match node {
            ContentNode::Text(text) => Some(text.as_str()),
            ContentNode::Branch(_) => None,
        }
    }
}

impl FromIterator<(String, Section)> for ContentDocument {
    fn from_iter<T: IntoIterator<Item = (String, Section)>>(iter: T) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
