//! Corpus-side reference data consumed by validation and scoring.
//!
//! These structures are normally produced by the corpus loaders (see
//! [`crate::load`]); the core only reads them. All maps are `BTreeMap` so
//! iteration order — and therefore report order — is deterministic.

use crate::span::Boundary;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Modality of a document element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Modality {
    /// Character-offset text segments.
    Text,
    /// Pixel-box still images.
    Image,
    /// Videos; concrete boundaries come from keyframes.
    Video,
}

impl Modality {
    /// Lower-case name used in boundary-table selection.
    pub fn name(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Video => "video",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Modality::Text),
            "image" => Ok(Modality::Image),
            "video" => Ok(Modality::Video),
            other => Err(format!("unrecognized modality: {other}")),
        }
    }
}

/// File-extension to modality mapping.
///
/// Malformed element IDs sometimes keep their source filename extension;
/// this table is how the validator recognizes (and strips) them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Encodings {
    by_extension: BTreeMap<String, Modality>,
}

impl Encodings {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension (without the leading dot).
    pub fn insert(&mut self, extension: impl Into<String>, modality: Modality) {
        self.by_extension
            .insert(extension.into().to_ascii_lowercase(), modality);
    }

    /// Known extensions, without leading dots.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.by_extension.keys().map(String::as_str)
    }

    /// If `id` ends with `.<known extension>`, return it with the extension
    /// stripped.
    pub fn strip_extension<'a>(&self, id: &'a str) -> Option<&'a str> {
        let (stem, ext) = id.rsplit_once('.')?;
        self.by_extension
            .contains_key(&ext.to_ascii_lowercase())
            .then_some(stem)
    }
}

/// One document element (a text segment, image, or video file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentElement {
    /// Element ID.
    pub id: String,
    /// Modality, when known from the parent-children table.
    pub modality: Option<Modality>,
}

/// One corpus document with its structural children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document ID.
    pub id: String,
    /// Language of the document (e.g. `ENG`, `SPA`).
    pub language: String,
    /// IDs of the document elements belonging to this document.
    pub elements: BTreeSet<String>,
}

impl Document {
    /// True iff `element_id` is a structural child of this document.
    pub fn has_element(&self, element_id: &str) -> bool {
        self.elements.contains(element_id)
    }
}

/// Document and document-element inventory of the corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMappings {
    /// Documents by ID.
    pub documents: BTreeMap<String, Document>,
    /// Document elements by ID.
    pub document_elements: BTreeMap<String, DocumentElement>,
    /// Documents in scope for task1/task2 scoring.
    pub core_documents: BTreeSet<String>,
    /// Extension-to-modality table.
    pub encodings: Encodings,
}

impl DocumentMappings {
    /// Empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a (document, element) pair, creating both ends as needed.
    pub fn add_element(
        &mut self,
        document_id: &str,
        language: &str,
        element_id: &str,
        modality: Option<Modality>,
    ) {
        let document = self
            .documents
            .entry(document_id.to_string())
            .or_insert_with(|| Document {
                id: document_id.to_string(),
                language: language.to_string(),
                elements: BTreeSet::new(),
            });
        document.elements.insert(element_id.to_string());
        self.document_elements
            .entry(element_id.to_string())
            .or_insert_with(|| DocumentElement {
                id: element_id.to_string(),
                modality,
            });
    }
}

/// Per-modality boundary tables, keyed by element ID (keyframe boundaries
/// by `<element>_<num>`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundaryTables {
    /// Text segment lengths.
    pub text: BTreeMap<String, Boundary>,
    /// Image pixel boxes.
    pub image: BTreeMap<String, Boundary>,
    /// Keyframe pixel boxes.
    pub keyframe: BTreeMap<String, Boundary>,
    /// Video frame counts.
    pub video: BTreeMap<String, Boundary>,
}

impl BoundaryTables {
    /// Empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff a keyframe boundary exists for `keyframe_id`.
    pub fn has_keyframe(&self, keyframe_id: &str) -> bool {
        self.keyframe.contains_key(keyframe_id)
    }

    /// Resolve the boundary governing a justification: the keyframe table
    /// for video-with-keyframe, the modality's own table otherwise.
    pub fn resolve(
        &self,
        modality: Modality,
        element_id: &str,
        keyframe_id: Option<&str>,
    ) -> Option<&Boundary> {
        match (modality, keyframe_id) {
            (Modality::Video, Some(kf)) => self.keyframe.get(kf),
            (Modality::Video, None) => self.video.get(element_id),
            (Modality::Text, _) => self.text.get(element_id),
            (Modality::Image, _) => self.image.get(element_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn strip_extension_is_case_insensitive_and_known_only() {
        let mut encodings = Encodings::new();
        encodings.insert("mp4", Modality::Video);
        encodings.insert("jpg", Modality::Image);
        assert_eq!(encodings.strip_extension("VID7.mp4"), Some("VID7"));
        assert_eq!(encodings.strip_extension("VID7.MP4"), Some("VID7"));
        assert_eq!(encodings.strip_extension("VID7.gif"), None);
        assert_eq!(encodings.strip_extension("VID7"), None);
    }

    #[test]
    fn resolve_prefers_keyframe_table_for_video() {
        let mut tables = BoundaryTables::new();
        tables
            .video
            .insert("VID7".into(), Boundary::new(Span::text(0.0, 900.0)));
        tables
            .keyframe
            .insert("VID7_23".into(), Boundary::image(640.0, 480.0));
        let b = tables
            .resolve(Modality::Video, "VID7", Some("VID7_23"))
            .unwrap();
        assert_eq!(*b, Boundary::image(640.0, 480.0));
        assert!(tables.resolve(Modality::Video, "VID7", None).is_some());
        assert!(tables.resolve(Modality::Text, "VID7", None).is_none());
    }

    #[test]
    fn add_element_links_parent_and_child() {
        let mut mappings = DocumentMappings::new();
        mappings.add_element("DOC1", "ENG", "DE1", Some(Modality::Text));
        mappings.add_element("DOC1", "ENG", "IMG1", Some(Modality::Image));
        let doc = mappings.documents.get("DOC1").unwrap();
        assert!(doc.has_element("DE1"));
        assert!(doc.has_element("IMG1"));
        assert!(!doc.has_element("DE9"));
    }
}
