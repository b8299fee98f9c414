//! Provenance string parsing.
//!
//! A provenance is a compact pointer into the corpus:
//! `documentID:documentElementID:(start_x,start_y)-(end_x,end_y)`, where a
//! video keyframe number may ride along as a trailing `_<digits>` on the
//! element ID. Parsing only takes the string apart; coordinate and corpus
//! checks live in the validator, which needs the raw coordinate text to
//! report `NOT_A_NUMBER` faithfully.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// `doc:element:(x1,y1)-(x2,y2)`. The element segment admits dots so that
/// IDs carrying a stray file extension still parse and can be corrected.
static PROVENANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w+?):([\w.]+?):\((\S+?),(\S+?)\)-\((\S+?),(\S+?)\)$")
        .expect("provenance pattern")
});

/// Trailing `_<digits>` keyframe suffix on an element ID.
static KEYFRAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\w.]*?)_(\d+)$").expect("keyframe pattern"));

/// A parsed provenance with coordinates still in raw textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// Document the justification points into.
    pub document_id: String,
    /// Document element, with any keyframe suffix already removed.
    pub document_element_id: String,
    /// Keyframe number extracted from the element ID, if present.
    pub keyframe_num: Option<u64>,
    /// Raw `[start_x, start_y, end_x, end_y]` coordinate text.
    pub coordinates: [String; 4],
}

impl Provenance {
    /// Parse a provenance string against the fixed grammar.
    ///
    /// Returns `None` when the string does not have exactly three
    /// colon-joined segments of the expected shapes.
    pub fn parse(provenance: &str) -> Option<Self> {
        let caps = PROVENANCE_RE.captures(provenance)?;
        let document_id = caps[1].to_string();
        let mut document_element_id = caps[2].to_string();
        let coordinates = [
            caps[3].to_string(),
            caps[4].to_string(),
            caps[5].to_string(),
            caps[6].to_string(),
        ];

        let mut keyframe_num = None;
        if let Some(kf) = KEYFRAME_RE.captures(&document_element_id) {
            // Unanchored element IDs ending in _<digits> denote a keyframe.
            keyframe_num = kf[2].parse::<u64>().ok();
            if keyframe_num.is_some() {
                document_element_id = kf[1].to_string();
            }
        }

        Some(Self {
            document_id,
            document_element_id,
            keyframe_num,
            coordinates,
        })
    }

    /// The keyframe boundary key, `<element>_<num>`, when a keyframe number
    /// is present.
    pub fn keyframe_id(&self) -> Option<String> {
        self.keyframe_num
            .map(|num| format!("{}_{}", self.document_element_id, num))
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let element = match self.keyframe_num {
            Some(num) => format!("{}_{}", self.document_element_id, num),
            None => self.document_element_id.clone(),
        };
        write!(
            f,
            "{}:{}:({},{})-({},{})",
            self.document_id,
            element,
            self.coordinates[0],
            self.coordinates[1],
            self.coordinates[2],
            self.coordinates[3]
        )
    }
}
