//! # rubric
//!
//! Validation and scoring for multi-task information-extraction
//! evaluations.
//!
//! - **Validation**: schema-driven rule tables over tab-separated response
//!   files, with bounded auto-corrections (span clamping, extension
//!   stripping, confidence repair)
//! - **Scoring**: cluster type ranking (AP), pairwise type similarity,
//!   frame and argument F1, cross-document ranking AP, claim-ranking NDCG
//! - **Reports**: fixed-width and tab-separated tables plus JSON export
//!
//! ## Pipeline
//!
//! ```rust,ignore
//! use rubric::events::EventLog;
//! use rubric::load;
//! use rubric::response::TaskSchema;
//! use rubric::validate::Validator;
//!
//! let log = EventLog::new();
//! let corpus = load::load_corpus(corpus_dir, &log)?;
//! let boundaries = load::load_boundaries(corpus_dir, &log)?;
//! let file = load::load_response_file(path, TaskSchema::Task1ClusterMention, &log)?;
//! let validator = Validator::new(&boundaries, &log);
//! // validate, then score the surviving records
//! ```
//!
//! Every component reports through a shared [`events::EventLog`]; nothing
//! panics on malformed input, and the log's error counter decides the
//! process exit code.
//!
//! ## Determinism
//!
//! All keyed state lives in `BTreeMap`/`BTreeSet`, so two runs over the
//! same inputs produce byte-identical reports. The pipeline is
//! single-threaded; the event log uses interior mutability, not locks.

#![warn(missing_docs)]

pub mod align;
pub mod corpus;
pub mod error;
pub mod events;
pub mod load;
pub mod provenance;
pub mod response;
pub mod score;
pub mod scorers;
pub mod span;
pub mod validate;

pub use crate::align::{AlignmentEntry, ClusterAlignment, TypeSimilarities};
pub use crate::corpus::{BoundaryTables, DocumentMappings, Encodings, Modality};
pub use crate::error::{Error, Result};
pub use crate::events::{EventCode, EventLog, Severity, Site};
pub use crate::provenance::Provenance;
pub use crate::response::{
    Attribute, Cluster, Frame, Metatype, ResponseRecord, ResponseSet, TaskSchema,
};
pub use crate::score::{Score, ScoreCollection};
pub use crate::scorers::{Scorer, ScoresManager, ScoringContext};
pub use crate::span::{Boundary, Span};
pub use crate::validate::Validator;
