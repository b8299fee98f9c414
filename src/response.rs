//! Response records, clusters, frames, and query structures.
//!
//! One [`ResponseRecord`] corresponds to one line of a submitted response
//! file. Records are loosely typed on the wire but closed here: every field
//! a validation rule can touch is a variant of [`Attribute`], and every
//! record shape is a [`TaskSchema`]. Clusters and frames are the aggregated
//! views the scorers consume.

use crate::corpus::DocumentMappings;
use crate::events::{EventCode, EventLog, Site};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Cluster metatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metatype {
    /// Entity cluster.
    Entity,
    /// Relation cluster.
    Relation,
    /// Event cluster.
    Event,
}

impl Metatype {
    /// Canonical name as it appears in response files.
    pub fn name(&self) -> &'static str {
        match self {
            Metatype::Entity => "Entity",
            Metatype::Relation => "Relation",
            Metatype::Event => "Event",
        }
    }
}

impl fmt::Display for Metatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metatype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Entity" => Ok(Metatype::Entity),
            "Relation" => Ok(Metatype::Relation),
            "Event" => Ok(Metatype::Event),
            other => Err(format!("unknown metatype: {other}")),
        }
    }
}

/// Closed set of record fields that validation rules read or repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Attribute {
    DocumentId,
    KbDocumentId,
    ClusterId,
    SubjectClusterId,
    ObjectClusterId,
    ClusterType,
    Metatype,
    SubjectMetatype,
    Predicate,
    MentionSpan,
    PredicateJustification,
    Confidence,
    ImportanceValue,
    ClaimId,
    KbClaimId,
    ClaimUid,
    QueryClaimId,
    ClaimCondition,
    ClaimTopic,
    ClaimSubtopic,
    ClaimTemplate,
    ClaimEpistemicStatus,
    ClaimSentimentStatus,
    ClaimComponentType,
    ClaimRelation,
    NegationStatus,
    EntityTypeInResponse,
    EntityTypeInQuery,
    QueryId,
    Date,
}

impl Attribute {
    /// Column name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::DocumentId => "document_id",
            Attribute::KbDocumentId => "kb_document_id",
            Attribute::ClusterId => "cluster_id",
            Attribute::SubjectClusterId => "subject_cluster_id",
            Attribute::ObjectClusterId => "object_cluster_id",
            Attribute::ClusterType => "cluster_type",
            Attribute::Metatype => "metatype",
            Attribute::SubjectMetatype => "subject_metatype",
            Attribute::Predicate => "predicate",
            Attribute::MentionSpan => "mention_span_text",
            Attribute::PredicateJustification => "predicate_justification_spans_text",
            Attribute::Confidence => "confidence",
            Attribute::ImportanceValue => "importance_value",
            Attribute::ClaimId => "claim_id",
            Attribute::KbClaimId => "kb_claim_id",
            Attribute::ClaimUid => "claim_uid",
            Attribute::QueryClaimId => "query_claim_id",
            Attribute::ClaimCondition => "claim_condition",
            Attribute::ClaimTopic => "claim_topic",
            Attribute::ClaimSubtopic => "claim_subtopic",
            Attribute::ClaimTemplate => "claim_template",
            Attribute::ClaimEpistemicStatus => "claim_epistemic_status",
            Attribute::ClaimSentimentStatus => "claim_sentiment_status",
            Attribute::ClaimComponentType => "claim_component_type",
            Attribute::ClaimRelation => "claim_relation",
            Attribute::NegationStatus => "negation_status",
            Attribute::EntityTypeInResponse => "entity_type_in_response",
            Attribute::EntityTypeInQuery => "entity_type_in_query",
            Attribute::QueryId => "query_id",
            Attribute::Date => "date",
        }
    }

    /// All attributes, for column-name resolution at load time.
    pub fn all() -> &'static [Attribute] {
        use Attribute::*;
        &[
            DocumentId,
            KbDocumentId,
            ClusterId,
            SubjectClusterId,
            ObjectClusterId,
            ClusterType,
            Metatype,
            SubjectMetatype,
            Predicate,
            MentionSpan,
            PredicateJustification,
            Confidence,
            ImportanceValue,
            ClaimId,
            KbClaimId,
            ClaimUid,
            QueryClaimId,
            ClaimCondition,
            ClaimTopic,
            ClaimSubtopic,
            ClaimTemplate,
            ClaimEpistemicStatus,
            ClaimSentimentStatus,
            ClaimComponentType,
            ClaimRelation,
            NegationStatus,
            EntityTypeInResponse,
            EntityTypeInQuery,
            QueryId,
            Date,
        ]
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::all()
            .iter()
            .copied()
            .find(|a| a.name() == s)
            .ok_or_else(|| format!("unknown attribute: {s}"))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Record shapes the pipeline understands, one per response-file kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskSchema {
    /// Task1 cluster-mention assertion (coreference/type input).
    Task1ClusterMention,
    /// Task1 frame argument assertion (subject, predicate, filler).
    Task1ArgumentAssertion,
    /// Task2 cross-document entity response for a query.
    Task2CrossDocument,
    /// Task3 claim frame response.
    Task3ClaimFrame,
}

impl TaskSchema {
    /// Stable schema name.
    pub fn name(&self) -> &'static str {
        match self {
            TaskSchema::Task1ClusterMention => "TASK1_CLUSTER_MENTION",
            TaskSchema::Task1ArgumentAssertion => "TASK1_ARGUMENT_ASSERTION",
            TaskSchema::Task2CrossDocument => "TASK2_CROSS_DOCUMENT",
            TaskSchema::Task3ClaimFrame => "TASK3_CLAIM_FRAME",
        }
    }

    /// Task this schema belongs to (`task1` | `task2` | `task3`).
    pub fn task(&self) -> &'static str {
        match self {
            TaskSchema::Task1ClusterMention | TaskSchema::Task1ArgumentAssertion => "task1",
            TaskSchema::Task2CrossDocument => "task2",
            TaskSchema::Task3ClaimFrame => "task3",
        }
    }
}

impl FromStr for TaskSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TASK1_CLUSTER_MENTION" => Ok(TaskSchema::Task1ClusterMention),
            "TASK1_ARGUMENT_ASSERTION" => Ok(TaskSchema::Task1ArgumentAssertion),
            "TASK2_CROSS_DOCUMENT" => Ok(TaskSchema::Task2CrossDocument),
            "TASK3_CLAIM_FRAME" => Ok(TaskSchema::Task3ClaimFrame),
            other => Err(format!("unknown schema: {other}")),
        }
    }
}

/// A date that may stop at the year or month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialDate {
    /// Year (required).
    pub year: i64,
    /// Month, 1-12 when present.
    pub month: Option<u32>,
    /// Day of month when present.
    pub day: Option<u32>,
}

impl PartialDate {
    /// Year-only date.
    pub fn year(year: i64) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    /// Year and month.
    pub fn year_month(year: i64, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
            day: None,
        }
    }

    /// Full date.
    pub fn ymd(year: i64, month: u32, day: u32) -> Self {
        Self {
            year,
            month: Some(month),
            day: Some(day),
        }
    }
}

/// `(after, before)` bounds on one end of a temporal assertion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// The end happened on or after this date.
    pub after: Option<PartialDate>,
    /// The end happened on or before this date.
    pub before: Option<PartialDate>,
}

/// Start and end ranges asserted on a cluster or claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDate {
    /// Bounds on when it started.
    pub start: Option<DateRange>,
    /// Bounds on when it ended.
    pub end: Option<DateRange>,
}

/// One line of a submitted response file.
///
/// Mutable only inside the validator, which repairs provenance and
/// confidence fields in its own copy before releasing the record into the
/// valid set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Shape of this record.
    pub schema: TaskSchema,
    /// Input file and line this record came from.
    pub site: Site,
    /// Raw field values, keyed by the closed attribute set.
    values: BTreeMap<Attribute, String>,
    /// Parsed temporal assertion, when the schema carries one.
    pub date: Option<ClusterDate>,
}

impl ResponseRecord {
    /// New empty record for `schema`.
    pub fn new(schema: TaskSchema, site: Site) -> Self {
        Self {
            schema,
            site,
            values: BTreeMap::new(),
            date: None,
        }
    }

    /// Read a field.
    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        self.values.get(&attribute).map(String::as_str)
    }

    /// Write (or repair) a field.
    pub fn set(&mut self, attribute: Attribute, value: impl Into<String>) {
        self.values.insert(attribute, value.into());
    }

    /// Builder-style field assignment.
    #[must_use]
    pub fn with(mut self, attribute: Attribute, value: impl Into<String>) -> Self {
        self.set(attribute, value);
        self
    }

    /// Fields present on this record, in attribute order.
    pub fn fields(&self) -> impl Iterator<Item = (Attribute, &str)> {
        self.values.iter().map(|(a, v)| (*a, v.as_str()))
    }
}

/// A gold- or system-asserted grouping of mentions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Cluster ID.
    pub id: String,
    /// Metatype fixed by the first assertion.
    pub metatype: Metatype,
    /// Expanded type set: type name to the distinct mention spans
    /// asserting it.
    pub types: BTreeMap<String, BTreeSet<String>>,
}

impl Cluster {
    /// New cluster.
    pub fn new(id: impl Into<String>, metatype: Metatype) -> Self {
        Self {
            id: id.into(),
            metatype,
            types: BTreeMap::new(),
        }
    }

    /// Record a type assertion from one mention span.
    ///
    /// An assertion carrying a different metatype than the cluster's first
    /// one is kept but logged as `MISMATCHED_METATYPE`.
    pub fn assert_type(
        &mut self,
        metatype: Metatype,
        cluster_type: &str,
        mention_span: &str,
        log: &EventLog,
        site: &Site,
    ) {
        if metatype != self.metatype {
            log.record(
                EventCode::MismatchedMetatype,
                format!(
                    "cluster {}: asserted {} but first seen as {}",
                    self.id, metatype, self.metatype
                ),
                site,
            );
        }
        self.types
            .entry(cluster_type.to_string())
            .or_default()
            .insert(mention_span.to_string());
    }
}

/// Role-to-filler structure of one event or relation cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Subject cluster this frame describes.
    pub cluster_id: String,
    /// Role name to filler cluster ID to the predicates justifying it.
    pub role_fillers: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl Frame {
    /// New empty frame for `cluster_id`.
    pub fn new(cluster_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            role_fillers: BTreeMap::new(),
        }
    }

    /// Record one role filler with its justifying predicate.
    pub fn add_filler(&mut self, role: &str, filler_cluster_id: &str, predicate: &str) {
        self.role_fillers
            .entry(role.to_string())
            .or_default()
            .entry(filler_cluster_id.to_string())
            .or_default()
            .insert(predicate.to_string());
    }
}

/// A parsed gold or system response collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseSet {
    /// Run being validated or scored.
    pub run_id: String,
    /// Validated records, in input order.
    pub records: Vec<ResponseRecord>,
    /// Clusters by document then cluster ID.
    pub document_clusters: BTreeMap<String, BTreeMap<String, Cluster>>,
    /// Frames by document then subject cluster ID.
    pub document_frames: BTreeMap<String, BTreeMap<String, Frame>>,
    /// Known claim UIDs.
    pub claims: BTreeSet<String>,
}

impl ResponseSet {
    /// Empty set for `run_id`.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            ..Self::default()
        }
    }

    /// Cluster lookup; absent documents or clusters yield `None`.
    pub fn cluster(&self, document_id: &str, cluster_id: &str) -> Option<&Cluster> {
        self.document_clusters.get(document_id)?.get(cluster_id)
    }

    /// Frame lookup; absent documents or frames yield `None`.
    pub fn frame(&self, document_id: &str, cluster_id: &str) -> Option<&Frame> {
        self.document_frames.get(document_id)?.get(cluster_id)
    }

    /// Cluster to update, created at first assertion.
    pub fn cluster_mut(
        &mut self,
        document_id: &str,
        cluster_id: &str,
        metatype: Metatype,
    ) -> &mut Cluster {
        self.document_clusters
            .entry(document_id.to_string())
            .or_default()
            .entry(cluster_id.to_string())
            .or_insert_with(|| Cluster::new(cluster_id, metatype))
    }

    /// Frame to update, created at first filler.
    pub fn frame_mut(&mut self, document_id: &str, cluster_id: &str) -> &mut Frame {
        self.document_frames
            .entry(document_id.to_string())
            .or_default()
            .entry(cluster_id.to_string())
            .or_insert_with(|| Frame::new(cluster_id))
    }
}

/// One topic enumeration entry of a claim query condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    /// Topic text.
    pub topic: String,
    /// Subtopic text.
    pub subtopic: String,
    /// Claim template text.
    pub claim_template: String,
}

/// One claim query condition (topics or claim-frame enumerations).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryCondition {
    /// Topic ID to its enumerated entries.
    pub topics: BTreeMap<String, Vec<TopicEntry>>,
    /// Claim-frame IDs, when this condition queries by claim frame.
    pub query_claim_frames: BTreeSet<String>,
}

/// User queries attached to claim and cross-document validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerySet {
    /// Conditions by name (e.g. `Condition5`).
    pub conditions: BTreeMap<String, QueryCondition>,
    /// Entity type requested per cross-document query.
    pub query_entity_types: BTreeMap<String, String>,
}

impl QuerySet {
    /// Empty query set.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Shared context the validation rules read from.
pub struct ValidationScope<'a> {
    /// Corpus inventory.
    pub corpus: &'a DocumentMappings,
    /// Claim UIDs known to the response set.
    pub claims: &'a BTreeSet<String>,
    /// User queries, when the task has them.
    pub queries: Option<&'a QuerySet>,
    /// The cluster this record asserts into, when already known.
    pub cluster: Option<&'a Cluster>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_names_round_trip() {
        for attribute in Attribute::all() {
            assert_eq!(attribute.name().parse::<Attribute>().unwrap(), *attribute);
        }
        assert!("no_such_column".parse::<Attribute>().is_err());
    }

    #[test]
    fn cluster_logs_metatype_mismatch() {
        let log = EventLog::new();
        let site = Site::new("run.tab", 8);
        let mut cluster = Cluster::new("C1", Metatype::Entity);
        cluster.assert_type(Metatype::Entity, "PER", "D1:DE1:(0,0)-(4,0)", &log, &site);
        cluster.assert_type(Metatype::Event, "PER", "D1:DE1:(6,0)-(9,0)", &log, &site);
        assert_eq!(log.count(EventCode::MismatchedMetatype), 1);
        // Distinct mention spans accumulate per type.
        assert_eq!(cluster.types.get("PER").unwrap().len(), 2);
    }

    #[test]
    fn record_get_set() {
        let mut record =
            ResponseRecord::new(TaskSchema::Task1ClusterMention, Site::new("f.tab", 1))
                .with(Attribute::DocumentId, "DOC1");
        assert_eq!(record.get(Attribute::DocumentId), Some("DOC1"));
        record.set(Attribute::Confidence, "0.5");
        assert_eq!(record.get(Attribute::Confidence), Some("0.5"));
        assert_eq!(record.get(Attribute::ClaimUid), None);
    }
}
