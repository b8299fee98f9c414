//! Response-record validation.
//!
//! Every [`TaskSchema`] declares a table of `(attribute, rule)` pairs; a
//! record survives iff every declared rule passes. Rules never return
//! errors for bad data — they return `false` and record a categorized
//! event — and a handful of them repair the record instead of failing it
//! (confidence clamping, provenance corrections).
//!
//! Rule dispatch is a closed enum resolved at compile time; there is no
//! name-string lookup to go wrong at call time.

mod provenance;

use crate::corpus::BoundaryTables;
use crate::events::{EventCode, EventLog};
use crate::response::{
    Attribute, Metatype, PartialDate, ResponseRecord, TaskSchema, ValidationScope,
};

/// Validation rule kinds, one per distinguishable behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum RuleKind {
    // Pure membership checks.
    ClaimComponentType,
    EpistemicStatus,
    SentimentStatus,
    NegationStatus,
    ClaimRelation,
    // Cross-reference checks.
    ClaimId,
    ClaimUid,
    ClaimCondition,
    ClaimTopic,
    ClaimSubtopic,
    ClaimTemplate,
    QueryClaimId,
    DocumentId,
    Metatype,
    EntityTypeInResponse,
    EntityTypeInQuery,
    // Numeric / temporal checks.
    Confidence,
    ImportanceValue,
    Date,
    DateRanges,
    DateStartAndEnd,
    // Provenance checks with bounded corrections.
    ProvenanceTriple,
    ProvenanceTriples,
}

/// Declared rules per schema. Unknown attribute/rule combinations cannot be
/// expressed: this table is the registry.
pub fn rules_for(schema: TaskSchema) -> &'static [(Attribute, RuleKind)] {
    use Attribute as A;
    use RuleKind as R;
    match schema {
        TaskSchema::Task1ClusterMention => &[
            (A::DocumentId, R::DocumentId),
            (A::Metatype, R::Metatype),
            (A::MentionSpan, R::ProvenanceTriple),
            (A::Confidence, R::Confidence),
        ],
        TaskSchema::Task1ArgumentAssertion => &[
            (A::DocumentId, R::DocumentId),
            (A::SubjectMetatype, R::Metatype),
            (A::PredicateJustification, R::ProvenanceTriples),
            (A::Confidence, R::Confidence),
            (A::ImportanceValue, R::ImportanceValue),
            (A::NegationStatus, R::NegationStatus),
            (A::Date, R::Date),
            (A::Date, R::DateRanges),
            (A::Date, R::DateStartAndEnd),
        ],
        TaskSchema::Task2CrossDocument => &[
            (A::DocumentId, R::DocumentId),
            (A::EntityTypeInResponse, R::EntityTypeInResponse),
            (A::EntityTypeInQuery, R::EntityTypeInQuery),
            (A::MentionSpan, R::ProvenanceTriple),
            (A::Confidence, R::Confidence),
        ],
        TaskSchema::Task3ClaimFrame => &[
            (A::DocumentId, R::DocumentId),
            (A::ClaimId, R::ClaimId),
            (A::ClaimUid, R::ClaimUid),
            (A::ClaimCondition, R::ClaimCondition),
            (A::QueryClaimId, R::QueryClaimId),
            (A::ClaimTopic, R::ClaimTopic),
            (A::ClaimSubtopic, R::ClaimSubtopic),
            (A::ClaimTemplate, R::ClaimTemplate),
            (A::ClaimEpistemicStatus, R::EpistemicStatus),
            (A::ClaimSentimentStatus, R::SentimentStatus),
            (A::ClaimComponentType, R::ClaimComponentType),
            (A::ClaimRelation, R::ClaimRelation),
            (A::NegationStatus, R::NegationStatus),
            (A::Confidence, R::Confidence),
            (A::Date, R::Date),
            (A::Date, R::DateRanges),
            (A::Date, R::DateStartAndEnd),
        ],
    }
}

/// Strip surrounding double quotes and parse a confidence-style value.
pub(crate) fn parse_cv(raw: &str) -> Option<f64> {
    raw.trim().trim_matches('"').parse::<f64>().ok()
}

/// `response_type` is compatible with `query_type` when it equals it or
/// refines it with further dotted components.
pub(crate) fn types_are_compatible(query_type: &str, response_type: &str) -> bool {
    response_type == query_type
        || response_type
            .strip_prefix(query_type)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// First field on which `before` precedes `after`, comparing year, then
/// month, then day; `None` when the pair is consistent.
pub(crate) fn range_violation(before: &PartialDate, after: &PartialDate) -> Option<&'static str> {
    if before.year < after.year {
        return Some("year");
    }
    if before.year == after.year {
        if let (Some(bm), Some(am)) = (before.month, after.month) {
            if bm < am {
                return Some("month");
            }
            if bm == am {
                if let (Some(bd), Some(ad)) = (before.day, after.day) {
                    if bd < ad {
                        return Some("day");
                    }
                }
            }
        }
    }
    None
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
            if leap {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn partial_date_is_valid(date: &PartialDate) -> bool {
    if date.year < 0 {
        return false;
    }
    match (date.month, date.day) {
        (None, _) => true,
        (Some(month), None) => (1..=12).contains(&month),
        (Some(month), Some(day)) => {
            (1..=12).contains(&month) && day >= 1 && day <= days_in_month(date.year, month)
        }
    }
}

/// Applies the declared rules of a schema to each record, repairing what is
/// repairable and rejecting the rest.
pub struct Validator<'a> {
    boundaries: &'a BoundaryTables,
    log: &'a EventLog,
}

impl<'a> Validator<'a> {
    /// New validator over the given boundary tables.
    pub fn new(boundaries: &'a BoundaryTables, log: &'a EventLog) -> Self {
        Self { boundaries, log }
    }

    /// Validate one record against its schema.
    ///
    /// Consumes the record, applies every declared rule (corrections mutate
    /// the local copy), and returns the possibly-repaired record when all
    /// rules pass, `None` when any fails. Callers never see partial
    /// mutations of a rejected record.
    pub fn validate_record(
        &self,
        scope: &ValidationScope<'_>,
        record: ResponseRecord,
    ) -> Option<ResponseRecord> {
        let mut record = record;
        let mut valid = true;
        for (attribute, rule) in rules_for(record.schema) {
            if !self.apply(*rule, scope, &mut record, *attribute) {
                valid = false;
            }
        }
        valid.then_some(record)
    }

    fn apply(
        &self,
        rule: RuleKind,
        scope: &ValidationScope<'_>,
        record: &mut ResponseRecord,
        attribute: Attribute,
    ) -> bool {
        match rule {
            RuleKind::ClaimComponentType => self.membership(
                record,
                attribute,
                &[
                    "claimMedium",
                    "claimer",
                    "claimerAffiliation",
                    "claimLocation",
                    "xVariable",
                ],
            ),
            RuleKind::EpistemicStatus => self.membership(
                record,
                attribute,
                &[
                    "EpistemicTrueCertain",
                    "EpistemicTrueUncertain",
                    "EpistemicFalseCertain",
                    "EpistemicFalseUncertain",
                    "EpistemicUnknown",
                ],
            ),
            RuleKind::SentimentStatus => self.membership(
                record,
                attribute,
                &[
                    "SentimentPositive",
                    "SentimentNegative",
                    "SentimentMixed",
                    "SentimentNeutralUnknown",
                ],
            ),
            RuleKind::NegationStatus => {
                self.membership(record, attribute, &["Negated", "NotNegated"])
            }
            RuleKind::ClaimRelation => {
                self.membership(record, attribute, &["supporting", "refuting", "related"])
            }
            RuleKind::ClaimId => self.claim_id(record, attribute),
            RuleKind::ClaimUid => self.claim_uid(scope, record, attribute),
            RuleKind::ClaimCondition => self.claim_condition(scope, record, attribute),
            RuleKind::ClaimTopic => self.claim_topic(scope, record, attribute),
            RuleKind::ClaimSubtopic => self.claim_subtopic(scope, record),
            RuleKind::ClaimTemplate => self.claim_template(scope, record),
            RuleKind::QueryClaimId => self.query_claim_id(scope, record, attribute),
            RuleKind::DocumentId => self.document_id(scope, record),
            RuleKind::Metatype => self.metatype(scope, record, attribute),
            RuleKind::EntityTypeInResponse => self.entity_type_in_response(scope, record),
            RuleKind::EntityTypeInQuery => self.entity_type_in_query(scope, record),
            RuleKind::Confidence => self.confidence(record, attribute),
            RuleKind::ImportanceValue => self.importance(record, attribute),
            RuleKind::Date => self.date(record),
            RuleKind::DateRanges => self.date_ranges(record),
            RuleKind::DateStartAndEnd => self.date_start_and_end(record),
            RuleKind::ProvenanceTriple => self.provenance_triple(scope, record, attribute),
            RuleKind::ProvenanceTriples => self.provenance_triples(scope, record, attribute),
        }
    }

    fn membership(
        &self,
        record: &ResponseRecord,
        attribute: Attribute,
        allowed: &[&str],
    ) -> bool {
        let value = record.get(attribute).unwrap_or_default();
        if allowed.contains(&value) {
            return true;
        }
        self.log.record(
            EventCode::UnknownValue,
            format!(
                "{}: '{}' not in {{{}}}",
                attribute,
                value,
                allowed.join(", ")
            ),
            &record.site,
        );
        false
    }

    fn claim_id(&self, record: &ResponseRecord, attribute: Attribute) -> bool {
        let claim_id = record.get(attribute).unwrap_or_default();
        let kb_claim_id = record.get(Attribute::KbClaimId).unwrap_or(claim_id);
        if claim_id != kb_claim_id {
            self.log.record(
                EventCode::UnexpectedClaimId,
                format!("claim_id '{claim_id}' does not match kb_claim_id '{kb_claim_id}'"),
                &record.site,
            );
            return false;
        }
        true
    }

    fn claim_uid(
        &self,
        scope: &ValidationScope<'_>,
        record: &ResponseRecord,
        attribute: Attribute,
    ) -> bool {
        let claim_uid = record.get(attribute).unwrap_or_default();
        if !scope.claims.contains(claim_uid) {
            self.log.record(
                EventCode::UnknownClaimId,
                format!("claim '{claim_uid}'"),
                &record.site,
            );
            return false;
        }
        true
    }

    fn claim_condition(
        &self,
        scope: &ValidationScope<'_>,
        record: &ResponseRecord,
        attribute: Attribute,
    ) -> bool {
        let Some(queries) = scope.queries else {
            return true;
        };
        let condition = record.get(attribute).unwrap_or_default();
        if !queries.conditions.contains_key(condition) {
            self.log.record(
                EventCode::UnknownClaimCondition,
                format!("condition '{condition}'"),
                &record.site,
            );
            return false;
        }
        true
    }

    fn claim_topic(
        &self,
        scope: &ValidationScope<'_>,
        record: &ResponseRecord,
        attribute: Attribute,
    ) -> bool {
        let Some(queries) = scope.queries else {
            return true;
        };
        let topic = record.get(attribute).unwrap_or_default().trim();
        let condition = record.get(Attribute::ClaimCondition).unwrap_or_default();
        // Absent conditions are for the ClaimCondition rule to flag.
        let Some(query_condition) = queries.conditions.get(condition) else {
            return true;
        };
        let known = query_condition
            .topics
            .values()
            .flatten()
            .any(|entry| entry.topic == topic);
        if !known {
            self.log.record(
                EventCode::UnexpectedClaimValue,
                format!("topic '{topic}'"),
                &record.site,
            );
            return false;
        }
        true
    }

    fn claim_subtopic(&self, scope: &ValidationScope<'_>, record: &ResponseRecord) -> bool {
        let condition = record.get(Attribute::ClaimCondition).unwrap_or_default();
        if condition != "Condition5" && condition != "Condition6" {
            return true;
        }
        let subtopic = record.get(Attribute::ClaimSubtopic).unwrap_or_default().trim();
        if subtopic.is_empty() {
            self.log.record(
                EventCode::MissingRequiredClaimField,
                format!("subtopic required under {condition}"),
                &record.site,
            );
            return false;
        }
        let Some(queries) = scope.queries else {
            return true;
        };
        let Some(query_condition) = queries.conditions.get(condition) else {
            return true;
        };
        let topic = record.get(Attribute::ClaimTopic).unwrap_or_default().trim();
        let known = query_condition
            .topics
            .values()
            .flatten()
            .any(|entry| entry.topic == topic && entry.subtopic == subtopic);
        if !known {
            self.log.record(
                EventCode::UnexpectedClaimValue,
                format!("subtopic '{subtopic}'"),
                &record.site,
            );
            return false;
        }
        true
    }

    fn claim_template(&self, scope: &ValidationScope<'_>, record: &ResponseRecord) -> bool {
        let condition = record.get(Attribute::ClaimCondition).unwrap_or_default();
        if condition != "Condition5" && condition != "Condition6" {
            return true;
        }
        let template = record.get(Attribute::ClaimTemplate).unwrap_or_default().trim();
        if template.is_empty() {
            self.log.record(
                EventCode::MissingRequiredClaimField,
                format!("claim_template required under {condition}"),
                &record.site,
            );
            return false;
        }
        let Some(queries) = scope.queries else {
            return true;
        };
        let Some(query_condition) = queries.conditions.get(condition) else {
            return true;
        };
        let topic = record.get(Attribute::ClaimTopic).unwrap_or_default().trim();
        let subtopic = record.get(Attribute::ClaimSubtopic).unwrap_or_default().trim();
        let known = query_condition.topics.values().flatten().any(|entry| {
            entry.topic == topic && entry.subtopic == subtopic && entry.claim_template == template
        });
        if !known {
            self.log.record(
                EventCode::UnexpectedClaimValue,
                format!("claimTemplate '{template}'"),
                &record.site,
            );
            return false;
        }
        true
    }

    /// The query claim ID names the topic or claim frame the response was
    /// pooled under; it must be one the claim's condition enumerates. A
    /// condition queried by claim frames checks that set, otherwise the
    /// topic IDs.
    fn query_claim_id(
        &self,
        scope: &ValidationScope<'_>,
        record: &ResponseRecord,
        attribute: Attribute,
    ) -> bool {
        let Some(queries) = scope.queries else {
            return true;
        };
        let condition = record.get(Attribute::ClaimCondition).unwrap_or_default();
        // Absent conditions are for the ClaimCondition rule to flag.
        let Some(query_condition) = queries.conditions.get(condition) else {
            return true;
        };
        let query_claim_id = record.get(attribute).unwrap_or_default();
        let (kind, known) = if query_condition.query_claim_frames.is_empty() {
            ("topic", query_condition.topics.contains_key(query_claim_id))
        } else {
            (
                "claim frame",
                query_condition.query_claim_frames.contains(query_claim_id),
            )
        };
        if !known {
            self.log.record(
                EventCode::UnknownClaimQueryId,
                format!("{kind} '{query_claim_id}' not queried under {condition}"),
                &record.site,
            );
            return false;
        }
        true
    }

    fn document_id(&self, scope: &ValidationScope<'_>, record: &ResponseRecord) -> bool {
        let Some(document_id) = record.get(Attribute::DocumentId) else {
            self.log
                .record(EventCode::MissingItem, "document_id", &record.site);
            return false;
        };
        if !scope.corpus.documents.contains_key(document_id) {
            self.log.record(
                EventCode::UnknownItem,
                format!("document '{document_id}'"),
                &record.site,
            );
            return false;
        }
        if record.schema.task() == "task1" {
            if let Some(kb_document_id) = record.get(Attribute::KbDocumentId) {
                if kb_document_id != document_id {
                    self.log.record(
                        EventCode::UnexpectedDocument,
                        format!("expected '{kb_document_id}', got '{document_id}'"),
                        &record.site,
                    );
                    return false;
                }
            }
        }
        true
    }

    fn metatype(
        &self,
        scope: &ValidationScope<'_>,
        record: &ResponseRecord,
        attribute: Attribute,
    ) -> bool {
        let value = record.get(attribute).unwrap_or_default();
        let Ok(metatype) = value.parse::<Metatype>() else {
            self.log.record(
                EventCode::InvalidMetatype,
                format!("'{value}' not in Entity, Relation, Event"),
                &record.site,
            );
            return false;
        };
        // Frame subjects are events or relations, never entities.
        if attribute == Attribute::SubjectMetatype && metatype == Metatype::Entity {
            self.log.record(
                EventCode::UnexpectedValue,
                "metatype Entity on a frame subject",
                &record.site,
            );
            return false;
        }
        if let Some(cluster) = scope.cluster {
            if cluster.metatype != metatype {
                self.log.record(
                    EventCode::UnexpectedValue,
                    format!(
                        "metatype {} disagrees with cluster {} ({})",
                        metatype, cluster.id, cluster.metatype
                    ),
                    &record.site,
                );
                return false;
            }
        }
        true
    }

    fn entity_type_in_response(
        &self,
        scope: &ValidationScope<'_>,
        record: &ResponseRecord,
    ) -> bool {
        let Some(query_type) = self.query_entity_type(scope, record) else {
            return true;
        };
        let response_type = record
            .get(Attribute::EntityTypeInResponse)
            .unwrap_or_default();
        if !types_are_compatible(&query_type, response_type) {
            // Warn-only: a mismatched type does not invalidate the record.
            self.log.record(
                EventCode::UnexpectedEntityType,
                format!("expected {query_type} or {query_type}.*, got {response_type}"),
                &record.site,
            );
        }
        true
    }

    fn entity_type_in_query(&self, scope: &ValidationScope<'_>, record: &ResponseRecord) -> bool {
        let Some(query_type) = self.query_entity_type(scope, record) else {
            return true;
        };
        let echoed = record.get(Attribute::EntityTypeInQuery).unwrap_or_default();
        if echoed != query_type {
            self.log.record(
                EventCode::UnexpectedEntityType,
                format!("expected {query_type}, got {echoed}"),
                &record.site,
            );
        }
        true
    }

    fn query_entity_type(
        &self,
        scope: &ValidationScope<'_>,
        record: &ResponseRecord,
    ) -> Option<String> {
        let queries = scope.queries?;
        let query_id = record.get(Attribute::QueryId)?;
        queries.query_entity_types.get(query_id).cloned()
    }

    /// Confidence is best-effort: malformed or out-of-range values are
    /// repaired to 1.0 and logged, never rejected.
    fn confidence(&self, record: &mut ResponseRecord, attribute: Attribute) -> bool {
        let raw = record.get(attribute).unwrap_or_default().to_string();
        match parse_cv(&raw) {
            Some(value) if value > 0.0 && value <= 1.0 => {}
            Some(value) => {
                self.log.record(
                    EventCode::InvalidConfidence,
                    format!("{attribute} '{value}' outside (0, 1]"),
                    &record.site,
                );
                record.set(attribute, "1.0");
            }
            None => {
                self.log.record(
                    EventCode::InvalidConfidence,
                    format!("{attribute} '{raw}' is not a number"),
                    &record.site,
                );
                record.set(attribute, "1.0");
            }
        }
        true
    }

    fn importance(&self, record: &ResponseRecord, attribute: Attribute) -> bool {
        let raw = record.get(attribute).unwrap_or_default();
        if parse_cv(raw).is_none() {
            self.log.record(
                EventCode::InvalidImportanceValue,
                format!("'{raw}'"),
                &record.site,
            );
            return false;
        }
        true
    }

    fn date(&self, record: &ResponseRecord) -> bool {
        let Some(date) = record.date.as_ref() else {
            return true;
        };
        let mut valid = true;
        for part in [&date.start, &date.end].into_iter().flatten() {
            for bound in [part.after, part.before].into_iter().flatten() {
                if !partial_date_is_valid(&bound) {
                    self.log.record(
                        EventCode::InvalidDate,
                        format!(
                            "year={} month={:?} day={:?}",
                            bound.year, bound.month, bound.day
                        ),
                        &record.site,
                    );
                    valid = false;
                }
            }
        }
        valid
    }

    fn date_ranges(&self, record: &ResponseRecord) -> bool {
        let Some(date) = record.date.as_ref() else {
            return true;
        };
        let mut valid = true;
        for (name, range) in [("start", &date.start), ("end", &date.end)] {
            if let Some(range) = range {
                if let (Some(after), Some(before)) = (range.after, range.before) {
                    if let Some(field) = range_violation(&before, &after) {
                        self.log.record(
                            EventCode::InvalidDateRange,
                            format!("{name}_before precedes {name}_after on {field}"),
                            &record.site,
                        );
                        valid = false;
                    }
                }
            }
        }
        valid
    }

    fn date_start_and_end(&self, record: &ResponseRecord) -> bool {
        let Some(date) = record.date.as_ref() else {
            return true;
        };
        let (Some(start), Some(end)) = (date.start, date.end) else {
            return true;
        };
        let (Some(start_after), Some(end_before)) = (start.after, end.before) else {
            return true;
        };
        if let Some(field) = range_violation(&end_before, &start_after) {
            self.log.record(
                EventCode::InvalidDateRange,
                format!("end_before precedes start_after on {field}"),
                &record.site,
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{BoundaryTables, DocumentMappings, Modality};
    use crate::events::EventLog;
    use crate::response::{ClusterDate, DateRange};
    use crate::events::Site;
    use std::collections::BTreeSet;

    fn corpus() -> DocumentMappings {
        let mut mappings = DocumentMappings::new();
        mappings.add_element("DOC1", "ENG", "DE1", Some(Modality::Text));
        mappings
    }

    fn scope<'a>(
        corpus: &'a DocumentMappings,
        claims: &'a BTreeSet<String>,
    ) -> ValidationScope<'a> {
        ValidationScope {
            corpus,
            claims,
            queries: None,
            cluster: None,
        }
    }

    fn record(schema: TaskSchema) -> ResponseRecord {
        ResponseRecord::new(schema, Site::new("run.tab", 1))
    }

    #[test]
    fn confidence_repair_never_rejects() {
        let corpus = corpus();
        let claims = BTreeSet::new();
        let scope = scope(&corpus, &claims);
        let boundaries = BoundaryTables::new();
        for bad in ["abc", "0", "1.5", "-0.2"] {
            let log = EventLog::new();
            let validator = Validator::new(&boundaries, &log);
            let mut rec = record(TaskSchema::Task1ClusterMention);
            rec.set(Attribute::Confidence, bad);
            assert!(validator.apply(
                RuleKind::Confidence,
                &scope,
                &mut rec,
                Attribute::Confidence
            ));
            assert_eq!(rec.get(Attribute::Confidence), Some("1.0"));
            assert_eq!(log.count(EventCode::InvalidConfidence), 1);
        }
        // A well-formed in-range value passes untouched.
        let log = EventLog::new();
        let validator = Validator::new(&boundaries, &log);
        let mut rec = record(TaskSchema::Task1ClusterMention);
        rec.set(Attribute::Confidence, "0.73");
        assert!(validator.apply(
            RuleKind::Confidence,
            &scope,
            &mut rec,
            Attribute::Confidence
        ));
        assert_eq!(rec.get(Attribute::Confidence), Some("0.73"));
        assert_eq!(log.count(EventCode::InvalidConfidence), 0);
    }

    #[test]
    fn quoted_confidence_parses() {
        assert_eq!(parse_cv("\"0.73\""), Some(0.73));
        assert_eq!(parse_cv("1"), Some(1.0));
        assert_eq!(parse_cv("abc"), None);
    }

    #[test]
    fn date_range_reports_first_mismatched_field() {
        let start_after = PartialDate::year_month(2020, 6);
        let end_before = PartialDate::year_month(2020, 5);
        assert_eq!(range_violation(&end_before, &start_after), Some("month"));
        assert_eq!(
            range_violation(&PartialDate::year(2019), &PartialDate::year(2020)),
            Some("year")
        );
        assert_eq!(
            range_violation(
                &PartialDate::ymd(2020, 6, 1),
                &PartialDate::ymd(2020, 6, 15)
            ),
            Some("day")
        );
        // Partial dates without comparable fields are consistent.
        assert_eq!(
            range_violation(&PartialDate::year(2020), &PartialDate::year_month(2020, 6)),
            None
        );
    }

    #[test]
    fn start_after_end_before_inconsistency_rejects() {
        let corpus = corpus();
        let claims = BTreeSet::new();
        let scope = scope(&corpus, &claims);
        let boundaries = BoundaryTables::new();
        let log = EventLog::new();
        let validator = Validator::new(&boundaries, &log);
        let mut rec = record(TaskSchema::Task1ArgumentAssertion);
        rec.date = Some(ClusterDate {
            start: Some(DateRange {
                after: Some(PartialDate::year_month(2020, 6)),
                before: None,
            }),
            end: Some(DateRange {
                after: None,
                before: Some(PartialDate::year_month(2020, 5)),
            }),
        });
        assert!(!validator.apply(RuleKind::DateStartAndEnd, &scope, &mut rec, Attribute::Date));
        assert_eq!(log.count(EventCode::InvalidDateRange), 1);
    }

    #[test]
    fn calendar_invalid_dates_reject() {
        let corpus = corpus();
        let claims = BTreeSet::new();
        let scope = scope(&corpus, &claims);
        let boundaries = BoundaryTables::new();
        let log = EventLog::new();
        let validator = Validator::new(&boundaries, &log);
        let mut rec = record(TaskSchema::Task1ArgumentAssertion);
        rec.date = Some(ClusterDate {
            start: Some(DateRange {
                after: Some(PartialDate::ymd(2021, 2, 29)),
                before: None,
            }),
            end: None,
        });
        assert!(!validator.apply(RuleKind::Date, &scope, &mut rec, Attribute::Date));
        // 2020 was a leap year.
        rec.date = Some(ClusterDate {
            start: Some(DateRange {
                after: Some(PartialDate::ymd(2020, 2, 29)),
                before: None,
            }),
            end: None,
        });
        assert!(validator.apply(RuleKind::Date, &scope, &mut rec, Attribute::Date));
        // Month 13 never exists.
        rec.date = Some(ClusterDate {
            start: Some(DateRange {
                after: Some(PartialDate::year_month(2020, 13)),
                before: None,
            }),
            end: None,
        });
        assert!(!validator.apply(RuleKind::Date, &scope, &mut rec, Attribute::Date));
    }

    #[test]
    fn membership_rule_logs_unknown_value() {
        let corpus = corpus();
        let claims = BTreeSet::new();
        let scope = scope(&corpus, &claims);
        let boundaries = BoundaryTables::new();
        let log = EventLog::new();
        let validator = Validator::new(&boundaries, &log);
        let mut rec = record(TaskSchema::Task3ClaimFrame);
        rec.set(Attribute::NegationStatus, "Maybe");
        assert!(!validator.apply(
            RuleKind::NegationStatus,
            &scope,
            &mut rec,
            Attribute::NegationStatus
        ));
        assert_eq!(log.count(EventCode::UnknownValue), 1);
        rec.set(Attribute::NegationStatus, "Negated");
        assert!(validator.apply(
            RuleKind::NegationStatus,
            &scope,
            &mut rec,
            Attribute::NegationStatus
        ));
    }

    #[test]
    fn query_claim_id_must_be_enumerated_by_its_condition() {
        let corpus = corpus();
        let claims = BTreeSet::new();
        let mut queries = crate::response::QuerySet::new();
        queries
            .conditions
            .entry("Condition5".to_owned())
            .or_default()
            .topics
            .insert("T101".to_owned(), Vec::new());
        let scope = ValidationScope {
            corpus: &corpus,
            claims: &claims,
            queries: Some(&queries),
            cluster: None,
        };
        let boundaries = BoundaryTables::new();
        let log = EventLog::new();
        let validator = Validator::new(&boundaries, &log);
        let mut rec = record(TaskSchema::Task3ClaimFrame);
        rec.set(Attribute::ClaimCondition, "Condition5");
        rec.set(Attribute::QueryClaimId, "T999");
        assert!(!validator.apply(
            RuleKind::QueryClaimId,
            &scope,
            &mut rec,
            Attribute::QueryClaimId
        ));
        assert_eq!(log.count(EventCode::UnknownClaimQueryId), 1);
        rec.set(Attribute::QueryClaimId, "T101");
        assert!(validator.apply(
            RuleKind::QueryClaimId,
            &scope,
            &mut rec,
            Attribute::QueryClaimId
        ));
        assert_eq!(log.count(EventCode::UnknownClaimQueryId), 1);
    }

    #[test]
    fn query_claim_id_checks_claim_frames_when_condition_queries_by_frame() {
        let corpus = corpus();
        let claims = BTreeSet::new();
        let mut queries = crate::response::QuerySet::new();
        let condition = queries.conditions.entry("Condition7".to_owned()).or_default();
        condition.query_claim_frames.insert("CF1".to_owned());
        let scope = ValidationScope {
            corpus: &corpus,
            claims: &claims,
            queries: Some(&queries),
            cluster: None,
        };
        let boundaries = BoundaryTables::new();
        let log = EventLog::new();
        let validator = Validator::new(&boundaries, &log);
        let mut rec = record(TaskSchema::Task3ClaimFrame);
        rec.set(Attribute::ClaimCondition, "Condition7");
        rec.set(Attribute::QueryClaimId, "CF1");
        assert!(validator.apply(
            RuleKind::QueryClaimId,
            &scope,
            &mut rec,
            Attribute::QueryClaimId
        ));
        // The topic IDs are not consulted when claim frames are queried.
        rec.set(Attribute::QueryClaimId, "T101");
        assert!(!validator.apply(
            RuleKind::QueryClaimId,
            &scope,
            &mut rec,
            Attribute::QueryClaimId
        ));
        assert_eq!(log.count(EventCode::UnknownClaimQueryId), 1);
        // Without loaded queries the rule has nothing to check against.
        let bare = ValidationScope {
            corpus: &corpus,
            claims: &claims,
            queries: None,
            cluster: None,
        };
        assert!(validator.apply(
            RuleKind::QueryClaimId,
            &bare,
            &mut rec,
            Attribute::QueryClaimId
        ));
    }

    #[test]
    fn entity_type_mismatch_warns_but_passes() {
        let corpus = corpus();
        let claims = BTreeSet::new();
        let mut queries = crate::response::QuerySet::new();
        queries
            .query_entity_types
            .insert("Q1".into(), "PER".into());
        let scope = ValidationScope {
            corpus: &corpus,
            claims: &claims,
            queries: Some(&queries),
            cluster: None,
        };
        let boundaries = BoundaryTables::new();
        let log = EventLog::new();
        let validator = Validator::new(&boundaries, &log);
        let mut rec = record(TaskSchema::Task2CrossDocument);
        rec.set(Attribute::QueryId, "Q1");
        rec.set(Attribute::EntityTypeInResponse, "ORG");
        assert!(validator.apply(
            RuleKind::EntityTypeInResponse,
            &scope,
            &mut rec,
            Attribute::EntityTypeInResponse
        ));
        assert_eq!(log.count(EventCode::UnexpectedEntityType), 1);
        // Refinements of the query type are compatible.
        rec.set(Attribute::EntityTypeInResponse, "PER.Politician");
        assert!(validator.apply(
            RuleKind::EntityTypeInResponse,
            &scope,
            &mut rec,
            Attribute::EntityTypeInResponse
        ));
        assert_eq!(log.count(EventCode::UnexpectedEntityType), 1);
    }
}
