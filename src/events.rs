//! Structured diagnostic events.
//!
//! Validators and scorers never fail on domain data; they record a
//! categorized event here and keep going (record rejection and value repair
//! are signalled through return values, not errors). The log is passed by
//! reference into every component that needs it, and its warning/error
//! counters gate the process exit code.
//!
//! Event codes are a closed enum so a new diagnostic cannot be introduced
//! without a severity and a stable code string. Every recorded event is also
//! forwarded to the `log` crate at the matching level.

use std::cell::RefCell;
use std::fmt;

/// Severity of a recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational trace (ranked-list dumps, progress notes).
    Info,
    /// Anomaly noted; processing continues, value may be auto-corrected.
    Warning,
    /// Record invalid or condition critical; gates a non-zero exit.
    Error,
}

/// Closed set of diagnostic categories with stable code strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum EventCode {
    DefaultInfo,
    // Structural failures: record rejected, no correction attempted.
    InvalidProvenanceFormat,
    UnknownItem,
    UnknownModality,
    MissingItem,
    MissingKeyframe,
    ParentChildMismatch,
    MultipleDocuments,
    NotANumber,
    NegativeNumber,
    StartBiggerThanEnd,
    SpanOffBoundaryError,
    IdWithExtensionError,
    ImproperCompoundJustification,
    InvalidMetatype,
    InvalidDate,
    InvalidDateRange,
    UnknownValue,
    UnexpectedValue,
    UnexpectedClaimId,
    UnknownClaimId,
    UnknownClaimCondition,
    UnknownClaimQueryId,
    UnexpectedClaimValue,
    MissingRequiredClaimField,
    UnexpectedDocument,
    InvalidImportanceValue,
    // Correctable or warn-only anomalies.
    UnexpectedColumn,
    IdWithExtension,
    SpanOffBoundaryCorrected,
    InvalidConfidence,
    UnexpectedEntityType,
    MismatchedMetatype,
    // Programming-contract / cross-consistency escalations.
    UnexpectedAlignedClusterMetatype,
    DefaultCriticalError,
}

impl EventCode {
    /// Stable code string used in the event stream.
    pub fn code(&self) -> &'static str {
        match self {
            EventCode::DefaultInfo => "DEFAULT_INFO",
            EventCode::InvalidProvenanceFormat => "INVALID_PROVENANCE_FORMAT",
            EventCode::UnknownItem => "UNKNOWN_ITEM",
            EventCode::UnknownModality => "UNKNOWN_MODALITY",
            EventCode::MissingItem => "MISSING_ITEM",
            EventCode::MissingKeyframe => "MISSING_KEYFRAME",
            EventCode::ParentChildMismatch => "PARENT_CHILD_RELATION_FAILURE",
            EventCode::MultipleDocuments => "MULTIPLE_DOCUMENTS",
            EventCode::NotANumber => "NOT_A_NUMBER",
            EventCode::NegativeNumber => "NEGATIVE_NUMBER",
            EventCode::StartBiggerThanEnd => "START_BIGGER_THAN_END",
            EventCode::SpanOffBoundaryError => "SPAN_OFF_BOUNDARY_ERROR",
            EventCode::IdWithExtensionError => "ID_WITH_EXTENSION_ERROR",
            EventCode::ImproperCompoundJustification => "IMPROPER_COMPOUND_JUSTIFICATION",
            EventCode::InvalidMetatype => "INVALID_METATYPE",
            EventCode::InvalidDate => "INVALID_DATE",
            EventCode::InvalidDateRange => "INVALID_DATE_RANGE",
            EventCode::UnknownValue => "UNKNOWN_VALUE",
            EventCode::UnexpectedValue => "UNEXPECTED_VALUE",
            EventCode::UnexpectedClaimId => "UNEXPECTED_CLAIM_ID",
            EventCode::UnknownClaimId => "UNKNOWN_CLAIM_ID",
            EventCode::UnknownClaimCondition => "UNKNOWN_CLAIM_CONDITION",
            EventCode::UnknownClaimQueryId => "UNKNOWN_CLAIM_QUERY_TOPIC_OR_CLAIM_FRAME_ID",
            EventCode::UnexpectedClaimValue => "UNEXPECTED_CLAIM_VALUE",
            EventCode::MissingRequiredClaimField => "MISSING_REQUIRED_CLAIM_FIELD",
            EventCode::UnexpectedDocument => "UNEXPECTED_DOCUMENT",
            EventCode::InvalidImportanceValue => "INVALID_IMPORTANCE_VALUE",
            EventCode::UnexpectedColumn => "UNEXPECTED_COLUMN",
            EventCode::IdWithExtension => "ID_WITH_EXTENSION",
            EventCode::SpanOffBoundaryCorrected => "SPAN_OFF_BOUNDARY_CORRECTED",
            EventCode::InvalidConfidence => "INVALID_CONFIDENCE",
            EventCode::UnexpectedEntityType => "UNEXPECTED_ENTITY_TYPE",
            EventCode::MismatchedMetatype => "MISMATCHED_METATYPE",
            EventCode::UnexpectedAlignedClusterMetatype => "UNEXPECTED_ALIGNED_CLUSTER_METATYPE",
            EventCode::DefaultCriticalError => "DEFAULT_CRITICAL_ERROR",
        }
    }

    /// Severity associated with this code.
    pub fn severity(&self) -> Severity {
        use EventCode::*;
        match self {
            DefaultInfo => Severity::Info,
            UnexpectedColumn
            | IdWithExtension
            | SpanOffBoundaryCorrected
            | InvalidConfidence
            | UnexpectedEntityType
            | MismatchedMetatype => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Location of the record that triggered an event (input file and line).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Site {
    /// Input filename.
    pub filename: String,
    /// 1-based line number.
    pub line: usize,
}

impl Site {
    /// Create a site from a filename and line number.
    pub fn new(filename: impl Into<String>, line: usize) -> Self {
        Self {
            filename: filename.into(),
            line,
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.filename.is_empty() {
            f.write_str("<unknown>")
        } else {
            write!(f, "{}:{}", self.filename, self.line)
        }
    }
}

/// One recorded diagnostic event.
#[derive(Debug, Clone)]
pub struct Event {
    /// Categorized code.
    pub code: EventCode,
    /// Human-readable detail.
    pub message: String,
    /// Where in the input the event arose.
    pub site: Site,
}

/// Append-only event stream with severity counters.
///
/// Single-threaded by design (see the concurrency model): interior
/// mutability lets validators and scorers share one log by `&` reference.
#[derive(Debug, Default)]
pub struct EventLog {
    events: RefCell<Vec<Event>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event, forwarding it to the `log` crate.
    pub fn record(&self, code: EventCode, message: impl Into<String>, site: &Site) {
        let message = message.into();
        match code.severity() {
            Severity::Info => log::info!("{} {} ({})", code, message, site),
            Severity::Warning => log::warn!("{} {} ({})", code, message, site),
            Severity::Error => log::error!("{} {} ({})", code, message, site),
        }
        self.events.borrow_mut().push(Event {
            code,
            message,
            site: site.clone(),
        });
    }

    /// Record an event with no input location.
    pub fn record_nowhere(&self, code: EventCode, message: impl Into<String>) {
        self.record(code, message, &Site::default());
    }

    /// Number of warning-severity events recorded so far.
    pub fn warnings(&self) -> usize {
        self.count_severity(Severity::Warning)
    }

    /// Number of error-severity events recorded so far.
    pub fn errors(&self) -> usize {
        self.count_severity(Severity::Error)
    }

    fn count_severity(&self, severity: Severity) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.code.severity() == severity)
            .count()
    }

    /// Number of events recorded with the given code.
    ///
    /// Exposed so repair-heavy codes (e.g. `INVALID_CONFIDENCE`) can be
    /// surfaced as a corruption rate, not just a log line.
    pub fn count(&self, code: EventCode) -> usize {
        self.events.borrow().iter().filter(|e| e.code == code).count()
    }

    /// Snapshot of all recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_severity() {
        let log = EventLog::new();
        let site = Site::new("run.tab", 3);
        log.record(EventCode::InvalidConfidence, "abc", &site);
        log.record(EventCode::UnknownItem, "document D1", &site);
        log.record(EventCode::DefaultInfo, "started", &site);
        assert_eq!(log.warnings(), 1);
        assert_eq!(log.errors(), 1);
        assert_eq!(log.count(EventCode::InvalidConfidence), 1);
    }

    #[test]
    fn codes_are_stable_strings() {
        assert_eq!(
            EventCode::SpanOffBoundaryCorrected.code(),
            "SPAN_OFF_BOUNDARY_CORRECTED"
        );
        assert_eq!(EventCode::InvalidDateRange.code(), "INVALID_DATE_RANGE");
        assert_eq!(
            EventCode::DefaultCriticalError.severity(),
            Severity::Error
        );
    }

    // Both cross-consistency anomalies on an aligned pair are critical:
    // either one must gate the exit code the same way.
    #[test]
    fn aligned_pair_anomalies_are_error_severity() {
        assert_eq!(
            EventCode::UnexpectedAlignedClusterMetatype.severity(),
            Severity::Error
        );
        assert_eq!(
            EventCode::DefaultCriticalError.severity(),
            Severity::Error
        );
    }
}
