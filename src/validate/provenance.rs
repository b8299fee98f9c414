//! Provenance validation against corpus boundaries.
//!
//! Parses the compact justification string, resolves it against the corpus
//! (document, element, modality, keyframe), and validates the span against
//! the right boundary table. Two classes of mistakes are auto-corrected
//! when correction is allowed: element IDs carrying a known file extension,
//! and spans that overflow their boundary. Everything else is a hard
//! rejection.

use super::Validator;
use crate::events::EventCode;
use crate::provenance::Provenance;
use crate::response::{Attribute, ResponseRecord, TaskSchema, ValidationScope};
use crate::span::Span;

impl<'a> Validator<'a> {
    /// Single-provenance attribute: corrections always allowed.
    pub(super) fn provenance_triple(
        &self,
        scope: &ValidationScope<'_>,
        record: &mut ResponseRecord,
        attribute: Attribute,
    ) -> bool {
        let Some(raw) = record.get(attribute).map(str::to_string) else {
            self.log
                .record(EventCode::MissingItem, attribute.name(), &record.site);
            return false;
        };
        self.validate_provenance(scope, record, attribute, &raw, true)
    }

    /// Semicolon-joined attribute of at most two provenances.
    ///
    /// A compound (two-span) justification is never auto-corrected; more
    /// than two segments is always a hard failure.
    pub(super) fn provenance_triples(
        &self,
        scope: &ValidationScope<'_>,
        record: &mut ResponseRecord,
        attribute: Attribute,
    ) -> bool {
        let Some(raw) = record.get(attribute).map(str::to_string) else {
            self.log
                .record(EventCode::MissingItem, attribute.name(), &record.site);
            return false;
        };
        let segments: Vec<&str> = raw.split(';').collect();
        if segments.len() > 2 {
            self.log.record(
                EventCode::ImproperCompoundJustification,
                raw.clone(),
                &record.site,
            );
            return false;
        }
        let apply_correction = segments.len() == 1;
        for segment in segments {
            if !self.validate_provenance(scope, record, attribute, segment, apply_correction) {
                return false;
            }
        }
        true
    }

    fn validate_provenance(
        &self,
        scope: &ValidationScope<'_>,
        record: &mut ResponseRecord,
        attribute: Attribute,
        provenance: &str,
        apply_correction: bool,
    ) -> bool {
        // Task3 claim fields may assert no justification at all.
        if record.schema == TaskSchema::Task3ClaimFrame && provenance == "NULL" {
            return true;
        }

        let Some(mut parsed) = Provenance::parse(provenance) else {
            self.log.record(
                EventCode::InvalidProvenanceFormat,
                provenance,
                &record.site,
            );
            return false;
        };

        // Element IDs sometimes keep their source filename extension.
        if let Some(stem) = scope
            .corpus
            .encodings
            .strip_extension(&parsed.document_element_id)
            .map(str::to_string)
        {
            if !apply_correction {
                self.log.record(
                    EventCode::IdWithExtensionError,
                    format!("document element id '{}'", parsed.document_element_id),
                    &record.site,
                );
                return false;
            }
            self.log.record(
                EventCode::IdWithExtension,
                format!("document element id '{}'", parsed.document_element_id),
                &record.site,
            );
            parsed.document_element_id = stem;
            record.set(attribute, parsed.to_string());
        }

        if Some(parsed.document_id.as_str()) != record.get(Attribute::DocumentId) {
            self.log.record(
                EventCode::MultipleDocuments,
                format!(
                    "provenance names '{}', record names '{}'",
                    parsed.document_id,
                    record.get(Attribute::DocumentId).unwrap_or_default()
                ),
                &record.site,
            );
            return false;
        }

        let Some(document) = scope.corpus.documents.get(&parsed.document_id) else {
            self.log.record(
                EventCode::UnknownItem,
                format!("document '{}'", parsed.document_id),
                &record.site,
            );
            return false;
        };
        let Some(element) = scope
            .corpus
            .document_elements
            .get(&parsed.document_element_id)
        else {
            self.log.record(
                EventCode::UnknownItem,
                format!("document element '{}'", parsed.document_element_id),
                &record.site,
            );
            return false;
        };

        let Some(modality) = element.modality else {
            self.log.record(
                EventCode::UnknownModality,
                parsed.document_element_id.clone(),
                &record.site,
            );
            return false;
        };

        let keyframe_id = parsed.keyframe_id();
        if modality == crate::corpus::Modality::Video {
            if let Some(keyframe_id) = keyframe_id.as_deref() {
                if !self.boundaries.has_keyframe(keyframe_id) {
                    self.log.record(
                        EventCode::MissingKeyframe,
                        format!("keyframe '{keyframe_id}'"),
                        &record.site,
                    );
                    return false;
                }
            }
        }

        if !document.has_element(&parsed.document_element_id) {
            self.log.record(
                EventCode::ParentChildMismatch,
                format!(
                    "'{}' is not a child of '{}'",
                    parsed.document_element_id, parsed.document_id
                ),
                &record.site,
            );
            return false;
        }

        // Coordinate problems are always hard failures, never corrected.
        let Some(span) = self.validate_coordinates(&parsed, record) else {
            return false;
        };

        let Some(boundary) = self.boundaries.resolve(
            modality,
            &parsed.document_element_id,
            keyframe_id.as_deref(),
        ) else {
            self.log.record(
                EventCode::MissingItem,
                format!(
                    "{} boundary for '{}'",
                    modality,
                    keyframe_id.as_deref().unwrap_or(&parsed.document_element_id)
                ),
                &record.site,
            );
            return false;
        };

        if boundary.validate(&span) {
            return true;
        }
        let corrected = boundary.correct(&span);
        let (Some(corrected), true) = (corrected, apply_correction) else {
            self.log.record(
                EventCode::SpanOffBoundaryError,
                format!("span {span} outside boundary {boundary}"),
                &record.site,
            );
            return false;
        };
        parsed.coordinates = [
            crate::span::format_coord(corrected.start_x),
            crate::span::format_coord(corrected.start_y),
            crate::span::format_coord(corrected.end_x),
            crate::span::format_coord(corrected.end_y),
        ];
        record.set(attribute, parsed.to_string());
        self.log.record(
            EventCode::SpanOffBoundaryCorrected,
            format!("span {span} clamped to {corrected} within {boundary}"),
            &record.site,
        );
        true
    }

    fn validate_coordinates(
        &self,
        parsed: &Provenance,
        record: &ResponseRecord,
    ) -> Option<Span> {
        let mut values = [0f64; 4];
        for (value, raw) in values.iter_mut().zip(parsed.coordinates.iter()) {
            let Ok(parsed_value) = raw.parse::<f64>() else {
                self.log
                    .record(EventCode::NotANumber, format!("'{raw}'"), &record.site);
                return None;
            };
            if parsed_value < 0.0 {
                self.log
                    .record(EventCode::NegativeNumber, format!("'{raw}'"), &record.site);
                return None;
            }
            *value = parsed_value;
        }
        let [start_x, start_y, end_x, end_y] = values;
        for (start, end) in [(start_x, end_x), (start_y, end_y)] {
            if start > end {
                self.log.record(
                    EventCode::StartBiggerThanEnd,
                    format!("{start} > {end} in {parsed}"),
                    &record.site,
                );
                return None;
            }
        }
        Some(Span::new(start_x, start_y, end_x, end_y))
    }
}
