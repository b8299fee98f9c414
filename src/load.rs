//! Tab-separated input files.
//!
//! Every input is a header-driven TSV; loaders resolve columns by name, so
//! column order never matters. Malformed rows are logged against their
//! file and line through the shared [`EventLog`] rather than aborting the
//! whole load; structurally unreadable files are hard errors.

use crate::align::{ClusterAlignment, TypeSimilarities};
use crate::corpus::{BoundaryTables, DocumentMappings, Encodings, Modality};
use crate::error::{Error, Result};
use crate::events::{EventCode, EventLog, Site};
use crate::response::{
    Attribute, ClusterDate, DateRange, PartialDate, QuerySet, ResponseRecord, ResponseSet,
    TaskSchema, TopicEntry,
};
use crate::span::Boundary;
use crate::span::Span;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

// Date bounds travel in dedicated columns rather than as attributes.
const DATE_COLUMNS: [&str; 4] = ["start_after", "start_before", "end_after", "end_before"];

/// One parsed TSV: header names plus rows with their 1-based line numbers.
struct Table {
    header: Vec<String>,
    rows: Vec<(usize, Vec<String>)>,
}

impl Table {
    fn read(path: &Path) -> Result<Table> {
        let text = fs::read_to_string(path)?;
        let mut lines = text.lines().enumerate();
        let header = match lines.next() {
            Some((_, line)) => line.split('\t').map(|s| s.trim().to_string()).collect(),
            None => return Err(Error::parse(format!("{}: empty file", path.display()))),
        };
        let mut rows = Vec::new();
        for (index, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            rows.push((
                index + 1,
                line.split('\t').map(|s| s.trim().to_string()).collect(),
            ));
        }
        Ok(Table { header, rows })
    }

    fn column(&self, path: &Path, name: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::parse(format!("{}: missing column '{name}'", path.display())))
    }
}

fn cell<'a>(row: &'a [String], index: usize) -> &'a str {
    row.get(index).map(String::as_str).unwrap_or_default()
}

/// Load `extension -> modality` mappings.
///
/// Columns: `extension`, `modality`.
pub fn load_encodings(path: &Path, log: &EventLog) -> Result<Encodings> {
    let table = Table::read(path)?;
    let extension = table.column(path, "extension")?;
    let modality = table.column(path, "modality")?;
    let mut encodings = Encodings::new();
    for (line, row) in &table.rows {
        let raw = cell(row, modality);
        match raw.parse::<Modality>() {
            Ok(parsed) => encodings.insert(cell(row, extension), parsed),
            Err(_) => log.record(
                EventCode::UnknownModality,
                format!("modality '{raw}'"),
                &Site::new(path.display().to_string(), *line),
            ),
        }
    }
    Ok(encodings)
}

/// Load the set of core (scorable) document IDs.
///
/// Columns: `document_id`.
pub fn load_core_documents(path: &Path) -> Result<BTreeSet<String>> {
    let table = Table::read(path)?;
    let document_id = table.column(path, "document_id")?;
    Ok(table
        .rows
        .iter()
        .map(|(_, row)| cell(row, document_id).to_string())
        .collect())
}

/// Load document/element parentage into `corpus`.
///
/// Columns: `document_id`, `document_element_id`, `language`, `modality`.
pub fn load_parent_children(path: &Path, corpus: &mut DocumentMappings, log: &EventLog) -> Result<()> {
    let table = Table::read(path)?;
    let document_id = table.column(path, "document_id")?;
    let element_id = table.column(path, "document_element_id")?;
    let language = table.column(path, "language")?;
    let modality = table.column(path, "modality")?;
    for (line, row) in &table.rows {
        let raw = cell(row, modality);
        let parsed = match raw.parse::<Modality>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                log.record(
                    EventCode::UnknownModality,
                    format!("modality '{raw}'"),
                    &Site::new(path.display().to_string(), *line),
                );
                None
            }
        };
        corpus.add_element(
            cell(row, document_id),
            cell(row, language),
            cell(row, element_id),
            parsed,
        );
    }
    Ok(())
}

/// Load the full corpus inventory from a directory laid out as
/// `encodings.tab`, `core_documents.tab`, `parent_children.tab`.
pub fn load_corpus(dir: &Path, log: &EventLog) -> Result<DocumentMappings> {
    let mut corpus = DocumentMappings::new();
    corpus.encodings = load_encodings(&dir.join("encodings.tab"), log)?;
    corpus.core_documents = load_core_documents(&dir.join("core_documents.tab"))?;
    load_parent_children(&dir.join("parent_children.tab"), &mut corpus, log)?;
    Ok(corpus)
}

fn parse_number(path: &Path, line: usize, raw: &str, log: &EventLog) -> Option<f64> {
    match raw.parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            log.record(
                EventCode::NotANumber,
                format!("'{raw}'"),
                &Site::new(path.display().to_string(), line),
            );
            None
        }
    }
}

/// Load per-modality boundary tables from a directory laid out as
/// `sentence_boundaries.tab`, `image_boundaries.tab`,
/// `keyframe_boundaries.tab`, `video_boundaries.tab`.
///
/// Missing files contribute empty tables: runs without (say) video
/// elements do not ship video boundaries.
pub fn load_boundaries(dir: &Path, log: &EventLog) -> Result<BoundaryTables> {
    let mut tables = BoundaryTables::new();

    let sentences = dir.join("sentence_boundaries.tab");
    if sentences.exists() {
        let table = Table::read(&sentences)?;
        let element_id = table.column(&sentences, "document_element_id")?;
        let start = table.column(&sentences, "start_char")?;
        let end = table.column(&sentences, "end_char")?;
        for (line, row) in &table.rows {
            let (Some(start), Some(end)) = (
                parse_number(&sentences, *line, cell(row, start), log),
                parse_number(&sentences, *line, cell(row, end), log),
            ) else {
                continue;
            };
            // Sentence boundaries extend any earlier extent of the element.
            let id = cell(row, element_id).to_string();
            let span = Span::text(0.0, end.max(start));
            let merged = match tables.text.get(&id) {
                Some(existing) => Span::text(0.0, existing.max().end_x.max(span.end_x)),
                None => span,
            };
            tables.text.insert(id, Boundary::new(merged));
        }
    }

    for (filename, table_ref) in [
        ("image_boundaries.tab", &mut tables.image),
        ("keyframe_boundaries.tab", &mut tables.keyframe),
    ] {
        let path = dir.join(filename);
        if !path.exists() {
            continue;
        }
        let table = Table::read(&path)?;
        let element_id = table.column(&path, "document_element_id")?;
        let width = table.column(&path, "width")?;
        let height = table.column(&path, "height")?;
        for (line, row) in &table.rows {
            let (Some(width), Some(height)) = (
                parse_number(&path, *line, cell(row, width), log),
                parse_number(&path, *line, cell(row, height), log),
            ) else {
                continue;
            };
            table_ref.insert(
                cell(row, element_id).to_string(),
                Boundary::image(width, height),
            );
        }
    }

    let videos = dir.join("video_boundaries.tab");
    if videos.exists() {
        let table = Table::read(&videos)?;
        let element_id = table.column(&videos, "document_element_id")?;
        let length = table.column(&videos, "length")?;
        for (line, row) in &table.rows {
            let Some(length) = parse_number(&videos, *line, cell(row, length), log) else {
                continue;
            };
            tables
                .video
                .insert(cell(row, element_id).to_string(), Boundary::text(length));
        }
    }

    Ok(tables)
}

/// Parse `yyyy`, `yyyy-mm`, or `yyyy-mm-dd`; empty and `EMPTY_NA` cells are
/// absent bounds.
fn parse_partial_date(raw: &str) -> std::result::Result<Option<PartialDate>, ()> {
    let raw = raw.trim().trim_matches('"');
    if raw.is_empty() || raw == "EMPTY_NA" {
        return Ok(None);
    }
    let mut parts = raw.split('-');
    let year = parts.next().ok_or(())?.parse::<i64>().map_err(|_| ())?;
    let month = match parts.next() {
        Some(m) => Some(m.parse::<u32>().map_err(|_| ())?),
        None => return Ok(Some(PartialDate::year(year))),
    };
    let day = match parts.next() {
        Some(d) => Some(d.parse::<u32>().map_err(|_| ())?),
        None => None,
    };
    if parts.next().is_some() {
        return Err(());
    }
    match (month, day) {
        (Some(month), None) => Ok(Some(PartialDate::year_month(year, month))),
        (Some(month), Some(day)) => Ok(Some(PartialDate::ymd(year, month, day))),
        _ => Err(()),
    }
}

fn parse_date_columns(
    path: &Path,
    line: usize,
    row: &[String],
    columns: &[Option<usize>; 4],
    log: &EventLog,
) -> Option<ClusterDate> {
    let mut bounds: [Option<PartialDate>; 4] = [None; 4];
    let mut any_column = false;
    for (slot, column) in bounds.iter_mut().zip(columns.iter()) {
        let Some(index) = column else {
            continue;
        };
        any_column = true;
        let raw = cell(row, *index);
        match parse_partial_date(raw) {
            Ok(parsed) => *slot = parsed,
            Err(()) => log.record(
                EventCode::InvalidDate,
                format!("unparseable date '{raw}'"),
                &Site::new(path.display().to_string(), line),
            ),
        }
    }
    if !any_column {
        return None;
    }
    let [start_after, start_before, end_after, end_before] = bounds;
    let start = (start_after.is_some() || start_before.is_some()).then_some(DateRange {
        after: start_after,
        before: start_before,
    });
    let end = (end_after.is_some() || end_before.is_some()).then_some(DateRange {
        after: end_after,
        before: end_before,
    });
    if start.is_none() && end.is_none() {
        return None;
    }
    Some(ClusterDate { start, end })
}

/// One loaded response file: its schema, the attribute columns it carried
/// in order, and its records.
pub struct ResponseFile {
    /// Record shape of every row.
    pub schema: TaskSchema,
    /// Attribute columns in file order, for writing the file back out.
    pub header: Vec<Attribute>,
    /// Parsed records, one per row.
    pub records: Vec<ResponseRecord>,
}

/// Load one response TSV.
///
/// Header cells name [`Attribute`]s; unknown columns are logged once and
/// ignored. The four date-bound columns are folded into each record's
/// [`ClusterDate`] instead of being kept as attributes.
pub fn load_response_file(path: &Path, schema: TaskSchema, log: &EventLog) -> Result<ResponseFile> {
    let table = Table::read(path)?;
    let filename = path.display().to_string();
    let mut header = Vec::new();
    let mut columns: Vec<(usize, Attribute)> = Vec::new();
    let mut date_columns: [Option<usize>; 4] = [None; 4];
    for (index, name) in table.header.iter().enumerate() {
        if let Some(slot) = DATE_COLUMNS.iter().position(|c| c == name) {
            date_columns[slot] = Some(index);
            continue;
        }
        match name.parse::<Attribute>() {
            Ok(attribute) => {
                header.push(attribute);
                columns.push((index, attribute));
            }
            Err(_) => log.record(
                EventCode::UnexpectedColumn,
                format!("column '{name}'"),
                &Site::new(filename.clone(), 1),
            ),
        }
    }
    let mut records = Vec::new();
    for (line, row) in &table.rows {
        let site = Site::new(filename.clone(), *line);
        let mut record = ResponseRecord::new(schema, site);
        for (index, attribute) in &columns {
            record.set(*attribute, cell(row, *index));
        }
        record.date = parse_date_columns(path, *line, row, &date_columns, log);
        records.push(record);
    }
    Ok(ResponseFile {
        schema,
        header,
        records,
    })
}

/// Write the (validated) records of `file` back out as a TSV with the same
/// attribute columns the input carried.
pub fn write_response_file(path: &Path, file: &ResponseFile) -> Result<()> {
    let mut out = String::new();
    let names: Vec<&str> = file.header.iter().map(Attribute::name).collect();
    out.push_str(&names.join("\t"));
    out.push('\n');
    for record in &file.records {
        let row: Vec<&str> = file
            .header
            .iter()
            .map(|attribute| record.get(*attribute).unwrap_or_default())
            .collect();
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

/// Fold validated records into a [`ResponseSet`], registering clusters and
/// frames as the record shapes imply.
pub fn assemble_response_set(
    run_id: &str,
    files: &[ResponseFile],
    log: &EventLog,
) -> ResponseSet {
    let mut set = ResponseSet::new(run_id);
    for file in files {
        for record in &file.records {
            ingest(&mut set, file.schema, record, log);
        }
    }
    set
}

fn ingest(set: &mut ResponseSet, schema: TaskSchema, record: &ResponseRecord, log: &EventLog) {
    let document_id = record.get(Attribute::DocumentId).unwrap_or_default();
    match schema {
        TaskSchema::Task1ClusterMention => {
            let (Some(cluster_id), Some(metatype)) = (
                record.get(Attribute::ClusterId),
                record
                    .get(Attribute::Metatype)
                    .and_then(|m| m.parse().ok()),
            ) else {
                return;
            };
            let cluster_id = cluster_id.to_string();
            let cluster_type = record.get(Attribute::ClusterType).map(str::to_string);
            let mention = record.get(Attribute::MentionSpan).map(str::to_string);
            let cluster = set.cluster_mut(document_id, &cluster_id, metatype);
            if let (Some(cluster_type), Some(mention)) = (cluster_type, mention) {
                cluster.assert_type(metatype, &cluster_type, &mention, log, &record.site);
            }
        }
        TaskSchema::Task1ArgumentAssertion => {
            let (Some(subject), Some(object), Some(predicate)) = (
                record.get(Attribute::SubjectClusterId),
                record.get(Attribute::ObjectClusterId),
                record.get(Attribute::Predicate),
            ) else {
                return;
            };
            let subject = subject.to_string();
            let object = object.to_string();
            let predicate = predicate.to_string();
            // The role is the predicate's suffix past the invoking type.
            let role = predicate.rsplit('_').next().unwrap_or(&predicate).to_string();
            if let Some(metatype) = record
                .get(Attribute::SubjectMetatype)
                .and_then(|m| m.parse().ok())
            {
                set.cluster_mut(document_id, &subject, metatype);
            }
            set.frame_mut(document_id, &subject)
                .add_filler(&role, &object, &predicate);
        }
        TaskSchema::Task2CrossDocument => {}
        TaskSchema::Task3ClaimFrame => {
            if let Some(claim_id) = record.get(Attribute::ClaimId) {
                set.claims.insert(claim_id.to_string());
            }
        }
    }
    set.records.push(record.clone());
}

/// Load the query set for claim validation.
///
/// `topics.tab` columns: `condition`, `topic_id`, `topic`, `subtopic`,
/// `claim_template`. Optional `query_claim_frames.tab` columns:
/// `condition`, `query_claim_frame_id`. Optional `query_entity_types.tab`
/// columns: `query_id`, `entity_type`.
pub fn load_queries(dir: &Path) -> Result<QuerySet> {
    let mut queries = QuerySet::new();

    let topics = dir.join("topics.tab");
    if topics.exists() {
        let table = Table::read(&topics)?;
        let condition = table.column(&topics, "condition")?;
        let topic_id = table.column(&topics, "topic_id")?;
        let topic = table.column(&topics, "topic")?;
        let subtopic = table.column(&topics, "subtopic")?;
        let claim_template = table.column(&topics, "claim_template")?;
        for (_, row) in &table.rows {
            queries
                .conditions
                .entry(cell(row, condition).to_string())
                .or_default()
                .topics
                .entry(cell(row, topic_id).to_string())
                .or_default()
                .push(TopicEntry {
                    topic: cell(row, topic).to_string(),
                    subtopic: cell(row, subtopic).to_string(),
                    claim_template: cell(row, claim_template).to_string(),
                });
        }
    }

    let frames = dir.join("query_claim_frames.tab");
    if frames.exists() {
        let table = Table::read(&frames)?;
        let condition = table.column(&frames, "condition")?;
        let frame_id = table.column(&frames, "query_claim_frame_id")?;
        for (_, row) in &table.rows {
            queries
                .conditions
                .entry(cell(row, condition).to_string())
                .or_default()
                .query_claim_frames
                .insert(cell(row, frame_id).to_string());
        }
    }

    let entity_types = dir.join("query_entity_types.tab");
    if entity_types.exists() {
        let table = Table::read(&entity_types)?;
        let query_id = table.column(&entity_types, "query_id")?;
        let entity_type = table.column(&entity_types, "entity_type")?;
        for (_, row) in &table.rows {
            queries.query_entity_types.insert(
                cell(row, query_id).to_string(),
                cell(row, entity_type).to_string(),
            );
        }
    }

    Ok(queries)
}

/// Load the gold/system cluster alignment.
///
/// Columns: `document_id`, `system_cluster_id`, `gold_cluster_id`,
/// `similarity`. A `None` cluster ID marks the other side as unaligned.
pub fn load_alignment(path: &Path, log: &EventLog) -> Result<ClusterAlignment> {
    let table = Table::read(path)?;
    let document_id = table.column(path, "document_id")?;
    let system_id = table.column(path, "system_cluster_id")?;
    let gold_id = table.column(path, "gold_cluster_id")?;
    let similarity = table.column(path, "similarity")?;
    let mut alignment = ClusterAlignment::new();
    for (line, row) in &table.rows {
        let document = cell(row, document_id);
        let system = cell(row, system_id);
        let gold = cell(row, gold_id);
        match (system, gold) {
            ("None", "None") => {}
            (system, "None") => alignment.unaligned(document, true, system),
            ("None", gold) => alignment.unaligned(document, false, gold),
            (system, gold) => {
                let Some(similarity) =
                    parse_number(path, *line, cell(row, similarity), log)
                else {
                    continue;
                };
                alignment.align(document, system, gold, similarity);
            }
        }
    }
    Ok(alignment)
}

/// Load pairwise type similarities.
///
/// Columns: `document_id`, `system_cluster_id`, `gold_cluster_id`,
/// `similarity`.
pub fn load_type_similarities(path: &Path, log: &EventLog) -> Result<TypeSimilarities> {
    let table = Table::read(path)?;
    let document_id = table.column(path, "document_id")?;
    let system_id = table.column(path, "system_cluster_id")?;
    let gold_id = table.column(path, "gold_cluster_id")?;
    let similarity = table.column(path, "similarity")?;
    let mut similarities = TypeSimilarities::new();
    for (line, row) in &table.rows {
        let Some(value) = parse_number(path, *line, cell(row, similarity), log) else {
            continue;
        };
        similarities.insert(
            cell(row, document_id),
            cell(row, system_id),
            cell(row, gold_id),
            value,
        );
    }
    Ok(similarities)
}

/// Load cross-document queries, responses, and assessments for task2.
///
/// `queries.tab` columns: `query_id`, `entity_id`. `responses.tab`
/// columns: `query_id`, `item_id`, `confidence`. `assessments.tab`
/// columns: `query_id`, `item_id`, `assessment` (rows assessed `Correct`
/// count).
pub fn load_cross_doc_queries(
    dir: &Path,
    log: &EventLog,
) -> Result<crate::scorers::cross_doc::CrossDocQueries> {
    use crate::scorers::cross_doc::{CrossDocQueries, RankedResponse};
    let mut queries = CrossDocQueries::default();

    let query_path = dir.join("queries.tab");
    let table = Table::read(&query_path)?;
    let query_id = table.column(&query_path, "query_id")?;
    let entity_id = table.column(&query_path, "entity_id")?;
    for (_, row) in &table.rows {
        queries.entities.insert(
            cell(row, query_id).to_string(),
            cell(row, entity_id).to_string(),
        );
    }

    let response_path = dir.join("responses.tab");
    let table = Table::read(&response_path)?;
    let query_id = table.column(&response_path, "query_id")?;
    let item_id = table.column(&response_path, "item_id")?;
    let confidence = table.column(&response_path, "confidence")?;
    for (line, row) in &table.rows {
        let Some(confidence) =
            parse_number(&response_path, *line, cell(row, confidence), log)
        else {
            continue;
        };
        queries
            .responses
            .entry(cell(row, query_id).to_string())
            .or_default()
            .push(RankedResponse {
                item_id: cell(row, item_id).to_string(),
                confidence,
            });
    }

    let assessment_path = dir.join("assessments.tab");
    let table = Table::read(&assessment_path)?;
    let query_id = table.column(&assessment_path, "query_id")?;
    let item_id = table.column(&assessment_path, "item_id")?;
    let assessment = table.column(&assessment_path, "assessment")?;
    for (_, row) in &table.rows {
        if cell(row, assessment) == "Correct" {
            queries
                .assessments
                .entry(cell(row, query_id).to_string())
                .or_default()
                .insert(cell(row, item_id).to_string());
        }
    }

    Ok(queries)
}

/// Load claim rankings and graded assessments for task3.
///
/// `rankings.tab` columns: `query_id`, `claim_id`, `rank` (ascending, best
/// first). `assessments.tab` columns: `query_id`, `claim_id`, `gain`.
pub fn load_claim_rankings(
    dir: &Path,
    log: &EventLog,
) -> Result<crate::scorers::ndcg::ClaimRankings> {
    use crate::scorers::ndcg::ClaimRankings;
    let mut claims = ClaimRankings::default();

    let ranking_path = dir.join("rankings.tab");
    let table = Table::read(&ranking_path)?;
    let query_id = table.column(&ranking_path, "query_id")?;
    let claim_id = table.column(&ranking_path, "claim_id")?;
    let rank = table.column(&ranking_path, "rank")?;
    let mut ranked: BTreeMap<String, Vec<(f64, String)>> = BTreeMap::new();
    for (line, row) in &table.rows {
        let Some(rank) = parse_number(&ranking_path, *line, cell(row, rank), log) else {
            continue;
        };
        ranked
            .entry(cell(row, query_id).to_string())
            .or_default()
            .push((rank, cell(row, claim_id).to_string()));
    }
    for (query, mut entries) in ranked {
        entries.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });
        claims
            .rankings
            .insert(query, entries.into_iter().map(|(_, id)| id).collect());
    }

    let assessment_path = dir.join("assessments.tab");
    let table = Table::read(&assessment_path)?;
    let query_id = table.column(&assessment_path, "query_id")?;
    let claim_id = table.column(&assessment_path, "claim_id")?;
    let gain = table.column(&assessment_path, "gain")?;
    for (line, row) in &table.rows {
        let Some(gain) = parse_number(&assessment_path, *line, cell(row, gain), log) else {
            continue;
        };
        claims
            .assessments
            .entry(cell(row, query_id).to_string())
            .or_default()
            .insert(cell(row, claim_id).to_string(), gain);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn corpus_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "encodings.tab",
            "extension\tmodality\nltf\ttext\nmp4\tvideo\n",
        );
        write(dir.path(), "core_documents.tab", "document_id\nD1\n");
        write(
            dir.path(),
            "parent_children.tab",
            "document_id\tdocument_element_id\tlanguage\tmodality\nD1\tD1E1\ten\ttext\n",
        );
        let log = EventLog::new();
        let corpus = load_corpus(dir.path(), &log).unwrap();
        assert!(corpus.core_documents.contains("D1"));
        assert_eq!(corpus.documents["D1"].language, "en");
        assert!(corpus.documents["D1"].has_element("D1E1"));
        assert_eq!(
            corpus.document_elements["D1E1"].modality,
            Some(Modality::Text)
        );
        assert_eq!(log.errors(), 0);
    }

    #[test]
    fn sentence_boundaries_merge_to_widest_extent() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "sentence_boundaries.tab",
            "document_element_id\tstart_char\tend_char\nD1E1\t0\t80\nD1E1\t81\t120\n",
        );
        let log = EventLog::new();
        let tables = load_boundaries(dir.path(), &log).unwrap();
        assert_eq!(tables.text["D1E1"].max().end_x, 120.0);
        assert!(tables.image.is_empty());
    }

    #[test]
    fn response_loading_folds_date_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.tab");
        fs::write(
            &path,
            "document_id\tconfidence\tstart_after\tstart_before\tend_after\tend_before\n\
             D1\t0.9\t2020-06\tEMPTY_NA\t\t2021-01-15\n",
        )
        .unwrap();
        let log = EventLog::new();
        let file =
            load_response_file(&path, TaskSchema::Task1ArgumentAssertion, &log).unwrap();
        assert_eq!(file.records.len(), 1);
        let record = &file.records[0];
        assert_eq!(record.get(Attribute::DocumentId), Some("D1"));
        let date = record.date.as_ref().unwrap();
        assert_eq!(date.start.unwrap().after, Some(PartialDate::year_month(2020, 6)));
        assert_eq!(date.start.unwrap().before, None);
        assert_eq!(date.end.unwrap().before, Some(PartialDate::ymd(2021, 1, 15)));
        // Date columns are not attributes.
        assert_eq!(file.header, vec![Attribute::DocumentId, Attribute::Confidence]);
    }

    #[test]
    fn unknown_response_columns_are_logged_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.tab");
        // role_name is not a response column; roles come from the predicate.
        fs::write(&path, "document_id\tbogus\trole_name\nD1\tx\tAttacker\n").unwrap();
        let log = EventLog::new();
        let file = load_response_file(&path, TaskSchema::Task1ClusterMention, &log).unwrap();
        assert_eq!(file.header, vec![Attribute::DocumentId]);
        assert_eq!(log.count(EventCode::UnexpectedColumn), 2);
    }

    #[test]
    fn write_response_file_preserves_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.tab");
        fs::write(&path, "confidence\tdocument_id\n0.9\tD1\n").unwrap();
        let log = EventLog::new();
        let file = load_response_file(&path, TaskSchema::Task1ClusterMention, &log).unwrap();
        let out = dir.path().join("out.tab");
        write_response_file(&out, &file).unwrap();
        let text = fs::read_to_string(&out).unwrap();
        assert_eq!(text, "confidence\tdocument_id\n0.9\tD1\n");
    }

    #[test]
    fn alignment_rows_with_none_sides_mark_unaligned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alignment.tab");
        fs::write(
            &path,
            "document_id\tsystem_cluster_id\tgold_cluster_id\tsimilarity\n\
             D1\tS1\tG1\t3.5\nD1\tS2\tNone\t0\nD1\tNone\tG2\t0\n",
        )
        .unwrap();
        let log = EventLog::new();
        let alignment = load_alignment(&path, &log).unwrap();
        assert_eq!(
            alignment.gold_to_system["D1"]["G1"].aligned_to.as_deref(),
            Some("S1")
        );
        assert!(alignment.system_to_gold["D1"]["S2"].aligned_to.is_none());
        assert!(alignment.gold_to_system["D1"]["G2"].aligned_to.is_none());
    }

    #[test]
    fn cluster_mention_records_assemble_clusters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mentions.tab");
        fs::write(
            &path,
            "document_id\tcluster_id\tmetatype\tcluster_type\tmention_span_text\tconfidence\n\
             D1\tC1\tEntity\tPER\tD1:D1E1:(0,0)-(5,0)\t1.0\n\
             D1\tC1\tEntity\tPER\tD1:D1E1:(9,0)-(12,0)\t1.0\n",
        )
        .unwrap();
        let log = EventLog::new();
        let file = load_response_file(&path, TaskSchema::Task1ClusterMention, &log).unwrap();
        let set = assemble_response_set("run1", &[file], &log);
        let cluster = set.cluster("D1", "C1").unwrap();
        assert_eq!(cluster.types["PER"].len(), 2);
    }

    #[test]
    fn argument_records_assemble_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arguments.tab");
        fs::write(
            &path,
            "document_id\tsubject_cluster_id\tsubject_metatype\tpredicate\tobject_cluster_id\tconfidence\n\
             D1\tE1\tEvent\tConflict.Attack_Attacker\tC9\t0.8\n",
        )
        .unwrap();
        let log = EventLog::new();
        let file =
            load_response_file(&path, TaskSchema::Task1ArgumentAssertion, &log).unwrap();
        let set = assemble_response_set("run1", &[file], &log);
        let frame = set.frame("D1", "E1").unwrap();
        assert!(frame.role_fillers["Attacker"]["C9"].contains("Conflict.Attack_Attacker"));
    }
}
