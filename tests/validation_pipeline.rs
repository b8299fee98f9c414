//! End-to-end validation: load a corpus and a response file from disk,
//! validate the records, and write the survivors back out.

use rubric::events::{EventCode, EventLog};
use rubric::load;
use rubric::response::{Attribute, TaskSchema, ValidationScope};
use rubric::validate::Validator;
use std::fs;
use std::path::Path;

fn write_corpus(dir: &Path) {
    fs::write(
        dir.join("encodings.tab"),
        "extension\tmodality\nltf\ttext\nmp4\tvideo\n",
    )
    .unwrap();
    fs::write(dir.join("core_documents.tab"), "document_id\nD1\n").unwrap();
    fs::write(
        dir.join("parent_children.tab"),
        "document_id\tdocument_element_id\tlanguage\tmodality\n\
         D1\tD1E1\ten\ttext\n",
    )
    .unwrap();
    fs::write(
        dir.join("sentence_boundaries.tab"),
        "document_element_id\tstart_char\tend_char\nD1E1\t0\t120\n",
    )
    .unwrap();
}

fn validate_file(dir: &Path, input: &Path, output: &Path) -> EventLog {
    let log = EventLog::new();
    let corpus = load::load_corpus(dir, &log).unwrap();
    let boundaries = load::load_boundaries(dir, &log).unwrap();
    let mut file =
        load::load_response_file(input, TaskSchema::Task1ClusterMention, &log).unwrap();
    let records = std::mem::take(&mut file.records);
    let set = load::assemble_response_set(
        "run1",
        &[load::ResponseFile {
            schema: file.schema,
            header: file.header.clone(),
            records: records.clone(),
        }],
        &log,
    );
    let validator = Validator::new(&boundaries, &log);
    for record in records {
        let cluster = record
            .get(Attribute::DocumentId)
            .zip(record.get(Attribute::ClusterId))
            .and_then(|(document_id, cluster_id)| set.cluster(document_id, cluster_id));
        let scope = ValidationScope {
            corpus: &corpus,
            claims: &set.claims,
            queries: None,
            cluster,
        };
        if let Some(valid) = validator.validate_record(&scope, record) {
            file.records.push(valid);
        }
    }
    load::write_response_file(output, &file).unwrap();
    log
}

#[test]
fn bad_records_are_dropped_and_repairs_are_written() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let input = dir.path().join("run.tab");
    // Row 2 is clean. Row 3 overflows the element boundary (clamped) and
    // carries an out-of-range confidence (repaired). Row 4 names an
    // unknown document and must be dropped.
    fs::write(
        &input,
        "document_id\tcluster_id\tmetatype\tcluster_type\tmention_span_text\tconfidence\n\
         D1\tC1\tEntity\tPER\tD1:D1E1:(0,0)-(40,0)\t0.9\n\
         D1\tC1\tEntity\tPER\tD1:D1E1:(50,0)-(300,0)\t1.5\n\
         D9\tC2\tEntity\tORG\tD9:D1E1:(0,0)-(10,0)\t0.8\n",
    )
    .unwrap();
    let output = dir.path().join("run.valid.tab");

    let log = validate_file(dir.path(), &input, &output);

    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3, "header plus two surviving records");
    assert!(lines[1].contains("D1:D1E1:(0,0)-(40,0)"));
    assert!(lines[1].ends_with("0.9"));
    assert!(lines[2].contains("D1:D1E1:(50,0)-(120,0)"));
    assert!(lines[2].ends_with("1.0"));

    assert_eq!(log.count(EventCode::SpanOffBoundaryCorrected), 1);
    assert_eq!(log.count(EventCode::InvalidConfidence), 1);
    // Both the document_id rule and the provenance rule flag document D9.
    assert_eq!(log.count(EventCode::UnknownItem), 2);
    assert!(log.errors() >= 1, "dropped record must gate the exit code");
}

#[test]
fn clean_file_round_trips_without_events() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let input = dir.path().join("run.tab");
    fs::write(
        &input,
        "document_id\tcluster_id\tmetatype\tcluster_type\tmention_span_text\tconfidence\n\
         D1\tC1\tEntity\tPER\tD1:D1E1:(17,0)-(42,0)\t0.73\n",
    )
    .unwrap();
    let output = dir.path().join("run.valid.tab");

    let log = validate_file(dir.path(), &input, &output);

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        "document_id\tcluster_id\tmetatype\tcluster_type\tmention_span_text\tconfidence\n\
         D1\tC1\tEntity\tPER\tD1:D1E1:(17,0)-(42,0)\t0.73\n"
    );
    assert_eq!(log.errors(), 0);
    assert_eq!(log.warnings(), 0);
}

#[test]
fn mention_with_element_extension_is_corrected_in_place() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let input = dir.path().join("run.tab");
    fs::write(
        &input,
        "document_id\tcluster_id\tmetatype\tcluster_type\tmention_span_text\tconfidence\n\
         D1\tC1\tEntity\tPER\tD1:D1E1.ltf:(17,0)-(42,0)\t0.73\n",
    )
    .unwrap();
    let output = dir.path().join("run.valid.tab");

    let log = validate_file(dir.path(), &input, &output);

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("D1:D1E1:(17,0)-(42,0)"));
    assert_eq!(log.count(EventCode::IdWithExtension), 1);
    assert_eq!(log.errors(), 0);
}
