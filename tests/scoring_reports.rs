//! End-to-end scoring: build a small run in memory, run the task1 metric
//! suite, and check the report files.

use rubric::align::{ClusterAlignment, TypeSimilarities};
use rubric::corpus::{DocumentMappings, Modality};
use rubric::events::EventLog;
use rubric::response::{Metatype, ResponseSet};
use rubric::score::printer::TableFormat;
use rubric::score::Column;
use rubric::scorers::{ScoresManager, ScoringContext};
use std::fs;

fn corpus() -> DocumentMappings {
    let mut corpus = DocumentMappings::new();
    corpus.add_element("D1", "en", "D1E1", Some(Modality::Text));
    corpus.core_documents.insert("D1".to_owned());
    corpus
}

fn put_types(
    set: &mut ResponseSet,
    document_id: &str,
    cluster_id: &str,
    metatype: Metatype,
    types: &[(&str, &[&str])],
) {
    let cluster = set.cluster_mut(document_id, cluster_id, metatype);
    for (type_name, spans) in types {
        for span in *spans {
            cluster
                .types
                .entry((*type_name).to_owned())
                .or_default()
                .insert((*span).to_owned());
        }
    }
}

fn build_run() -> (DocumentMappings, ResponseSet, ResponseSet, ClusterAlignment, TypeSimilarities) {
    let corpus = corpus();
    let mut gold = ResponseSet::new("gold");
    let mut system = ResponseSet::new("run1");
    put_types(&mut gold, "D1", "G1", Metatype::Entity, &[
        ("PER", &["s1"]),
        ("ORG", &["s2"]),
    ]);
    put_types(&mut system, "D1", "S1", Metatype::Entity, &[
        ("PER", &["s1", "s2", "s3"]),
        ("LOC", &["s4", "s5"]),
        ("ORG", &["s6"]),
    ]);
    put_types(&mut gold, "D1", "GE1", Metatype::Event, &[("Attack", &["s7"])]);
    put_types(&mut system, "D1", "SE1", Metatype::Event, &[("Attack", &["s7"])]);
    gold.frame_mut("D1", "GE1")
        .add_filler("Attacker", "G9", "Conflict.Attack_Attacker");
    gold.frame_mut("D1", "GE1")
        .add_filler("Target", "G8", "Conflict.Attack_Target");
    system
        .frame_mut("D1", "SE1")
        .add_filler("Attacker", "S9", "Conflict.Attack_Attacker");

    let mut alignment = ClusterAlignment::new();
    alignment.align("D1", "S1", "G1", 2.0);
    alignment.align("D1", "SE1", "GE1", 2.0);
    alignment.align("D1", "S9", "G9", 1.0);
    let mut similarities = TypeSimilarities::new();
    similarities.insert("D1", "S1", "G1", 0.8);
    similarities.insert("D1", "SE1", "GE1", 1.0);
    (corpus, gold, system, alignment, similarities)
}

#[test]
fn task1_suite_produces_all_reports() {
    let (corpus, gold, system, alignment, similarities) = build_run();
    let log = EventLog::new();
    let ctx = ScoringContext {
        run_id: "run1",
        corpus: &corpus,
        gold: &gold,
        system: &system,
        alignment: &alignment,
        similarities: &similarities,
        log: &log,
    };
    let manager = ScoresManager::score_task1(&ctx);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("scores");
    manager.write_reports(&out).unwrap();
    manager.write_json(&out).unwrap();
    for metric in ["TypeRanking", "TypeSimilarity", "FrameMetric", "ArgumentMetric"] {
        assert!(out.join(format!("{metric}-scores.txt")).exists(), "{metric} txt");
        assert!(out.join(format!("{metric}-scores.tab")).exists(), "{metric} tab");
        assert!(out.join(format!("{metric}-scores.json")).exists(), "{metric} json");
    }
    assert_eq!(log.errors(), 0);

    // Gold cluster G1 scores AP (1/1 + 2/3) / 2 against the system's
    // PER > LOC > ORG ranking.
    let type_ranking = &manager.scorers()[0];
    let g1 = type_ranking
        .scores()
        .raw_rows()
        .find(|s| s.gold_cluster_id.as_deref() == Some("G1"))
        .unwrap();
    assert!((g1.number(Column::AveragePrecision).unwrap() - 0.8333333333333333).abs() < 1e-9);

    let tab = type_ranking.render(TableFormat::Tab);
    assert!(tab.starts_with(
        "DocID\tRunID\tLanguage\tMetatype\tGoldClusterID\tSystemClusterID\tAvgPrec"
    ));
    assert!(tab.contains("D1\trun1\ten\tEntity\tG1\tS1\t0.8333"));
}

#[test]
fn aggregates_appear_after_raw_rows_with_all_last() {
    let (corpus, gold, system, alignment, similarities) = build_run();
    let log = EventLog::new();
    let ctx = ScoringContext {
        run_id: "run1",
        corpus: &corpus,
        gold: &gold,
        system: &system,
        alignment: &alignment,
        similarities: &similarities,
        log: &log,
    };
    let manager = ScoresManager::score_task1(&ctx);
    let similarity = &manager.scorers()[1];

    let keys: Vec<(String, String)> = similarity
        .scores()
        .rows()
        .iter()
        .filter(|s| s.aggregate)
        .map(|s| {
            (
                s.language.clone().unwrap_or_default(),
                s.metatype.clone().unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(
        keys,
        vec![
            ("en".into(), "Entity".into()),
            ("en".into(), "Event".into()),
            ("en".into(), "ALL".into()),
            ("ALL".into(), "Entity".into()),
            ("ALL".into(), "Event".into()),
            ("ALL".into(), "ALL".into()),
        ]
    );
    let grand = similarity
        .scores()
        .rows()
        .iter()
        .find(|s| {
            s.aggregate
                && s.language.as_deref() == Some("ALL")
                && s.metatype.as_deref() == Some("ALL")
        })
        .unwrap();
    assert!((grand.number(Column::TypeSimilarity).unwrap() - 0.9).abs() < 1e-9);
}

#[test]
fn report_files_are_deterministic() {
    let render = || {
        let (corpus, gold, system, alignment, similarities) = build_run();
        let log = EventLog::new();
        let ctx = ScoringContext {
            run_id: "run1",
            corpus: &corpus,
            gold: &gold,
            system: &system,
            alignment: &alignment,
            similarities: &similarities,
            log: &log,
        };
        let manager = ScoresManager::score_task1(&ctx);
        let dir = tempfile::tempdir().unwrap();
        manager.write_reports(dir.path()).unwrap();
        fs::read_to_string(dir.path().join("FrameMetric-scores.tab")).unwrap()
    };
    assert_eq!(render(), render());
}
