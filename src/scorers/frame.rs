//! Frame metric: per-frame F1 over `role:filler` pairs for event and
//! relation clusters.
//!
//! Each gold frame is compared against the frame of its aligned system
//! cluster; `role:filler` pairs are the unit, with system fillers remapped
//! through the alignment the same way the argument metric does. Frames
//! without an aligned counterpart score zero.

use super::argument::f_measure;
use super::{Scorer, ScoringContext};
use crate::response::{Frame, Metatype};
use crate::score::aggregate::aggregate_scores;
use crate::score::printer::ColumnSpec;
use crate::score::{Column, Score, ScoreCollection};
use std::collections::BTreeSet;

const SPECS: &[ColumnSpec] = &[
    ColumnSpec::text(Column::DocumentId, "DocID"),
    ColumnSpec::text(Column::RunId, "RunID"),
    ColumnSpec::text(Column::Language, "Language"),
    ColumnSpec::text(Column::Metatype, "Metatype"),
    ColumnSpec::text(Column::GoldClusterId, "GoldClusterID"),
    ColumnSpec::text(Column::SystemClusterId, "SystemClusterID"),
    ColumnSpec::numeric_no_mean(Column::Precision, "Prec", 4),
    ColumnSpec::numeric_no_mean(Column::Recall, "Recall", 4),
    ColumnSpec::numeric(Column::F1, "F1", 4),
];

fn relevant(metatype: Metatype) -> bool {
    matches!(metatype, Metatype::Event | Metatype::Relation)
}

/// Per-frame `role:filler` F1 with language and metatype aggregates.
pub struct FrameScorer {
    scores: ScoreCollection,
}

impl FrameScorer {
    /// Score every core document in `ctx`.
    pub fn score(ctx: &ScoringContext<'_>) -> Self {
        let mut rows: Vec<Score> = Vec::new();
        for document_id in &ctx.corpus.core_documents {
            let document = match ctx.corpus.documents.get(document_id) {
                Some(document) => document,
                None => continue,
            };
            let language = &document.language;

            if let Some(frames) = ctx.gold.document_frames.get(document_id) {
                for (gold_cluster_id, gold_frame) in frames {
                    let metatype = match ctx.gold.cluster(document_id, gold_cluster_id) {
                        Some(cluster) => cluster.metatype,
                        None => continue,
                    };
                    if !relevant(metatype) {
                        continue;
                    }
                    let gold_pairs = role_fillers(gold_frame, document_id, None);
                    let aligned = ctx
                        .alignment
                        .gold_to_system
                        .get(document_id)
                        .and_then(|table| table.get(gold_cluster_id))
                        .and_then(|entry| entry.aligned_to.clone());
                    let (system_cluster_id, system_pairs) = match aligned {
                        Some(system_cluster_id) => {
                            let pairs = ctx
                                .system
                                .frame(document_id, &system_cluster_id)
                                .map(|frame| role_fillers(frame, document_id, Some(ctx)))
                                .unwrap_or_default();
                            (system_cluster_id, pairs)
                        }
                        None => ("None".to_owned(), BTreeSet::new()),
                    };
                    let (precision, recall, f1) = f_measure(&gold_pairs, &system_pairs);
                    rows.push(frame_row(
                        ctx,
                        document_id,
                        language,
                        metatype,
                        gold_cluster_id,
                        &system_cluster_id,
                        precision,
                        recall,
                        f1,
                    ));
                }
            }

            if let Some(frames) = ctx.system.document_frames.get(document_id) {
                for system_cluster_id in frames.keys() {
                    let aligned = ctx
                        .alignment
                        .system_to_gold
                        .get(document_id)
                        .and_then(|table| table.get(system_cluster_id))
                        .and_then(|entry| entry.aligned_to.as_deref());
                    if aligned.is_some() {
                        continue;
                    }
                    let metatype = match ctx.system.cluster(document_id, system_cluster_id) {
                        Some(cluster) => cluster.metatype,
                        None => continue,
                    };
                    if !relevant(metatype) {
                        continue;
                    }
                    rows.push(frame_row(
                        ctx,
                        document_id,
                        language,
                        metatype,
                        "None",
                        system_cluster_id,
                        0.0,
                        0.0,
                        0.0,
                    ));
                }
            }
        }

        rows.sort_by(|a, b| {
            (
                &a.document_id,
                &a.metatype,
                &a.gold_cluster_id,
                &a.system_cluster_id,
            )
                .cmp(&(
                    &b.document_id,
                    &b.metatype,
                    &b.gold_cluster_id,
                    &b.system_cluster_id,
                ))
        });
        let mut scores = ScoreCollection::new();
        for row in rows {
            scores.add(row);
        }
        aggregate_scores(&mut scores, ctx.run_id);
        Self { scores }
    }
}

impl Scorer for FrameScorer {
    fn name(&self) -> &'static str {
        "FrameMetric"
    }

    fn scores(&self) -> &ScoreCollection {
        &self.scores
    }

    fn printing_specs(&self) -> &'static [ColumnSpec] {
        SPECS
    }
}

/// The `role:filler` pairs of one frame, remapping fillers through the
/// alignment when `remap` carries the context.
fn role_fillers(
    frame: &Frame,
    document_id: &str,
    remap: Option<&ScoringContext<'_>>,
) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for (role, fillers) in &frame.role_fillers {
        for filler_cluster_id in fillers.keys() {
            let filler = remap
                .and_then(|ctx| {
                    ctx.alignment
                        .system_to_gold
                        .get(document_id)
                        .and_then(|table| table.get(filler_cluster_id))
                        .and_then(|entry| entry.aligned_to.clone())
                })
                .unwrap_or_else(|| filler_cluster_id.clone());
            out.insert(format!("{role}:{filler}"));
        }
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn frame_row(
    ctx: &ScoringContext<'_>,
    document_id: &str,
    language: &str,
    metatype: Metatype,
    gold_cluster_id: &str,
    system_cluster_id: &str,
    precision: f64,
    recall: f64,
    f1: f64,
) -> Score {
    let mut score = Score::new(ctx.run_id);
    score.document_id = Some(document_id.to_owned());
    score.language = Some(language.to_owned());
    score.metatype = Some(metatype.to_string());
    score.gold_cluster_id = Some(gold_cluster_id.to_owned());
    score.system_cluster_id = Some(system_cluster_id.to_owned());
    score.precision = Some(precision);
    score.recall = Some(recall);
    score.f1 = Some(f1);
    score
}
