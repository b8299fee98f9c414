//! Argument metric: per-document F1 over argument assertions.
//!
//! An assertion is canonicalized as `type_role:filler`, with the type
//! taken from the predicate that invoked the role. System filler clusters
//! are remapped onto their aligned gold clusters before comparison, so
//! a system is not penalized for its own cluster naming.

use super::{Scorer, ScoringContext};
use crate::score::printer::ColumnSpec;
use crate::score::{mean_of, Column, Score, ScoreCollection};
use std::collections::BTreeSet;

const SPECS: &[ColumnSpec] = &[
    ColumnSpec::text(Column::DocumentId, "DocID"),
    ColumnSpec::text(Column::RunId, "RunID"),
    ColumnSpec::numeric_no_mean(Column::Precision, "Prec", 4),
    ColumnSpec::numeric_no_mean(Column::Recall, "Recall", 4),
    ColumnSpec::numeric(Column::F1, "F1", 4),
];

/// Per-document argument-assertion F1 with a mean-F1 summary row.
pub struct ArgumentScorer {
    scores: ScoreCollection,
}

impl ArgumentScorer {
    /// Score every core document in `ctx`.
    pub fn score(ctx: &ScoringContext<'_>) -> Self {
        let mut scores = ScoreCollection::new();
        for document_id in &ctx.corpus.core_documents {
            let gold = assertions(ctx.gold, document_id, None);
            let system = assertions(ctx.system, document_id, Some(ctx));
            let (precision, recall, f1) = f_measure(&gold, &system);
            let mut score = Score::new(ctx.run_id);
            score.document_id = Some(document_id.clone());
            score.precision = Some(precision);
            score.recall = Some(recall);
            score.f1 = Some(f1);
            scores.add(score);
        }
        let mut summary = Score::new(ctx.run_id);
        summary.document_id = Some("Summary".to_owned());
        summary.f1 = mean_of(scores.rows(), Column::F1);
        summary.summary = true;
        scores.add(summary);
        Self { scores }
    }
}

impl Scorer for ArgumentScorer {
    fn name(&self) -> &'static str {
        "ArgumentMetric"
    }

    fn scores(&self) -> &ScoreCollection {
        &self.scores
    }

    fn printing_specs(&self) -> &'static [ColumnSpec] {
        SPECS
    }
}

/// Collect `type_role:filler` assertions from one document's frames.
///
/// When `remap` carries the context, filler cluster ids are replaced by
/// their aligned gold cluster ids where an alignment exists.
fn assertions(
    set: &crate::response::ResponseSet,
    document_id: &str,
    remap: Option<&ScoringContext<'_>>,
) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let frames = match set.document_frames.get(document_id) {
        Some(frames) => frames,
        None => return out,
    };
    for frame in frames.values() {
        for (role, fillers) in &frame.role_fillers {
            for (filler_cluster_id, predicates) in fillers {
                let filler = remap
                    .and_then(|ctx| {
                        ctx.alignment
                            .system_to_gold
                            .get(document_id)
                            .and_then(|table| table.get(filler_cluster_id))
                            .and_then(|entry| entry.aligned_to.clone())
                    })
                    .unwrap_or_else(|| filler_cluster_id.clone());
                for predicate in predicates {
                    let invoked_type = predicate.split('_').next().unwrap_or(predicate);
                    out.insert(format!("{invoked_type}_{role}:{filler}"));
                }
            }
        }
    }
    out
}

/// Precision, recall, and F1 of `system` against `gold`.
///
/// An empty side yields zero for its ratio; F1 is zero when both ratios
/// are (no division by zero).
pub(super) fn f_measure(gold: &BTreeSet<String>, system: &BTreeSet<String>) -> (f64, f64, f64) {
    let both = gold.intersection(system).count() as f64;
    let precision = if system.is_empty() {
        0.0
    } else {
        both / system.len() as f64
    };
    let recall = if gold.is_empty() {
        0.0
    } else {
        both / gold.len() as f64
    };
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    (precision, recall, f1)
}
