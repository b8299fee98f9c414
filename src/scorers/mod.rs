//! Metric scorers.
//!
//! Every metric implements [`Scorer`]: it owns its computed
//! [`ScoreCollection`] and the column layout its reports print with. The
//! cluster-pair metrics (type ranking, type similarity) share one walk of
//! the alignment tables through [`ClusterPairScorer`], parameterized by a
//! [`ClusterStatistic`] that computes the per-pair number. Metrics whose
//! scoring unit is not an aligned cluster pair (arguments, frames,
//! cross-document ranking, claim ranking) carry their own loops.

pub mod argument;
pub mod cross_doc;
pub mod frame;
pub mod manager;
pub mod ndcg;
pub mod type_ranking;
pub mod type_similarity;

pub use manager::ScoresManager;

use crate::align::{ClusterAlignment, TypeSimilarities};
use crate::corpus::DocumentMappings;
use crate::events::{EventCode, EventLog};
use crate::response::{Metatype, ResponseSet};
use crate::score::aggregate::aggregate_scores;
use crate::score::printer::{render, ColumnSpec, TableFormat};
use crate::score::{Column, Score, ScoreCollection};

/// Everything the cluster-level metrics read while scoring one run.
pub struct ScoringContext<'a> {
    /// Run being scored.
    pub run_id: &'a str,
    /// Corpus tables; core documents pick the scoring units.
    pub corpus: &'a DocumentMappings,
    /// Gold responses.
    pub gold: &'a ResponseSet,
    /// System responses.
    pub system: &'a ResponseSet,
    /// Cluster alignment between the two.
    pub alignment: &'a ClusterAlignment,
    /// Pairwise type similarities keyed by aligned pair.
    pub similarities: &'a TypeSimilarities,
    /// Shared event log.
    pub log: &'a EventLog,
}

/// A computed metric: its rows plus how to print them.
pub trait Scorer {
    /// Short metric name, used for report filenames.
    fn name(&self) -> &'static str;

    /// The computed rows.
    fn scores(&self) -> &ScoreCollection;

    /// Column layout for reports.
    fn printing_specs(&self) -> &'static [ColumnSpec];

    /// Render the report in the requested format.
    fn render(&self, format: TableFormat) -> String {
        render(self.printing_specs(), self.scores(), format)
    }
}

/// Per-pair statistic plugged into [`ClusterPairScorer`].
pub trait ClusterStatistic {
    /// Metric name for reports.
    fn name(&self) -> &'static str;

    /// Which score column the statistic fills.
    fn column(&self) -> Column;

    /// Column layout for reports.
    fn printing_specs(&self) -> &'static [ColumnSpec];

    /// Metatypes the metric scores.
    fn relevant(&self, metatype: Metatype) -> bool {
        matches!(metatype, Metatype::Entity | Metatype::Event)
    }

    /// The number for one aligned gold/system cluster pair.
    fn compute(
        &self,
        ctx: &ScoringContext<'_>,
        document_id: &str,
        gold_cluster_id: &str,
        system_cluster_id: &str,
    ) -> f64;
}

/// Shared engine for metrics whose unit is an aligned cluster pair.
///
/// Walks the core documents: every relevant gold cluster yields a row
/// (statistic zero when unaligned), and every unaligned relevant system
/// cluster yields a zero row against a `None` gold cluster. Rows are
/// ordered by document, metatype, then cluster ids, and finished with
/// language/metatype aggregates.
pub struct ClusterPairScorer<S: ClusterStatistic> {
    statistic: S,
    scores: ScoreCollection,
}

impl<S: ClusterStatistic> ClusterPairScorer<S> {
    /// Score `ctx` with `statistic`.
    pub fn score(ctx: &ScoringContext<'_>, statistic: S) -> Self {
        let mut rows: Vec<Score> = Vec::new();
        for document_id in &ctx.corpus.core_documents {
            let document = match ctx.corpus.documents.get(document_id) {
                Some(document) => document,
                None => continue,
            };
            let language = document.language.clone();

            if let Some(alignments) = ctx.alignment.gold_to_system.get(document_id) {
                for (gold_cluster_id, entry) in alignments {
                    let gold_cluster = match ctx.gold.cluster(document_id, gold_cluster_id) {
                        Some(cluster) => cluster,
                        None => continue,
                    };
                    if !statistic.relevant(gold_cluster.metatype) {
                        continue;
                    }
                    let (system_cluster_id, value) = match &entry.aligned_to {
                        Some(system_cluster_id) => {
                            check_aligned_pair(
                                ctx,
                                document_id,
                                gold_cluster.metatype,
                                gold_cluster_id,
                                system_cluster_id,
                                entry.aligned_similarity,
                            );
                            let value = statistic.compute(
                                ctx,
                                document_id,
                                gold_cluster_id,
                                system_cluster_id,
                            );
                            (system_cluster_id.clone(), value)
                        }
                        None => ("None".to_owned(), 0.0),
                    };
                    rows.push(pair_row(
                        ctx,
                        statistic.column(),
                        document_id,
                        &language,
                        gold_cluster.metatype,
                        gold_cluster_id,
                        &system_cluster_id,
                        value,
                    ));
                }
            }

            if let Some(alignments) = ctx.alignment.system_to_gold.get(document_id) {
                for (system_cluster_id, entry) in alignments {
                    if entry.aligned_to.is_some() {
                        // Already rowed from the gold side.
                        continue;
                    }
                    let system_cluster = match ctx.system.cluster(document_id, system_cluster_id) {
                        Some(cluster) => cluster,
                        None => continue,
                    };
                    if !statistic.relevant(system_cluster.metatype) {
                        continue;
                    }
                    rows.push(pair_row(
                        ctx,
                        statistic.column(),
                        document_id,
                        &language,
                        system_cluster.metatype,
                        "None",
                        system_cluster_id,
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
        Self { statistic, scores }
    }
}

impl<S: ClusterStatistic> Scorer for ClusterPairScorer<S> {
    fn name(&self) -> &'static str {
        self.statistic.name()
    }

    fn scores(&self) -> &ScoreCollection {
        &self.scores
    }

    fn printing_specs(&self) -> &'static [ColumnSpec] {
        self.statistic.printing_specs()
    }
}

/// Sanity checks on an aligned pair before its statistic is computed.
fn check_aligned_pair(
    ctx: &ScoringContext<'_>,
    document_id: &str,
    gold_metatype: Metatype,
    gold_cluster_id: &str,
    system_cluster_id: &str,
    aligned_similarity: f64,
) {
    if aligned_similarity == 0.0 {
        ctx.log.record_nowhere(
            EventCode::DefaultCriticalError,
            format!(
                "aligned clusters {gold_cluster_id} and {system_cluster_id} \
                 in document {document_id} have zero alignment similarity"
            ),
        );
    }
    if let Some(system_cluster) = ctx.system.cluster(document_id, system_cluster_id) {
        if system_cluster.metatype != gold_metatype {
            ctx.log.record_nowhere(
                EventCode::UnexpectedAlignedClusterMetatype,
                format!(
                    "system cluster {system_cluster_id} has metatype \
                     {} but is aligned to {gold_metatype} cluster {gold_cluster_id} \
                     in document {document_id}",
                    system_cluster.metatype
                ),
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn pair_row(
    ctx: &ScoringContext<'_>,
    column: Column,
    document_id: &str,
    language: &str,
    metatype: Metatype,
    gold_cluster_id: &str,
    system_cluster_id: &str,
    value: f64,
) -> Score {
    let mut score = Score::new(ctx.run_id);
    score.document_id = Some(document_id.to_owned());
    score.language = Some(language.to_owned());
    score.metatype = Some(metatype.to_string());
    score.gold_cluster_id = Some(gold_cluster_id.to_owned());
    score.system_cluster_id = Some(system_cluster_id.to_owned());
    score.set_number(column, value);
    score
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use crate::corpus::Modality;
    use crate::response::Cluster;

    /// Corpus with two core documents, `D1` in English and `D2` in Spanish.
    pub fn two_document_corpus() -> DocumentMappings {
        let mut corpus = DocumentMappings::new();
        corpus.add_element("D1", "en", "D1E1", Some(Modality::Text));
        corpus.add_element("D2", "es", "D2E1", Some(Modality::Text));
        corpus.core_documents.insert("D1".to_owned());
        corpus.core_documents.insert("D2".to_owned());
        corpus
    }

    pub fn put_cluster(
        set: &mut ResponseSet,
        document_id: &str,
        cluster_id: &str,
        metatype: Metatype,
        types: &[(&str, &[&str])],
    ) {
        let cluster = set
            .document_clusters
            .entry(document_id.to_owned())
            .or_default()
            .entry(cluster_id.to_owned())
            .or_insert_with(|| Cluster::new(cluster_id, metatype));
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
}
