//! Type-similarity metric: reports the precomputed pairwise type
//! similarity for each aligned cluster pair.

use super::{ClusterPairScorer, ClusterStatistic, ScoringContext};
use crate::score::printer::ColumnSpec;
use crate::score::Column;

const SPECS: &[ColumnSpec] = &[
    ColumnSpec::text(Column::DocumentId, "DocID"),
    ColumnSpec::text(Column::RunId, "RunID"),
    ColumnSpec::text(Column::Language, "Language"),
    ColumnSpec::text(Column::Metatype, "Metatype"),
    ColumnSpec::text(Column::GoldClusterId, "GoldClusterID"),
    ColumnSpec::text(Column::SystemClusterId, "SystemClusterID"),
    ColumnSpec::numeric(Column::TypeSimilarity, "Similarity", 4),
];

/// Looks the pair up in the similarity tables; missing pairs score zero.
pub struct TypeSimilarity;

impl TypeSimilarity {
    /// Run the cluster-pair engine with this statistic.
    pub fn score(ctx: &ScoringContext<'_>) -> ClusterPairScorer<Self> {
        ClusterPairScorer::score(ctx, TypeSimilarity)
    }
}

impl ClusterStatistic for TypeSimilarity {
    fn name(&self) -> &'static str {
        "TypeSimilarity"
    }

    fn column(&self) -> Column {
        Column::TypeSimilarity
    }

    fn printing_specs(&self) -> &'static [ColumnSpec] {
        SPECS
    }

    fn compute(
        &self,
        ctx: &ScoringContext<'_>,
        document_id: &str,
        gold_cluster_id: &str,
        system_cluster_id: &str,
    ) -> f64 {
        ctx.similarities
            .get(document_id, system_cluster_id, gold_cluster_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{ClusterAlignment, TypeSimilarities};
    use crate::events::EventLog;
    use crate::response::{Metatype, ResponseSet};
    use crate::scorers::testutil::{put_cluster, two_document_corpus};
    use crate::scorers::Scorer;

    #[test]
    fn aligned_pairs_report_table_value_and_feed_aggregates() {
        let corpus = two_document_corpus();
        let mut gold = ResponseSet::new("gold");
        let mut system = ResponseSet::new("run1");
        put_cluster(&mut gold, "D1", "G1", Metatype::Entity, &[]);
        put_cluster(&mut gold, "D2", "G2", Metatype::Event, &[]);
        put_cluster(&mut system, "D1", "S1", Metatype::Entity, &[]);
        put_cluster(&mut system, "D2", "S2", Metatype::Event, &[]);
        let mut alignment = ClusterAlignment::new();
        alignment.align("D1", "S1", "G1", 4.0);
        alignment.align("D2", "S2", "G2", 2.0);
        let mut similarities = TypeSimilarities::new();
        similarities.insert("D1", "S1", "G1", 0.9);
        // D2's pair is deliberately absent and must read as zero.
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
        let scorer = TypeSimilarity::score(&ctx);
        let raw: Vec<f64> = scorer
            .scores()
            .raw_rows()
            .filter_map(|s| s.number(Column::TypeSimilarity))
            .collect();
        assert_eq!(raw, vec![0.9, 0.0]);
        let grand_total = scorer
            .scores()
            .rows()
            .iter()
            .find(|s| {
                s.aggregate
                    && s.language.as_deref() == Some("ALL")
                    && s.metatype.as_deref() == Some("ALL")
            })
            .and_then(|s| s.number(Column::TypeSimilarity))
            .unwrap();
        assert!((grand_total - 0.45).abs() < 1e-9);
    }
}
