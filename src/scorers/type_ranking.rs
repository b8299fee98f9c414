//! Type-ranking metric: average precision of system types against gold
//! types for each aligned cluster pair.

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
    ColumnSpec::numeric(Column::AveragePrecision, "AvgPrec", 4),
];

/// Average precision over the system's type ranking.
///
/// System types are ranked by the number of distinct mention spans
/// asserting each type (descending), ties broken by type name ascending.
/// A rank is a hit when the gold cluster asserts the same type; AP is the
/// sum of precision-at-hits divided by the number of gold types.
pub struct TypeRanking;

impl TypeRanking {
    /// Run the cluster-pair engine with this statistic.
    pub fn score(ctx: &ScoringContext<'_>) -> ClusterPairScorer<Self> {
        ClusterPairScorer::score(ctx, TypeRanking)
    }
}

impl ClusterStatistic for TypeRanking {
    fn name(&self) -> &'static str {
        "TypeRanking"
    }

    fn column(&self) -> Column {
        Column::AveragePrecision
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
        let gold_types = match ctx.gold.cluster(document_id, gold_cluster_id) {
            Some(cluster) => &cluster.types,
            None => return 0.0,
        };
        if gold_types.is_empty() {
            return 0.0;
        }
        let system_types = ctx
            .system
            .cluster(document_id, system_cluster_id)
            .map(|cluster| &cluster.types);

        let mut ranking: Vec<(&str, usize)> = system_types
            .map(|types| {
                types
                    .iter()
                    .map(|(type_name, spans)| (type_name.as_str(), spans.len()))
                    .collect()
            })
            .unwrap_or_default();
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut hits = 0usize;
        let mut precision_sum = 0.0;
        for (rank, (type_name, _)) in ranking.iter().enumerate() {
            if gold_types.contains_key(*type_name) {
                hits += 1;
                precision_sum += hits as f64 / (rank + 1) as f64;
            }
        }
        precision_sum / gold_types.len() as f64
    }
}
