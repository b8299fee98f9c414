//! Claim-ranking metric: normalized discounted cumulative gain per query.
//!
//! The system submits an ordered list of claim IDs per query; assessments
//! assign each assessed claim a graded gain. DCG discounts the gain at
//! 0-based position `i` by `log2(i + 2)`; the ideal ordering sorts all
//! assessed gains descending. An optional cutoff truncates both lists.

use super::Scorer;
use crate::score::printer::ColumnSpec;
use crate::score::{mean_of, Column, Score, ScoreCollection};
use std::collections::BTreeMap;

const SPECS: &[ColumnSpec] = &[
    ColumnSpec::text(Column::QueryId, "QueryID"),
    ColumnSpec::text(Column::RunId, "RunID"),
    ColumnSpec::numeric(Column::Ndcg, "NDCG", 4),
];

/// Ranked claims and their assessments, per query.
#[derive(Debug, Clone, Default)]
pub struct ClaimRankings {
    /// System ranking per query, best first.
    pub rankings: BTreeMap<String, Vec<String>>,
    /// Graded gain per assessed claim, per query.
    pub assessments: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Per-query NDCG with a mean summary row.
pub struct NdcgScorer {
    scores: ScoreCollection,
}

impl NdcgScorer {
    /// Score every assessed query; `cutoff` truncates rankings when set.
    pub fn score(claims: &ClaimRankings, cutoff: Option<usize>, run_id: &str) -> Self {
        let mut scores = ScoreCollection::new();
        for (query_id, gains) in &claims.assessments {
            let empty = Vec::new();
            let ranking = claims.rankings.get(query_id).unwrap_or(&empty);
            let mut score = Score::new(run_id);
            score.query_id = Some(query_id.clone());
            score.ndcg = Some(ndcg(ranking, gains, cutoff));
            scores.add(score);
        }
        let mut summary = Score::new(run_id);
        summary.query_id = Some("Summary".to_owned());
        summary.ndcg = mean_of(scores.rows(), Column::Ndcg);
        summary.summary = true;
        scores.add(summary);
        Self { scores }
    }
}

fn dcg(gains: &[f64]) -> f64 {
    gains
        .iter()
        .enumerate()
        .map(|(i, gain)| gain / ((i + 2) as f64).log2())
        .sum()
}

fn ndcg(ranking: &[String], gains: &BTreeMap<String, f64>, cutoff: Option<usize>) -> f64 {
    let take = cutoff.unwrap_or(usize::MAX);
    let actual: Vec<f64> = ranking
        .iter()
        .take(take)
        .map(|claim_id| gains.get(claim_id).copied().unwrap_or(0.0))
        .collect();
    let mut ideal: Vec<f64> = gains.values().copied().collect();
    ideal.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    ideal.truncate(take);
    let ideal_dcg = dcg(&ideal);
    if ideal_dcg == 0.0 {
        return 0.0;
    }
    dcg(&actual) / ideal_dcg
}

impl Scorer for NdcgScorer {
    fn name(&self) -> &'static str {
        "NDCGMetric"
    }

    fn scores(&self) -> &ScoreCollection {
        &self.scores
    }

    fn printing_specs(&self) -> &'static [ColumnSpec] {
        SPECS
    }
}
