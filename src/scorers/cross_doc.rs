//! Cross-document metric: per-query average precision over ranked
//! responses, with per-entity micro averages and a macro average.
//!
//! Responses are ranked by confidence descending, ties broken by item ID
//! ascending so the ranking is deterministic. A query with no assessed
//! items scores zero. The report ends with one `ALL-Micro` row per entity
//! (mean over that entity's queries), a global `ALL-Micro` row (mean over
//! all queries), and a global `ALL-Macro` row (mean of the per-entity
//! means).

use super::Scorer;
use crate::score::printer::ColumnSpec;
use crate::score::{mean_of, Column, Score, ScoreCollection};
use std::collections::{BTreeMap, BTreeSet};

const SPECS: &[ColumnSpec] = &[
    ColumnSpec::text(Column::EntityId, "EntityID"),
    ColumnSpec::text(Column::RunId, "RunID"),
    ColumnSpec::text(Column::QueryId, "QueryID"),
    ColumnSpec::numeric(Column::AveragePrecision, "AvgPrec", 4),
];

/// One ranked response to a query.
#[derive(Debug, Clone)]
pub struct RankedResponse {
    /// Item the system returned.
    pub item_id: String,
    /// Ranking confidence.
    pub confidence: f64,
}

/// Everything the cross-document metric scores.
#[derive(Debug, Clone, Default)]
pub struct CrossDocQueries {
    /// Queries to score: query ID to the entity it asks about.
    pub entities: BTreeMap<String, String>,
    /// System responses per query.
    pub responses: BTreeMap<String, Vec<RankedResponse>>,
    /// Assessed-correct items per query.
    pub assessments: BTreeMap<String, BTreeSet<String>>,
}

/// Per-query AP with micro and macro roll-ups.
pub struct CrossDocScorer {
    scores: ScoreCollection,
}

impl CrossDocScorer {
    /// Score every query in `queries` for `run_id`.
    pub fn score(queries: &CrossDocQueries, run_id: &str) -> Self {
        let mut by_entity: BTreeMap<&str, Vec<Score>> = BTreeMap::new();
        for (query_id, entity_id) in &queries.entities {
            let empty_responses = Vec::new();
            let responses = queries.responses.get(query_id).unwrap_or(&empty_responses);
            let empty_assessments = BTreeSet::new();
            let assessed = queries
                .assessments
                .get(query_id)
                .unwrap_or(&empty_assessments);
            let ap = average_precision(responses, assessed);
            let mut score = Score::new(run_id);
            score.entity_id = Some(entity_id.clone());
            score.query_id = Some(query_id.clone());
            score.average_precision = Some(ap);
            by_entity.entry(entity_id).or_default().push(score);
        }

        let mut scores = ScoreCollection::new();
        let mut entity_means: Vec<f64> = Vec::new();
        let mut all_raw: Vec<Score> = Vec::new();
        for rows in by_entity.values() {
            for row in rows {
                scores.add(row.clone());
                all_raw.push(row.clone());
            }
        }
        for (entity_id, rows) in &by_entity {
            let mean = mean_of(rows, Column::AveragePrecision).unwrap_or(0.0);
            entity_means.push(mean);
            scores.add(summary_row(run_id, entity_id, "ALL-Micro", mean));
        }
        let micro = mean_of(&all_raw, Column::AveragePrecision).unwrap_or(0.0);
        scores.add(summary_row(run_id, "Summary", "ALL-Micro", micro));
        let macro_mean = if entity_means.is_empty() {
            0.0
        } else {
            entity_means.iter().sum::<f64>() / entity_means.len() as f64
        };
        scores.add(summary_row(run_id, "Summary", "ALL-Macro", macro_mean));
        Self { scores }
    }
}

fn summary_row(run_id: &str, entity_id: &str, query_id: &str, ap: f64) -> Score {
    let mut score = Score::new(run_id);
    score.entity_id = Some(entity_id.to_owned());
    score.query_id = Some(query_id.to_owned());
    score.average_precision = Some(ap);
    score.summary = true;
    score
}

/// AP of a ranked response list against the assessed-correct set.
fn average_precision(responses: &[RankedResponse], assessed: &BTreeSet<String>) -> f64 {
    if assessed.is_empty() {
        return 0.0;
    }
    let mut ranked: Vec<&RankedResponse> = responses.iter().collect();
    ranked.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    let mut hits = 0usize;
    let mut precision_sum = 0.0;
    for (rank, response) in ranked.iter().enumerate() {
        if assessed.contains(&response.item_id) {
            hits += 1;
            precision_sum += hits as f64 / (rank + 1) as f64;
        }
    }
    precision_sum / assessed.len() as f64
}

impl Scorer for CrossDocScorer {
    fn name(&self) -> &'static str {
        "CrossDocMetric"
    }

    fn scores(&self) -> &ScoreCollection {
        &self.scores
    }

    fn printing_specs(&self) -> &'static [ColumnSpec] {
        SPECS
    }
}
