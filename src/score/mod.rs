//! Score rows and collections.
//!
//! A [`Score`] is one immutable result row: identifying keys plus the
//! numeric fields its metric fills in. Summary and aggregate rows are
//! synthesized by the scorers and the aggregation engine, never loaded from
//! input; aggregate rows keep the raw rows they were computed from in
//! `elements` so their means are recomputable from exact membership.

pub mod aggregate;
pub mod printer;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The columns a score row can expose to the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Document ID key.
    DocumentId,
    /// Run ID key.
    RunId,
    /// Document language key.
    Language,
    /// Cluster metatype key.
    Metatype,
    /// Gold cluster ID key.
    GoldClusterId,
    /// System cluster ID key.
    SystemClusterId,
    /// Query ID key (cross-document and claim metrics).
    QueryId,
    /// Entity ID key (cross-document metric).
    EntityId,
    /// Precision.
    Precision,
    /// Recall.
    Recall,
    /// F1.
    F1,
    /// Average precision.
    AveragePrecision,
    /// Pairwise type similarity.
    TypeSimilarity,
    /// Normalized discounted cumulative gain.
    Ndcg,
}

impl Column {
    /// True for numeric metric columns.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Column::Precision
                | Column::Recall
                | Column::F1
                | Column::AveragePrecision
                | Column::TypeSimilarity
                | Column::Ndcg
        )
    }
}

/// One per-unit result row, or a synthesized summary/aggregate row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    /// Run being scored.
    pub run_id: String,
    /// Document key, `Summary` on summary rows.
    pub document_id: Option<String>,
    /// Document language, `ALL` on aggregate rows.
    pub language: Option<String>,
    /// Cluster metatype, `ALL` on aggregate rows.
    pub metatype: Option<String>,
    /// Gold cluster key, `None` when unaligned.
    pub gold_cluster_id: Option<String>,
    /// System cluster key, `None` when unaligned.
    pub system_cluster_id: Option<String>,
    /// Query key.
    pub query_id: Option<String>,
    /// Entity key.
    pub entity_id: Option<String>,
    /// Precision.
    pub precision: Option<f64>,
    /// Recall.
    pub recall: Option<f64>,
    /// F1.
    pub f1: Option<f64>,
    /// Average precision.
    pub average_precision: Option<f64>,
    /// Pairwise type similarity.
    pub type_similarity: Option<f64>,
    /// Normalized discounted cumulative gain.
    pub ndcg: Option<f64>,
    /// Synthesized summary row (printed with mean formats).
    pub summary: bool,
    /// Synthesized by the aggregation engine.
    pub aggregate: bool,
    /// Raw rows contributing to an aggregate, for drill-down.
    pub elements: Vec<Score>,
}

impl Score {
    /// New raw row for `run_id`.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            ..Self::default()
        }
    }

    /// Text rendering of a key column; empty when unset.
    pub fn text(&self, column: Column) -> String {
        let value = match column {
            Column::RunId => return self.run_id.clone(),
            Column::DocumentId => &self.document_id,
            Column::Language => &self.language,
            Column::Metatype => &self.metatype,
            Column::GoldClusterId => &self.gold_cluster_id,
            Column::SystemClusterId => &self.system_cluster_id,
            Column::QueryId => &self.query_id,
            Column::EntityId => &self.entity_id,
            _ => &None,
        };
        value.clone().unwrap_or_default()
    }

    /// Stored numeric value of a metric column.
    ///
    /// Aggregate rows answer with the mean over their member rows, so the
    /// value always reflects exact membership.
    pub fn number(&self, column: Column) -> Option<f64> {
        if self.aggregate {
            return mean_of(&self.elements, column);
        }
        match column {
            Column::Precision => self.precision,
            Column::Recall => self.recall,
            Column::F1 => self.f1,
            Column::AveragePrecision => self.average_precision,
            Column::TypeSimilarity => self.type_similarity,
            Column::Ndcg => self.ndcg,
            _ => None,
        }
    }

    /// Set a numeric metric column.
    pub fn set_number(&mut self, column: Column, value: f64) {
        match column {
            Column::Precision => self.precision = Some(value),
            Column::Recall => self.recall = Some(value),
            Column::F1 => self.f1 = Some(value),
            Column::AveragePrecision => self.average_precision = Some(value),
            Column::TypeSimilarity => self.type_similarity = Some(value),
            Column::Ndcg => self.ndcg = Some(value),
            _ => {}
        }
    }
}

/// Mean of a numeric column over rows where it is present; `None` when no
/// row carries it.
pub fn mean_of(rows: &[Score], column: Column) -> Option<f64> {
    let values: Vec<f64> = rows.iter().filter_map(|s| s.number(column)).collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Append-only, insertion-ordered sequence of score rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreCollection {
    rows: Vec<Score>,
}

impl ScoreCollection {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row.
    pub fn add(&mut self, score: Score) {
        self.rows.push(score);
    }

    /// All rows in insertion order.
    pub fn rows(&self) -> &[Score] {
        &self.rows
    }

    /// Raw (non-summary) rows.
    pub fn raw_rows(&self) -> impl Iterator<Item = &Score> {
        self.rows.iter().filter(|s| !s.summary)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows were added.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// JSON rendering of the rows.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.rows)
            .map_err(|e| Error::invalid_input(format!("JSON serialization failed: {e}")))
    }
}
