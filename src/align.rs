//! Cluster alignment and pairwise type similarities.
//!
//! Both tables are computed outside the core (by the alignment stage of the
//! pipeline) and consumed read-only by the scorers. `aligned_to == None`
//! means no alignment was found; an aligned pair with a similarity of
//! exactly 0 is an anomaly the scorers escalate as a critical event.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One direction of an alignment for one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentEntry {
    /// Counterpart cluster ID, when aligned.
    pub aligned_to: Option<String>,
    /// Similarity supporting the alignment; 0 on an aligned pair is an
    /// anomaly, not a value.
    pub aligned_similarity: f64,
}

impl AlignmentEntry {
    /// An unaligned entry.
    pub fn unaligned() -> Self {
        Self {
            aligned_to: None,
            aligned_similarity: 0.0,
        }
    }

    /// An aligned entry.
    pub fn aligned(to: impl Into<String>, similarity: f64) -> Self {
        Self {
            aligned_to: Some(to.into()),
            aligned_similarity: similarity,
        }
    }
}

/// Per-document map from cluster ID to its alignment entry.
pub type DocumentAlignment = BTreeMap<String, AlignmentEntry>;

/// Bidirectional gold/system cluster alignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterAlignment {
    /// Per document: system cluster ID to gold-side entry.
    pub system_to_gold: BTreeMap<String, DocumentAlignment>,
    /// Per document: gold cluster ID to system-side entry.
    pub gold_to_system: BTreeMap<String, DocumentAlignment>,
}

impl ClusterAlignment {
    /// Empty alignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an aligned pair in both directions.
    pub fn align(
        &mut self,
        document_id: &str,
        system_cluster_id: &str,
        gold_cluster_id: &str,
        similarity: f64,
    ) {
        self.system_to_gold
            .entry(document_id.to_string())
            .or_default()
            .insert(
                system_cluster_id.to_string(),
                AlignmentEntry::aligned(gold_cluster_id, similarity),
            );
        self.gold_to_system
            .entry(document_id.to_string())
            .or_default()
            .insert(
                gold_cluster_id.to_string(),
                AlignmentEntry::aligned(system_cluster_id, similarity),
            );
    }

    /// Record an unaligned cluster on one side.
    pub fn unaligned(&mut self, document_id: &str, system_side: bool, cluster_id: &str) {
        let table = if system_side {
            &mut self.system_to_gold
        } else {
            &mut self.gold_to_system
        };
        table
            .entry(document_id.to_string())
            .or_default()
            .insert(cluster_id.to_string(), AlignmentEntry::unaligned());
    }
}

/// Precomputed pairwise type similarities:
/// document → system cluster → gold cluster → similarity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeSimilarities {
    table: BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>,
}

impl TypeSimilarities {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one pairwise similarity.
    pub fn insert(
        &mut self,
        document_id: &str,
        system_cluster_id: &str,
        gold_cluster_id: &str,
        similarity: f64,
    ) {
        self.table
            .entry(document_id.to_string())
            .or_default()
            .entry(system_cluster_id.to_string())
            .or_default()
            .insert(gold_cluster_id.to_string(), similarity);
    }

    /// Similarity for a (system, gold) pair; 0.0 when absent.
    pub fn get(&self, document_id: &str, system_cluster_id: &str, gold_cluster_id: &str) -> f64 {
        self.table
            .get(document_id)
            .and_then(|doc| doc.get(system_cluster_id))
            .and_then(|sys| sys.get(gold_cluster_id))
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_records_both_directions() {
        let mut alignment = ClusterAlignment::new();
        alignment.align("DOC1", "S1", "G1", 0.8);
        alignment.unaligned("DOC1", true, "S2");
        let s2g = alignment.system_to_gold.get("DOC1").unwrap();
        assert_eq!(s2g.get("S1").unwrap().aligned_to.as_deref(), Some("G1"));
        assert_eq!(s2g.get("S2").unwrap().aligned_to, None);
        let g2s = alignment.gold_to_system.get("DOC1").unwrap();
        assert_eq!(g2s.get("G1").unwrap().aligned_to.as_deref(), Some("S1"));
    }

    #[test]
    fn similarity_defaults_to_zero() {
        let mut similarities = TypeSimilarities::new();
        similarities.insert("DOC1", "S1", "G1", 0.75);
        assert_eq!(similarities.get("DOC1", "S1", "G1"), 0.75);
        assert_eq!(similarities.get("DOC1", "S1", "G2"), 0.0);
        assert_eq!(similarities.get("DOC9", "S1", "G1"), 0.0);
    }
}
