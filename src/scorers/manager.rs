//! Runs the metrics registered for a task and writes their reports.

use super::cross_doc::{CrossDocQueries, CrossDocScorer};
use super::ndcg::{ClaimRankings, NdcgScorer};
use super::{
    argument::ArgumentScorer, frame::FrameScorer, type_ranking::TypeRanking,
    type_similarity::TypeSimilarity, Scorer, ScoringContext,
};
use crate::error::Result;
use crate::score::printer::TableFormat;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Evaluation task being scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Document-level clusters, frames, and arguments.
    Task1,
    /// Cross-document entity ranking.
    Task2,
    /// Claim frames and claim ranking.
    Task3,
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "task1" => Ok(Task::Task1),
            "task2" => Ok(Task::Task2),
            "task3" => Ok(Task::Task3),
            other => Err(format!("unknown task: {other}")),
        }
    }
}

/// Owns the scorers of one scoring invocation.
pub struct ScoresManager {
    scorers: Vec<Box<dyn Scorer>>,
}

impl ScoresManager {
    /// Score a task1 run: type ranking, type similarity, frames, and
    /// arguments.
    pub fn score_task1(ctx: &ScoringContext<'_>) -> Self {
        Self {
            scorers: vec![
                Box::new(TypeRanking::score(ctx)),
                Box::new(TypeSimilarity::score(ctx)),
                Box::new(FrameScorer::score(ctx)),
                Box::new(ArgumentScorer::score(ctx)),
            ],
        }
    }

    /// Score a task2 run: cross-document average precision.
    pub fn score_task2(queries: &CrossDocQueries, run_id: &str) -> Self {
        Self {
            scorers: vec![Box::new(CrossDocScorer::score(queries, run_id))],
        }
    }

    /// Score a task3 run: claim-ranking NDCG.
    pub fn score_task3(claims: &ClaimRankings, cutoff: Option<usize>, run_id: &str) -> Self {
        Self {
            scorers: vec![Box::new(NdcgScorer::score(claims, cutoff, run_id))],
        }
    }

    /// The scorers, in registration order.
    pub fn scorers(&self) -> &[Box<dyn Scorer>] {
        &self.scorers
    }

    /// Write `<metric>-scores.txt` and `<metric>-scores.tab` for every
    /// metric under `dir`, creating it as needed.
    pub fn write_reports(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        for scorer in &self.scorers {
            let pretty = dir.join(format!("{}-scores.txt", scorer.name()));
            fs::write(pretty, scorer.render(TableFormat::Pretty))?;
            let tab = dir.join(format!("{}-scores.tab", scorer.name()));
            fs::write(tab, scorer.render(TableFormat::Tab))?;
        }
        Ok(())
    }

    /// Write `<metric>-scores.json` for every metric under `dir`.
    pub fn write_json(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        for scorer in &self.scorers {
            let path = dir.join(format!("{}-scores.json", scorer.name()));
            fs::write(path, scorer.scores().to_json()?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorers::cross_doc::RankedResponse;

    #[test]
    fn task_names_parse() {
        assert_eq!("task1".parse::<Task>(), Ok(Task::Task1));
        assert_eq!("task3".parse::<Task>(), Ok(Task::Task3));
        assert!("task4".parse::<Task>().is_err());
    }

    #[test]
    fn reports_are_written_per_metric() {
        let dir = tempfile::tempdir().unwrap();
        let mut queries = CrossDocQueries::default();
        queries.entities.insert("Q1".into(), "E1".into());
        queries.responses.insert(
            "Q1".into(),
            vec![RankedResponse {
                item_id: "m1".into(),
                confidence: 0.9,
            }],
        );
        queries
            .assessments
            .insert("Q1".into(), ["m1".to_string()].into_iter().collect());
        let manager = ScoresManager::score_task2(&queries, "run1");
        manager.write_reports(dir.path()).unwrap();
        let pretty = std::fs::read_to_string(dir.path().join("CrossDocMetric-scores.txt")).unwrap();
        assert!(pretty.contains("AvgPrec"));
        let tab = std::fs::read_to_string(dir.path().join("CrossDocMetric-scores.tab")).unwrap();
        assert!(tab.starts_with("EntityID\tRunID\tQueryID\tAvgPrec"));
    }
}
