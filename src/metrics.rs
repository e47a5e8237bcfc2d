use crate::solver::SearchResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// One strategy run of a simulation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmRun {
    pub algorithm: String,
    #[serde(flatten)]
    pub result: SearchResult,
    pub timestamp: DateTime<Utc>,
}

/// Results of the runs of a single simulation, in the order they finished.
#[derive(Clone, Debug, Default)]
pub struct RunMetrics {
    runs: Vec<AlgorithmRun>,
}

impl RunMetrics {
    pub fn new() -> RunMetrics {
        RunMetrics::default()
    }

    pub fn add_result(&mut self, algorithm: &str, result: SearchResult) {
        self.runs.push(AlgorithmRun {
            algorithm: algorithm.to_owned(),
            result,
            timestamp: Utc::now(),
        });
    }

    pub fn runs(&self) -> &[AlgorithmRun] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn clear(&mut self) {
        self.runs.clear();
    }

    pub fn best(&self) -> Option<&AlgorithmRun> {
        best_of_run(&self.runs)
    }
}

/// The successful run with the shortest path, the faster one on equal length. The
/// earliest run wins a complete tie.
pub fn best_of_run(runs: &[AlgorithmRun]) -> Option<&AlgorithmRun> {
    runs.iter()
        .filter(|run| run.result.success)
        .min_by(|a, b| compare_runs(&a.result, &b.result))
}

fn compare_runs(a: &SearchResult, b: &SearchResult) -> Ordering {
    a.path_length
        .cmp(&b.path_length)
        .then_with(|| a.time_elapsed_ms.total_cmp(&b.time_elapsed_ms))
}
