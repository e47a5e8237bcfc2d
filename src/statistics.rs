//! Aggregation of results across repeated simulations.
use crate::solver::SearchResult;
use chrono::{DateTime, Utc};
use itertools::{Itertools, MinMaxResult};
use num_traits::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary of one run as kept in the history.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub success: bool,
    pub path_length: usize,
    pub path_cost: f64,
    pub nodes_explored: usize,
    pub time_elapsed_ms: f64,
    pub timestamp: DateTime<Utc>,
}

impl RunRecord {
    pub fn from_result(result: &SearchResult) -> RunRecord {
        RunRecord {
            success: result.success,
            path_length: result.path_length,
            path_cost: result.path_cost.unwrap_or(0.0),
            nodes_explored: result.nodes_explored,
            time_elapsed_ms: result.time_elapsed_ms,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl MetricSummary {
    /// Summarizes `values`, or [None] when there are none.
    pub fn from_values<T, I>(values: I) -> Option<MetricSummary>
    where
        T: ToPrimitive,
        I: IntoIterator<Item = T>,
    {
        let values: Vec<f64> = values.into_iter().filter_map(|v| v.to_f64()).collect();
        let (min, max) = match values.iter().copied().minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(min, max) => (min, max),
        };
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(MetricSummary {
            mean,
            min,
            max,
            std_dev: variance.sqrt(),
        })
    }
}

/// Aggregate of one algorithm's history. The metric summaries only cover successful
/// runs and are [None] when there were none.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmStatistics {
    pub run_count: usize,
    /// Percentage of successful runs, 0 to 100.
    pub success_rate: f64,
    pub path_length: Option<MetricSummary>,
    pub path_cost: Option<MetricSummary>,
    pub nodes_explored: Option<MetricSummary>,
    pub time_elapsed: Option<MetricSummary>,
}

/// Append-only history of run summaries per algorithm name. Shared between threads
/// it needs a lock, e.g. `Arc<Mutex<RunHistory>>`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunHistory {
    runs: BTreeMap<String, Vec<RunRecord>>,
}

impl RunHistory {
    pub fn new() -> RunHistory {
        RunHistory::default()
    }

    pub fn add_run(&mut self, algorithm: &str, result: &SearchResult) {
        self.runs
            .entry(algorithm.to_owned())
            .or_default()
            .push(RunRecord::from_result(result));
    }

    pub fn runs(&self, algorithm: &str) -> &[RunRecord] {
        self.runs.get(algorithm).map(Vec::as_slice).unwrap_or_default()
    }

    /// Statistics for `algorithm`, or [None] if it never ran.
    pub fn statistics(&self, algorithm: &str) -> Option<AlgorithmStatistics> {
        let runs = self.runs.get(algorithm).filter(|runs| !runs.is_empty())?;
        let successful: Vec<&RunRecord> = runs.iter().filter(|r| r.success).collect();
        Some(AlgorithmStatistics {
            run_count: runs.len(),
            success_rate: 100.0 * successful.len() as f64 / runs.len() as f64,
            path_length: MetricSummary::from_values(successful.iter().map(|r| r.path_length)),
            path_cost: MetricSummary::from_values(successful.iter().map(|r| r.path_cost)),
            nodes_explored: MetricSummary::from_values(successful.iter().map(|r| r.nodes_explored)),
            time_elapsed: MetricSummary::from_values(successful.iter().map(|r| r.time_elapsed_ms)),
        })
    }

    pub fn all_statistics(&self) -> BTreeMap<String, AlgorithmStatistics> {
        self.runs
            .keys()
            .filter_map(|name| Some((name.clone(), self.statistics(name)?)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.runs.clear();
    }

    pub fn has_data(&self) -> bool {
        !self.runs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::NO_PATH_MESSAGE;
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn success(path_length: usize, nodes_explored: usize) -> SearchResult {
        SearchResult {
            success: true,
            message: "Path found".to_owned(),
            path_length,
            path_cost: Some(path_length as f64 * 1.5),
            nodes_explored,
            time_elapsed_ms: 1.0,
            path: None,
        }
    }

    #[test]
    fn summary_uses_population_std_dev() {
        let summary = MetricSummary::from_values([2, 4, 4, 4, 5, 5, 7, 9]).unwrap();
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
        assert_eq!(summary.std_dev, 2.0);
        let single = MetricSummary::from_values([3.5]).unwrap();
        assert_eq!((single.min, single.max, single.std_dev), (3.5, 3.5, 0.0));
        assert!(MetricSummary::from_values(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn statistics_over_successful_runs() {
        let mut history = RunHistory::new();
        assert!(!history.has_data());
        history.add_run("BFS", &success(4, 10));
        history.add_run("BFS", &SearchResult::failure(NO_PATH_MESSAGE, 99, 1.0));
        history.add_run("BFS", &success(8, 30));
        history.add_run("BFS", &SearchResult::failure(NO_PATH_MESSAGE, 99, 1.0));
        let stats = history.statistics("BFS").unwrap();
        assert_eq!(stats.run_count, 4);
        assert_eq!(stats.success_rate, 50.0);
        let length = stats.path_length.unwrap();
        assert_eq!((length.mean, length.min, length.max, length.std_dev), (6.0, 4.0, 8.0, 2.0));
        assert_eq!(stats.nodes_explored.unwrap().max, 30.0);
        assert_eq!(stats.path_cost.unwrap().mean, 9.0);
        assert!(history.statistics("A*").is_none());
    }

    #[test]
    fn all_failed_has_no_summaries() {
        let mut history = RunHistory::new();
        history.add_run("GA", &SearchResult::failure(NO_PATH_MESSAGE, 5, 1.0));
        let stats = history.statistics("GA").unwrap();
        assert_eq!(stats.success_rate, 0.0);
        assert!(stats.path_length.is_none() && stats.time_elapsed.is_none());
        assert_eq!(history.all_statistics().len(), 1);
        history.clear();
        assert!(!history.has_data());
        assert!(history.runs("GA").is_empty());
    }

    #[test]
    fn concurrent_appends() {
        let history = Arc::new(Mutex::new(RunHistory::new()));
        thread::scope(|s| {
            for worker in 0..4 {
                let history = Arc::clone(&history);
                s.spawn(move || {
                    for i in 0..25 {
                        let result = success(worker + i, i);
                        history.lock().unwrap().add_run("Dijkstra", &result);
                    }
                });
            }
        });
        let history = history.lock().unwrap();
        assert_eq!(history.runs("Dijkstra").len(), 100);
        assert_eq!(history.statistics("Dijkstra").unwrap().success_rate, 100.0);
    }
}
