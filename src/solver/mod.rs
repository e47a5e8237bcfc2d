use crate::grid::Grid;
use crate::observer::{CancelToken, SearchObserver};
use crate::path::path_cost;
use grid_util::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

pub mod astar;
pub mod bfs;
pub mod dijkstra;
pub mod genetic;

use astar::AstarSolver;
use bfs::BfsSolver;
use dijkstra::DijkstraSolver;
use genetic::GeneticSolver;

pub const FOUND_MESSAGE: &str = "Path found";
pub const MISSING_ENDPOINTS_MESSAGE: &str = "Start or end point not set";
pub const NO_PATH_MESSAGE: &str = "No path found";
pub const NO_VALID_PATH_MESSAGE: &str = "No valid path found";
pub const STOPPED_MESSAGE: &str = "Search stopped";

/// Outcome of a single strategy run. A failed search is a normal outcome and is
/// reported here rather than as an error.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub success: bool,
    pub message: String,
    /// Number of edges in the path.
    pub path_length: usize,
    pub path_cost: Option<f64>,
    pub nodes_explored: usize,
    pub time_elapsed_ms: f64,
    #[serde(skip)]
    pub path: Option<Vec<Point>>,
}

impl SearchResult {
    pub fn missing_endpoints() -> SearchResult {
        SearchResult::failure(MISSING_ENDPOINTS_MESSAGE, 0, 0.0)
    }

    pub fn failure(message: &str, nodes_explored: usize, time_elapsed_ms: f64) -> SearchResult {
        SearchResult {
            success: false,
            message: message.to_owned(),
            path_length: 0,
            path_cost: None,
            nodes_explored,
            time_elapsed_ms,
            path: None,
        }
    }

    pub fn stopped(nodes_explored: usize, timer: &Instant) -> SearchResult {
        SearchResult::failure(STOPPED_MESSAGE, nodes_explored, elapsed_ms(timer))
    }

    pub fn found(grid: &Grid, path: Vec<Point>, nodes_explored: usize, timer: &Instant) -> SearchResult {
        SearchResult {
            success: true,
            message: FOUND_MESSAGE.to_owned(),
            path_length: path.len().saturating_sub(1),
            path_cost: Some(path_cost(grid, &path)),
            nodes_explored,
            time_elapsed_ms: elapsed_ms(timer),
            path: Some(path),
        }
    }

    /// Whether the run ended because it was cancelled rather than exhausted.
    pub fn was_stopped(&self) -> bool {
        !self.success && self.message == STOPPED_MESSAGE
    }
}

pub(crate) fn elapsed_ms(timer: &Instant) -> f64 {
    timer.elapsed().as_secs_f64() * 1000.0
}

/// Start and end of the grid, or [None] if either is missing.
pub(crate) fn endpoints(grid: &Grid) -> Option<(Point, Point)> {
    grid.start().zip(grid.end())
}

pub trait GridSolver {
    /// Display name used in metrics, statistics and exports.
    fn name(&self) -> &'static str;

    /// Runs the search on `grid`, which it may annotate with visualization marks.
    /// `cancel` is checked at every frontier pop and `observer` is called after every
    /// visualization step.
    fn solve(
        &self,
        grid: &mut Grid,
        allow_diagonal: bool,
        cancel: &CancelToken,
        observer: &mut dyn SearchObserver,
    ) -> SearchResult;

    /// Headless run without cancellation.
    fn run(&self, grid: &mut Grid, allow_diagonal: bool) -> SearchResult {
        self.solve(grid, allow_diagonal, &CancelToken::new(), &mut ())
    }
}

/// Selection of a strategy in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmKind {
    Bfs,
    Dijkstra,
    Astar,
    Genetic,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 4] = [
        AlgorithmKind::Dijkstra,
        AlgorithmKind::Astar,
        AlgorithmKind::Genetic,
        AlgorithmKind::Bfs,
    ];
}

/// The closed set of strategies. Adding one means extending every match below.
#[derive(Clone, Debug)]
pub enum Algorithm {
    Bfs(BfsSolver),
    Dijkstra(DijkstraSolver),
    AStar(AstarSolver),
    Genetic(GeneticSolver),
}

impl Algorithm {
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Algorithm::Bfs(_) => AlgorithmKind::Bfs,
            Algorithm::Dijkstra(_) => AlgorithmKind::Dijkstra,
            Algorithm::AStar(_) => AlgorithmKind::Astar,
            Algorithm::Genetic(_) => AlgorithmKind::Genetic,
        }
    }

    fn solver(&self) -> &dyn GridSolver {
        match self {
            Algorithm::Bfs(s) => s,
            Algorithm::Dijkstra(s) => s,
            Algorithm::AStar(s) => s,
            Algorithm::Genetic(s) => s,
        }
    }
}

impl GridSolver for Algorithm {
    fn name(&self) -> &'static str {
        self.solver().name()
    }

    fn solve(
        &self,
        grid: &mut Grid,
        allow_diagonal: bool,
        cancel: &CancelToken,
        observer: &mut dyn SearchObserver,
    ) -> SearchResult {
        self.solver().solve(grid, allow_diagonal, cancel, observer)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
