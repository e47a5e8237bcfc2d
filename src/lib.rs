//! # terrain_pathfinding
//!
//! A grid-based pathfinding engine on terrain-weighted grids. Implements
//! [breadth-first search](https://en.wikipedia.org/wiki/Breadth-first_search),
//! [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm),
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) and a
//! [genetic algorithm](https://en.wikipedia.org/wiki/Genetic_algorithm) behind a
//! common [GridSolver] interface. Entering a cell costs 1 (or sqrt(2) diagonally)
//! times the cost of its terrain. Pre-computes
//! [connected components](https://en.wikipedia.org/wiki/Component_(graph_theory))
//! to detect unreachable configurations up front.
//!
//! ```
//! use terrain_pathfinding::{AstarSolver, Grid, GridSolver, Paint, Terrain};
//!
//! let mut grid = Grid::new(5, 5);
//! grid.set_cell(0, 0, Paint::Start);
//! grid.set_cell(4, 4, Paint::End);
//! grid.set_cell(2, 2, Paint::Terrain(Terrain::Water));
//! let result = AstarSolver::new().run(&mut grid, false);
//! assert!(result.success);
//! assert_eq!(result.path_cost, Some(8.0));
//! ```
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod metrics;
pub mod observer;
pub mod path;
mod search_context;
pub mod simulation;
pub mod solver;
pub mod statistics;

pub use config::{GridConfig, SimulationConfig};
pub use error::{Error, Result};
pub use grid::{point, row_col, Cell, CellMarks, Grid, Paint, Terrain};
pub use grid_util::Point;
pub use metrics::{best_of_run, AlgorithmRun, RunMetrics};
pub use observer::{CancelToken, CellState, Recording, SearchObserver};
pub use simulation::{Simulation, SimulationReport};
pub use solver::astar::AstarSolver;
pub use solver::bfs::BfsSolver;
pub use solver::dijkstra::DijkstraSolver;
pub use solver::genetic::{GeneticConfig, GeneticSolver};
pub use solver::{Algorithm, AlgorithmKind, GridSolver, SearchResult};
pub use statistics::{AlgorithmStatistics, RunHistory};

/// Inline capacity of neighbour lists, enough for all eight directions.
pub const N_SMALLVEC_SIZE: usize = 8;
