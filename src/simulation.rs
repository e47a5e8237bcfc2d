//! Headless driver that runs a selection of strategies on one grid and collects their
//! results, the way an interactive front end would.
use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::metrics::RunMetrics;
use crate::observer::{mark_path, CancelToken, CellState, Recording, SearchObserver};
use crate::path::{smooth_path, waypoint_cost};
use crate::solver::{AlgorithmKind, GridSolver, SearchResult};
use crate::statistics::RunHistory;
use grid_util::Point;
use log::{info, warn};
use std::sync::{Arc, Mutex, PoisonError};

/// A successful path after line-of-sight smoothing. Only reported, never used to judge
/// the search itself.
#[derive(Clone, Debug, PartialEq)]
pub struct SmoothedPath {
    pub path: Vec<Point>,
    /// Number of segments between waypoints.
    pub path_length: usize,
    /// Cost of walking each segment along its straight line.
    pub path_cost: f64,
}

impl SmoothedPath {
    fn new(grid: &Grid, path: &[Point]) -> SmoothedPath {
        let path = smooth_path(grid, path);
        SmoothedPath {
            path_length: path.len().saturating_sub(1),
            path_cost: waypoint_cost(grid, &path),
            path,
        }
    }
}

/// Everything one strategy produced during a simulation.
#[derive(Clone, Debug)]
pub struct AlgorithmOutcome {
    pub algorithm: &'static str,
    pub kind: AlgorithmKind,
    pub result: SearchResult,
    pub smoothed: Option<SmoothedPath>,
    /// Visualization steps of the run, for replay.
    pub recording: Recording,
}

#[derive(Clone, Debug, Default)]
pub struct SimulationReport {
    pub outcomes: Vec<AlgorithmOutcome>,
    pub metrics: RunMetrics,
    best: Option<usize>,
}

impl SimulationReport {
    /// The outcome ranked best: shortest path, then fastest.
    pub fn best(&self) -> Option<&AlgorithmOutcome> {
        self.best.map(|ix| &self.outcomes[ix])
    }

    /// Whether the simulation was cancelled before every strategy finished.
    pub fn was_stopped(&self) -> bool {
        self.outcomes.iter().any(|o| o.result.was_stopped())
    }
}

/// Forwards every step to the caller's observer and keeps a copy for replay.
struct Recorder<'a> {
    recording: Recording,
    inner: &'a mut dyn SearchObserver,
}

impl SearchObserver for Recorder<'_> {
    fn on_step(&mut self, grid: &Grid, cells: &[Point], state: CellState) {
        self.recording.on_step(grid, cells, state);
        self.inner.on_step(grid, cells, state);
    }
}

/// Owns the base grid and the run history shared across simulations.
#[derive(Debug)]
pub struct Simulation {
    grid: Grid,
    history: Arc<Mutex<RunHistory>>,
}

impl Simulation {
    pub fn new(grid: Grid) -> Simulation {
        Simulation::with_history(grid, Arc::new(Mutex::new(RunHistory::new())))
    }

    /// A simulation appending to a history that other simulations may share.
    pub fn with_history(grid: Grid, history: Arc<Mutex<RunHistory>>) -> Simulation {
        Simulation { grid, history }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn history(&self) -> Arc<Mutex<RunHistory>> {
        Arc::clone(&self.history)
    }

    /// Runs every configured strategy, in order, on its own snapshot of the grid.
    ///
    /// Cancellation stops the running strategy and skips the rest. Results go to the
    /// report and, unless the run was stopped, to the shared history. The best path is
    /// marked on the base grid.
    pub fn run(
        &mut self,
        config: &SimulationConfig,
        cancel: &CancelToken,
        observer: &mut dyn SearchObserver,
    ) -> Result<SimulationReport> {
        let (Some(start), Some(end)) = (self.grid.start(), self.grid.end()) else {
            return Err(Error::MissingEndpoints);
        };
        let algorithms = config.build_algorithms();
        if algorithms.is_empty() {
            return Err(Error::NoAlgorithms);
        }
        if !self.grid.reachable(&start, &end, config.allow_diagonal) {
            warn!("End {end} cannot be reached from start {start}");
        }
        info!(
            "Running {} algorithms on a {}x{} grid",
            algorithms.len(),
            self.grid.rows(),
            self.grid.cols()
        );
        self.grid.reset();

        let mut report = SimulationReport::default();
        for algorithm in algorithms {
            if !cancel.is_running() {
                info!("Simulation stopped before {algorithm}");
                break;
            }
            let mut grid = self.grid.snapshot();
            let mut recorder = Recorder {
                recording: Recording::new(),
                inner: &mut *observer,
            };
            let result = algorithm.solve(&mut grid, config.allow_diagonal, cancel, &mut recorder);
            info!(
                "{algorithm}: {} after {} nodes in {:.2} ms",
                result.message, result.nodes_explored, result.time_elapsed_ms
            );
            let smoothed = result.path.as_deref().map(|path| SmoothedPath::new(&grid, path));
            if let Some(smoothed) = &smoothed {
                info!(
                    "{algorithm}: smoothed path has {} segments costing {:.2}",
                    smoothed.path_length, smoothed.path_cost
                );
            }
            if !result.was_stopped() {
                self.history
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .add_run(algorithm.name(), &result);
            }
            report.metrics.add_result(algorithm.name(), result.clone());
            report.outcomes.push(AlgorithmOutcome {
                algorithm: algorithm.name(),
                kind: algorithm.kind(),
                result,
                smoothed,
                recording: recorder.recording,
            });
        }

        report.best = report.metrics.best().and_then(|best| {
            report
                .metrics
                .runs()
                .iter()
                .position(|run| std::ptr::eq(run, best))
        });
        match report.best() {
            Some(best) => {
                info!("Best result: {}", best.algorithm);
                if let Some(path) = &best.result.path {
                    mark_path(&mut self.grid, observer, path);
                }
            }
            None => info!("No algorithm found a path"),
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{point, Paint, Terrain};
    use crate::solver::genetic::GeneticConfig;

    fn grid() -> Grid {
        // S . . . .
        // . # # # .
        // . . w . .
        // . # # # .
        // . . . . E
        let mut grid = Grid::new(5, 5);
        grid.set_cell(0, 0, Paint::Start);
        grid.set_cell(4, 4, Paint::End);
        for col in 1..4 {
            grid.set_cell(1, col, Paint::Obstacle);
            grid.set_cell(3, col, Paint::Obstacle);
        }
        grid.set_cell(2, 2, Paint::Terrain(Terrain::Water));
        grid
    }

    fn config() -> SimulationConfig {
        SimulationConfig {
            genetic: GeneticConfig {
                seed: Some(17),
                ..GeneticConfig::default()
            },
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn runs_every_algorithm() {
        let mut simulation = Simulation::new(grid());
        let report = simulation
            .run(&config(), &CancelToken::new(), &mut ())
            .unwrap();
        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.metrics.len(), 4);
        assert!(!report.was_stopped());
        for outcome in &report.outcomes {
            assert!(!outcome.recording.is_empty(), "{}", outcome.algorithm);
            let Some(smoothed) = &outcome.smoothed else {
                continue;
            };
            assert!(smoothed.path_length <= outcome.result.path_length);
            // Mutated genetic paths may skip cells, which the bound does not cover.
            if outcome.kind != AlgorithmKind::Genetic {
                assert!(smoothed.path_cost <= outcome.result.path_cost.unwrap() + 1e-9);
            }
        }
        let dijkstra = &report.outcomes[0];
        assert_eq!(dijkstra.kind, AlgorithmKind::Dijkstra);
        assert_eq!(dijkstra.result.path_cost, Some(8.0));

        let best = report.best().unwrap();
        assert_eq!(best.result.path_length, 8);
        let base = simulation.grid();
        let marked = base.cells().filter(|(p, _)| base.marks_at(p).unwrap().path).count();
        assert_eq!(marked, 7);

        let history = simulation.history();
        let history = history.lock().unwrap();
        assert_eq!(history.all_statistics().len(), 4);
        assert_eq!(history.statistics("Breadth-First Search").unwrap().success_rate, 100.0);
    }

    #[test]
    fn shared_history_accumulates() {
        let history = Arc::new(Mutex::new(RunHistory::new()));
        let config = SimulationConfig {
            algorithms: vec![AlgorithmKind::Astar],
            ..SimulationConfig::default()
        };
        for _ in 0..3 {
            let mut simulation = Simulation::with_history(grid(), Arc::clone(&history));
            simulation.run(&config, &CancelToken::new(), &mut ()).unwrap();
        }
        let stats = history.lock().unwrap().statistics("A* Pathfinding").unwrap();
        assert_eq!(stats.run_count, 3);
        assert_eq!(stats.path_cost.unwrap().std_dev, 0.0);
    }

    #[test]
    fn preconditions() {
        let mut simulation = Simulation::new(Grid::new(3, 3));
        assert!(matches!(
            simulation.run(&config(), &CancelToken::new(), &mut ()),
            Err(Error::MissingEndpoints)
        ));
        let mut simulation = Simulation::new(grid());
        let none = SimulationConfig {
            algorithms: vec![],
            ..config()
        };
        assert!(matches!(
            simulation.run(&none, &CancelToken::new(), &mut ()),
            Err(Error::NoAlgorithms)
        ));
    }

    #[test]
    fn cancelled_simulation_records_nothing() {
        let mut simulation = Simulation::new(grid());
        let cancel = CancelToken::new();
        cancel.stop();
        let report = simulation.run(&config(), &cancel, &mut ()).unwrap();
        assert!(report.outcomes.is_empty());
        assert!(report.best().is_none());
        assert!(!simulation.history().lock().unwrap().has_data());
    }

    #[test]
    fn unreachable_end_has_no_best() {
        let mut base = grid();
        base.set_cell(3, 4, Paint::Obstacle);
        base.set_cell(3, 0, Paint::Obstacle);
        let mut simulation = Simulation::new(base);
        let report = simulation
            .run(&config(), &CancelToken::new(), &mut ())
            .unwrap();
        assert!(report.outcomes.iter().all(|o| !o.result.success));
        assert!(report.best().is_none());
        assert!(!simulation.grid().marks_at(&point(2, 2)).unwrap().path);
    }
}
