//! Hooks through which a running search reports its progress: the visualization marks
//! written to the grid, an observer called after every step, a replay recording and
//! the cooperative cancellation flag.
use crate::grid::{point, row_col, Grid};
use chrono::{DateTime, Utc};
use grid_util::Point;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Visualization state reported for a group of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    /// Cell taken off the frontier. Only marked while the observer is called.
    Exploring,
    Visited,
    Path,
    /// The cells of the current genetic candidate, replacing any earlier candidate.
    Candidate,
}

/// Called after every visualization step of a search. This is the place to pace an
/// animation; whatever an observer does, it cannot alter the search.
pub trait SearchObserver {
    fn on_step(&mut self, grid: &Grid, cells: &[Point], state: CellState);
}

/// Headless runs observe nothing.
impl SearchObserver for () {
    fn on_step(&mut self, _: &Grid, _: &[Point], _: CellState) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedCell {
    pub row: usize,
    pub col: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedStep {
    pub cells: Vec<RecordedCell>,
    pub state: CellState,
    pub timestamp: DateTime<Utc>,
}

/// Records every step of a run so it can be replayed onto a grid later.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Recording {
    steps: Vec<RecordedStep>,
}

impl Recording {
    pub fn new() -> Recording {
        Recording::default()
    }

    pub fn steps(&self) -> &[RecordedStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Applies one recorded step to the marks of `grid`, leaving them as the live run
    /// left them once the step was observed. `Exploring` steps therefore change
    /// nothing. Cells outside the grid are ignored.
    pub fn apply_step(grid: &mut Grid, step: &RecordedStep) {
        if step.state == CellState::Candidate {
            grid.clear_open_marks();
        }
        for cell in &step.cells {
            let Some(marks) = grid.marks_mut(&point(cell.row, cell.col)) else {
                continue;
            };
            match step.state {
                CellState::Exploring => {}
                CellState::Visited => marks.visited = true,
                CellState::Path => marks.path = true,
                CellState::Candidate => marks.exploring = true,
            }
        }
    }

    /// Resets the marks of `grid` and replays every step onto it.
    pub fn replay(&self, grid: &mut Grid) {
        grid.reset();
        for step in &self.steps {
            Recording::apply_step(grid, step);
        }
    }
}

impl SearchObserver for Recording {
    fn on_step(&mut self, _: &Grid, cells: &[Point], state: CellState) {
        self.steps.push(RecordedStep {
            cells: cells
                .iter()
                .map(|p| {
                    let (row, col) = row_col(p);
                    RecordedCell { row, col }
                })
                .collect(),
            state,
            timestamp: Utc::now(),
        });
    }
}

/// Shared "still running" flag. Searches check it every time they take a node off
/// their frontier (or start a generation) and stop early once it is cleared.
#[derive(Clone, Debug)]
pub struct CancelToken {
    running: Arc<AtomicBool>,
}

impl Default for CancelToken {
    fn default() -> CancelToken {
        CancelToken {
            running: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Marks a dequeued cell as being explored for the duration of the observer call.
pub(crate) fn explore(grid: &mut Grid, observer: &mut dyn SearchObserver, p: &Point) {
    if grid.is_endpoint(p) {
        return;
    }
    if let Some(marks) = grid.marks_mut(p) {
        marks.exploring = true;
    }
    observer.on_step(grid, std::slice::from_ref(p), CellState::Exploring);
    if let Some(marks) = grid.marks_mut(p) {
        marks.exploring = false;
    }
}

pub(crate) fn visit(grid: &mut Grid, observer: &mut dyn SearchObserver, p: &Point) {
    if let Some(marks) = grid.marks_mut(p) {
        marks.visited = true;
    }
    observer.on_step(grid, std::slice::from_ref(p), CellState::Visited);
}

/// Draws `path` as the current genetic candidate after clearing earlier candidates.
/// Endpoints and obstacles are skipped.
pub(crate) fn show_candidate(grid: &mut Grid, observer: &mut dyn SearchObserver, path: &[Point]) {
    grid.clear_open_marks();
    let cells: Vec<Point> = path
        .iter()
        .filter(|p| grid.is_open(p) && !grid.is_endpoint(p))
        .copied()
        .collect();
    for p in &cells {
        if let Some(marks) = grid.marks_mut(p) {
            marks.exploring = true;
        }
    }
    observer.on_step(grid, &cells, CellState::Candidate);
}

/// Marks the cells of a final path, skipping the endpoints.
pub(crate) fn mark_path(grid: &mut Grid, observer: &mut dyn SearchObserver, path: &[Point]) {
    let inner: Vec<Point> = path
        .iter()
        .filter(|p| !grid.is_endpoint(p))
        .copied()
        .collect();
    for p in &inner {
        if let Some(marks) = grid.marks_mut(p) {
            marks.path = true;
        }
    }
    observer.on_step(grid, &inner, CellState::Path);
}
