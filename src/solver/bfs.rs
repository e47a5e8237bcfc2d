use log::info;
use std::collections::VecDeque;
use std::time::Instant;

use crate::grid::Grid;
use crate::observer::{explore, mark_path, visit, CancelToken, SearchObserver};
use crate::search_context::SearchContext;
use crate::solver::{elapsed_ms, endpoints, GridSolver, SearchResult, NO_PATH_MESSAGE};

/// Unweighted breadth-first search. Finds a path with the fewest moves and ignores
/// terrain cost. Cells are marked visited when they are enqueued so no cell is queued
/// twice.
#[derive(Clone, Debug, Default)]
pub struct BfsSolver;

impl GridSolver for BfsSolver {
    fn name(&self) -> &'static str {
        "Breadth-First Search"
    }

    fn solve(
        &self,
        grid: &mut Grid,
        allow_diagonal: bool,
        cancel: &CancelToken,
        observer: &mut dyn SearchObserver,
    ) -> SearchResult {
        let timer = Instant::now();
        let Some((start, end)) = endpoints(grid) else {
            return SearchResult::missing_endpoints();
        };
        info!("Breadth-first search from {start} to {end}");

        let mut ctx = SearchContext::new(start);
        let mut queue = VecDeque::from([0]);
        visit(grid, observer, &start);
        let mut nodes_explored = 0;

        loop {
            if !cancel.is_running() {
                return SearchResult::stopped(nodes_explored, &timer);
            }
            let Some(index) = queue.pop_front() else {
                break;
            };
            let current = ctx.point(index);
            nodes_explored += 1;
            explore(grid, observer, &current);

            if current == end {
                let path = ctx.path_to(grid, index);
                mark_path(grid, observer, &path);
                return SearchResult::found(grid, path, nodes_explored, &timer);
            }

            for (neighbour, _) in grid.neighbours(&current, allow_diagonal) {
                if let Some(neighbour_ix) = ctx.discover(index, neighbour) {
                    visit(grid, observer, &neighbour);
                    queue.push_back(neighbour_ix);
                }
            }
        }
        info!("Breadth-first search exhausted after {nodes_explored} nodes");
        SearchResult::failure(NO_PATH_MESSAGE, nodes_explored, elapsed_ms(&timer))
    }
}
