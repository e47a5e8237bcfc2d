use grid_util::Point;
use log::info;
use std::f64::consts::SQRT_2;
use std::time::Instant;

use crate::grid::Grid;
use crate::observer::{explore, mark_path, visit, CancelToken, SearchObserver};
use crate::search_context::SearchContext;
use crate::solver::{elapsed_ms, endpoints, GridSolver, SearchResult, NO_PATH_MESSAGE};

/// Best-first search on `g + heuristic_factor * h`. Equal estimates are expanded in
/// the order their cells were first discovered.
#[derive(Clone, Debug)]
pub struct AstarSolver {
    pub heuristic_factor: f64,
}

impl AstarSolver {
    pub fn new() -> AstarSolver {
        AstarSolver {
            heuristic_factor: 1.0,
        }
    }

    /// Weighted A*. Factors above 1 trade optimality for fewer expansions.
    pub fn weighted(heuristic_factor: f64) -> AstarSolver {
        AstarSolver { heuristic_factor }
    }

    /// Just the distance estimate times the heuristic factor.
    pub fn heuristic(&self, p1: &Point, p2: &Point, allow_diagonal: bool) -> f64 {
        let h = if allow_diagonal {
            octile(p1, p2)
        } else {
            manhattan(p1, p2)
        };
        h * self.heuristic_factor
    }
}

impl Default for AstarSolver {
    fn default() -> AstarSolver {
        AstarSolver::new()
    }
}

pub fn manhattan(p1: &Point, p2: &Point) -> f64 {
    p1.manhattan_distance(p2) as f64
}

/// Cost of the cheapest unobstructed route on normal terrain: as many diagonal moves
/// as possible, then straight ones.
pub fn octile(p1: &Point, p2: &Point) -> f64 {
    let delta_x = (p1.x - p2.x).abs();
    let delta_y = (p1.y - p2.y).abs();
    (delta_x + delta_y) as f64 + (SQRT_2 - 2.0) * delta_x.min(delta_y) as f64
}

impl GridSolver for AstarSolver {
    fn name(&self) -> &'static str {
        "A* Pathfinding"
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
        info!(
            "A* search from {start} to {end} with heuristic factor {}",
            self.heuristic_factor
        );

        let mut ctx = SearchContext::new(start);
        ctx.push(0, self.heuristic(&start, &end, allow_diagonal), 0);
        let mut nodes_explored = 0;

        loop {
            if !cancel.is_running() {
                return SearchResult::stopped(nodes_explored, &timer);
            }
            let Some(index) = ctx.pop() else {
                break;
            };
            let current = ctx.point(index);
            // The end is not counted as explored.
            if current == end {
                let path = ctx.path_to(grid, index);
                mark_path(grid, observer, &path);
                return SearchResult::found(grid, path, nodes_explored, &timer);
            }
            ctx.close(index);
            visit(grid, observer, &current);
            nodes_explored += 1;
            explore(grid, observer, &current);

            let g = ctx.cost(index);
            for (neighbour, cost) in grid.neighbours(&current, allow_diagonal) {
                if let Some(neighbour_ix) = ctx.relax(index, neighbour, g + cost) {
                    let f = ctx.cost(neighbour_ix) + self.heuristic(&neighbour, &end, allow_diagonal);
                    ctx.push(neighbour_ix, f, neighbour_ix);
                }
            }
        }
        info!("A* search exhausted after {nodes_explored} nodes");
        SearchResult::failure(NO_PATH_MESSAGE, nodes_explored, elapsed_ms(&timer))
    }
}
