use grid_util::Point;
use log::info;
use std::time::Instant;

use crate::grid::Grid;
use crate::observer::{explore, mark_path, visit, CancelToken, SearchObserver};
use crate::search_context::SearchContext;
use crate::solver::{elapsed_ms, endpoints, GridSolver, SearchResult, NO_PATH_MESSAGE};

/// Uniform-cost search over the terrain-weighted grid. Among cells with equal distance
/// the one first in row-major scan order is expanded first.
#[derive(Clone, Debug, Default)]
pub struct DijkstraSolver;

/// Row-major index of `p`, the tie-break key among equal distances.
fn scan_order(grid: &Grid, p: &Point) -> usize {
    grid.index(p).unwrap_or(usize::MAX)
}

impl GridSolver for DijkstraSolver {
    fn name(&self) -> &'static str {
        "Dijkstra's Algorithm"
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
        info!("Dijkstra search from {start} to {end}");

        let mut ctx = SearchContext::new(start);
        ctx.push(0, 0.0, scan_order(grid, &start));
        let mut nodes_explored = 0;

        loop {
            if !cancel.is_running() {
                return SearchResult::stopped(nodes_explored, &timer);
            }
            // Only reachable cells ever enter the frontier, so running dry is the same
            // as the cheapest unvisited cell being at infinite distance.
            let Some(index) = ctx.pop() else {
                break;
            };
            let current = ctx.point(index);
            ctx.close(index);
            visit(grid, observer, &current);
            nodes_explored += 1;
            explore(grid, observer, &current);

            if current == end {
                let path = ctx.path_to(grid, index);
                mark_path(grid, observer, &path);
                return SearchResult::found(grid, path, nodes_explored, &timer);
            }

            let distance = ctx.cost(index);
            for (neighbour, cost) in grid.neighbours(&current, allow_diagonal) {
                if let Some(neighbour_ix) = ctx.relax(index, neighbour, distance + cost) {
                    let new_distance = ctx.cost(neighbour_ix);
                    ctx.push(neighbour_ix, new_distance, scan_order(grid, &neighbour));
                }
            }
        }
        info!("Dijkstra search exhausted after {nodes_explored} nodes");
        SearchResult::failure(NO_PATH_MESSAGE, nodes_explored, elapsed_ms(&timer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{point, Paint, Terrain};
    use crate::path::path_cost;

    #[test]
    fn equal_distances_follow_scan_order() {
        // S . .
        // . E .
        // . . .
        let mut grid = Grid::new(3, 3);
        grid.set_cell(0, 0, Paint::Start);
        grid.set_cell(1, 1, Paint::End);
        let result = DijkstraSolver.run(&mut grid, false);
        // (0, 1) comes before (1, 0) in scan order, so the end is reached through it.
        assert_eq!(result.path, Some(vec![point(0, 0), point(0, 1), point(1, 1)]));
        assert_eq!(result.nodes_explored, 5);
    }

    #[test]
    fn avoids_expensive_terrain() {
        // S w E
        // . . .
        let mut grid = Grid::new(2, 3);
        grid.set_cell(0, 0, Paint::Start);
        grid.set_cell(0, 2, Paint::End);
        grid.set_cell(0, 1, Paint::Terrain(Terrain::Water));
        let result = DijkstraSolver.run(&mut grid, false);
        assert!(result.success);
        // Going through the water costs 3 + 1, around it 1 + 1 + 1 + 1.
        assert_eq!(result.path_cost, Some(4.0));
        let mut grid = grid.snapshot();
        grid.set_cell(0, 1, Paint::Terrain(Terrain::Mud));
        let result = DijkstraSolver.run(&mut grid, false);
        assert_eq!(result.path_cost, Some(3.0));
        assert_eq!(result.path_length, 2);
    }

    #[test]
    fn single_obstacle_detour_cost() {
        // . . S . .
        // . . # . .
        // . . E . .
        let mut grid = Grid::new(3, 5);
        grid.set_cell(0, 2, Paint::Start);
        grid.set_cell(2, 2, Paint::End);
        grid.set_cell(1, 2, Paint::Obstacle);
        let result = DijkstraSolver.run(&mut grid.snapshot(), false);
        // Around the obstacle: left, down, down, right.
        assert_eq!(result.path_cost, Some(4.0));
        let result = DijkstraSolver.run(&mut grid.snapshot(), true);
        // Two diagonal moves around it.
        let expected = 2.0 * std::f64::consts::SQRT_2;
        assert!((result.path_cost.unwrap() - expected).abs() < 1e-12);

        grid.set_cell(1, 1, Paint::Terrain(Terrain::Grass));
        grid.set_cell(1, 3, Paint::Terrain(Terrain::Sand));
        let result = DijkstraSolver.run(&mut grid.snapshot(), true);
        // Diagonal onto grass (1.5 sqrt 2) then diagonal onto the normal end.
        let expected = 2.5 * std::f64::consts::SQRT_2;
        assert!((result.path_cost.unwrap() - expected).abs() < 1e-12);
        assert_eq!(result.path.as_ref().unwrap()[1], point(1, 1));
    }

    #[test]
    fn reported_cost_matches_path() {
        let mut grid = Grid::new(4, 4);
        grid.set_cell(0, 0, Paint::Start);
        grid.set_cell(3, 3, Paint::End);
        grid.set_cell(1, 1, Paint::Terrain(Terrain::Water));
        grid.set_cell(2, 2, Paint::Terrain(Terrain::Sand));
        grid.set_cell(1, 2, Paint::Obstacle);
        let base = grid.snapshot();
        let result = DijkstraSolver.run(&mut grid, true);
        let path = result.path.unwrap();
        assert_eq!(result.path_cost, Some(path_cost(&base, &path)));
    }

    #[test]
    fn unreachable_end_explores_component() {
        // S . #
        // . . #
        // # # E
        let mut grid = Grid::new(3, 3);
        grid.set_cell(0, 0, Paint::Start);
        grid.set_cell(2, 2, Paint::End);
        for (row, col) in [(0, 2), (1, 2), (2, 0), (2, 1)] {
            grid.set_cell(row, col, Paint::Obstacle);
        }
        let result = DijkstraSolver.run(&mut grid.snapshot(), false);
        assert!(!result.success);
        assert_eq!(result.message, NO_PATH_MESSAGE);
        assert_eq!(result.nodes_explored, 4);
        // (1, 1) touches the end diagonally.
        assert!(DijkstraSolver.run(&mut grid, true).success);
    }
}
