//! Path reconstruction, cost accounting and smoothing.
use crate::grid::{move_cost, Grid};
use grid_util::Point;
use itertools::Itertools;

/// Walks parent links back from `end` and returns the path in start to end order.
/// Returns [None] if the chain does not terminate on the grid's start cell, which
/// only happens if a strategy recorded its parents incorrectly.
pub fn reconstruct_path<F>(grid: &Grid, end: Point, mut parent: F) -> Option<Vec<Point>>
where
    F: FnMut(&Point) -> Option<Point>,
{
    let limit = grid.rows() * grid.cols();
    // A chain longer than the number of cells must contain a cycle.
    let mut path: Vec<Point> = std::iter::successors(Some(end), |p| parent(p))
        .take(limit + 1)
        .collect();
    path.reverse();
    match path.first() {
        Some(first) if path.len() <= limit && grid.start() == Some(*first) => Some(path),
        _ => None,
    }
}

/// Cost of a single step: the base move cost times the terrain cost of the destination.
pub fn step_cost(grid: &Grid, from: &Point, to: &Point) -> f64 {
    move_cost(from, to) * grid.terrain_cost(to)
}

/// Sums the step costs of consecutive pairs. Steps that change both row and column
/// count as diagonal. Empty and single-cell paths cost 0.
pub fn path_cost(grid: &Grid, path: &[Point]) -> f64 {
    path.iter()
        .tuple_windows()
        .map(|(a, b)| step_cost(grid, a, b))
        .sum()
}

/// Whether every consecutive pair is a legal move onto an open cell under the given
/// movement mode.
pub fn is_contiguous(grid: &Grid, path: &[Point], allow_diagonal: bool) -> bool {
    path.first().map_or(true, |p| grid.is_open(p))
        && path.iter().tuple_windows().all(|(a, b)| {
            let dx = (a.x - b.x).abs();
            let dy = (a.y - b.y).abs();
            let adjacent = dx <= 1 && dy <= 1 && dx + dy > 0;
            adjacent && (allow_diagonal || dx + dy == 1) && grid.is_open(b)
        })
}

/// Whether any cell occurs more than once.
pub fn has_revisits(path: &[Point]) -> bool {
    !path.iter().all_unique()
}

/// Cells on the Bresenham line from `from` to `to`, both included. Consecutive cells
/// are neighbours, diagonally where the line steps in both directions.
pub fn line_cells(from: &Point, to: &Point) -> Vec<Point> {
    let (mut x0, mut y0) = (from.x, from.y);
    let (x1, y1) = (to.x, to.y);

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut cells = Vec::with_capacity((dx.max(dy) + 1) as usize);
    loop {
        cells.push(Point::new(x0, y0));
        if x0 == x1 && y0 == y1 {
            return cells;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Checks whether the Bresenham line between two cells stays clear of obstacles.
pub fn line_of_sight(grid: &Grid, from: &Point, to: &Point) -> bool {
    line_cells(from, to).iter().all(|p| grid.is_open(p))
}

/// Cost of walking the straight line between two waypoints cell by cell. Equal to
/// [step_cost] for neighbouring cells.
pub fn segment_cost(grid: &Grid, from: &Point, to: &Point) -> f64 {
    path_cost(grid, &line_cells(from, to))
}

/// Cost of a path whose consecutive waypoints are joined by straight lines, such as
/// the output of [smooth_path].
pub fn waypoint_cost(grid: &Grid, waypoints: &[Point]) -> f64 {
    waypoints
        .iter()
        .tuple_windows()
        .map(|(a, b)| segment_cost(grid, a, b))
        .sum()
}

/// Removes waypoints by jumping from each waypoint to the furthest later one that is in
/// line of sight, as long as the jump costs no more than the stretch of path it replaces.
/// The result is only used for reporting. For a contiguous `path` its [waypoint_cost]
/// never exceeds the [path_cost] of `path`.
pub fn smooth_path(grid: &Grid, path: &[Point]) -> Vec<Point> {
    if path.len() <= 2 {
        return path.to_vec();
    }
    let mut smoothed = vec![path[0]];
    let mut i = 0;
    while i < path.len() - 1 {
        let mut furthest = i + 1;
        for j in (i + 2)..path.len() {
            if line_of_sight(grid, &path[i], &path[j])
                && segment_cost(grid, &path[i], &path[j]) <= path_cost(grid, &path[i..=j])
            {
                furthest = j;
            }
        }
        smoothed.push(path[furthest]);
        i = furthest;
    }
    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{point, Paint, Terrain};
    use std::collections::HashMap;
    use std::f64::consts::SQRT_2;

    fn straight_grid() -> Grid {
        let mut grid = Grid::new(3, 5);
        grid.set_cell(0, 0, Paint::Start);
        grid.set_cell(0, 4, Paint::End);
        grid
    }

    #[test]
    fn reconstruct_follows_parents() {
        let grid = straight_grid();
        let parents: HashMap<Point, Point> = (1..5)
            .map(|col| (point(0, col), point(0, col - 1)))
            .collect();
        let path = reconstruct_path(&grid, point(0, 4), |p| parents.get(p).copied()).unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], point(0, 0));
        assert_eq!(path[4], point(0, 4));
    }

    #[test]
    fn reconstruct_rejects_chain_missing_start() {
        let grid = straight_grid();
        let parents: HashMap<Point, Point> = (2..5)
            .map(|col| (point(0, col), point(0, col - 1)))
            .collect();
        assert!(reconstruct_path(&grid, point(0, 4), |p| parents.get(p).copied()).is_none());

        let cyclic: HashMap<Point, Point> =
            [(point(0, 4), point(0, 3)), (point(0, 3), point(0, 4))].into();
        assert!(reconstruct_path(&grid, point(0, 4), |p| cyclic.get(p).copied()).is_none());
    }

    #[test]
    fn cost_uses_destination_terrain() {
        let mut grid = straight_grid();
        grid.set_cell(1, 1, Paint::Terrain(Terrain::Mud));
        let path = [point(0, 0), point(1, 1), point(1, 2)];
        let expected = SQRT_2 * 2.0 + 1.0;
        assert!((path_cost(&grid, &path) - expected).abs() < 1e-12);
        assert_eq!(path_cost(&grid, &path[..1]), 0.0);
        assert_eq!(path_cost(&grid, &[]), 0.0);
    }

    #[test]
    fn contiguity_depends_on_mode() {
        let mut grid = straight_grid();
        let diagonal = [point(0, 0), point(1, 1), point(2, 2)];
        assert!(is_contiguous(&grid, &diagonal, true));
        assert!(!is_contiguous(&grid, &diagonal, false));
        let jump = [point(0, 0), point(0, 2)];
        assert!(!is_contiguous(&grid, &jump, true));
        grid.set_cell(1, 1, Paint::Obstacle);
        assert!(!is_contiguous(&grid, &diagonal, true));
    }

    #[test]
    fn revisits_detected() {
        assert!(!has_revisits(&[point(0, 0), point(0, 1)]));
        assert!(has_revisits(&[point(0, 0), point(0, 1), point(0, 0)]));
    }

    #[test]
    fn line_of_sight_blocked_by_obstacle() {
        let mut grid = straight_grid();
        assert!(line_of_sight(&grid, &point(0, 0), &point(2, 4)));
        grid.set_cell(1, 2, Paint::Obstacle);
        assert!(!line_of_sight(&grid, &point(0, 0), &point(2, 4)));
        assert!(line_of_sight(&grid, &point(0, 0), &point(0, 4)));
    }

    #[test]
    fn smoothing_drops_redundant_waypoints() {
        let grid = straight_grid();
        let path: Vec<Point> = (0..5).map(|col| point(0, col)).collect();
        let smoothed = smooth_path(&grid, &path);
        assert_eq!(smoothed, vec![point(0, 0), point(0, 4)]);
        assert_eq!(waypoint_cost(&grid, &smoothed), path_cost(&grid, &path));
    }

    #[test]
    fn smoothing_never_increases_cost() {
        // A 4-connected staircase onto water would get more expensive if the
        // corner were cut diagonally, so that shortcut is refused.
        let mut grid = straight_grid();
        grid.set_cell(1, 1, Paint::Terrain(Terrain::Water));
        let path = [point(0, 0), point(0, 1), point(1, 1)];
        let smoothed = smooth_path(&grid, &path);
        assert_eq!(smoothed, path.to_vec());
        assert!(waypoint_cost(&grid, &smoothed) <= path_cost(&grid, &path));
    }

    #[test]
    fn smoothing_cuts_staircases() {
        // S . . . .
        // . . . . .
        // . . . . E
        let grid = straight_grid();
        let path = [
            point(0, 0),
            point(1, 0),
            point(1, 1),
            point(2, 1),
            point(2, 2),
            point(2, 3),
            point(2, 4),
        ];
        let smoothed = smooth_path(&grid, &path);
        assert_eq!(smoothed.first(), Some(&point(0, 0)));
        assert_eq!(smoothed.last(), Some(&point(2, 4)));
        assert!(smoothed.len() < path.len());
        assert!(waypoint_cost(&grid, &smoothed) < path_cost(&grid, &path));
    }

    #[test]
    fn line_cells_are_neighbours() {
        let cells = line_cells(&point(0, 0), &point(2, 4));
        assert_eq!(cells.len(), 5);
        assert_eq!(cells.first(), Some(&point(0, 0)));
        assert_eq!(cells.last(), Some(&point(2, 4)));
        let grid = straight_grid();
        assert!(is_contiguous(&grid, &cells, true));
        assert_eq!(segment_cost(&grid, &point(0, 0), &point(0, 1)), 1.0);
    }
}
