use crate::N_SMALLVEC_SIZE;
use core::fmt;
use grid_util::Point;
use log::debug;
use petgraph::unionfind::UnionFind;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f64::consts::SQRT_2;

/// Row/column offsets in neighbour order: up, down, left, right, then the diagonals
/// up-left, up-right, down-left, down-right. Strategies depend on this order for
/// deterministic tie-breaking.
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Converts a (row, col) coordinate into a [Point]. Columns map to `x`, rows to `y`.
pub fn point(row: usize, col: usize) -> Point {
    Point::new(col as i32, row as i32)
}

/// Inverse of [point]. Only meaningful for points with non-negative coordinates.
pub fn row_col(p: &Point) -> (usize, usize) {
    (p.y as usize, p.x as usize)
}

/// Base cost of a single move: 1 for orthogonal moves and sqrt(2) for diagonal ones.
pub fn move_cost(from: &Point, to: &Point) -> f64 {
    if from.x != to.x && from.y != to.y {
        SQRT_2
    } else {
        1.0
    }
}

/// Kinds of terrain. The cost multiplies the base cost of entering a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    #[default]
    Normal,
    Grass,
    Mud,
    Water,
    Sand,
}

impl Terrain {
    pub const ALL: [Terrain; 5] = [
        Terrain::Normal,
        Terrain::Grass,
        Terrain::Mud,
        Terrain::Water,
        Terrain::Sand,
    ];

    pub fn cost(self) -> f64 {
        match self {
            Terrain::Normal => 1.0,
            Terrain::Grass => 1.5,
            Terrain::Mud => 2.0,
            Terrain::Water => 3.0,
            Terrain::Sand => 1.8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Terrain::Normal => "normal",
            Terrain::Grass => "grass",
            Terrain::Mud => "mud",
            Terrain::Water => "water",
            Terrain::Sand => "sand",
        }
    }

    fn symbol(self) -> char {
        match self {
            Terrain::Normal => '.',
            Terrain::Grass => 'g',
            Terrain::Mud => 'm',
            Terrain::Water => 'w',
            Terrain::Sand => 's',
        }
    }
}

/// A paint operation applied through [Grid::set_cell].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Paint {
    Start,
    End,
    Obstacle,
    Erase,
    Terrain(Terrain),
}

/// Topology of a single cell. Obstacles are never start or end cells.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    obstacle: bool,
    start: bool,
    end: bool,
    terrain: Terrain,
}

impl Cell {
    pub fn is_obstacle(&self) -> bool {
        self.obstacle
    }
    pub fn is_start(&self) -> bool {
        self.start
    }
    pub fn is_end(&self) -> bool {
        self.end
    }
    pub fn terrain(&self) -> Terrain {
        self.terrain
    }
    pub fn terrain_cost(&self) -> f64 {
        self.terrain.cost()
    }
    /// True for cells that carry nothing worth persisting.
    pub fn is_default(&self) -> bool {
        !self.obstacle && !self.start && !self.end && self.terrain == Terrain::Normal
    }
    fn is_endpoint(&self) -> bool {
        self.start || self.end
    }
}

/// Presentation hints written by the strategies while they run. They never feed back
/// into any search decision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellMarks {
    pub visited: bool,
    pub exploring: bool,
    pub path: bool,
}

/// A fixed-size grid of [Cell]s with at most one start and one end cell.
/// Per-run search state (distances, parents) is kept out of the grid and owned by
/// the strategy that runs; the grid only carries the visualization [CellMarks].
#[derive(Clone, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    marks: Vec<CellMarks>,
    start: Option<Point>,
    end: Option<Point>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Grid {
        Grid {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
            marks: vec![CellMarks::default(); rows * cols],
            start: None,
            end: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    pub fn start(&self) -> Option<Point> {
        self.start
    }
    pub fn end(&self) -> Option<Point> {
        self.end
    }

    pub fn in_bounds(&self, p: &Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.y as usize) < self.rows && (p.x as usize) < self.cols
    }

    /// Row-major index of a point, which doubles as its scan order.
    pub fn index(&self, p: &Point) -> Option<usize> {
        if self.in_bounds(p) {
            Some(p.y as usize * self.cols + p.x as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cell_at(&point(row, col))
    }

    pub fn cell_at(&self, p: &Point) -> Option<&Cell> {
        self.index(p).map(|ix| &self.cells[ix])
    }

    pub fn marks_at(&self, p: &Point) -> Option<CellMarks> {
        self.index(p).map(|ix| self.marks[ix])
    }

    pub(crate) fn marks_mut(&mut self, p: &Point) -> Option<&mut CellMarks> {
        match self.index(p) {
            Some(ix) => Some(&mut self.marks[ix]),
            None => None,
        }
    }

    /// Whether a point is inside the grid and not an obstacle.
    pub fn is_open(&self, p: &Point) -> bool {
        self.cell_at(p).is_some_and(|c| !c.obstacle)
    }

    pub fn is_endpoint(&self, p: &Point) -> bool {
        self.cell_at(p).is_some_and(Cell::is_endpoint)
    }

    /// Terrain multiplier of a cell; points outside the grid count as normal terrain.
    pub fn terrain_cost(&self, p: &Point) -> f64 {
        self.cell_at(p).map_or(1.0, Cell::terrain_cost)
    }

    /// Iterates all cells in scan order together with their position.
    pub fn cells(&self) -> impl Iterator<Item = (Point, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(ix, cell)| (point(ix / self.cols, ix % self.cols), cell))
    }

    /// Open neighbours of `p` with the cost of entering them. Always yields the
    /// orthogonal directions first and the diagonals after them when `allow_diagonal`.
    pub fn neighbours(
        &self,
        p: &Point,
        allow_diagonal: bool,
    ) -> SmallVec<[(Point, f64); N_SMALLVEC_SIZE]> {
        let n_dirs = if allow_diagonal { 8 } else { 4 };
        DIRECTIONS[..n_dirs]
            .iter()
            .map(|&(d_row, d_col)| Point::new(p.x + d_col, p.y + d_row))
            .filter_map(|n| {
                self.cell_at(&n)
                    .filter(|c| !c.obstacle)
                    .map(|c| (n, move_cost(p, &n) * c.terrain_cost()))
            })
            .collect()
    }

    /// Applies a paint operation. Returns `false` (and changes nothing) if the
    /// coordinate is outside the grid.
    pub fn set_cell(&mut self, row: usize, col: usize, paint: Paint) -> bool {
        let p = point(row, col);
        let Some(ix) = self.index(&p) else {
            debug!("Ignoring {paint:?} outside the grid at ({row}, {col})");
            return false;
        };
        match paint {
            Paint::Start => {
                if let Some(old) = self.start.take() {
                    self.flag_cell(&old, |c| c.start = false);
                }
                if self.end == Some(p) {
                    self.end = None;
                }
                let cell = &mut self.cells[ix];
                cell.end = false;
                cell.start = true;
                cell.obstacle = false;
                self.start = Some(p);
            }
            Paint::End => {
                if let Some(old) = self.end.take() {
                    self.flag_cell(&old, |c| c.end = false);
                }
                if self.start == Some(p) {
                    self.start = None;
                }
                let cell = &mut self.cells[ix];
                cell.start = false;
                cell.end = true;
                cell.obstacle = false;
                self.end = Some(p);
            }
            Paint::Obstacle => {
                let cell = &mut self.cells[ix];
                if !cell.is_endpoint() {
                    cell.obstacle = true;
                }
            }
            Paint::Erase => {
                let cell = &mut self.cells[ix];
                if !cell.is_endpoint() {
                    cell.obstacle = false;
                    cell.terrain = Terrain::Normal;
                }
            }
            Paint::Terrain(terrain) => {
                let cell = &mut self.cells[ix];
                if !cell.is_endpoint() && !cell.obstacle {
                    cell.terrain = terrain;
                }
            }
        }
        true
    }

    fn flag_cell<F: FnOnce(&mut Cell)>(&mut self, p: &Point, f: F) {
        if let Some(ix) = self.index(p) {
            f(&mut self.cells[ix]);
        }
    }

    /// Clears the visualization marks. Obstacles, terrain, start and end are kept.
    pub fn reset(&mut self) {
        self.marks.fill(CellMarks::default());
    }

    /// Reinitializes every cell and drops the start and end designation.
    pub fn clear(&mut self) {
        *self = Grid::new(self.rows, self.cols);
    }

    /// Independent copy of the layout (obstacles, terrain, start, end) with fresh marks.
    /// Every strategy run gets its own snapshot.
    pub fn snapshot(&self) -> Grid {
        let mut grid = self.clone();
        grid.reset();
        grid
    }

    /// Turns every cell other than start and end into an obstacle with probability `density`.
    pub fn add_random_obstacles<R: Rng>(&mut self, density: f64, rng: &mut R) {
        let density = density.clamp(0.0, 1.0);
        for cell in self.cells.iter_mut().filter(|c| !c.is_endpoint()) {
            if rng.gen_bool(density) {
                cell.obstacle = true;
            }
        }
    }

    /// Clears the marks of every cell that is neither an endpoint nor an obstacle.
    pub(crate) fn clear_open_marks(&mut self) {
        for (cell, marks) in self.cells.iter().zip(self.marks.iter_mut()) {
            if !cell.is_endpoint() && !cell.obstacle {
                *marks = CellMarks::default();
            }
        }
    }

    /// Generates a [UnionFind] structure linking up open cells that are neighbours under
    /// the given movement mode.
    pub fn components(&self, allow_diagonal: bool) -> UnionFind<usize> {
        let mut components = UnionFind::new(self.rows * self.cols);
        // Linking forward neighbours (down, right and the two lower diagonals) covers every edge.
        let forward: &[(i32, i32)] = if allow_diagonal {
            &[(1, 0), (0, 1), (1, -1), (1, 1)]
        } else {
            &[(1, 0), (0, 1)]
        };
        for (p, cell) in self.cells() {
            if cell.obstacle {
                continue;
            }
            let Some(p_ix) = self.index(&p) else { continue };
            for &(d_row, d_col) in forward {
                let n = Point::new(p.x + d_col, p.y + d_row);
                if self.is_open(&n) {
                    if let Some(n_ix) = self.index(&n) {
                        components.union(p_ix, n_ix);
                    }
                }
            }
        }
        components
    }

    /// Checks if `a` and `b` are on the same connected component.
    pub fn reachable(&self, a: &Point, b: &Point, allow_diagonal: bool) -> bool {
        match (self.index(a), self.index(b)) {
            (Some(a_ix), Some(b_ix)) if self.is_open(a) && self.is_open(b) => {
                self.components(allow_diagonal).equiv(a_ix, b_ix)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..self.rows {
            let line = (0..self.cols)
                .map(|col| {
                    let ix = row * self.cols + col;
                    let cell = &self.cells[ix];
                    if cell.start {
                        'S'
                    } else if cell.end {
                        'E'
                    } else if cell.obstacle {
                        '#'
                    } else if self.marks[ix].path {
                        '*'
                    } else {
                        cell.terrain.symbol()
                    }
                })
                .collect::<String>();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
