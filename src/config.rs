//! Persisted grid layouts and run configuration.
//!
//! A grid is saved as a sparse list of its non-default cells:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "timestamp": "2024-05-01T12:00:00Z",
//!   "gridSize": { "rows": 20, "cols": 30 },
//!   "start": { "row": 2, "col": 3 },
//!   "end": null,
//!   "cells": [
//!     { "row": 2, "col": 3, "isObstacle": false, "isStart": true, "isEnd": false,
//!       "terrainType": "normal", "terrainCost": 1.0 }
//!   ]
//! }
//! ```
use crate::error::{Error, Result};
use crate::grid::{row_col, Grid, Paint, Terrain};
use crate::solver::astar::AstarSolver;
use crate::solver::bfs::BfsSolver;
use crate::solver::dijkstra::DijkstraSolver;
use crate::solver::genetic::{GeneticConfig, GeneticSolver};
use crate::solver::{Algorithm, AlgorithmKind};
use chrono::{DateTime, Utc};
use grid_util::Point;
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const FORMAT_VERSION: &str = "1.0";

/// Largest number of cells a persisted grid may declare.
pub const MAX_CELLS: usize = 1 << 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl From<Point> for Coord {
    fn from(p: Point) -> Coord {
        let (row, col) = row_col(&p);
        Coord { row, col }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRecord {
    pub row: usize,
    pub col: usize,
    #[serde(default)]
    pub is_obstacle: bool,
    #[serde(default)]
    pub is_start: bool,
    #[serde(default)]
    pub is_end: bool,
    #[serde(default)]
    pub terrain_type: Terrain,
    /// Written for readers of the file; loading derives the cost from the terrain type.
    #[serde(default = "default_terrain_cost")]
    pub terrain_cost: f64,
}

fn default_terrain_cost() -> f64 {
    1.0
}

/// Serialized grid layout. `grid_size` is optional only so a missing size surfaces as
/// [Error::InvalidConfig] instead of a parse error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub grid_size: Option<GridSize>,
    #[serde(default)]
    pub start: Option<Coord>,
    #[serde(default)]
    pub end: Option<Coord>,
    #[serde(default)]
    pub cells: Vec<CellRecord>,
}

impl GridConfig {
    /// Checks the record and builds the grid it describes.
    fn build(&self) -> Result<Grid> {
        let size = self
            .grid_size
            .ok_or_else(|| Error::invalid_config("missing gridSize"))?;
        if size.rows == 0 || size.cols == 0 {
            return Err(Error::invalid_config(format!(
                "grid size must be positive, got {}x{}",
                size.rows, size.cols
            )));
        }
        if size.rows.checked_mul(size.cols).map_or(true, |n| n > MAX_CELLS) {
            return Err(Error::invalid_config(format!(
                "grid size {}x{} exceeds {MAX_CELLS} cells",
                size.rows, size.cols
            )));
        }
        let check_bounds = |row: usize, col: usize| {
            if row < size.rows && col < size.cols {
                Ok(())
            } else {
                Err(Error::OutOfBounds {
                    row,
                    col,
                    rows: size.rows,
                    cols: size.cols,
                })
            }
        };
        for coord in self.start.iter().chain(self.end.iter()) {
            check_bounds(coord.row, coord.col)?;
        }
        if self.start.is_some() && self.start == self.end {
            return Err(Error::invalid_config("start and end share a cell"));
        }
        for record in &self.cells {
            check_bounds(record.row, record.col)?;
            let coord = Some(Coord {
                row: record.row,
                col: record.col,
            });
            if record.is_obstacle && (coord == self.start || coord == self.end) {
                return Err(Error::invalid_config(format!(
                    "obstacle on endpoint ({}, {})",
                    record.row, record.col
                )));
            }
        }

        let mut grid = Grid::new(size.rows, size.cols);
        for record in &self.cells {
            if record.terrain_type != Terrain::Normal {
                grid.set_cell(record.row, record.col, Paint::Terrain(record.terrain_type));
            }
        }
        if let Some(start) = self.start {
            grid.set_cell(start.row, start.col, Paint::Start);
        }
        if let Some(end) = self.end {
            grid.set_cell(end.row, end.col, Paint::End);
        }
        for record in self.cells.iter().filter(|r| r.is_obstacle) {
            grid.set_cell(record.row, record.col, Paint::Obstacle);
        }
        Ok(grid)
    }
}

impl Grid {
    /// Sparse record of the layout, holding only the cells that differ from the default.
    pub fn to_config(&self) -> GridConfig {
        let cells = self
            .cells()
            .filter(|(_, cell)| !cell.is_default())
            .map(|(p, cell)| {
                let Coord { row, col } = Coord::from(p);
                CellRecord {
                    row,
                    col,
                    is_obstacle: cell.is_obstacle(),
                    is_start: cell.is_start(),
                    is_end: cell.is_end(),
                    terrain_type: cell.terrain(),
                    terrain_cost: cell.terrain_cost(),
                }
            })
            .collect();
        GridConfig {
            version: Some(FORMAT_VERSION.to_owned()),
            timestamp: Some(Utc::now()),
            grid_size: Some(GridSize {
                rows: self.rows(),
                cols: self.cols(),
            }),
            start: self.start().map(Coord::from),
            end: self.end().map(Coord::from),
            cells,
        }
    }

    /// Replaces the layout with `config`. The record is fully validated first, so on
    /// error the grid is unchanged. A different size reinitializes the grid to it.
    pub fn load_config(&mut self, config: &GridConfig) -> Result<()> {
        let grid = config.build()?;
        if grid.rows() != self.rows() || grid.cols() != self.cols() {
            warn!(
                "Grid size mismatch, reinitializing {}x{} grid as {}x{}",
                self.rows(),
                self.cols(),
                grid.rows(),
                grid.cols()
            );
        }
        info!(
            "Loaded grid configuration with {} non-default cells",
            config.cells.len()
        );
        *self = grid;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_config())?)
    }

    pub fn from_json(json: &str) -> Result<Grid> {
        let config: GridConfig = serde_json::from_str(json)?;
        config.build()
    }
}

fn default_algorithms() -> Vec<AlgorithmKind> {
    AlgorithmKind::ALL.to_vec()
}

fn default_heuristic_factor() -> f64 {
    1.0
}

/// Which strategies a simulation runs and how.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    #[serde(default)]
    pub allow_diagonal: bool,
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<AlgorithmKind>,
    #[serde(default = "default_heuristic_factor")]
    pub astar_heuristic_factor: f64,
    #[serde(default)]
    pub genetic: GeneticConfig,
}

impl Default for SimulationConfig {
    fn default() -> SimulationConfig {
        SimulationConfig {
            allow_diagonal: false,
            algorithms: default_algorithms(),
            astar_heuristic_factor: default_heuristic_factor(),
            genetic: GeneticConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<SimulationConfig> {
        Ok(serde_json::from_str(json)?)
    }

    /// The selected strategies in the configured order, each set up with its parameters.
    pub fn build_algorithms(&self) -> Vec<Algorithm> {
        self.algorithms
            .iter()
            .map(|kind| match kind {
                AlgorithmKind::Bfs => Algorithm::Bfs(BfsSolver),
                AlgorithmKind::Dijkstra => Algorithm::Dijkstra(DijkstraSolver),
                AlgorithmKind::Astar => {
                    Algorithm::AStar(AstarSolver::weighted(self.astar_heuristic_factor))
                }
                AlgorithmKind::Genetic => {
                    Algorithm::Genetic(GeneticSolver::new(self.genetic.clone()))
                }
            })
            .collect()
    }
}
