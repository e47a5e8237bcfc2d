use terrain_pathfinding::{AstarSolver, Grid, GridSolver, Paint};

// In this example a path is found on a 3x3 grid with shape
//  ___
// |S  |
// | # |
// |  E|
//  ___
// where
// - # marks an obstacle
// - S marks the start
// - E marks the end
//
// Nodes have a 4-neighborhood

fn main() {
    let mut grid = Grid::new(3, 3);
    grid.set_cell(0, 0, Paint::Start);
    grid.set_cell(2, 2, Paint::End);
    grid.set_cell(1, 1, Paint::Obstacle);
    println!("{}", grid);
    let result = AstarSolver::new().run(&mut grid, false);
    println!("{}: cost {:?}", result.message, result.path_cost);
    println!("Path:");
    for p in result.path.unwrap() {
        println!("{:?}", p);
    }
    println!("{}", grid);
}
