use terrain_pathfinding::{
    AstarSolver, BfsSolver, DijkstraSolver, Grid, GridSolver, Paint, Terrain,
};

// A river of water with a single sandy ford splits the grid. BFS wades straight
// through the water since it only counts moves, while Dijkstra and A* walk to the
// ford because water costs three times as much to enter.
//
// The heuristic_factor of A* can be raised to scale the heuristic, which makes nodes
// closer to the end (ignoring terrain) get expanded sooner. This is Weighted A*; it
// explores fewer nodes but may return a more expensive path.

fn main() {
    const N: usize = 12;
    let mut grid = Grid::new(N, N);
    for row in 0..N {
        grid.set_cell(row, 5, Paint::Terrain(Terrain::Water));
        grid.set_cell(row, 6, Paint::Terrain(Terrain::Water));
    }
    grid.set_cell(N - 2, 5, Paint::Terrain(Terrain::Sand));
    grid.set_cell(N - 2, 6, Paint::Terrain(Terrain::Sand));
    for col in 1..4 {
        grid.set_cell(4, col, Paint::Terrain(Terrain::Mud));
        grid.set_cell(7, N - 1 - col, Paint::Terrain(Terrain::Grass));
    }
    grid.set_cell(2, 1, Paint::Start);
    grid.set_cell(2, N - 2, Paint::End);
    println!("{}", grid);

    for allow_diagonal in [false, true] {
        let mode = if allow_diagonal { "8-grid" } else { "4-grid" };
        let solvers: [(&str, Box<dyn GridSolver>); 4] = [
            ("BFS", Box::new(BfsSolver)),
            ("Dijkstra", Box::new(DijkstraSolver)),
            ("A*", Box::new(AstarSolver::new())),
            ("Weighted A* (1.5)", Box::new(AstarSolver::weighted(1.5))),
        ];
        for (label, solver) in solvers {
            let mut run_grid = grid.snapshot();
            let result = solver.run(&mut run_grid, allow_diagonal);
            println!(
                "{mode} {label}: {} moves, cost {:.2}, {} nodes explored",
                result.path_length,
                result.path_cost.unwrap_or(f64::NAN),
                result.nodes_explored
            );
        }
    }
}
