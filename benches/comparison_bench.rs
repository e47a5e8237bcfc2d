use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;
use terrain_pathfinding::{
    AstarSolver, BfsSolver, DijkstraSolver, GeneticConfig, GeneticSolver, Grid, GridSolver,
    Paint, Terrain,
};

const N: usize = 64;
const N_GRIDS: u64 = 8;

/// Seeded random grids with obstacles and a band of each terrain type, start and end in
/// opposite corners.
fn bench_grids() -> Vec<Grid> {
    (0..N_GRIDS)
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut grid = Grid::new(N, N);
            for (i, terrain) in Terrain::ALL.iter().enumerate() {
                for col in 0..N {
                    grid.set_cell(8 + 10 * i, col, Paint::Terrain(*terrain));
                }
            }
            grid.set_cell(0, 0, Paint::Start);
            grid.set_cell(N - 1, N - 1, Paint::End);
            grid.add_random_obstacles(0.2, &mut rng);
            grid
        })
        .collect()
}

fn bench_solver<S: GridSolver>(c: &mut Criterion, solver_name: &str, solver: S) {
    let grids = bench_grids();
    for allow_diagonal in [false, true] {
        let diag_str = if allow_diagonal { "8-grid" } else { "4-grid" };
        c.bench_function(format!("random {N}x{N}, {solver_name} {diag_str}").as_str(), |b| {
            b.iter(|| {
                for grid in &grids {
                    let mut run_grid = grid.snapshot();
                    black_box(solver.run(&mut run_grid, allow_diagonal));
                }
            })
        });
    }
}

fn bench_bfs(c: &mut Criterion) {
    bench_solver(c, "BFS", BfsSolver);
}

fn bench_dijkstra(c: &mut Criterion) {
    bench_solver(c, "Dijkstra", DijkstraSolver);
}

fn bench_astar(c: &mut Criterion) {
    bench_solver(c, "Astar", AstarSolver::new());
    bench_solver(c, "Weighted Astar (1.3)", AstarSolver::weighted(1.3));
}

fn bench_genetic(c: &mut Criterion) {
    let solver = GeneticSolver::new(GeneticConfig {
        generations: 20,
        seed: Some(0),
        ..GeneticConfig::default()
    });
    bench_solver(c, "Genetic", solver);
}

criterion_group!(benches, bench_bfs, bench_dijkstra, bench_astar, bench_genetic);
criterion_main!(benches);
