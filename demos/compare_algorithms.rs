use rand::{rngs::StdRng, SeedableRng};
use std::io;
use terrain_pathfinding::export::write_csv;
use terrain_pathfinding::{
    CancelToken, GeneticConfig, Grid, Paint, Simulation, SimulationConfig,
};

// Runs all four strategies on a seeded random 20x20 grid a number of times and prints
// the aggregated statistics per algorithm, followed by the results of the last run
// as CSV.

fn main() {
    const N: usize = 20;
    const RUNS: u64 = 5;
    let config = SimulationConfig {
        allow_diagonal: true,
        genetic: GeneticConfig {
            seed: Some(0),
            ..GeneticConfig::default()
        },
        ..SimulationConfig::default()
    };

    let mut last = None;
    let mut simulation = Simulation::new(Grid::new(N, N));
    for seed in 0..RUNS {
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = simulation.grid_mut();
        grid.clear();
        grid.set_cell(0, 0, Paint::Start);
        grid.set_cell(N - 1, N - 1, Paint::End);
        grid.add_random_obstacles(0.25, &mut rng);
        let report = simulation
            .run(&config, &CancelToken::new(), &mut ())
            .unwrap();
        if let Some(best) = report.best() {
            println!("Run {seed}: best was {}", best.algorithm);
        } else {
            println!("Run {seed}: no path");
        }
        last = Some(report);
    }
    println!("{}", simulation.grid());

    let history = simulation.history();
    for (algorithm, stats) in history.lock().unwrap().all_statistics() {
        println!("{algorithm}: {:.0}% success over {} runs", stats.success_rate, stats.run_count);
        if let Some(cost) = stats.path_cost {
            println!(
                "  path cost {:.2} avg, {:.2} min, {:.2} max, {:.2} std dev",
                cost.mean, cost.min, cost.max, cost.std_dev
            );
        }
        if let Some(nodes) = stats.nodes_explored {
            println!("  nodes explored {:.1} avg", nodes.mean);
        }
    }

    if let Some(report) = last {
        write_csv(&report.metrics, io::stdout()).unwrap();
    }
}
