//! Evolutionary search over random walks. Individuals are walks from the start that
//! may run through walls or miss the end; fitness rewards reaching the end and
//! punishes distance, length and obstacle cells, so the best individual converges on
//! a short valid path without any guarantee of optimality.
use grid_util::Point;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Instant;

use crate::grid::Grid;
use crate::observer::{mark_path, show_candidate, CancelToken, SearchObserver};
use crate::solver::{elapsed_ms, endpoints, GridSolver, SearchResult, NO_VALID_PATH_MESSAGE};
use crate::N_SMALLVEC_SIZE;

/// The best individual is drawn onto the grid every this many generations.
const VISUALIZE_EVERY: usize = 10;

fn default_population_size() -> usize {
    50
}

fn default_generations() -> usize {
    100
}

fn default_mutation_rate() -> f64 {
    0.1
}

fn default_elite_count() -> usize {
    5
}

fn default_tournament_size() -> usize {
    5
}

fn default_max_path_length() -> usize {
    100
}

fn default_greedy_bias() -> f64 {
    0.7
}

fn default_greedy_candidates() -> usize {
    3
}

fn default_allow_revisits() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneticConfig {
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Probability that a child is mutated.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Number of top individuals copied unchanged into the next generation.
    #[serde(default = "default_elite_count")]
    pub elite_count: usize,
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    /// Maximum number of steps of a random walk.
    #[serde(default = "default_max_path_length")]
    pub max_path_length: usize,
    /// Probability that a walk step picks among the neighbours closest to the end.
    #[serde(default = "default_greedy_bias")]
    pub greedy_bias: f64,
    /// How many of the closest neighbours a greedy step chooses from.
    #[serde(default = "default_greedy_candidates")]
    pub greedy_candidates: usize,
    /// Whether a random walk may step onto a cell it already passed through.
    #[serde(default = "default_allow_revisits")]
    pub allow_revisits: bool,
    /// Seed for reproducible runs; entropy is used when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> GeneticConfig {
        GeneticConfig {
            population_size: default_population_size(),
            generations: default_generations(),
            mutation_rate: default_mutation_rate(),
            elite_count: default_elite_count(),
            tournament_size: default_tournament_size(),
            max_path_length: default_max_path_length(),
            greedy_bias: default_greedy_bias(),
            greedy_candidates: default_greedy_candidates(),
            allow_revisits: default_allow_revisits(),
            seed: None,
        }
    }
}

/// A candidate path with its fitness under the current grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Individual {
    pub path: Vec<Point>,
    pub fitness: i64,
}

impl Individual {
    fn new(path: Vec<Point>) -> Individual {
        Individual { path, fitness: 0 }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GeneticSolver {
    pub config: GeneticConfig,
}

impl GeneticSolver {
    pub fn new(config: GeneticConfig) -> GeneticSolver {
        GeneticSolver { config }
    }

    /// Solver with default parameters and a fixed seed.
    pub fn seeded(seed: u64) -> GeneticSolver {
        GeneticSolver::new(GeneticConfig {
            seed: Some(seed),
            ..GeneticConfig::default()
        })
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Scores a path: 1000 base, plus 5000 when it ends on `end`, minus 10 per unit of
/// Manhattan distance between its last cell and `end`, minus 2 per cell and minus
/// 1000 per obstacle cell. Never negative.
pub fn fitness(grid: &Grid, path: &[Point], end: &Point) -> i64 {
    let Some(last) = path.last() else {
        return 0;
    };
    let obstacles = path
        .iter()
        .filter(|p| grid.cell_at(p).is_some_and(|c| c.is_obstacle()))
        .count() as i64;
    let mut score = 1000;
    if last == end {
        score += 5000;
    }
    score -= 10 * last.manhattan_distance(end) as i64;
    score -= 2 * path.len() as i64;
    score -= 1000 * obstacles;
    score.max(0)
}

/// Random walk from `start` that stops at `end`, at a dead end or after
/// `max_path_length` steps. With probability `greedy_bias` a step picks uniformly
/// among the `greedy_candidates` neighbours closest to `end`, otherwise among all of
/// them.
fn random_path<R: Rng>(
    grid: &Grid,
    start: Point,
    end: Point,
    allow_diagonal: bool,
    config: &GeneticConfig,
    rng: &mut R,
) -> Vec<Point> {
    let mut path = vec![start];
    let mut current = start;
    for _ in 0..config.max_path_length {
        if current == end {
            break;
        }
        let mut candidates: SmallVec<[Point; N_SMALLVEC_SIZE]> = grid
            .neighbours(&current, allow_diagonal)
            .into_iter()
            .map(|(p, _)| p)
            .filter(|p| config.allow_revisits || !path.contains(p))
            .collect();
        if candidates.is_empty() {
            break;
        }
        let pool = if rng.gen_bool(config.greedy_bias.clamp(0.0, 1.0)) {
            // Stable, so equally close neighbours keep their direction order.
            candidates.sort_by_key(|p| p.manhattan_distance(&end));
            config.greedy_candidates.clamp(1, candidates.len())
        } else {
            candidates.len()
        };
        current = candidates[rng.gen_range(0..pool)];
        path.push(current);
    }
    path
}

/// Best of `size` individuals drawn with replacement; the earliest draw wins ties.
fn tournament<'a, R: Rng>(population: &'a [Individual], size: usize, rng: &mut R) -> &'a Individual {
    let mut winner = &population[rng.gen_range(0..population.len())];
    for _ in 1..size.max(1) {
        let candidate = &population[rng.gen_range(0..population.len())];
        if candidate.fitness > winner.fitness {
            winner = candidate;
        }
    }
    winner
}

/// Single point crossover: the head of `first` up to a random cut followed by the tail
/// of `second` from the same cut.
fn crossover<R: Rng>(first: &Individual, second: &Individual, rng: &mut R) -> Individual {
    let shortest = first.path.len().min(second.path.len());
    let cut = if shortest == 0 {
        0
    } else {
        rng.gen_range(0..shortest)
    };
    let path = first.path[..cut]
        .iter()
        .chain(&second.path[cut..])
        .copied()
        .collect();
    Individual::new(path)
}

/// Replaces one cell after the first with a random open neighbour of that cell. Paths
/// shorter than two cells are returned unchanged.
fn mutate<R: Rng>(mut individual: Individual, grid: &Grid, allow_diagonal: bool, rng: &mut R) -> Individual {
    if individual.path.len() < 2 {
        return individual;
    }
    let index = rng.gen_range(1..individual.path.len());
    let neighbours = grid.neighbours(&individual.path[index], allow_diagonal);
    if !neighbours.is_empty() {
        individual.path[index] = neighbours[rng.gen_range(0..neighbours.len())].0;
    }
    individual
}

impl GridSolver for GeneticSolver {
    fn name(&self) -> &'static str {
        "Genetic Algorithm"
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
        let config = &self.config;
        info!(
            "Genetic search from {start} to {end}: {} individuals, {} generations",
            config.population_size, config.generations
        );
        let elite_count = if config.elite_count > config.population_size {
            warn!(
                "Elite count {} exceeds population size {}, keeping the whole population",
                config.elite_count, config.population_size
            );
            config.population_size
        } else {
            config.elite_count
        };
        let mutation_rate = config.mutation_rate.clamp(0.0, 1.0);

        let mut rng = self.rng();
        let mut population: Vec<Individual> = (0..config.population_size)
            .map(|_| Individual::new(random_path(grid, start, end, allow_diagonal, config, &mut rng)))
            .collect();
        let mut best: Option<Individual> = None;
        let mut nodes_explored = 0;

        for generation in 0..config.generations {
            if !cancel.is_running() {
                return SearchResult::stopped(nodes_explored, &timer);
            }
            for individual in population.iter_mut() {
                individual.fitness = fitness(grid, &individual.path, &end);
            }
            population.sort_by(|a, b| b.fitness.cmp(&a.fitness));

            if let Some(leader) = population.first() {
                if best.as_ref().map_or(true, |b| leader.fitness > b.fitness) {
                    best = Some(leader.clone());
                }
            }
            if generation % VISUALIZE_EVERY == 0 {
                if let Some(best) = &best {
                    show_candidate(grid, observer, &best.path);
                }
                debug!(
                    "Generation {generation}: best fitness {}",
                    best.as_ref().map_or(0, |b| b.fitness)
                );
            }

            let mut next: Vec<Individual> = population[..elite_count].to_vec();
            while next.len() < config.population_size {
                let first = tournament(&population, config.tournament_size, &mut rng);
                let second = tournament(&population, config.tournament_size, &mut rng);
                let mut child = crossover(first, second, &mut rng);
                if rng.gen_bool(mutation_rate) {
                    child = mutate(child, grid, allow_diagonal, &mut rng);
                }
                next.push(child);
            }
            population = next;
            nodes_explored += config.population_size;
        }

        match best {
            Some(best) if best.path.last() == Some(&end) => {
                info!("Genetic search reached the end with fitness {}", best.fitness);
                mark_path(grid, observer, &best.path);
                SearchResult::found(grid, best.path, nodes_explored, &timer)
            }
            _ => SearchResult::failure(NO_VALID_PATH_MESSAGE, nodes_explored, elapsed_ms(&timer)),
        }
    }
}
