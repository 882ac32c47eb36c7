//! Benchmarks for the move engine, evaluation and both search engines.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_2048::core::{Direction, GameRng, Grid, MoveEngine};
use rust_2048::eval::{EvalConfig, EvaluationFunction};
use rust_2048::expectimax::{ExpectimaxConfig, ExpectimaxSearch};
use rust_2048::mcts::{MCTSConfig, MCTSSearch, SearchBudget};

/// Grids sampled from a seeded game played with a fixed move cycle.
fn corpus() -> Vec<Grid> {
    let mut rng = GameRng::new(7777);
    let mut grid = Grid::new(4, 4, &mut rng).unwrap();
    let mut grids = vec![grid.clone()];
    for i in 0..64 {
        if grid.is_terminal() {
            break;
        }
        grid.play(Direction::ALL[i % 4], &mut rng);
        grids.push(grid.clone());
    }
    grids
}

fn midgame() -> Grid {
    let rows = vec![
        vec![128, 64, 16, 4],
        vec![32, 8, 4, 2],
        vec![8, 2, 0, 0],
        vec![2, 0, 0, 0],
    ];
    Grid::from_rows(4, 4, &rows).unwrap()
}

// =============================================================================
// Move Engine
// =============================================================================

fn bench_moves(c: &mut Criterion) {
    let grids = corpus();
    let mut group = c.benchmark_group("moves");
    group.throughput(Throughput::Elements((grids.len() * 4) as u64));

    group.bench_function("preview", |b| {
        b.iter(|| {
            let mut valid = 0;
            for grid in &grids {
                for direction in Direction::ALL {
                    if MoveEngine::preview(grid, direction).1.valid {
                        valid += 1;
                    }
                }
            }
            black_box(valid)
        })
    });

    group.bench_function("valid_moves", |b| {
        b.iter(|| grids.iter().map(|g| g.valid_moves().len()).sum::<usize>())
    });

    group.finish();
}

// =============================================================================
// Evaluation
// =============================================================================

fn bench_evaluation(c: &mut Criterion) {
    let grids = corpus();
    let mut group = c.benchmark_group("evaluation");
    group.throughput(Throughput::Elements(grids.len() as u64));

    for (name, config) in [("expectimax", EvalConfig::expectimax()), ("mcts", EvalConfig::mcts())] {
        let eval = EvaluationFunction::new(config);
        group.bench_function(name, |b| {
            b.iter(|| grids.iter().map(|g| eval.evaluate(g, g.last_move_score())).sum::<f64>())
        });
    }

    group.finish();
}

// =============================================================================
// Expectimax
// =============================================================================

fn bench_expectimax(c: &mut Criterion) {
    let grid = midgame();
    let mut group = c.benchmark_group("expectimax");
    group.sample_size(20);

    for depth in [1, 2, 3] {
        for parallel in [false, true] {
            let label = if parallel { "parallel" } else { "sequential" };
            let config = ExpectimaxConfig::default().with_depth(depth).with_parallel(parallel);
            group.bench_with_input(BenchmarkId::new(label, depth), &config, |b, config| {
                let mut search = ExpectimaxSearch::new(config.clone());
                b.iter(|| black_box(search.choose_move(&grid)))
            });
        }
    }

    group.finish();
}

// =============================================================================
// MCTS
// =============================================================================

fn bench_mcts(c: &mut Criterion) {
    let grid = midgame();
    let mut group = c.benchmark_group("mcts");
    group.sample_size(20);

    for sims in [50u32, 100, 300] {
        group.throughput(Throughput::Elements(sims as u64));
        group.bench_with_input(BenchmarkId::new("simulations", sims), &sims, |b, &sims| {
            let config = MCTSConfig::default().with_tree_reuse(false);
            let mut search = MCTSSearch::new(config);
            b.iter(|| black_box(search.run_simulations(&grid, SearchBudget::simulations(sims))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_moves, bench_evaluation, bench_expectimax, bench_mcts);
criterion_main!(benches);
