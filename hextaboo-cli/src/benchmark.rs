//! Benchmark command - time move selection for each difficulty
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: generate_positions(), run_benchmarks(), report_results()
//! - Level 3: benchmark_difficulty(), random_position()
//! - Level 4: timing utilities, formatting

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Args;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hextaboo_core::{new_game, Action, AiStrategy, Difficulty, GameState, MAX_RADIUS};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchmarkArgs {
    /// Board radius
    #[arg(long, default_value = "4")]
    pub radius: u32,

    /// Number of random positions to time each difficulty on
    #[arg(long, default_value = "20")]
    pub positions: usize,

    /// Maximum hard search depth to test
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Timing of one difficulty over the position set
#[derive(Clone, Debug)]
struct BenchmarkResult {
    name: String,
    positions: usize,
    total_time: Duration,
    avg_time_per_move: Duration,
    /// Positions where the strategy returned no action
    passes: usize,
}

/// All benchmark results
#[derive(Clone, Debug)]
struct AllResults {
    results: Vec<BenchmarkResult>,
    system_info: String,
    radius: u32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run benchmark command
///
/// This function reads like a table of contents:
/// 1. Generate a reproducible set of mid-game positions
/// 2. Time every difficulty on the same positions
/// 3. Report all results
pub fn run(args: BenchmarkArgs, seed: Option<u64>) -> Result<()> {
    validate_args(&args)?;
    let seed = seed.unwrap_or(42);

    tracing::info!(
        "Starting benchmarks: {} positions, radius {}, max depth {}",
        args.positions,
        args.radius,
        args.depth
    );

    let positions = generate_positions(args.radius, args.positions, seed)?;

    let all_results = AllResults {
        results: run_benchmarks(&positions, args.depth, seed),
        system_info: get_system_info(),
        radius: args.radius,
    };

    report_results(&all_results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn validate_args(args: &BenchmarkArgs) -> Result<()> {
    if args.radius < 1 || args.radius > MAX_RADIUS {
        bail!("radius must be between 1 and {}, got {}", MAX_RADIUS, args.radius);
    }
    if args.positions == 0 {
        bail!("positions must be at least 1");
    }
    if args.depth == 0 {
        bail!("depth must be at least 1");
    }
    Ok(())
}

/// Build `count` non-terminal positions by seeded random play
fn generate_positions(radius: u32, count: usize, seed: u64) -> Result<Vec<GameState>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| random_position(radius, &mut rng)).collect()
}

/// Time easy, medium and hard at every depth up to `max_depth`
fn run_benchmarks(positions: &[GameState], max_depth: u32, seed: u64) -> Vec<BenchmarkResult> {
    let difficulties = [Difficulty::Easy, Difficulty::Medium]
        .into_iter()
        .chain((1..=max_depth).map(|depth| Difficulty::Hard { depth }));

    difficulties
        .map(|difficulty| {
            tracing::info!("Benchmarking {}...", difficulty);
            benchmark_difficulty(positions, difficulty, seed)
        })
        .collect()
}

/// Report all benchmark results
fn report_results(results: &AllResults, args: &BenchmarkArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Average `choose_action` time of one difficulty
fn benchmark_difficulty(positions: &[GameState], difficulty: Difficulty, seed: u64) -> BenchmarkResult {
    let mut total_time = Duration::ZERO;
    let mut passes = 0;

    for state in positions {
        let mut ai = AiStrategy::with_seed(difficulty, state.current_player(), seed);

        let start = Instant::now();
        let action = ai.choose_action(state);
        total_time += start.elapsed();

        if action.is_none() {
            passes += 1;
        }
    }

    let avg_time_per_move = if positions.is_empty() {
        Duration::ZERO
    } else {
        total_time / positions.len() as u32
    };

    tracing::debug!(
        "{}: {} positions in {}",
        difficulty,
        positions.len(),
        format_duration(total_time)
    );

    BenchmarkResult {
        name: difficulty.to_string(),
        positions: positions.len(),
        total_time,
        avg_time_per_move,
        passes,
    }
}

/// Play a random number of random legal placements, retrying whenever the
/// game ends before the target is reached
fn random_position(radius: u32, rng: &mut ChaCha8Rng) -> Result<GameState> {
    loop {
        let mut state = new_game(radius)?;
        let target = rng.gen_range(0..=state.board().len() / 2);

        while state.history().len() < target && !state.is_over() {
            let Some(&hex) = state.legal_cells().choose(rng) else {
                break;
            };
            state.play(Action::Place(hex))?;
        }

        if !state.is_over() {
            return Ok(state);
        }
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Get system information string
fn get_system_info() -> String {
    format!(
        "hextaboo {}, {} CPUs",
        env!("CARGO_PKG_VERSION"),
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1)
    )
}

/// Format duration for display
fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 1 {
        format!("{:.2}s", d.as_secs_f64())
    } else if d.as_millis() >= 1 {
        format!("{:.1}ms", d.as_secs_f64() * 1000.0)
    } else {
        format!("{:.1}us", d.as_secs_f64() * 1_000_000.0)
    }
}

/// Print results as JSON
fn print_json_results(results: &AllResults) {
    #[derive(serde::Serialize)]
    struct JsonBenchmark {
        difficulty: String,
        positions: usize,
        total_time_ms: f64,
        avg_time_ms: f64,
        passes: usize,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        system_info: String,
        radius: u32,
        benchmarks: Vec<JsonBenchmark>,
    }

    let output = JsonOutput {
        system_info: results.system_info.clone(),
        radius: results.radius,
        benchmarks: results
            .results
            .iter()
            .map(|r| JsonBenchmark {
                difficulty: r.name.clone(),
                positions: r.positions,
                total_time_ms: r.total_time.as_secs_f64() * 1000.0,
                avg_time_ms: r.avg_time_per_move.as_secs_f64() * 1000.0,
                passes: r.passes,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text table
fn print_text_results(results: &AllResults) {
    println!("\n=== HEX3-TABOO Benchmark Results ===");
    println!("System: {}", results.system_info);
    println!("Board radius: {}\n", results.radius);

    println!(
        "{:<12} {:>10} {:>12} {:>12} {:>8}",
        "Difficulty", "Positions", "Total Time", "Avg/Move", "Passes"
    );
    println!("{}", "-".repeat(58));

    for r in &results.results {
        println!(
            "{:<12} {:>10} {:>12} {:>12} {:>8}",
            r.name,
            r.positions,
            format_duration(r.total_time),
            format_duration(r.avg_time_per_move),
            r.passes
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(500)), "500.0us");
        assert_eq!(format_duration(Duration::from_millis(500)), "500.0ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.00s");
    }

    #[test]
    fn test_positions_are_playable_and_reproducible() {
        let a = generate_positions(3, 8, 42).unwrap();
        let b = generate_positions(3, 8, 42).unwrap();

        assert_eq!(a.len(), 8);
        for (x, y) in a.iter().zip(&b) {
            assert!(!x.is_over());
            assert_eq!(x.history(), y.history());
            assert!(!x.legal_cells().is_empty());
        }
    }

    #[test]
    fn test_every_difficulty_is_timed() {
        let positions = generate_positions(2, 3, 1).unwrap();
        let results = run_benchmarks(&positions, 2, 1);

        let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["easy", "medium", "hard:1", "hard:2"]);
        assert!(results.iter().all(|r| r.positions == 3 && r.passes == 0));
    }
}
