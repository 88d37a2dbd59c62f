//! Match command - play a series of games between two AI seats
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_config(), play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use hextaboo_core::{new_game, AiStrategy, Difficulty, Move, OutcomeKind, Player};

use crate::config::{MatchConfig, Seat};

/// Safety net for a game that never reaches a terminal state
const MAX_TURNS_PER_CELL: usize = 2;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Match configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Board radius (overrides the config file)
    #[arg(long)]
    pub radius: Option<u32>,

    /// Player 1 difficulty: easy, medium, hard or hard:DEPTH
    #[arg(long)]
    pub player1: Option<Seat>,

    /// Player 2 difficulty: easy, medium, hard or hard:DEPTH
    #[arg(long)]
    pub player2: Option<Seat>,

    /// Number of games to play
    #[arg(long)]
    pub games: Option<usize>,

    /// Play games in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Write the effective configuration to FILE
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    seed: u64,
    /// None for a draw
    winner: Option<Player>,
    kind: OutcomeKind,
    /// Player who made the final move
    mover: Player,
    moves: Vec<Move>,
}

impl GameRecord {
    fn neutralized(&self) -> bool {
        self.moves
            .iter()
            .any(|mv| mv.action == hextaboo_core::ActionKind::Neutralize)
    }
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    player1_wins: usize,
    player2_wins: usize,
    draws: usize,
    /// Isolated-three losses, indexed by the player who made them
    self_losses: [usize; 2],
    neutralizations: usize,
    avg_moves: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// This function reads like a table of contents:
/// 1. Resolve the configuration (file, then flags)
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let (config, player1, player2) = load_config(&args, seed)?;

    tracing::info!(
        "Starting match: {} vs {} ({} games, radius={})",
        player1,
        player2,
        config.games,
        config.radius
    );

    let results = play_match(&config, player1, player2, args.parallel, !args.json)?;

    report_results(&results, &config, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Merge file config and flags; both seats must be computer players
fn load_config(args: &MatchArgs, seed: Option<u64>) -> Result<(MatchConfig, Difficulty, Difficulty)> {
    let mut config = MatchConfig::load_or_default(args.config.as_deref())?.override_with(
        args.radius,
        args.player1,
        args.player2,
        seed,
    );
    if let Some(games) = args.games {
        config.games = games;
    }
    config.validate()?;

    if let Some(path) = &args.save_config {
        config
            .save(path)
            .with_context(|| format!("Failed to save config: {}", path.display()))?;
    }

    let (player1, player2) = match (config.player1, config.player2) {
        (Seat::Cpu(p1), Seat::Cpu(p2)) => (p1, p2),
        _ => bail!("match needs two computer seats (got {} vs {})", config.player1, config.player2),
    };

    Ok((config, player1, player2))
}

/// Play all games in the match
fn play_match(
    config: &MatchConfig,
    player1: Difficulty,
    player2: Difficulty,
    parallel: bool,
    show_progress: bool,
) -> Result<MatchResults> {
    let base_seed = config.seed_or_default();
    let progress = create_progress_bar(config.games as u64, show_progress)?;

    let play = |index: usize| -> Result<GameRecord> {
        let record = play_single_game(
            config.radius,
            player1,
            player2,
            index + 1,
            base_seed.wrapping_add(index as u64),
        )?;
        tracing::info!(
            "Game {}: {:?} by {} ({} moves)",
            record.game_number,
            record.kind,
            record.mover,
            record.moves.len()
        );
        progress.inc(1);
        Ok(record)
    };

    let games = if parallel {
        (0..config.games).into_par_iter().map(play).collect::<Result<Vec<_>>>()?
    } else {
        (0..config.games).map(play).collect::<Result<Vec<_>>>()?
    };

    progress.finish_and_clear();

    Ok(compute_match_statistics(games))
}

/// Report match results
fn report_results(results: &MatchResults, config: &MatchConfig, json: bool) {
    if json {
        print_json_results(results, config);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game between the two difficulties
fn play_single_game(
    radius: u32,
    player1: Difficulty,
    player2: Difficulty,
    game_number: usize,
    seed: u64,
) -> Result<GameRecord> {
    let mut state = new_game(radius)?;
    let mut seats = [
        AiStrategy::with_seed(player1, Player::One, seed),
        AiStrategy::with_seed(player2, Player::Two, seed.wrapping_add(1)),
    ];

    let max_turns = state.board().len() * MAX_TURNS_PER_CELL;
    let mut turns = 0;

    while !state.is_over() {
        if turns >= max_turns {
            bail!("game {} did not finish within {} turns", game_number, max_turns);
        }
        let seat = &mut seats[state.current_player().index()];
        seat.take_turn(&mut state)
            .with_context(|| format!("game {}: {} could not move", game_number, seat.player()))?;
        turns += 1;
    }

    let outcome = state
        .outcome()
        .cloned()
        .context("finished game has no outcome")?;

    Ok(GameRecord {
        game_number,
        seed,
        winner: outcome.winner(),
        kind: outcome.kind,
        mover: outcome.player,
        moves: state.history().to_vec(),
    })
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let player1_wins = games
        .iter()
        .filter(|g| g.winner == Some(Player::One))
        .count();
    let player2_wins = games
        .iter()
        .filter(|g| g.winner == Some(Player::Two))
        .count();
    let draws = games.iter().filter(|g| g.winner.is_none()).count();

    let mut self_losses = [0; 2];
    for game in games.iter().filter(|g| g.kind == OutcomeKind::Loss) {
        self_losses[game.mover.index()] += 1;
    }
    let neutralizations = games.iter().filter(|g| g.neutralized()).count();

    let total_moves: usize = games.iter().map(|g| g.moves.len()).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    MatchResults {
        games,
        player1_wins,
        player2_wins,
        draws,
        self_losses,
        neutralizations,
        avg_moves,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn create_progress_bar(len: u64, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let progress = ProgressBar::new(len);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Playing games: {bar:40.cyan/blue} {pos}/{len} ~{eta} remaining")?
            .progress_chars("█▓▒░  "),
    );
    Ok(progress)
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults, config: &MatchConfig) {
    #[derive(Serialize)]
    struct JsonGame<'a> {
        game_number: usize,
        seed: u64,
        result: String,
        winner: Option<u8>,
        moves: &'a [Move],
    }

    #[derive(Serialize)]
    struct JsonOutput<'a> {
        config: &'a MatchConfig,
        total_games: usize,
        player1_wins: usize,
        player2_wins: usize,
        draws: usize,
        player1_self_losses: usize,
        player2_self_losses: usize,
        games_with_neutralization: usize,
        avg_moves: f32,
        games: Vec<JsonGame<'a>>,
    }

    let output = JsonOutput {
        config,
        total_games: results.games.len(),
        player1_wins: results.player1_wins,
        player2_wins: results.player2_wins,
        draws: results.draws,
        player1_self_losses: results.self_losses[0],
        player2_self_losses: results.self_losses[1],
        games_with_neutralization: results.neutralizations,
        avg_moves: results.avg_moves,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                seed: g.seed,
                result: format!("{:?}", g.kind),
                winner: g.winner.map(Player::number),
                moves: &g.moves,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("Total games:      {}", total);
    println!(
        "Player 1 wins:    {} ({:.1}%)",
        results.player1_wins,
        percent(results.player1_wins, total)
    );
    println!(
        "Player 2 wins:    {} ({:.1}%)",
        results.player2_wins,
        percent(results.player2_wins, total)
    );
    println!(
        "Draws:            {} ({:.1}%)",
        results.draws,
        percent(results.draws, total)
    );
    println!(
        "Self-losses:      P1 {} / P2 {}",
        results.self_losses[0], results.self_losses[1]
    );
    println!("Neutralizations:  {}", results.neutralizations);
    println!("Avg moves:        {:.1}", results.avg_moves);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {} (seed {}): {:?} by {} in {} moves",
            game.game_number,
            game.seed,
            game.kind,
            game.mover,
            game.moves.len()
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
