//! Play command - interactive game in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_config(), run_session(), report_outcome()
//! - Level 3: human_turn(), cpu_turn()
//! - Level 4: prompt and rendering utilities

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use hextaboo_core::{new_game, AiStrategy, GameState, Outcome, Player};

use crate::command::{self, Command, HELP};
use crate::config::{MatchConfig, Seat};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Match configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Board radius (overrides the config file)
    #[arg(long)]
    pub radius: Option<u32>,

    /// Player 1 seat: human, easy, medium, hard or hard:DEPTH
    #[arg(long)]
    pub player1: Option<Seat>,

    /// Player 2 seat: human, easy, medium, hard or hard:DEPTH
    #[arg(long)]
    pub player2: Option<Seat>,

    /// Write the effective configuration to FILE before playing
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,
}

/// How an interactive session ended
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEnd {
    Finished(Outcome),
    Quit,
    /// Input closed before the game was decided
    Eof,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// This function reads like a table of contents:
/// 1. Resolve the configuration (file, then flags)
/// 2. Run the interactive session on stdin/stdout
/// 3. Report how it ended
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = load_config(&args, seed)?;

    tracing::info!(
        "Starting game: radius={}, player1={}, player2={}",
        config.radius,
        config.player1,
        config.player2
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let end = run_session(&config, stdin.lock(), stdout.lock())?;

    report_outcome(&end);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Merge file config, command-line overrides and the global seed
fn load_config(args: &PlayArgs, seed: Option<u64>) -> Result<MatchConfig> {
    let config = MatchConfig::load_or_default(args.config.as_deref())?.override_with(
        args.radius,
        args.player1,
        args.player2,
        seed,
    );
    config.validate()?;

    if let Some(path) = &args.save_config {
        config
            .save(path)
            .with_context(|| format!("Failed to save config: {}", path.display()))?;
    }

    Ok(config)
}

/// Drive one game to completion, reading human commands from `input`
pub fn run_session<R: BufRead, W: Write>(
    config: &MatchConfig,
    mut input: R,
    mut output: W,
) -> Result<SessionEnd> {
    let mut state = new_game(config.radius)?;
    let seed = config.seed_or_default();
    let mut seats = [
        Controller::new(config.player1, Player::One, seed),
        Controller::new(config.player2, Player::Two, seed.wrapping_add(1)),
    ];

    writeln!(output, "{}", state.board())?;

    loop {
        if let Some(outcome) = state.outcome() {
            let outcome = outcome.clone();
            writeln!(output, "{}", outcome)?;
            if !outcome.line.is_empty() {
                writeln!(output, "Line: {}", format_line(&outcome.line))?;
            }
            return Ok(SessionEnd::Finished(outcome));
        }

        let player = state.current_player();
        let step = match &mut seats[player.index()] {
            Controller::Human => human_turn(&mut state, &mut input, &mut output)?,
            Controller::Cpu(ai) => cpu_turn(&mut state, ai, &mut output)?,
        };

        match step {
            TurnStep::Played => writeln!(output, "{}", state.board())?,
            TurnStep::Ended(end) => return Ok(end),
        }
    }
}

/// Report how the session ended
fn report_outcome(end: &SessionEnd) {
    match end {
        SessionEnd::Finished(outcome) => {
            tracing::info!("Game over: {:?} by {}", outcome.kind, outcome.player)
        }
        SessionEnd::Quit => println!("Game abandoned."),
        SessionEnd::Eof => println!("\nInput closed. Game abandoned."),
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

enum Controller {
    Human,
    Cpu(AiStrategy),
}

impl Controller {
    fn new(seat: Seat, player: Player, seed: u64) -> Self {
        match seat {
            Seat::Human => Controller::Human,
            Seat::Cpu(difficulty) => Controller::Cpu(AiStrategy::with_seed(difficulty, player, seed)),
        }
    }
}

enum TurnStep {
    Played,
    Ended(SessionEnd),
}

/// Prompt until the human submits an accepted action or leaves
fn human_turn<R: BufRead, W: Write>(
    state: &mut GameState,
    input: &mut R,
    output: &mut W,
) -> Result<TurnStep> {
    loop {
        write!(output, "{}", prompt(state))?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(TurnStep::Ended(SessionEnd::Eof));
        }

        match command::parse(&line) {
            Ok(Command::Act(action)) => match state.play(action) {
                Ok(_) => return Ok(TurnStep::Played),
                Err(err) => writeln!(output, "Error: {}", err)?,
            },
            Ok(Command::Board) => writeln!(output, "{}", state.board())?,
            Ok(Command::Help) => writeln!(output, "{}", HELP)?,
            Ok(Command::Quit) => return Ok(TurnStep::Ended(SessionEnd::Quit)),
            Err(command::CommandError::Empty) => {}
            Err(err) => writeln!(output, "Error: {}", err)?,
        }
    }
}

/// Let the AI play its seat and echo the chosen action
fn cpu_turn<W: Write>(state: &mut GameState, ai: &mut AiStrategy, output: &mut W) -> Result<TurnStep> {
    let player = state.current_player();
    let moves_before = state.history().len();

    if let Err(err) = ai.take_turn(state) {
        bail!("{} AI could not move: {}", player, err);
    }

    if let Some(mv) = state.history().get(moves_before) {
        writeln!(output, "{} ({}) plays {:?} at {}", player, ai.difficulty(), mv.action, mv.hex)?;
    }
    Ok(TurnStep::Played)
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Prompt text; `remove` is only offered when it would be accepted
fn prompt(state: &GameState) -> String {
    let player = state.current_player();
    if state.can_neutralize() {
        format!("{} > place q r | remove: ", player)
    } else {
        format!("{} > place q r: ", player)
    }
}

fn format_line(line: &[hextaboo_core::Hex]) -> String {
    line.iter()
        .map(|hex| hex.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// TESTS
// ============================================================================
