//! HEX3-TABOO CLI - Command-line interface
//!
//! Commands:
//! - play: Interactive game, any mix of human and computer seats
//! - match: Series of computer-vs-computer games with statistics
//! - benchmark: Time move selection per difficulty

mod benchmark;
mod command;
mod config;
mod match_cmd;
mod play_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hextaboo")]
#[command(about = "Hexagonal connection game: four in a row wins, an isolated three loses")]
#[command(version)]
struct Cli {
    /// Random seed for reproducible AI play
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log AI decisions (same as RUST_LOG=debug)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive game
    Play(play_cmd::PlayArgs),
    /// Play a series of games between two computer players
    Match(match_cmd::MatchArgs),
    /// Time move selection for each difficulty
    Benchmark(benchmark::BenchmarkArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Match(args) => match_cmd::run(args, cli.seed),
        Commands::Benchmark(args) => benchmark::run(args, cli.seed),
    }
}

/// Logs go to stderr so they never interleave with the board on stdout
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
