//! HEX3-TABOO Core - Rules engine and AI
//!
//! This crate provides the core game logic for HEX3-TABOO:
//! - Board geometry (hex disk with axial coordinates)
//! - Stone placement and the one-shot neutralization
//! - Line detection: four or more wins, an isolated three loses
//! - Static evaluation and three AI tiers (random, greedy, alpha-beta)

pub mod board;
pub mod error;
pub mod game;
pub mod lines;
pub mod eval;
pub mod ai;

// Re-exports for convenient access
pub use board::{Board, Cell, Hex, AXES, DIRECTIONS, MAX_RADIUS};
pub use error::GameError;
pub use game::{new_game, Action, ActionKind, GameState, Move, Outcome, OutcomeKind, Phase, Player};
pub use lines::{LineReport, Run};
pub use eval::{evaluate, Heuristics, WIN_VALUE};
pub use ai::{AiStrategy, Difficulty, DEFAULT_HARD_DEPTH};
