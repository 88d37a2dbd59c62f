//! Computer opponents: random, greedy and alpha-beta

use std::fmt;
use std::str::FromStr;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell, Hex, DIRECTIONS};
use crate::error::GameError;
use crate::eval::{self, Heuristics, WIN_VALUE};
use crate::game::{Action, GameState, Outcome, Player};
use crate::lines::{self, LOSS_LENGTH};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Search depth used by `Difficulty::hard()`
pub const DEFAULT_HARD_DEPTH: u32 = 3;

/// Medium picks at random among this many best-centred candidates
const MEDIUM_TOP_K: usize = 3;

/// Hard neutralizes when the heuristic value reaches this
const NEUTRALIZE_THRESHOLD: f32 = 500.0;

/// Value of each opponent winning cell a neutralization erases
const THREAT_DENIAL_VALUE: f32 = 1000.0;

/// Value of erasing a lone threat that could have been blocked safely
const BLOCKABLE_THREAT_VALUE: f32 = 200.0;

/// Value of breaking a run of three or more
const RUN_DENIAL_VALUE: f32 = 500.0;

const DEFAULT_SEED: u64 = 42;

// ============================================================================
// DIFFICULTY
// ============================================================================

/// Strategy tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "lowercase")]
pub enum Difficulty {
    /// Uniform random placement
    Easy,
    /// One-ply greedy rules
    Medium,
    /// Alpha-beta search to a fixed depth
    Hard { depth: u32 },
}

impl Difficulty {
    pub const fn hard() -> Self {
        Difficulty::Hard {
            depth: DEFAULT_HARD_DEPTH,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard { .. } => "hard",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Hard { depth } => write!(f, "hard:{depth}"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    /// Accepts `easy`, `medium`, `hard` and `hard:<depth>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.split_once(':') {
            None => match lower.as_str() {
                "easy" => Ok(Difficulty::Easy),
                "medium" => Ok(Difficulty::Medium),
                "hard" => Ok(Difficulty::hard()),
                _ => Err(format!("unknown difficulty '{s}' (expected easy, medium or hard)")),
            },
            Some(("hard", depth)) => match depth.parse::<u32>() {
                Ok(depth) if depth >= 1 => Ok(Difficulty::Hard { depth }),
                _ => Err(format!("invalid search depth '{depth}'")),
            },
            Some(_) => Err(format!("only hard takes a depth, got '{s}'")),
        }
    }
}

// ============================================================================
// STRATEGY
// ============================================================================

/// Computer player for one seat
pub struct AiStrategy {
    difficulty: Difficulty,
    player: Player,
    pub heuristics: Heuristics,
    pub max_moves_per_action: usize,
    rng: ChaCha8Rng,
}

impl AiStrategy {
    pub fn new(difficulty: Difficulty, player: Player) -> Self {
        Self::with_seed(difficulty, player, DEFAULT_SEED)
    }

    pub fn with_seed(difficulty: Difficulty, player: Player, seed: u64) -> Self {
        Self {
            difficulty,
            player,
            heuristics: Heuristics::default(),
            max_moves_per_action: 12,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn player(&self) -> Player {
        self.player
    }

    /// Pick an action for this strategy's seat.
    ///
    /// Returns `None` when the game is over, when it is not this seat's turn,
    /// or when no legal action exists. A choice the rules would reject is
    /// replaced by a random legal placement.
    pub fn choose_action(&mut self, state: &GameState) -> Option<Action> {
        if state.is_over() || state.current_player() != self.player {
            return None;
        }
        if state.legal_cells().is_empty() {
            return state.can_neutralize().then_some(Action::Neutralize);
        }

        let action = match self.difficulty {
            Difficulty::Easy => self.choose_easy(state),
            Difficulty::Medium => self.choose_medium(state),
            Difficulty::Hard { depth } => self.choose_hard(state, depth.max(1)),
        };

        match action {
            Some(action) if state.is_legal(&action) => Some(action),
            other => {
                tracing::warn!(
                    "{} AI produced illegal action {:?}, falling back to random",
                    self.difficulty,
                    other
                );
                self.random_legal(state)
            }
        }
    }

    /// Choose and play this seat's turn through `GameState::play`.
    ///
    /// A rejected choice is retried once with a random legal placement; only
    /// a finished game or a turn that is not ours yields an error.
    pub fn take_turn(&mut self, state: &mut GameState) -> Result<Option<Outcome>, GameError> {
        if state.is_over() {
            return Err(GameError::GameOver);
        }
        if state.current_player() != self.player {
            return Err(GameError::NotYourTurn(self.player));
        }
        let action = self.choose_action(state).ok_or(GameError::GameOver)?;
        match state.play(action) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracing::warn!("engine rejected {action}: {err}; playing a random move");
                let fallback = self.random_legal(state).ok_or(err)?;
                state.play(fallback)
            }
        }
    }

    fn random_legal(&mut self, state: &GameState) -> Option<Action> {
        match state.legal_cells().choose(&mut self.rng) {
            Some(&hex) => Some(Action::Place(hex)),
            None => state.can_neutralize().then_some(Action::Neutralize),
        }
    }

    // ========================================================================
    // EASY
    // ========================================================================

    fn choose_easy(&mut self, state: &GameState) -> Option<Action> {
        state
            .legal_cells()
            .choose(&mut self.rng)
            .map(|&hex| Action::Place(hex))
    }

    // ========================================================================
    // MEDIUM
    // ========================================================================

    fn choose_medium(&mut self, state: &GameState) -> Option<Action> {
        let me = self.player;
        let opponent = me.opponent();
        let board = state.board();
        let cells = state.legal_cells();

        if let Some(&hex) = cells.iter().find(|&&h| lines::completes_win(board, h, me)) {
            tracing::debug!("medium: winning at {hex}");
            return Some(Action::Place(hex));
        }

        if state.can_neutralize() && medium_wants_neutralize(state) {
            tracing::debug!("medium: neutralizing");
            return Some(Action::Neutralize);
        }

        let safe: Vec<Hex> = cells
            .iter()
            .copied()
            .filter(|&h| !lines::creates_loss(board, h, me))
            .collect();

        let blocks = opponent_threats(state, opponent);
        if let Some(&hex) = safe.iter().find(|h| blocks.contains(h)) {
            tracing::debug!("medium: blocking at {hex}");
            return Some(Action::Place(hex));
        }

        let mut pool = if safe.is_empty() { cells } else { safe };
        pool.shuffle(&mut self.rng);
        pool.sort_by_key(|h| h.distance_to_center());
        pool.truncate(MEDIUM_TOP_K);
        pool.choose(&mut self.rng).map(|&hex| Action::Place(hex))
    }

    // ========================================================================
    // HARD
    // ========================================================================

    fn choose_hard(&mut self, state: &GameState, depth: u32) -> Option<Action> {
        let me = self.player;
        let board = state.board();
        let cells = state.legal_cells();

        if let Some(&hex) = cells.iter().find(|&&h| lines::completes_win(board, h, me)) {
            tracing::debug!("hard: winning at {hex}");
            return Some(Action::Place(hex));
        }

        if state.can_neutralize() {
            let value = neutralize_value(state, me);
            tracing::debug!("hard: neutralize value {value}");
            if value >= NEUTRALIZE_THRESHOLD {
                return Some(Action::Neutralize);
            }
        }

        let mut search = Search::new(state, &self.heuristics, self.max_moves_per_action);
        let best = search.best_placement(me, cells, depth, &mut self.rng);
        tracing::debug!(
            "hard: depth {} searched {} nodes, best {:?}",
            depth,
            search.nodes,
            best
        );
        best.map(|(hex, _)| Action::Place(hex))
    }
}

// ============================================================================
// NEUTRALIZATION HEURISTICS
// ============================================================================

/// Cells where `opponent` would complete four on their next placement
fn opponent_threats(state: &GameState, opponent: Player) -> Vec<Hex> {
    let forbidden = state.forbidden_cell(opponent);
    lines::winning_cells(state.board(), opponent)
        .into_iter()
        .filter(|&h| Some(h) != forbidden)
        .collect()
}

/// Longest run the stone at `hex` belongs to
fn run_through_stone(board: &Board, hex: Hex, player: Player) -> usize {
    if board.is_owned_by(hex, player) {
        lines::longest_run_through(board, hex, player)
    } else {
        0
    }
}

/// Board after the neutralization that is currently available
fn board_after_neutralize(state: &GameState) -> Option<(Board, Hex)> {
    let target = state.history().last()?.hex;
    let mut board = state.board().clone();
    board.set(target, Cell::Neutralized).ok()?;
    Some((board, target))
}

/// Medium's trigger: the opponent's last stone sits in a run of three or
/// more, or it feeds a double threat that one block cannot stop.
fn medium_wants_neutralize(state: &GameState) -> bool {
    let opponent = state.current_player().opponent();
    let Some((after, target)) = board_after_neutralize(state) else {
        return false;
    };
    if run_through_stone(state.board(), target, opponent) >= LOSS_LENGTH {
        return true;
    }
    let before = opponent_threats(state, opponent).len();
    let remaining = lines::winning_cells(&after, opponent).len();
    before >= 2 && remaining < before
}

/// How much the available neutralization is worth to `me`
fn neutralize_value(state: &GameState, me: Player) -> f32 {
    let opponent = me.opponent();
    let Some((after, target)) = board_after_neutralize(state) else {
        return 0.0;
    };

    let threats = opponent_threats(state, opponent);
    let remaining = lines::winning_cells(&after, opponent).len();
    let removed = threats.len().saturating_sub(remaining);

    let mut value = match (threats.len(), removed) {
        (_, 0) => 0.0,
        // A single threat is normally blocked by placing on it, unless that
        // placement would hand us an isolated three.
        (1, _) => {
            if lines::creates_loss(state.board(), threats[0], me) {
                THREAT_DENIAL_VALUE
            } else {
                BLOCKABLE_THREAT_VALUE
            }
        }
        (_, removed) => THREAT_DENIAL_VALUE * removed as f32,
    };

    if run_through_stone(state.board(), target, opponent) >= LOSS_LENGTH {
        value += RUN_DENIAL_VALUE;
    }
    value
}

// ============================================================================
// NEGAMAX WITH ALPHA-BETA
// ============================================================================

/// Search context over a private copy of the board
struct Search<'a> {
    board: Board,
    forbidden: [Option<Hex>; 2],
    heuristics: &'a Heuristics,
    max_moves: usize,
    nodes: u64,
}

impl<'a> Search<'a> {
    fn new(state: &GameState, heuristics: &'a Heuristics, max_moves: usize) -> Self {
        Self {
            board: state.board().clone(),
            forbidden: [
                state.forbidden_cell(Player::One),
                state.forbidden_cell(Player::Two),
            ],
            heuristics,
            max_moves,
            nodes: 0,
        }
    }

    /// Place a stone, run `f`, and restore the cell and forbidden marker.
    ///
    /// Returns `None` without calling `f` if `hex` is off the board.
    fn with_stone<T>(&mut self, hex: Hex, player: Player, f: impl FnOnce(&mut Self) -> T) -> Option<T> {
        let previous = self.board.cell(hex)?;
        self.board.set(hex, Cell::Stone(player)).ok()?;
        let forbidden = self.forbidden[player.index()].take();

        let result = f(self);

        self.forbidden[player.index()] = forbidden;
        self.board.set(hex, previous).ok()?;
        Some(result)
    }

    /// Placements for `player`, best-looking first, capped at `max_moves`
    fn ordered_moves(&self, player: Player) -> Vec<Hex> {
        let forbidden = self.forbidden[player.index()];
        let mut moves: Vec<Hex> = self
            .board
            .empty_cells()
            .into_iter()
            .filter(|&h| Some(h) != forbidden)
            .collect();
        self.order(&mut moves, player);
        moves
    }

    fn order(&self, moves: &mut Vec<Hex>, player: Player) {
        let mut scored: Vec<(f32, Hex)> = moves
            .iter()
            .map(|&hex| (move_score(&self.board, hex, player), hex))
            .collect();
        // Stable, so earlier entries win ties
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.max_moves);
        *moves = scored.into_iter().map(|(_, hex)| hex).collect();
    }

    /// Score of `player` placing on `hex`, from `player`'s perspective
    fn score_placement(&mut self, hex: Hex, player: Player, depth: u32, alpha: f32, beta: f32) -> f32 {
        // The position before this stone was not terminal, so any decided
        // line must run through it.
        if lines::completes_win(&self.board, hex, player) {
            return WIN_VALUE + depth as f32;
        }
        if lines::creates_loss(&self.board, hex, player) {
            return -WIN_VALUE - depth as f32;
        }

        self.with_stone(hex, player, |search| {
            if search.board.is_full() {
                0.0
            } else if depth <= 1 {
                eval::evaluate(&search.board, player, search.heuristics)
            } else {
                -search.negamax(player.opponent(), depth - 1, -beta, -alpha)
            }
        })
        .unwrap_or(f32::NEG_INFINITY)
    }

    fn negamax(&mut self, player: Player, depth: u32, mut alpha: f32, beta: f32) -> f32 {
        self.nodes += 1;

        let moves = self.ordered_moves(player);
        if moves.is_empty() {
            return eval::evaluate(&self.board, player, self.heuristics);
        }

        let mut best = f32::NEG_INFINITY;
        for hex in moves {
            let score = self.score_placement(hex, player, depth, alpha, beta);
            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        best
    }

    fn best_placement(
        &mut self,
        player: Player,
        mut moves: Vec<Hex>,
        depth: u32,
        rng: &mut ChaCha8Rng,
    ) -> Option<(Hex, f32)> {
        // Shuffle first so equal scores are broken by the seeded RNG
        moves.shuffle(rng);
        self.order(&mut moves, player);

        let mut best: Option<(Hex, f32)> = None;
        for hex in moves {
            let alpha = best.map_or(f32::NEG_INFINITY, |(_, s)| s);
            let score = self.score_placement(hex, player, depth, alpha, f32::INFINITY);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((hex, score));
            }
        }
        best
    }
}

/// Cheap ordering score for a placement (higher = search first)
fn move_score(board: &Board, hex: Hex, player: Player) -> f32 {
    let opponent = player.opponent();
    let mut score = 0.0;

    if lines::completes_win(board, hex, player) {
        score += 10000.0;
    } else if lines::creates_loss(board, hex, player) {
        score -= 5000.0;
    }
    if lines::completes_win(board, hex, opponent) {
        score += 5000.0;
    }

    // Center proximity and contact with existing stones
    score += (board.radius() as i32 - hex.distance_to_center()) as f32;
    let neighbours = (0..DIRECTIONS.len())
        .filter(|&d| matches!(board.cell(hex.neighbor(d)), Some(Cell::Stone(_))))
        .count();
    score += neighbours as f32 * 2.0;

    score
}

// ============================================================================
// TESTS
// ============================================================================
