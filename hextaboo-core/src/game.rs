//! Game state, turn order and move validation

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell, Hex};
use crate::error::GameError;
use crate::lines::{self, LineReport};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player seat. `One` moves first; only `Two` may neutralize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Zero-based index for per-player arrays
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// Seat number as shown to users (1 or 2)
    pub fn number(self) -> u8 {
        self as u8
    }

    /// The seat allowed to neutralize
    pub fn can_ever_neutralize(self) -> bool {
        self == Player::Two
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// Kind of recorded action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Place,
    Neutralize,
}

/// History entry. Neutralize records the coordinate it cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub player: Player,
    pub action: ActionKind,
    pub hex: Hex,
}

/// An action submitted by a front end or chosen by an AI
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Place(Hex),
    Neutralize,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Place(hex) => write!(f, "place {} {}", hex.q, hex.r),
            Action::Neutralize => write!(f, "remove"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// The mover completed a run of four or more
    Win,
    /// The mover left an isolated run of exactly three
    Loss,
    /// Board full with neither
    Draw,
}

/// Terminal result, always stated from the point of view of the player
/// who made the final move
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub player: Player,
    /// The run that decided the game; empty for a draw
    pub line: Vec<Hex>,
}

impl Outcome {
    pub fn winner(&self) -> Option<Player> {
        match self.kind {
            OutcomeKind::Win => Some(self.player),
            OutcomeKind::Loss => Some(self.player.opponent()),
            OutcomeKind::Draw => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OutcomeKind::Win => write!(f, "{} wins with a line of four or more", self.player),
            OutcomeKind::Loss => write!(f, "{} loses with an isolated three-in-a-row", self.player),
            OutcomeKind::Draw => write!(f, "The board is full. The game is a draw"),
        }
    }
}

/// Position in the turn state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Player1Turn,
    Player2Turn,
    Won,
    Lost,
    Draw,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Phase::Player1Turn | Phase::Player2Turn)
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// One match: board, turn order and history
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    current_player: Player,
    history: Vec<Move>,

    /// Per player; only seat two can ever set it
    removal_used: [bool; 2],

    /// Most recent surviving placement per player
    last_placed: [Option<Hex>; 2],

    /// Cell a player may not take on their next placement
    forbidden_cell: [Option<Hex>; 2],

    outcome: Option<Outcome>,

    /// Run reported by the most recent `check_end`
    last_line: Vec<Hex>,
}

/// Start a game on a board of the given radius
pub fn new_game(radius: u32) -> Result<GameState, GameError> {
    GameState::new(radius)
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    pub fn new(radius: u32) -> Result<Self, GameError> {
        Ok(Self {
            board: Board::new(radius)?,
            current_player: Player::One,
            history: Vec::new(),
            removal_used: [false; 2],
            last_placed: [None; 2],
            forbidden_cell: [None; 2],
            outcome: None,
            last_line: Vec::new(),
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn removal_used(&self, player: Player) -> bool {
        self.removal_used[player.index()]
    }

    pub fn last_placed(&self, player: Player) -> Option<Hex> {
        self.last_placed[player.index()]
    }

    pub fn forbidden_cell(&self, player: Player) -> Option<Hex> {
        self.forbidden_cell[player.index()]
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Winning or losing run found by the last `check_end`; empty otherwise
    pub fn last_detected_line(&self) -> &[Hex] {
        &self.last_line
    }

    pub fn phase(&self) -> Phase {
        match (&self.outcome, self.current_player) {
            (None, Player::One) => Phase::Player1Turn,
            (None, Player::Two) => Phase::Player2Turn,
            (Some(o), _) => match o.kind {
                OutcomeKind::Win => Phase::Won,
                OutcomeKind::Loss => Phase::Lost,
                OutcomeKind::Draw => Phase::Draw,
            },
        }
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    fn ensure_ongoing(&self) -> Result<(), GameError> {
        if self.is_over() {
            Err(GameError::GameOver)
        } else {
            Ok(())
        }
    }

    /// Check a placement for the current player without applying it
    pub fn validate_place(&self, hex: Hex) -> Result<(), GameError> {
        self.ensure_ongoing()?;
        let cell = self.board.get(hex)?;
        if self.forbidden_cell(self.current_player) == Some(hex) {
            return Err(GameError::ForbiddenCell(hex));
        }
        if !cell.is_empty() {
            return Err(GameError::CellOccupied(hex));
        }
        Ok(())
    }

    /// Place the current player's stone
    pub fn place(&mut self, hex: Hex) -> Result<(), GameError> {
        self.validate_place(hex)?;

        let player = self.current_player;
        self.board.set(hex, Cell::Stone(player))?;
        self.history.push(Move {
            player,
            action: ActionKind::Place,
            hex,
        });
        self.last_placed[player.index()] = Some(hex);
        self.forbidden_cell[player.index()] = None;
        Ok(())
    }

    /// Whether the current player may neutralize right now.
    ///
    /// Only seat two, only once, and only directly after seat one placed.
    pub fn can_neutralize(&self) -> bool {
        let player = self.current_player;
        if self.is_over() || !player.can_ever_neutralize() || self.removal_used(player) {
            return false;
        }
        matches!(
            self.history.last(),
            Some(Move { player: last, action: ActionKind::Place, .. }) if *last != player
        )
    }

    /// Neutralize the opponent's most recent stone, returning its coordinate
    pub fn neutralize(&mut self) -> Result<Hex, GameError> {
        self.ensure_ongoing()?;
        if !self.can_neutralize() {
            return Err(GameError::NotAvailable);
        }
        let target = match self.history.last() {
            Some(last) => last.hex,
            None => return Err(GameError::NotAvailable),
        };

        let player = self.current_player;
        let opponent = player.opponent();
        self.board.set(target, Cell::Neutralized)?;
        self.history.push(Move {
            player,
            action: ActionKind::Neutralize,
            hex: target,
        });
        self.removal_used[player.index()] = true;
        self.last_placed[opponent.index()] = None;
        self.forbidden_cell[opponent.index()] = Some(target);
        Ok(target)
    }

    /// Apply an action without checking for the end of the game
    pub fn apply(&mut self, action: Action) -> Result<(), GameError> {
        match action {
            Action::Place(hex) => self.place(hex),
            Action::Neutralize => self.neutralize().map(|_| ()),
        }
    }

    // ========================================================================
    // OUTCOME
    // ========================================================================

    /// Winning and losing lines currently on the board for `player`
    pub fn evaluate(&self, player: Player) -> LineReport {
        lines::evaluate(&self.board, player)
    }

    /// Decide whether the current player's last action ended the game.
    ///
    /// A win is reported even if the same move also made an isolated three.
    /// A terminal outcome is stored and returned again on later calls.
    pub fn check_end(&mut self) -> Option<Outcome> {
        if let Some(outcome) = &self.outcome {
            return Some(outcome.clone());
        }

        let player = self.current_player;
        let report = self.evaluate(player);
        let outcome = if let Some(line) = report.winning_line {
            Outcome { kind: OutcomeKind::Win, player, line }
        } else if let Some(line) = report.losing_line {
            Outcome { kind: OutcomeKind::Loss, player, line }
        } else if self.board.is_full() {
            Outcome { kind: OutcomeKind::Draw, player, line: Vec::new() }
        } else {
            self.last_line.clear();
            return None;
        };

        self.last_line = outcome.line.clone();
        self.outcome = Some(outcome.clone());
        Some(outcome)
    }

    /// Pass the turn. Ignored once the game is over.
    pub fn switch_player(&mut self) {
        if !self.is_over() {
            self.current_player = self.current_player.opponent();
        }
    }

    /// Apply an action, check for the end, and pass the turn if play goes on
    pub fn play(&mut self, action: Action) -> Result<Option<Outcome>, GameError> {
        self.apply(action)?;
        let outcome = self.check_end();
        if outcome.is_none() {
            self.switch_player();
        }
        Ok(outcome)
    }

    // ========================================================================
    // LEGALITY
    // ========================================================================

    /// Empty cells the current player may take
    pub fn legal_cells(&self) -> Vec<Hex> {
        if self.is_over() {
            return Vec::new();
        }
        let forbidden = self.forbidden_cell(self.current_player);
        self.board
            .empty_cells()
            .into_iter()
            .filter(|hex| Some(*hex) != forbidden)
            .collect()
    }

    /// All actions the current player may submit
    pub fn legal_actions(&self) -> Vec<Action> {
        let mut actions: Vec<Action> = self.legal_cells().into_iter().map(Action::Place).collect();
        if self.can_neutralize() {
            actions.push(Action::Neutralize);
        }
        actions
    }

    pub fn is_legal(&self, action: &Action) -> bool {
        match action {
            Action::Place(hex) => self.validate_place(*hex).is_ok(),
            Action::Neutralize => self.can_neutralize(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
