//! Static position evaluation

use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell, Hex, AXES};
use crate::game::Player;
use crate::lines::{self, WIN_LENGTH};

/// Score of a decided game (effectively infinite)
pub const WIN_VALUE: f32 = 100000.0;

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Heuristics {
    /// Run of four or more
    pub win_weight: f32,
    /// Split three: four-cell window of three stones around one inner gap
    pub open_three_weight: f32,
    /// Isolated run of exactly three (negative: it loses)
    pub closed_three_weight: f32,
    /// Per stone, per step closer to the center
    pub center_weight: f32,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            win_weight: 1000.0,
            open_three_weight: 100.0,
            closed_three_weight: -500.0,
            center_weight: 0.5,
        }
    }
}

/// Evaluate the board from `player`'s perspective
pub fn evaluate(board: &Board, player: Player, heuristics: &Heuristics) -> f32 {
    side_score(board, player, heuristics) - side_score(board, player.opponent(), heuristics)
}

/// Everything `player`'s stones are worth, ignoring the opponent
pub fn side_score(board: &Board, player: Player, heuristics: &Heuristics) -> f32 {
    let mut score = 0.0f32;

    for run in lines::runs(board, player) {
        if run.is_win() {
            score += heuristics.win_weight;
        } else if run.is_loss(board) {
            score += heuristics.closed_three_weight;
        }
    }

    score += heuristics.open_three_weight * open_threes(board, player) as f32;

    let radius = board.radius() as f32;
    for hex in board.stones(player) {
        score += heuristics.center_weight * (radius - hex.distance_to_center() as f32);
    }

    score
}

/// Count four-cell windows with three of `player`'s stones and an inner gap.
///
/// A gap at either end of the window would mean the stones already form a
/// run of three, which is a lost position rather than a threat.
pub fn open_threes(board: &Board, player: Player) -> usize {
    let mut count = 0;
    for &start in board.coords() {
        for &axis in &AXES {
            if window_is_open_three(board, start, axis, player) {
                count += 1;
            }
        }
    }
    count
}

fn window_is_open_three(board: &Board, start: Hex, axis: (i32, i32), player: Player) -> bool {
    let last = WIN_LENGTH as i32 - 1;
    let mut gaps = 0;
    for k in 0..=last {
        match board.cell(start.offset(axis, k)) {
            Some(Cell::Stone(p)) if p == player => {}
            Some(Cell::Empty) if k != 0 && k != last => gaps += 1,
            _ => return false,
        }
    }
    gaps == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(board: &mut Board, q: i32, r: i32, player: Player) {
        board.set(Hex::new(q, r), Cell::Stone(player)).unwrap();
    }

    #[test]
    fn test_evaluate_symmetric() {
        let mut board = Board::new(3).unwrap();
        place(&mut board, 1, 0, Player::One);
        place(&mut board, -1, 0, Player::Two);
        let h = Heuristics::default();
        assert_eq!(evaluate(&board, Player::One, &h), 0.0);
        assert_eq!(evaluate(&board, Player::Two, &h), 0.0);
    }

    #[test]
    fn test_open_three_rewarded() {
        let mut board = Board::new(3).unwrap();
        for (q, r) in [(-2, 0), (-1, 0), (1, 0)] {
            place(&mut board, q, r, Player::One);
        }
        assert_eq!(open_threes(&board, Player::One), 1);
        let h = Heuristics::default();
        assert!(evaluate(&board, Player::One, &h) > 100.0);
        assert!(evaluate(&board, Player::Two, &h) < -100.0);
    }

    #[test]
    fn test_closed_three_penalized() {
        let mut board = Board::new(3).unwrap();
        for (q, r) in [(0, -1), (0, 0), (0, 1)] {
            place(&mut board, q, r, Player::One);
        }
        let h = Heuristics::default();
        assert!(evaluate(&board, Player::One, &h) < -400.0);
        assert!(evaluate(&board, Player::Two, &h) > 400.0);
    }

    #[test]
    fn test_center_preferred() {
        let h = Heuristics::default();
        let mut center = Board::new(3).unwrap();
        place(&mut center, 0, 0, Player::One);
        let mut edge = Board::new(3).unwrap();
        place(&mut edge, 3, 0, Player::One);
        assert!(evaluate(&center, Player::One, &h) > evaluate(&edge, Player::One, &h));
    }

    #[test]
    fn test_default_heuristics() {
        let h = Heuristics::default();
        assert!(h.win_weight > h.open_three_weight);
        assert!(h.closed_three_weight < 0.0);
        assert!(h.center_weight > 0.0);
    }
}
