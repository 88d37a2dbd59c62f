//! Line detection along the three hex axes
//!
//! A run is a maximal sequence of one player's stones along an axis. Runs
//! of four or more win; a run of exactly three, closed on both ends by
//! anything that is not the player's stone (including the board edge),
//! loses.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Hex, AXES};
use crate::game::Player;

/// Minimum run length that wins
pub const WIN_LENGTH: usize = 4;

/// Exact run length that loses
pub const LOSS_LENGTH: usize = 3;

/// A maximal run of one player's stones
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub player: Player,
    /// Index into [`AXES`]
    pub axis: usize,
    /// Cells from the first to the last stone
    pub cells: Vec<Hex>,
}

impl Run {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell just before the first stone
    pub fn before(&self) -> Hex {
        self.cells[0].offset(AXES[self.axis], -1)
    }

    /// Cell just past the last stone
    pub fn after(&self) -> Hex {
        self.cells[self.cells.len() - 1].offset(AXES[self.axis], 1)
    }

    pub fn is_win(&self) -> bool {
        self.len() >= WIN_LENGTH
    }

    /// Exactly three, with neither neighbor along the axis owned by the player
    pub fn is_loss(&self, board: &Board) -> bool {
        self.len() == LOSS_LENGTH
            && !board.is_owned_by(self.before(), self.player)
            && !board.is_owned_by(self.after(), self.player)
    }
}

/// Result of scanning a board for one player
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReport {
    /// First run of four or more found in scan order
    pub winning_line: Option<Vec<Hex>>,
    /// First isolated run of three found in scan order
    pub losing_line: Option<Vec<Hex>>,
}

impl LineReport {
    pub fn has_win(&self) -> bool {
        self.winning_line.is_some()
    }

    pub fn has_loss(&self) -> bool {
        self.losing_line.is_some()
    }
}

/// True if `hex` holds `player`'s stone and the cell behind it on `axis` does not
pub fn is_run_start(board: &Board, hex: Hex, axis: usize, player: Player) -> bool {
    board.is_owned_by(hex, player) && !board.is_owned_by(hex.offset(AXES[axis], -1), player)
}

/// Walk forward from `start` while cells hold `player`'s stones
fn walk(board: &Board, start: Hex, axis: usize, player: Player) -> Vec<Hex> {
    let mut cells = Vec::new();
    let mut cursor = start;
    while board.is_owned_by(cursor, player) {
        cells.push(cursor);
        cursor = cursor.offset(AXES[axis], 1);
    }
    cells
}

/// Every maximal run of `player`, each reported once from its first cell
pub fn runs(board: &Board, player: Player) -> Vec<Run> {
    let mut found = Vec::new();
    for hex in board.stones(player) {
        for axis in 0..AXES.len() {
            if is_run_start(board, hex, axis, player) {
                found.push(Run {
                    player,
                    axis,
                    cells: walk(board, hex, axis, player),
                });
            }
        }
    }
    found
}

/// Scan for `player`'s winning and losing lines.
///
/// Stops as soon as one of each has been seen.
pub fn evaluate(board: &Board, player: Player) -> LineReport {
    let mut report = LineReport::default();

    for hex in board.stones(player) {
        for axis in 0..AXES.len() {
            if !is_run_start(board, hex, axis, player) {
                continue;
            }
            let run = Run {
                player,
                axis,
                cells: walk(board, hex, axis, player),
            };
            if run.is_win() {
                if report.winning_line.is_none() {
                    report.winning_line = Some(run.cells);
                }
            } else if run.is_loss(board) && report.losing_line.is_none() {
                report.losing_line = Some(run.cells);
            }
            if report.has_win() && report.has_loss() {
                return report;
            }
        }
    }

    report
}

/// Stones of `player` adjacent to `hex` on one axis, counting both ways
fn count_on_axis(board: &Board, hex: Hex, axis: usize, player: Player) -> (usize, usize) {
    let count = |sign: i32| {
        (1..)
            .take_while(|&k| board.is_owned_by(hex.offset(AXES[axis], sign * k), player))
            .count()
    };
    (count(-1), count(1))
}

/// Length of the run on `axis` that would contain `hex` if `player` owned it.
///
/// `hex` itself is not inspected, so this answers "what if I place here"
/// without touching the board.
pub fn run_length_through_on_axis(board: &Board, hex: Hex, axis: usize, player: Player) -> usize {
    let (back, forward) = count_on_axis(board, hex, axis, player);
    back + forward + 1
}

/// Longest run through `hex` over all axes if `player` owned it
pub fn longest_run_through(board: &Board, hex: Hex, player: Player) -> usize {
    (0..AXES.len())
        .map(|axis| run_length_through_on_axis(board, hex, axis, player))
        .max()
        .unwrap_or(1)
}

/// Would a stone of `player` on `hex` complete a winning run?
pub fn completes_win(board: &Board, hex: Hex, player: Player) -> bool {
    longest_run_through(board, hex, player) >= WIN_LENGTH
}

/// Would a stone of `player` on `hex` leave an isolated three without winning?
///
/// Checks every run the new stone touches; runs elsewhere on the board are
/// unaffected by one placement.
pub fn creates_loss(board: &Board, hex: Hex, player: Player) -> bool {
    let lengths: Vec<usize> = (0..AXES.len())
        .map(|axis| run_length_through_on_axis(board, hex, axis, player))
        .collect();
    !lengths.iter().any(|&len| len >= WIN_LENGTH) && lengths.contains(&LOSS_LENGTH)
}

/// Empty cells where `player` would complete a winning run
pub fn winning_cells(board: &Board, player: Player) -> Vec<Hex> {
    board
        .empty_cells()
        .into_iter()
        .filter(|&hex| completes_win(board, hex, player))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, AXES};

    fn board_with(radius: u32, stones: &[(i32, i32, Player)]) -> Board {
        let mut board = Board::new(radius).unwrap();
        for &(q, r, p) in stones {
            board.set(Hex::new(q, r), Cell::Stone(p)).unwrap();
        }
        board
    }

    use Player::{One, Two};

    #[test]
    fn test_isolated_three_loses() {
        let board = board_with(3, &[(0, -1, One), (0, 0, One), (0, 1, One)]);
        let report = evaluate(&board, One);
        assert!(!report.has_win());
        assert_eq!(
            report.losing_line,
            Some(vec![Hex::new(0, -1), Hex::new(0, 0), Hex::new(0, 1)])
        );
    }

    #[test]
    fn test_four_wins() {
        let board = board_with(
            3,
            &[(-1, 0, One), (0, 0, One), (1, 0, One), (2, 0, One)],
        );
        let report = evaluate(&board, One);
        assert_eq!(report.winning_line.as_ref().map(Vec::len), Some(4));
        assert!(!report.has_loss());
    }

    #[test]
    fn test_three_against_edge_loses() {
        // The r = -2 row of a radius-2 board holds exactly three cells
        let board = board_with(2, &[(0, -2, One), (1, -2, One), (2, -2, One)]);
        assert!(evaluate(&board, One).has_loss());
    }

    #[test]
    fn test_three_closed_by_opponent_and_neutralized() {
        let mut board = board_with(
            3,
            &[(-2, 0, Two), (-1, 0, One), (0, 0, One), (1, 0, One)],
        );
        board.set(Hex::new(2, 0), Cell::Neutralized).unwrap();
        assert!(evaluate(&board, One).has_loss());
        assert!(!evaluate(&board, Two).has_loss());
    }

    #[test]
    fn test_two_is_harmless() {
        let board = board_with(3, &[(0, 0, One), (1, 0, One)]);
        assert_eq!(evaluate(&board, One), LineReport::default());
    }

    #[test]
    fn test_win_and_loss_both_reported() {
        let board = board_with(
            4,
            &[
                (-2, 0, One),
                (-1, 0, One),
                (0, 0, One),
                (1, 0, One),
                (0, 1, One),
                (0, 2, One),
            ],
        );
        let report = evaluate(&board, One);
        assert!(report.has_win());
        assert!(report.has_loss());
    }

    #[test]
    fn test_runs_visits_each_run_once() {
        let board = board_with(3, &[(0, 0, One), (1, 0, One), (2, 0, One)]);
        let all = runs(&board, One);
        // One run of three on axis 0, three singletons on each other axis
        assert_eq!(all.iter().filter(|r| r.len() == 3).count(), 1);
        assert_eq!(all.iter().filter(|r| r.len() == 1).count(), 6);
    }

    #[test]
    fn test_hypothetical_queries() {
        let board = board_with(3, &[(0, 0, One), (1, 0, One), (3, 0, One)]);
        let gap = Hex::new(2, 0);
        assert_eq!(longest_run_through(&board, gap, One), 4);
        assert!(completes_win(&board, gap, One));
        assert!(!completes_win(&board, gap, Two));
        assert!(creates_loss(&board, Hex::new(-1, 0), One));
        assert!(!creates_loss(&board, gap, One));
        assert_eq!(winning_cells(&board, One), vec![gap]);
    }

    /// Axis-aligned lines of the board, each ordered along its axis
    fn board_lines(board: &Board) -> Vec<(usize, Vec<Hex>)> {
        let mut lines = Vec::new();
        for axis in 0..AXES.len() {
            for &hex in board.coords() {
                if board.is_valid(hex.offset(AXES[axis], -1)) {
                    continue;
                }
                let line: Vec<Hex> = (0..)
                    .map(|k| hex.offset(AXES[axis], k))
                    .take_while(|h| board.is_valid(*h))
                    .collect();
                lines.push((axis, line));
            }
        }
        lines
    }

    /// Segment every line into runs without using the run-start rule
    fn reference(board: &Board, lines: &[(usize, Vec<Hex>)], player: Player) -> (bool, bool) {
        let mut win = false;
        let mut loss = false;
        for (_, line) in lines {
            let mut len = 0;
            for hex in line.iter().map(Some).chain(std::iter::once(None)) {
                if hex.map_or(false, |h| board.is_owned_by(*h, player)) {
                    len += 1;
                    continue;
                }
                win |= len >= WIN_LENGTH;
                loss |= len == LOSS_LENGTH;
                len = 0;
            }
        }
        (win, loss)
    }

    /// Only ownership by the scanned player matters to the evaluator, so a
    /// bitmask over the cells covers every distinct position.
    fn check_exhaustive(radius: u32) {
        let mut board = Board::new(radius).unwrap();
        let coords = board.coords().to_vec();
        let lines = board_lines(&board);

        for mask in 0u32..(1 << coords.len()) {
            for (i, &hex) in coords.iter().enumerate() {
                let cell = if mask & (1 << i) != 0 {
                    Cell::Stone(One)
                } else {
                    Cell::Empty
                };
                board.set(hex, cell).unwrap();
            }

            let report = evaluate(&board, One);
            let (win, loss) = reference(&board, &lines, One);
            assert_eq!(report.has_win(), win, "win mismatch for mask {mask:#b}");
            assert_eq!(report.has_loss(), loss, "loss mismatch for mask {mask:#b}");

            if let Some(line) = &report.winning_line {
                assert!(line.len() >= WIN_LENGTH);
                assert!(line.iter().all(|h| board.is_owned_by(*h, One)));
            }
            if let Some(line) = &report.losing_line {
                assert_eq!(line.len(), LOSS_LENGTH);
                assert!(line.iter().all(|h| board.is_owned_by(*h, One)));
            }
        }
    }

    #[test]
    fn test_exhaustive_radius_1() {
        check_exhaustive(1);
    }

    #[test]
    fn test_exhaustive_radius_2() {
        check_exhaustive(2);
    }
}
