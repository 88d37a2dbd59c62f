//! Hex board geometry with axial coordinates

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::game::Player;

/// Largest radius accepted by [`Board::new`]
pub const MAX_RADIUS: u32 = 32;

/// Axial hex coordinates (s = -q - r is implied)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const ORIGIN: Hex = Hex::new(0, 0);

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Third cube coordinate
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Check if this hex lies inside a disk of the given radius
    pub fn is_within(&self, radius: u32) -> bool {
        let radius = radius as i64;
        (self.q as i64).abs() <= radius
            && (self.r as i64).abs() <= radius
            && (self.q as i64 + self.r as i64).abs() <= radius
    }

    /// Distance from center (0,0)
    pub fn distance_to_center(&self) -> i32 {
        (self.q.abs() + self.r.abs() + self.s().abs()) / 2
    }

    /// Distance between two hexes
    pub fn distance_to(&self, other: Hex) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        (dq + dr + ds) / 2
    }

    /// Step `steps` cells along a direction vector
    pub fn offset(&self, (dq, dr): (i32, i32), steps: i32) -> Hex {
        Hex::new(self.q + dq * steps, self.r + dr * steps)
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> Hex {
        self.offset(DIRECTIONS[direction % 6], 1)
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// The three line axes. Each is scanned forward; its negation is the
/// backward direction.
pub const AXES: [(i32, i32); 3] = [(1, 0), (0, 1), (-1, 1)];

/// All six neighbor directions: the axes followed by their negations
pub const DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (0, -1),
    (1, -1),
];

/// Occupancy of a single board cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Stone(Player),
    /// Removed stone; blocks placement and ends lines, owned by nobody
    Neutralized,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    pub fn is_owned_by(self, player: Player) -> bool {
        self == Cell::Stone(player)
    }

    /// Single-character token used by the text dump
    pub fn token(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Stone(Player::One) => 'X',
            Cell::Stone(Player::Two) => 'O',
            Cell::Neutralized => '#',
        }
    }
}

/// All hexes of a disk of `radius`, ordered by q then r
pub fn generate(radius: u32) -> Vec<Hex> {
    let radius = radius as i32;
    let mut coords = Vec::new();
    for q in -radius..=radius {
        let r_min = (-radius).max(-q - radius);
        let r_max = radius.min(-q + radius);
        for r in r_min..=r_max {
            coords.push(Hex::new(q, r));
        }
    }
    coords
}

/// Number of cells in a disk of `radius`
pub fn cell_count(radius: u32) -> usize {
    let radius = radius as usize;
    1 + 3 * radius * (radius + 1)
}

/// Hex-disk board. Cells live in a flat arena indexed by coordinate, so
/// cloning a board for search is a single vector copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    radius: u32,
    coords: Arc<[Hex]>,
    /// Arena index of the first cell of each q-row
    row_starts: Arc<[usize]>,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(radius: u32) -> Result<Self, GameError> {
        if radius < 1 || radius > MAX_RADIUS {
            return Err(GameError::InvalidRadius(radius));
        }

        let coords = generate(radius);
        let r = radius as i32;
        let mut row_starts = Vec::with_capacity(2 * radius as usize + 1);
        let mut start = 0;
        for q in -r..=r {
            row_starts.push(start);
            start += (2 * r + 1 - q.abs()) as usize;
        }
        debug_assert_eq!(start, coords.len());

        Ok(Self {
            radius,
            cells: vec![Cell::Empty; coords.len()],
            coords: coords.into(),
            row_starts: row_starts.into(),
        })
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Number of cells on the board
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All coordinates in stable enumeration order
    pub fn coords(&self) -> &[Hex] {
        &self.coords
    }

    pub fn is_valid(&self, hex: Hex) -> bool {
        self.index(hex).is_some()
    }

    fn index(&self, hex: Hex) -> Option<usize> {
        if !hex.is_within(self.radius) {
            return None;
        }
        let radius = self.radius as i32;
        let r_min = (-radius).max(-hex.q - radius);
        let row = self.row_starts[(hex.q + radius) as usize];
        Some(row + (hex.r - r_min) as usize)
    }

    pub fn get(&self, hex: Hex) -> Result<Cell, GameError> {
        self.cell(hex).ok_or(GameError::OutOfBounds(hex))
    }

    pub fn set(&mut self, hex: Hex, cell: Cell) -> Result<(), GameError> {
        let idx = self.index(hex).ok_or(GameError::OutOfBounds(hex))?;
        self.cells[idx] = cell;
        Ok(())
    }

    /// Lookup that treats off-board hexes as absent
    pub fn cell(&self, hex: Hex) -> Option<Cell> {
        self.index(hex).map(|idx| self.cells[idx])
    }

    /// True if `hex` is on the board and holds `player`'s stone
    pub fn is_owned_by(&self, hex: Hex, player: Player) -> bool {
        self.cell(hex) == Some(Cell::Stone(player))
    }

    pub fn is_full(&self) -> bool {
        !self.cells.iter().any(|c| c.is_empty())
    }

    pub fn empty_cells(&self) -> Vec<Hex> {
        self.iter()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(hex, _)| hex)
            .collect()
    }

    /// Iterate (hex, cell) in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (Hex, Cell)> + '_ {
        self.coords.iter().copied().zip(self.cells.iter().copied())
    }

    /// Hexes holding `player`'s stones
    pub fn stones(&self, player: Player) -> impl Iterator<Item = Hex> + '_ {
        self.iter()
            .filter(move |(_, cell)| cell.is_owned_by(player))
            .map(|(hex, _)| hex)
    }

    /// Owned copy of every (coordinate, occupancy) pair
    pub fn snapshot(&self) -> Vec<(Hex, Cell)> {
        self.iter().collect()
    }
}

impl fmt::Display for Board {
    /// Rows of constant r, shifted so that neighbouring rows interleave
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let radius = self.radius as i32;
        for r in -radius..=radius {
            let row: Vec<String> = (-radius..=radius)
                .filter_map(|q| self.cell(Hex::new(q, r)))
                .map(|cell| cell.token().to_string())
                .collect();
            write!(f, "{}{}", " ".repeat(r.unsigned_abs() as usize), row.join(" "))?;
            if r < radius {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_validity() {
        assert!(Hex::new(0, 0).is_within(4));
        assert!(Hex::new(4, 0).is_within(4));
        assert!(Hex::new(0, 4).is_within(4));
        assert!(Hex::new(-4, 0).is_within(4));
        assert!(!Hex::new(5, 0).is_within(4));
        assert!(!Hex::new(3, 3).is_within(4)); // q + r = 6 > 4
    }

    #[test]
    fn test_distance() {
        assert_eq!(Hex::new(0, 0).distance_to_center(), 0);
        assert_eq!(Hex::new(1, 0).distance_to_center(), 1);
        assert_eq!(Hex::new(2, -4).distance_to_center(), 4);
        assert_eq!(Hex::new(1, -1).distance_to(Hex::new(-1, 1)), 2);
    }

    #[test]
    fn test_cell_count() {
        for radius in 1..=8 {
            let board = Board::new(radius).unwrap();
            assert_eq!(board.len(), cell_count(radius));
        }
        assert_eq!(Board::new(4).unwrap().len(), 61);
    }

    #[test]
    fn test_generated_coords_within_radius() {
        for radius in 1..=6u32 {
            let r = radius as i32;
            for hex in generate(radius) {
                assert!(hex.q.abs() <= r && hex.r.abs() <= r && (hex.q + hex.r).abs() <= r);
            }
        }
    }

    #[test]
    fn test_index_is_bijective() {
        let board = Board::new(5).unwrap();
        for (i, hex) in board.coords().iter().enumerate() {
            assert_eq!(board.index(*hex), Some(i));
        }
    }

    #[test]
    fn test_invalid_radius() {
        assert!(matches!(Board::new(0), Err(GameError::InvalidRadius(0))));
        assert!(matches!(
            Board::new(MAX_RADIUS + 1),
            Err(GameError::InvalidRadius(_))
        ));
    }

    #[test]
    fn test_get_set() {
        let mut board = Board::new(2).unwrap();
        let origin = Hex::ORIGIN;
        assert_eq!(board.get(origin).unwrap(), Cell::Empty);
        board.set(origin, Cell::Stone(Player::One)).unwrap();
        assert_eq!(board.get(origin).unwrap(), Cell::Stone(Player::One));

        let outside = Hex::new(5, 5);
        assert_eq!(board.get(outside), Err(GameError::OutOfBounds(outside)));
        assert_eq!(
            board.set(outside, Cell::Empty),
            Err(GameError::OutOfBounds(outside))
        );
    }

    #[test]
    fn test_is_full_counts_neutralized() {
        let mut board = Board::new(1).unwrap();
        let coords = board.coords().to_vec();
        for (i, hex) in coords.iter().enumerate() {
            assert!(!board.is_full());
            let cell = if i == 0 {
                Cell::Neutralized
            } else {
                Cell::Stone(Player::Two)
            };
            board.set(*hex, cell).unwrap();
        }
        assert!(board.is_full());
        assert!(board.empty_cells().is_empty());
    }

    #[test]
    fn test_render() {
        let mut board = Board::new(1).unwrap();
        board.set(Hex::new(0, 0), Cell::Stone(Player::One)).unwrap();
        board.set(Hex::new(1, -1), Cell::Stone(Player::Two)).unwrap();
        board.set(Hex::new(-1, 1), Cell::Neutralized).unwrap();
        assert_eq!(board.to_string(), " . O\n. X .\n # .");
    }
}
