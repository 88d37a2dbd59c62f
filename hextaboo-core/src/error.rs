//! Rule engine errors

use crate::board::Hex;
use crate::game::Player;

/// Rejected action or construction. Every variant leaves state unchanged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("coordinate {0} is outside the board")]
    OutOfBounds(Hex),

    #[error("cell {0} is already occupied")]
    CellOccupied(Hex),

    #[error("cell {0} was just neutralized and cannot be reclaimed this turn")]
    ForbiddenCell(Hex),

    #[error("neutralization is not available")]
    NotAvailable,

    #[error("invalid board radius {0} (must be between 1 and 32)")]
    InvalidRadius(u32),

    #[error("the game is already over")]
    GameOver,

    #[error("it is not {0}'s turn")]
    NotYourTurn(Player),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            GameError::OutOfBounds(Hex::new(5, -1)).to_string(),
            "coordinate (5, -1) is outside the board"
        );
        assert_eq!(
            GameError::InvalidRadius(0).to_string(),
            "invalid board radius 0 (must be between 1 and 32)"
        );
        assert_eq!(
            GameError::NotAvailable.to_string(),
            "neutralization is not available"
        );
    }
}
