//! Game status tracking and result messages
//!
//! [`GameStatus`] is derived read-only from the rules engine after every ply.
//!
//! # Terminal Conditions
//!
//! Checked in this order, the first that holds wins:
//!
//! 1. **Checkmate**: side to move is in check with no legal moves
//! 2. **Stalemate**: side to move has no legal moves and is not in check
//! 3. **Insufficient material**: neither side can deliver mate
//! 4. **75-move rule**: 150 plies without a capture or pawn move
//! 5. **Fivefold repetition**: the same position occurred five times
//!
//! All non-`InProgress` states are terminal.

/// Status of the current game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameStatus {
    /// Moves are still being played
    #[default]
    InProgress,

    /// The side to move has been checkmated
    Checkmate,

    /// The side to move has no legal move but is not in check
    Stalemate,

    /// Neither side has enough material to mate
    DrawInsufficientMaterial,

    /// 75 full moves without a capture or pawn move
    DrawSeventyFiveMoves,

    /// Same position five times
    DrawFivefoldRepetition,
}

impl GameStatus {
    /// Check if the game has ended
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// Check if the game ended in a draw
    pub fn is_draw(self) -> bool {
        matches!(
            self,
            GameStatus::Stalemate
                | GameStatus::DrawInsufficientMaterial
                | GameStatus::DrawSeventyFiveMoves
                | GameStatus::DrawFivefoldRepetition
        )
    }

    /// Banner text for a finished game, `None` while playing
    pub fn message(self) -> Option<&'static str> {
        match self {
            GameStatus::InProgress => None,
            GameStatus::Checkmate => Some("Checkmate"),
            GameStatus::Stalemate => Some("Stalemate"),
            GameStatus::DrawInsufficientMaterial => Some("Draw due to insufficient material"),
            GameStatus::DrawSeventyFiveMoves => Some("Draw due to 75-move rule"),
            GameStatus::DrawFivefoldRepetition => Some("Draw due to fivefold repetition"),
        }
    }
}
