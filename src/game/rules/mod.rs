//! Chess rules module - the rules-engine capability
//!
//! The interaction layer never implements chess rules itself. It talks to a
//! [`RulesEngine`], which tracks the position, answers legality queries and
//! detects terminal states. [`ChessRules`] is the `shakmaty`-backed
//! implementation; tests may substitute their own.
//!
//! # Module Structure
//!
//! - `board_state` - [`ChessRules`], position history and repetition tracking

pub mod board_state;

pub use board_state::ChessRules;

use crate::game::error::GameResult;
use crate::game::resources::GameStatus;
use crate::game::types::{Move, Piece, PieceColor, Square};

/// Serialized position handed to the engine
///
/// The start position plus the full move history, which is what the engine's
/// `position` command takes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionSnapshot {
    /// Starting FEN, `None` for the standard initial position
    pub start_fen: Option<String>,
    /// Moves played since the start position
    pub moves: Vec<Move>,
}

impl PositionSnapshot {
    pub fn startpos() -> Self {
        PositionSnapshot {
            start_fen: None,
            moves: Vec::new(),
        }
    }
}

/// Rules-engine capability consumed by the controller and the resolver
pub trait RulesEngine {
    /// Colour whose turn it is
    fn side_to_move(&self) -> PieceColor;

    /// Occupant of `square`, if any
    fn piece_at(&self, square: Square) -> Option<Piece>;

    /// Every legal move in the current position
    fn legal_moves(&self) -> Vec<Move>;

    /// Membership test against the legal-move set
    fn is_legal(&self, mv: &Move) -> bool {
        self.legal_moves().contains(mv)
    }

    /// Squares reachable from `from`, sorted, each once
    ///
    /// The four promotions to one square count as one destination.
    fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut destinations: Vec<Square> = self
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.from == from)
            .map(|mv| mv.to)
            .collect();
        destinations.sort();
        destinations.dedup();
        destinations
    }

    /// Apply a legal move
    ///
    /// # Errors
    /// [`crate::game::GameError::IllegalMove`] if `mv` is not legal; the
    /// position is unchanged in that case.
    fn push(&mut self, mv: &Move) -> GameResult<()>;

    /// Terminal-state detection for the current position
    fn status(&self) -> GameStatus;

    /// Back to the starting position
    fn reset(&mut self);

    /// Position in a form the engine can be sent
    fn position(&self) -> PositionSnapshot;

    /// Plies played since the start position
    fn ply_count(&self) -> usize;

    /// Render `line` in SAN starting from the current position
    ///
    /// Stops at the first move that is not legal in sequence.
    fn san_line(&self, line: &[Move]) -> Vec<String>;
}
