//! Error types for game module
//!
//! Provides the error taxonomy for the interaction layer: pointer input,
//! move resolution, turn sequencing and the engine process bridge.

use std::path::PathBuf;

use crate::game::resources::TurnPhase;
use crate::game::types::Move;

/// Errors that can occur in game logic
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Pointer position outside the 8x8 board area
    #[error("Pointer position ({x}, {y}) is outside the board")]
    OutOfBounds { x: f32, y: f32 },

    /// Candidate move is not in the legal-move set
    #[error("Illegal move: {mv}")]
    IllegalMove { mv: Move },

    /// The promotion prompt was dismissed without a choice
    #[error("Promotion cancelled")]
    PromotionCancelled,

    /// A completed drag arrived while it was not the human's turn
    #[error("Move ignored: not accepting moves while {phase:?}")]
    MoveRejectedWhileBusy { phase: TurnPhase },

    /// One engine option was refused (unknown or out of advertised bounds)
    #[error("Engine rejected option '{option}': {reason}")]
    EngineConfigRejected { option: String, reason: String },

    /// Malformed or missing reply from the engine process
    #[error("Engine protocol error: {message}")]
    EngineProtocol { message: String },

    /// The engine executable could not be launched or died
    #[error("Engine process unavailable at {path:?}: {source}")]
    EngineProcessUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A position could not be set up (bad FEN or illegal setup)
    #[error("Invalid position: {message}")]
    InvalidPosition { message: String },

    /// Invalid turn state transition
    #[error("Invalid turn state transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: TurnPhase, to: TurnPhase },
}

impl GameError {
    /// Whether this error ends the current game session
    ///
    /// Input and move errors only return control to the human; engine
    /// process failures leave the turn state unrecoverable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GameError::EngineProtocol { .. } | GameError::EngineProcessUnavailable { .. }
        )
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        GameError::EngineProtocol {
            message: message.into(),
        }
    }

    pub(crate) fn config_rejected(option: impl Into<String>, reason: impl Into<String>) -> Self {
        GameError::EngineConfigRejected {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
