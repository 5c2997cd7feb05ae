//! Turn state management for human/engine alternation
//!
//! Tracks where we are within the current ply so that completed drags are
//! only turned into moves while the human is to move, and so that only one
//! engine search is outstanding at a time.

use tracing::error;

use crate::game::error::{GameError, GameResult};
use crate::game::types::PieceColor;

/// Fine-grained turn flow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TurnPhase {
    /// Waiting for the human to drag a piece
    ///
    /// Valid transitions: → HumanMoveApplied, → AwaitingEngineReply (reset as black)
    #[default]
    AwaitingHumanInput,

    /// A legal human move has just been pushed to the rules engine
    ///
    /// Valid transitions: → AwaitingEngineReply, → GameOver
    HumanMoveApplied,

    /// A best-move request is in flight
    ///
    /// Drags stay visually responsive but completed moves are ignored.
    /// Valid transitions: → EngineMoveApplied, → GameOver (engine failure)
    AwaitingEngineReply,

    /// The engine's reply has just been pushed to the rules engine
    ///
    /// Valid transitions: → AwaitingHumanInput, → GameOver
    EngineMoveApplied,

    /// Terminal state; only a reset leaves it
    GameOver,
}

impl TurnPhase {
    /// Check if this state turns completed drags into moves
    pub fn accepts_input(self) -> bool {
        matches!(self, TurnPhase::AwaitingHumanInput)
    }

    /// Check if an engine search is outstanding
    pub fn is_engine_thinking(self) -> bool {
        matches!(self, TurnPhase::AwaitingEngineReply)
    }

    fn can_transition_to(self, next: TurnPhase) -> bool {
        use TurnPhase::*;
        matches!(
            (self, next),
            (AwaitingHumanInput, HumanMoveApplied)
                | (AwaitingHumanInput, AwaitingEngineReply)
                | (HumanMoveApplied, AwaitingEngineReply)
                | (HumanMoveApplied, GameOver)
                | (AwaitingEngineReply, EngineMoveApplied)
                | (AwaitingEngineReply, GameOver)
                | (EngineMoveApplied, AwaitingHumanInput)
                | (EngineMoveApplied, GameOver)
        )
    }
}

/// Combines the human's colour with the current turn phase
///
/// This provides context about both WHO the human plays and WHAT PHASE
/// of the ply we're in.
#[derive(Debug, Clone)]
pub struct TurnStateContext {
    /// Colour controlled by pointer input
    pub human_color: PieceColor,

    /// What phase of the turn are we in?
    pub phase: TurnPhase,

    /// Move number (increments after black moves)
    pub move_number: u32,
}

impl Default for TurnStateContext {
    fn default() -> Self {
        Self::new(PieceColor::White)
    }
}

impl TurnStateContext {
    pub fn new(human_color: PieceColor) -> Self {
        Self {
            human_color,
            phase: TurnPhase::AwaitingHumanInput,
            move_number: 1,
        }
    }

    pub fn engine_color(&self) -> PieceColor {
        self.human_color.opposite()
    }

    /// Transition to the next turn phase
    ///
    /// # Errors
    /// Returns [`GameError::InvalidStateTransition`] and leaves the phase
    /// untouched if the edge is not part of the turn machine.
    pub fn transition_to(&mut self, next_phase: TurnPhase) -> GameResult<()> {
        if !self.phase.can_transition_to(next_phase) {
            error!(
                "[TURN] Invalid turn state transition: {:?} -> {:?}",
                self.phase, next_phase
            );
            return Err(GameError::InvalidStateTransition {
                from: self.phase,
                to: next_phase,
            });
        }
        self.phase = next_phase;
        Ok(())
    }

    /// Force the terminal state from any phase (engine failure)
    pub fn abort(&mut self) {
        self.phase = TurnPhase::GameOver;
    }

    /// Count a ply played by `mover`
    pub fn record_ply(&mut self, mover: PieceColor) {
        if mover == PieceColor::Black {
            self.move_number += 1;
        }
    }

    /// Start a fresh game with `human_color` at the bottom
    pub fn reset(&mut self, human_color: PieceColor) {
        *self = Self::new(human_color);
    }
}
