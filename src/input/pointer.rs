//! Pointer drag-and-drop state machine
//!
//! Turns raw press/move/release events into piece pick-ups and completed
//! drags. It never decides legality: a release always ends the drag and
//! reports where the piece was dropped, and the move resolver takes it from
//! there.
//!
//! # States
//!
//! ```text
//! Idle --press on own piece--> Dragging --release--> Idle
//!  ^ |                          |    ^
//!  | +--anything else (no-op)   +move+  (pointer position only)
//! ```
//!
//! "Own" means the colour of the human at the bottom of the board. Pressing
//! an empty square, an off-board pixel or an engine piece leaves the
//! controller `Idle`. The human's pieces can be lifted while the engine
//! thinks; the turn logic refuses the drop.

use tracing::{debug, trace};

use crate::game::rules::RulesEngine;
use crate::game::types::Square;
use crate::rendering::board::coordinates::{BoardOrientation, CoordinateMapper, Pixel};

/// Raw pointer input in board-local pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(Pixel),
    Move(Pixel),
    Release(Pixel),
}

/// Read-only view the renderer draws from
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        origin: Square,
        /// e.g. `"pawn_white"`
        piece_glyph_id: String,
        pointer_pos: Pixel,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// Square whose piece is lifted, if any
    pub fn origin(&self) -> Option<Square> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { origin, .. } => Some(*origin),
        }
    }

    /// Top-left corner for drawing the lifted glyph centred on the pointer
    pub fn glyph_anchor(&self, square_size: u32) -> Option<Pixel> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { pointer_pos, .. } => {
                let half = square_size as f32 / 2.0;
                Some(Pixel::new(pointer_pos.x - half, pointer_pos.y - half))
            }
        }
    }
}

/// A finished drag, legal or not
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedDrag {
    pub origin: Square,
    pub destination: Square,
    pub release_pixel: Pixel,
}

/// What a pointer event produced
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    /// A piece was lifted
    PickedUp { origin: Square, glyph_id: String },
    /// The piece was dropped on a square
    Dropped(CompletedDrag),
    /// The piece was dropped outside the board
    Cancelled { origin: Square, release_pixel: Pixel },
}

#[derive(Debug, Default)]
pub struct DragInputController {
    state: DragState,
}

impl DragInputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Drop whatever is being dragged without emitting anything
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Feed one pointer event through the state machine
    pub fn handle<R>(
        &mut self,
        event: PointerEvent,
        mapper: &CoordinateMapper,
        orientation: BoardOrientation,
        rules: &R,
    ) -> Option<DragEvent>
    where
        R: RulesEngine + ?Sized,
    {
        match (&mut self.state, event) {
            (DragState::Idle, PointerEvent::Press(pixel)) => {
                let square = match mapper.square_at(pixel, orientation) {
                    Ok(square) => square,
                    Err(e) => {
                        trace!("[INPUT] Press ignored: {}", e);
                        return None;
                    }
                };
                let piece = rules.piece_at(square)?;
                if piece.color != orientation.human_color() {
                    debug!(
                        "[INPUT] {} on {} is not the human's piece",
                        piece.glyph_id(),
                        square
                    );
                    return None;
                }
                let glyph_id = piece.glyph_id();
                debug!("[INPUT] Picked up {} from {}", glyph_id, square);
                self.state = DragState::Dragging {
                    origin: square,
                    piece_glyph_id: glyph_id.clone(),
                    pointer_pos: pixel,
                };
                Some(DragEvent::PickedUp {
                    origin: square,
                    glyph_id,
                })
            }
            (DragState::Dragging { pointer_pos, .. }, PointerEvent::Move(pixel)) => {
                *pointer_pos = pixel;
                None
            }
            (DragState::Dragging { origin, .. }, PointerEvent::Release(pixel)) => {
                let origin = *origin;
                self.state = DragState::Idle;
                match mapper.square_at(pixel, orientation) {
                    Ok(destination) => {
                        debug!("[INPUT] Dropped {} -> {}", origin, destination);
                        Some(DragEvent::Dropped(CompletedDrag {
                            origin,
                            destination,
                            release_pixel: pixel,
                        }))
                    }
                    Err(_) => {
                        debug!("[INPUT] Dropped {} off the board", origin);
                        Some(DragEvent::Cancelled {
                            origin,
                            release_pixel: pixel,
                        })
                    }
                }
            }
            // a second press while dragging keeps the first drag
            (DragState::Dragging { .. }, PointerEvent::Press(_)) => None,
            (DragState::Idle, _) => None,
        }
    }
}
