//! Pawn promotion prompt
//!
//! When a pawn is dropped on its last rank the move resolver blocks on a
//! [`PromotionPrompt`] for the piece to promote to. The prompt may decline,
//! which discards the move.

use crate::game::types::{PieceColor, PieceKind, Square};

/// The four pieces a pawn may become
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionChoice {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionChoice {
    pub const ALL: [PromotionChoice; 4] = [
        PromotionChoice::Queen,
        PromotionChoice::Rook,
        PromotionChoice::Bishop,
        PromotionChoice::Knight,
    ];

    /// Parse a menu answer: `q`, `queen`, `N`, ...
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "q" | "queen" => Some(PromotionChoice::Queen),
            "r" | "rook" => Some(PromotionChoice::Rook),
            "b" | "bishop" => Some(PromotionChoice::Bishop),
            "n" | "knight" => Some(PromotionChoice::Knight),
            _ => None,
        }
    }
}

impl From<PromotionChoice> for PieceKind {
    fn from(choice: PromotionChoice) -> Self {
        match choice {
            PromotionChoice::Queen => PieceKind::Queen,
            PromotionChoice::Rook => PieceKind::Rook,
            PromotionChoice::Bishop => PieceKind::Bishop,
            PromotionChoice::Knight => PieceKind::Knight,
        }
    }
}

/// Blocking UI prompt asking which piece a pawn promotes to
///
/// Returns `None` when the player dismisses the prompt.
pub trait PromotionPrompt {
    fn choose(&mut self, color: PieceColor, square: Square) -> Option<PromotionChoice>;
}

impl<F> PromotionPrompt for F
where
    F: FnMut(PieceColor, Square) -> Option<PromotionChoice>,
{
    fn choose(&mut self, color: PieceColor, square: Square) -> Option<PromotionChoice> {
        self(color, square)
    }
}

/// Prompt that always answers the same way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPromotion(pub Option<PromotionChoice>);

impl PromotionPrompt for FixedPromotion {
    fn choose(&mut self, _color: PieceColor, _square: Square) -> Option<PromotionChoice> {
        self.0
    }
}

/// Check if a pawn move results in promotion
pub fn is_promotion_move(piece_kind: PieceKind, color: PieceColor, target_rank: u8) -> bool {
    piece_kind == PieceKind::Pawn && target_rank == color.last_rank()
}
