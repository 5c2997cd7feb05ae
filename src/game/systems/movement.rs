//! Move resolution - from a completed drag to a candidate move
//!
//! Turns an origin/destination pair into a fully specified [`Move`]: asks the
//! promotion prompt when a pawn lands on its last rank, then checks the result
//! against the legal-move set. Nothing is applied here.

use tracing::{debug, info};

use crate::game::error::{GameError, GameResult};
use crate::game::resources::{is_promotion_move, PromotionPrompt};
use crate::game::rules::RulesEngine;
use crate::game::types::{Move, PieceKind, Square};

pub struct MoveResolver;

impl MoveResolver {
    /// Resolve a drag from `origin` to `destination` into a legal move
    ///
    /// # Errors
    /// - [`GameError::PromotionCancelled`] if the prompt was dismissed
    /// - [`GameError::IllegalMove`] if the candidate is not legal
    pub fn resolve<R, P>(
        rules: &R,
        prompt: &mut P,
        origin: Square,
        destination: Square,
    ) -> GameResult<Move>
    where
        R: RulesEngine + ?Sized,
        P: PromotionPrompt + ?Sized,
    {
        let mut candidate = Move::new(origin, destination);

        if let Some(piece) = rules.piece_at(origin) {
            if is_promotion_move(piece.kind, piece.color, destination.rank.index()) {
                info!("[PROMOTION] Pawn {} -> {} needs a piece", origin, destination);
                let choice = prompt
                    .choose(piece.color, destination)
                    .ok_or(GameError::PromotionCancelled)?;
                let kind = PieceKind::from(choice);
                debug!("[PROMOTION] Chose {}", kind.name());
                candidate = Move::with_promotion(origin, destination, kind);
            }
        }

        if rules.is_legal(&candidate) {
            Ok(candidate)
        } else {
            debug!("[INPUT] Rejected illegal move {}", candidate);
            Err(GameError::IllegalMove { mv: candidate })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::resources::{FixedPromotion, PromotionChoice};
    use crate::game::rules::ChessRules;
    use crate::game::types::PieceColor;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn test_plain_legal_move() {
        let rules = ChessRules::new();
        let mut prompt = FixedPromotion(None);
        let mv = MoveResolver::resolve(&rules, &mut prompt, sq("e2"), sq("e4")).unwrap();
        assert_eq!(mv, "e2e4".parse().unwrap());
        // nothing applied
        assert_eq!(rules.ply_count(), 0);
    }

    #[test]
    fn test_illegal_move_rejected() {
        let rules = ChessRules::new();
        let mut prompt = FixedPromotion(None);
        let err = MoveResolver::resolve(&rules, &mut prompt, sq("e2"), sq("e5")).unwrap_err();
        assert!(matches!(err, GameError::IllegalMove { .. }));
    }

    #[test]
    fn test_promotion_uses_prompt_choice() {
        let rules = ChessRules::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mut asked = Vec::new();
        let mut prompt = |color: PieceColor, square: Square| {
            asked.push((color, square));
            Some(PromotionChoice::Knight)
        };
        let mv = MoveResolver::resolve(&rules, &mut prompt, sq("a7"), sq("a8")).unwrap();
        assert_eq!(mv, "a7a8n".parse().unwrap());
        assert_eq!(asked, vec![(PieceColor::White, sq("a8"))]);
    }

    #[test]
    fn test_promotion_cancelled() {
        let rules = ChessRules::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mut prompt = FixedPromotion(None);
        let err = MoveResolver::resolve(&rules, &mut prompt, sq("a7"), sq("a8")).unwrap_err();
        assert!(matches!(err, GameError::PromotionCancelled));
        assert_eq!(rules.ply_count(), 0);
    }

    #[test]
    fn test_black_promotion() {
        let rules = ChessRules::from_fen("k7/8/8/8/8/8/p6K/8 b - - 0 1").unwrap();
        let mut prompt = FixedPromotion(Some(PromotionChoice::Rook));
        let mv = MoveResolver::resolve(&rules, &mut prompt, sq("a2"), sq("a1")).unwrap();
        assert_eq!(mv.promotion, Some(PieceKind::Rook));
    }

    #[test]
    fn test_non_pawn_on_last_rank_is_not_prompted() {
        let rules = ChessRules::from_fen("7k/8/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let mut prompt = |_: PieceColor, _: Square| -> Option<PromotionChoice> {
            panic!("prompt must not be asked")
        };
        let mv = MoveResolver::resolve(&rules, &mut prompt, sq("a1"), sq("a8")).unwrap();
        assert_eq!(mv.promotion, None);
    }
}
