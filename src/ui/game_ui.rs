//! In-game text: turn line, game-over banner, evaluation and PV
//!
//! Scores are shown from white's point of view, like an evaluation bar.

use crate::game::ai::{EvaluationResult, Score};
use crate::game::controller::GameController;
use crate::game::resources::TurnPhase;
use crate::game::rules::RulesEngine;
use crate::game::types::PieceColor;

/// `"Evaluation: +0.35"`, `"Mate in 3"` or `"Evaluation: N/A"`, plus the PV
pub fn evaluation_text<R>(evaluation: Option<&EvaluationResult>, rules: &R) -> String
where
    R: RulesEngine + ?Sized,
{
    let Some(evaluation) = evaluation else {
        return "Evaluation: N/A".to_string();
    };
    let mut text = match evaluation.white_score() {
        Some(Score::Centipawns(cp)) => format!("Evaluation: {:+.2}", cp.to_pawns()),
        Some(Score::Mate(n)) => format!("Mate in {n}"),
        None => "Evaluation: N/A".to_string(),
    };
    if !evaluation.principal_variation.is_empty() {
        let sans = rules.san_line(&evaluation.principal_variation);
        if !sans.is_empty() {
            text.push_str(" | PV: ");
            text.push_str(&format_pv(&sans, evaluation.side_to_move));
        }
    }
    text
}

/// Number a SAN line from 1, `"1... "` when black moves first
pub fn format_pv(sans: &[String], side_to_move: PieceColor) -> String {
    let mut parts = Vec::with_capacity(sans.len() * 3 / 2);
    let mut move_number = 1;
    let mut white_to_move = side_to_move == PieceColor::White;
    for (i, san) in sans.iter().enumerate() {
        if white_to_move {
            parts.push(format!("{move_number}. {san}"));
        } else if i == 0 {
            parts.push(format!("{move_number}... {san}"));
        } else {
            parts.push(san.clone());
        }
        if !white_to_move {
            move_number += 1;
        }
        white_to_move = !white_to_move;
    }
    parts.join(" ")
}

/// One-line summary of whose turn it is, or how the game ended
pub fn status_line<R: RulesEngine>(controller: &GameController<R>) -> String {
    if let Some(reason) = controller.fatal_error() {
        return format!("Engine failure: {reason}");
    }
    if let Some(banner) = controller.status().message() {
        return banner.to_string();
    }
    let side = controller.rules().side_to_move();
    let who = if side == controller.human_color() {
        "you"
    } else {
        "engine"
    };
    match controller.phase() {
        TurnPhase::AwaitingEngineReply => format!(
            "Move {} | {} to move | engine thinking...",
            controller.turn().move_number,
            capitalized(side.name())
        ),
        _ => format!(
            "Move {} | {} to move ({})",
            controller.turn().move_number,
            capitalized(side.name()),
            who
        ),
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rules::ChessRules;
    use crate::game::types::{Centipawns, Move};

    fn line(moves: &[&str]) -> Vec<Move> {
        moves.iter().map(|m| m.parse().unwrap()).collect()
    }

    #[test]
    fn test_centipawn_text_with_pv() {
        let rules = ChessRules::new();
        let evaluation = EvaluationResult {
            score: Some(Score::Centipawns(Centipawns(35))),
            principal_variation: line(&["e2e4", "e7e5", "g1f3"]),
            depth: Some(20),
            side_to_move: PieceColor::White,
        };
        assert_eq!(
            evaluation_text(Some(&evaluation), &rules),
            "Evaluation: +0.35 | PV: 1. e4 e5 2. Nf3"
        );
    }

    #[test]
    fn test_black_to_move_pv_and_pov() {
        let mut rules = ChessRules::new();
        rules.push(&"e2e4".parse().unwrap()).unwrap();
        let evaluation = EvaluationResult {
            score: Some(Score::Centipawns(Centipawns(20))),
            principal_variation: line(&["e7e5", "g1f3", "b8c6"]),
            depth: Some(20),
            side_to_move: PieceColor::Black,
        };
        assert_eq!(
            evaluation_text(Some(&evaluation), &rules),
            "Evaluation: -0.20 | PV: 1... e5 2. Nf3 Nc6"
        );
    }

    #[test]
    fn test_mate_and_missing_scores() {
        let rules = ChessRules::new();
        let mate = EvaluationResult {
            score: Some(Score::Mate(3)),
            ..Default::default()
        };
        assert_eq!(evaluation_text(Some(&mate), &rules), "Mate in 3");
        assert_eq!(
            evaluation_text(Some(&EvaluationResult::default()), &rules),
            "Evaluation: N/A"
        );
        assert_eq!(evaluation_text(None, &rules), "Evaluation: N/A");
    }

    #[test]
    fn test_format_pv_numbering() {
        let sans: Vec<String> = ["e4", "e5", "Nf3", "Nc6"].iter().map(|s| s.to_string()).collect();
        assert_eq!(format_pv(&sans, PieceColor::White), "1. e4 e5 2. Nf3 Nc6");
        assert_eq!(format_pv(&sans[..1], PieceColor::Black), "1... e4");
        assert_eq!(format_pv(&[], PieceColor::White), "");
    }
}
