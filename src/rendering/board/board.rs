//! Text rendering of the board
//!
//! Draws the position as an 8x8 character grid in the same orientation the
//! pointer mapping uses, so the square printed at row `r`, column `c` is the
//! square [`CoordinateMapper::square_at`] returns for that cell.
//!
//! [`CoordinateMapper::square_at`]: super::coordinates::CoordinateMapper::square_at

use crate::game::rules::RulesEngine;
use crate::game::types::{Move, Square};
use crate::input::pointer::DragState;

use super::coordinates::BoardOrientation;

/// Marker drawn on the square a piece was lifted from
pub const LIFTED_MARKER: char = '*';
/// Marker on empty squares the lifted piece can move to
pub const HINT_MARKER: char = '+';
const EMPTY: char = '.';

/// Squares in drawing order: top row first, left to right
pub fn squares_in_draw_order(orientation: BoardOrientation) -> Vec<Vec<Square>> {
    (0..8u8)
        .map(|row| {
            (0..8u8)
                .filter_map(|column| {
                    let (file, rank) = match orientation {
                        BoardOrientation::HumanAtBottomAsWhite => (column, 7 - row),
                        BoardOrientation::HumanAtBottomAsBlack => (7 - column, row),
                    };
                    Square::new(file, rank)
                })
                .collect()
        })
        .collect()
}

/// Board as text, rank labels on the left and file labels underneath
///
/// Uppercase is white, lowercase black. Squares of `last_move` are bracketed.
/// While a piece is lifted, the empty squares it can legally reach show
/// [`HINT_MARKER`].
pub fn render_board<R>(
    rules: &R,
    orientation: BoardOrientation,
    drag: &DragState,
    last_move: Option<Move>,
) -> String
where
    R: RulesEngine + ?Sized,
{
    let rows = squares_in_draw_order(orientation);
    let hints = drag
        .origin()
        .map(|origin| rules.legal_destinations(origin))
        .unwrap_or_default();
    let mut out = String::new();
    for row in &rows {
        let rank = row.first().map(|sq| sq.rank.to_number()).unwrap_or(0);
        out.push_str(&format!("{rank} "));
        for square in row {
            let glyph = if drag.origin() == Some(*square) {
                LIFTED_MARKER
            } else {
                match rules.piece_at(*square) {
                    Some(piece) => piece.to_char(),
                    None if hints.contains(square) => HINT_MARKER,
                    None => EMPTY,
                }
            };
            let highlighted = last_move.is_some_and(|mv| mv.from == *square || mv.to == *square);
            if highlighted {
                out.push('[');
                out.push(glyph);
                out.push(']');
            } else {
                out.push(' ');
                out.push(glyph);
                out.push(' ');
            }
        }
        out.push('\n');
    }
    out.push_str("  ");
    if let Some(first) = rows.first() {
        for square in first {
            out.push(' ');
            out.push(square.file.to_char());
            out.push(' ');
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rules::ChessRules;
    use crate::rendering::board::coordinates::{CoordinateMapper, Pixel};

    #[test]
    fn test_initial_board_white_bottom() {
        let rules = ChessRules::new();
        let text = render_board(
            &rules,
            BoardOrientation::HumanAtBottomAsWhite,
            &DragState::Idle,
            None,
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8  r  n  b  q  k  b  n  r ");
        assert_eq!(lines[7], "1  R  N  B  Q  K  B  N  R ");
        assert_eq!(lines[8], "   a  b  c  d  e  f  g  h ");
    }

    #[test]
    fn test_black_bottom_is_rotated() {
        let rules = ChessRules::new();
        let text = render_board(
            &rules,
            BoardOrientation::HumanAtBottomAsBlack,
            &DragState::Idle,
            None,
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "1  R  N  B  K  Q  B  N  R ");
        assert_eq!(lines[8], "   h  g  f  e  d  c  b  a ");
    }

    #[test]
    fn test_draw_order_matches_pointer_mapping() {
        let mapper = CoordinateMapper::new(10);
        for orientation in [
            BoardOrientation::HumanAtBottomAsWhite,
            BoardOrientation::HumanAtBottomAsBlack,
        ] {
            for (row, squares) in squares_in_draw_order(orientation).iter().enumerate() {
                for (column, square) in squares.iter().enumerate() {
                    let pixel = Pixel::new(column as f32 * 10.0 + 1.0, row as f32 * 10.0 + 1.0);
                    assert_eq!(mapper.square_at(pixel, orientation).unwrap(), *square);
                }
            }
        }
    }

    #[test]
    fn test_lifted_piece_and_last_move() {
        let mut rules = ChessRules::new();
        let e2e4: Move = "e2e4".parse().unwrap();
        rules.push(&e2e4).unwrap();
        let drag = DragState::Dragging {
            origin: Square::from_algebraic("g8").unwrap(),
            piece_glyph_id: "knight_black".to_string(),
            pointer_pos: Pixel::new(0.0, 0.0),
        };
        let text = render_board(
            &rules,
            BoardOrientation::HumanAtBottomAsWhite,
            &drag,
            Some(e2e4),
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8  r  n  b  q  k  b  *  r ");
        // the knight's two destinations
        assert_eq!(lines[2], "6  .  .  .  .  .  +  .  + ");
        assert_eq!(lines[4], "4  .  .  .  . [P] .  .  . ");
        assert_eq!(lines[6], "2  P  P  P  P [.] P  P  P ");
    }

    #[test]
    fn test_promotion_destination_is_hinted_once() {
        let rules = ChessRules::from_fen("8/P6k/7p/8/8/8/8/K7 w - - 0 1").unwrap();
        let a7 = Square::from_algebraic("a7").unwrap();
        assert_eq!(
            rules.legal_destinations(a7),
            vec![Square::from_algebraic("a8").unwrap()]
        );

        let drag = DragState::Dragging {
            origin: a7,
            piece_glyph_id: "pawn_white".to_string(),
            pointer_pos: Pixel::new(0.0, 0.0),
        };
        let text = render_board(&rules, BoardOrientation::HumanAtBottomAsWhite, &drag, None);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8  +  .  .  .  .  .  .  . ");
        assert_eq!(lines[1], "7  *  .  .  .  .  .  .  k ");
    }
}
