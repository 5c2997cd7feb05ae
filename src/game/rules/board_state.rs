//! `shakmaty`-backed rules engine
//!
//! `shakmaty` positions carry no history, so [`ChessRules`] keeps the played
//! moves (for the engine's `position` command) and a Zobrist hash per
//! position (for fivefold repetition).

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::zobrist::Zobrist64;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position, Role};
use tracing::debug;

use super::{PositionSnapshot, RulesEngine};
use crate::game::error::{GameError, GameResult};
use crate::game::resources::GameStatus;
use crate::game::types::{Move, Piece, PieceColor, PieceKind, Square};

/// Plies without capture or pawn move that end the game
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// Occurrences of one position that end the game
const FIVEFOLD: usize = 5;

#[derive(Debug, Clone)]
pub struct ChessRules {
    start: Chess,
    start_fen: Option<String>,
    position: Chess,
    moves: Vec<Move>,
    hashes: Vec<Zobrist64>,
}

impl Default for ChessRules {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessRules {
    /// Standard initial position
    pub fn new() -> Self {
        Self::from_chess(Chess::default(), None)
    }

    /// Start from an arbitrary FEN
    pub fn from_fen(fen: &str) -> GameResult<Self> {
        let parsed: Fen = fen.parse().map_err(|e| GameError::InvalidPosition {
            message: format!("{fen}: {e}"),
        })?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| GameError::InvalidPosition {
                message: format!("{fen}: {e}"),
            })?;
        Ok(Self::from_chess(position, Some(fen.trim().to_string())))
    }

    fn from_chess(position: Chess, start_fen: Option<String>) -> Self {
        let hash = position.zobrist_hash::<Zobrist64>(EnPassantMode::Legal);
        ChessRules {
            start: position.clone(),
            start_fen,
            position,
            moves: Vec::new(),
            hashes: vec![hash],
        }
    }

    fn repetitions(&self) -> usize {
        match self.hashes.last() {
            Some(current) => self.hashes.iter().filter(|h| *h == current).count(),
            None => 0,
        }
    }

    /// Find the shakmaty move a drag-level move stands for
    fn find_legal(position: &Chess, mv: &Move) -> Option<shakmaty::Move> {
        position
            .legal_moves()
            .into_iter()
            .find(|candidate| from_shakmaty_move(candidate).as_ref() == Some(mv))
    }
}

impl RulesEngine for ChessRules {
    fn side_to_move(&self) -> PieceColor {
        from_shakmaty_color(self.position.turn())
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position
            .board()
            .piece_at(to_shakmaty_square(square))
            .map(|piece| Piece::new(from_shakmaty_role(piece.role), from_shakmaty_color(piece.color)))
    }

    fn legal_moves(&self) -> Vec<Move> {
        self.position
            .legal_moves()
            .iter()
            .filter_map(from_shakmaty_move)
            .collect()
    }

    fn is_legal(&self, mv: &Move) -> bool {
        Self::find_legal(&self.position, mv).is_some()
    }

    fn push(&mut self, mv: &Move) -> GameResult<()> {
        let legal = Self::find_legal(&self.position, mv).ok_or(GameError::IllegalMove { mv: *mv })?;
        self.position = self
            .position
            .clone()
            .play(legal)
            .map_err(|_| GameError::IllegalMove { mv: *mv })?;
        self.moves.push(*mv);
        self.hashes
            .push(self.position.zobrist_hash::<Zobrist64>(EnPassantMode::Legal));
        debug!("[RULES] Played {} (ply {})", mv, self.moves.len());
        Ok(())
    }

    fn status(&self) -> GameStatus {
        if self.position.is_checkmate() {
            GameStatus::Checkmate
        } else if self.position.is_stalemate() {
            GameStatus::Stalemate
        } else if self.position.is_insufficient_material() {
            GameStatus::DrawInsufficientMaterial
        } else if self.position.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES {
            GameStatus::DrawSeventyFiveMoves
        } else if self.repetitions() >= FIVEFOLD {
            GameStatus::DrawFivefoldRepetition
        } else {
            GameStatus::InProgress
        }
    }

    fn reset(&mut self) {
        *self = Self::from_chess(self.start.clone(), self.start_fen.clone());
    }

    fn position(&self) -> PositionSnapshot {
        PositionSnapshot {
            start_fen: self.start_fen.clone(),
            moves: self.moves.clone(),
        }
    }

    fn ply_count(&self) -> usize {
        self.moves.len()
    }

    fn san_line(&self, line: &[Move]) -> Vec<String> {
        let mut position = self.position.clone();
        let mut sans = Vec::with_capacity(line.len());
        for mv in line {
            let Some(legal) = Self::find_legal(&position, mv) else {
                break;
            };
            sans.push(San::from_move(&position, legal.clone()).to_string());
            match position.play(legal) {
                Ok(next) => position = next,
                Err(_) => break,
            }
        }
        sans
    }
}

fn to_shakmaty_square(square: Square) -> shakmaty::Square {
    shakmaty::Square::new(u32::from(square.index()))
}

fn from_shakmaty_square(square: shakmaty::Square) -> Option<Square> {
    Square::from_index(u8::from(square))
}

fn from_shakmaty_color(color: shakmaty::Color) -> PieceColor {
    match color {
        shakmaty::Color::White => PieceColor::White,
        shakmaty::Color::Black => PieceColor::Black,
    }
}

fn from_shakmaty_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

/// Express a shakmaty move the way a drag produces it
///
/// Castling becomes the king's two-square step; drops have no counterpart.
fn from_shakmaty_move(mv: &shakmaty::Move) -> Option<Move> {
    match mv {
        shakmaty::Move::Normal {
            from,
            to,
            promotion,
            ..
        } => Some(Move {
            from: from_shakmaty_square(*from)?,
            to: from_shakmaty_square(*to)?,
            promotion: promotion.map(from_shakmaty_role),
        }),
        shakmaty::Move::EnPassant { from, to } => Some(Move::new(
            from_shakmaty_square(*from)?,
            from_shakmaty_square(*to)?,
        )),
        shakmaty::Move::Castle { king, rook } => {
            let king = from_shakmaty_square(*king)?;
            let rook = from_shakmaty_square(*rook)?;
            let file = if rook.file > king.file { 6 } else { 2 };
            Some(Move::new(king, Square::new(file, king.rank.index())?))
        }
        shakmaty::Move::Put { .. } => None,
    }
}
