//! Pixel <-> square mapping for the 2D board
//!
//! The board is drawn as an 8x8 grid of `square_size` pixel squares whose
//! top-left corner is the pixel origin. Which file/rank ends up in which
//! grid cell depends on who sits at the bottom:
//!
//! | Orientation            | file        | rank        |
//! |------------------------|-------------|-------------|
//! | `HumanAtBottomAsWhite` | column      | 7 - row     |
//! | `HumanAtBottomAsBlack` | 7 - column  | row         |
//!
//! Both directions are pure. Pixels outside `[0, 8 * square_size)` on either
//! axis are rejected with [`GameError::OutOfBounds`], never clamped.

use crate::game::error::{GameError, GameResult};
use crate::game::types::{PieceColor, Square};

/// Which side of the board faces the human
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoardOrientation {
    #[default]
    HumanAtBottomAsWhite,
    HumanAtBottomAsBlack,
}

impl BoardOrientation {
    pub fn for_human(color: PieceColor) -> Self {
        match color {
            PieceColor::White => BoardOrientation::HumanAtBottomAsWhite,
            PieceColor::Black => BoardOrientation::HumanAtBottomAsBlack,
        }
    }

    pub fn human_color(self) -> PieceColor {
        match self {
            BoardOrientation::HumanAtBottomAsWhite => PieceColor::White,
            BoardOrientation::HumanAtBottomAsBlack => PieceColor::Black,
        }
    }

    pub fn flipped(self) -> Self {
        BoardOrientation::for_human(self.human_color().opposite())
    }
}

/// A pointer position in board-local pixels (origin at the board's top-left)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pixel {
    pub x: f32,
    pub y: f32,
}

impl Pixel {
    pub fn new(x: f32, y: f32) -> Self {
        Pixel { x, y }
    }
}

/// Converts between board-local pixels and squares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMapper {
    square_size: u32,
}

impl CoordinateMapper {
    /// `square_size` is clamped to at least one pixel
    pub fn new(square_size: u32) -> Self {
        CoordinateMapper {
            square_size: square_size.max(1),
        }
    }

    /// Mapper for a board `board_size` pixels wide
    pub fn for_board(board_size: u32) -> Self {
        Self::new(board_size / 8)
    }

    pub fn square_size(&self) -> u32 {
        self.square_size
    }

    pub fn board_size(&self) -> u32 {
        self.square_size * 8
    }

    pub fn contains(&self, pixel: Pixel) -> bool {
        let limit = self.board_size() as f32;
        // written so NaN falls outside
        (pixel.x >= 0.0 && pixel.x < limit) && (pixel.y >= 0.0 && pixel.y < limit)
    }

    /// Square under `pixel`
    pub fn square_at(&self, pixel: Pixel, orientation: BoardOrientation) -> GameResult<Square> {
        if !self.contains(pixel) {
            return Err(GameError::OutOfBounds {
                x: pixel.x,
                y: pixel.y,
            });
        }
        let size = self.square_size as f32;
        let column = ((pixel.x / size).floor() as u8).min(7);
        let raw_row = ((pixel.y / size).floor() as u8).min(7);
        let (file, rank) = match orientation {
            BoardOrientation::HumanAtBottomAsWhite => (column, 7 - raw_row),
            BoardOrientation::HumanAtBottomAsBlack => (7 - column, raw_row),
        };
        Square::new(file, rank).ok_or(GameError::OutOfBounds {
            x: pixel.x,
            y: pixel.y,
        })
    }

    /// Top-left pixel of `square`
    pub fn pixel_origin(&self, square: Square, orientation: BoardOrientation) -> Pixel {
        let file = square.file.index();
        let rank = square.rank.index();
        let (column, row) = match orientation {
            BoardOrientation::HumanAtBottomAsWhite => (file, 7 - rank),
            BoardOrientation::HumanAtBottomAsBlack => (7 - file, rank),
        };
        let size = self.square_size as f32;
        Pixel::new(f32::from(column) * size, f32::from(row) * size)
    }

    /// Centre pixel of `square`
    pub fn pixel_center(&self, square: Square, orientation: BoardOrientation) -> Pixel {
        let origin = self.pixel_origin(square, orientation);
        let half = self.square_size as f32 / 2.0;
        Pixel::new(origin.x + half, origin.y + half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIENTATIONS: [BoardOrientation; 2] = [
        BoardOrientation::HumanAtBottomAsWhite,
        BoardOrientation::HumanAtBottomAsBlack,
    ];

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn test_white_at_bottom_corners() {
        let mapper = CoordinateMapper::for_board(800);
        let white = BoardOrientation::HumanAtBottomAsWhite;
        assert_eq!(mapper.square_at(Pixel::new(0.0, 0.0), white).unwrap(), sq("a8"));
        assert_eq!(mapper.square_at(Pixel::new(799.0, 799.0), white).unwrap(), sq("h1"));
        assert_eq!(mapper.square_at(Pixel::new(450.0, 650.0), white).unwrap(), sq("e2"));
    }

    #[test]
    fn test_black_at_bottom_corners() {
        let mapper = CoordinateMapper::for_board(800);
        let black = BoardOrientation::HumanAtBottomAsBlack;
        assert_eq!(mapper.square_at(Pixel::new(0.0, 0.0), black).unwrap(), sq("h1"));
        assert_eq!(mapper.square_at(Pixel::new(799.0, 799.0), black).unwrap(), sq("a8"));
        assert_eq!(mapper.square_at(Pixel::new(350.0, 650.0), black).unwrap(), sq("e7"));
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let mapper = CoordinateMapper::for_board(800);
        for pixel in [
            Pixel::new(-0.5, 10.0),
            Pixel::new(10.0, -1.0),
            Pixel::new(800.0, 10.0),
            Pixel::new(10.0, 800.0),
            Pixel::new(f32::NAN, 10.0),
        ] {
            for orientation in ORIENTATIONS {
                assert!(matches!(
                    mapper.square_at(pixel, orientation),
                    Err(GameError::OutOfBounds { .. })
                ));
            }
        }
    }

    #[test]
    fn test_every_square_round_trips() {
        for size in [1, 37, 100] {
            let mapper = CoordinateMapper::new(size);
            for orientation in ORIENTATIONS {
                for square in Square::all() {
                    let origin = mapper.pixel_origin(square, orientation);
                    assert_eq!(mapper.square_at(origin, orientation).unwrap(), square);
                }
            }
        }
    }

    #[test]
    fn test_pixel_round_trip_at_square_granularity() {
        let mapper = CoordinateMapper::new(60);
        for orientation in ORIENTATIONS {
            let mut y = 0.0;
            while y < 480.0 {
                let mut x = 0.0;
                while x < 480.0 {
                    let square = mapper.square_at(Pixel::new(x, y), orientation).unwrap();
                    let origin = mapper.pixel_origin(square, orientation);
                    assert_eq!(mapper.square_at(origin, orientation).unwrap(), square);
                    x += 7.5;
                }
                y += 7.5;
            }
        }
    }

    #[test]
    fn test_mapping_is_a_bijection() {
        let mapper = CoordinateMapper::new(10);
        for orientation in ORIENTATIONS {
            let mut seen = std::collections::HashSet::new();
            for row in 0..8 {
                for column in 0..8 {
                    let pixel = Pixel::new(column as f32 * 10.0 + 5.0, row as f32 * 10.0 + 5.0);
                    assert!(seen.insert(mapper.square_at(pixel, orientation).unwrap()));
                }
            }
            assert_eq!(seen.len(), 64);
        }
    }

    #[test]
    fn test_orientation_helpers() {
        assert_eq!(
            BoardOrientation::for_human(PieceColor::Black),
            BoardOrientation::HumanAtBottomAsBlack
        );
        assert_eq!(
            BoardOrientation::HumanAtBottomAsWhite.flipped(),
            BoardOrientation::HumanAtBottomAsBlack
        );
        let mapper = CoordinateMapper::new(100);
        assert_eq!(
            mapper.pixel_center(sq("a1"), BoardOrientation::HumanAtBottomAsWhite),
            Pixel::new(50.0, 750.0)
        );
    }
}
