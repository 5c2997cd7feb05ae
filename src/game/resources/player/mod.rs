//! Player interaction resources
//!
//! Capabilities the move resolver consumes from the human side of the board.

pub mod promotion;
pub use promotion::*;
