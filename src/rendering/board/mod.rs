//! Board rendering module
//!
//! Pixel/square mapping and the text board the terminal front-end draws.

pub mod board;
pub mod coordinates;

pub use board::*;
pub use coordinates::*;
