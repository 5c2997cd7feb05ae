//! Rendering module - board geometry and drawing
//!
//! # Architecture
//!
//! - `board` - [`board::CoordinateMapper`] and the text board renderer
//!
//! The renderer only reads state: the position from the rules engine and the
//! lifted piece from the drag controller.

pub mod board;
