//! Input module - pointer drag-and-drop
//!
//! # Architecture
//!
//! - `pointer` - [`DragInputController`], the press/move/release state machine
//!
//! Pointer positions arrive in board-local pixels; the
//! [`crate::rendering::board::coordinates::CoordinateMapper`] turns them into
//! squares.

pub mod pointer;

pub use pointer::*;
