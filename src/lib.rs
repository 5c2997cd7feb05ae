//! xfboard - an interactive chess board played against a UCI engine
//!
//! The crate turns pointer input on a drawn board into legal moves, alternates
//! turns between the human and an external engine process, and keeps engine
//! replies matched to the position they were computed for.
//!
//! # Modules
//!
//! - `core` - configuration, logging
//! - `game` - rules, turn sequencing, move resolution, engine bridge
//! - `input` - pointer drag-and-drop
//! - `rendering` - pixel/square mapping, text board
//! - `ui` - settings panel and evaluation text

pub mod core;
pub mod game;
pub mod input;
pub mod rendering;
pub mod ui;
