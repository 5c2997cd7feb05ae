//! Chess game logic module - board interaction and engine opponent
//!
//! Everything between a pointer event and an engine reply: rules, turn
//! sequencing, move resolution and the engine process bridge. Rendering and
//! the host loop stay outside.
//!
//! # Module Organization
//!
//! - `types` - squares, pieces, moves
//! - `error` - [`GameError`] taxonomy
//! - `rules` - [`rules::RulesEngine`] capability and its `shakmaty` backend
//! - `resources` - turn state machine, game status, promotion prompt
//! - `systems` - move resolution
//! - `ai` - UCI engine bridge
//! - `controller` - [`GameController`], the human vs engine loop

pub mod ai;
pub mod controller;
pub mod error;
pub mod resources;
pub mod rules;
pub mod systems;
pub mod types;

pub use controller::{ControllerConfig, ControllerEvent, GameController};
pub use error::{GameError, GameResult};
