//! Chess game resources - Game state owned by the controller
//!
//! # Resource Categories
//!
//! ## Turn Management
//! - [`TurnStateContext`] - Human/engine alternation state machine
//! - [`TurnPhase`] - Turn sub-states (AwaitingHumanInput, AwaitingEngineReply, etc.)
//!
//! ## Player Interaction
//! - [`PromotionPrompt`] - Blocking promotion choice
//!
//! ## Game Status
//! - [`GameStatus`] - Checkmate/draw conditions

pub mod game_over;
pub mod player;
pub mod turn;

pub use game_over::*;
pub use player::*;
pub use turn::*;
