//! Turn management resources
//!
//! Manages the human/engine alternation state machine.

pub mod state;

pub use state::*;
