//! Chess game systems module - per-event game logic
//!
//! # System Organization
//!
//! - [`movement`] - [`MoveResolver`], from a completed drag to a legal move
//!
//! The turn sequencing that calls into these lives in
//! [`crate::game::controller`].

pub mod movement;

pub use movement::MoveResolver;
