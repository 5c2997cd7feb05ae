//! UCI engine opponent
//!
//! The engine runs as a separate process. This module owns everything about
//! talking to it; the rest of the crate only sees [`EngineBridge`] requests
//! and [`EngineReply`] values.
//!
//! # Architecture
//!
//! - `resource`: engine settings, advertised options, search limits, evaluations
//! - `uci`: formatting and parsing of UCI lines
//! - `process`: the [`EngineIo`] transport and the real child process
//! - `session`: blocking handshake/search conversation over an [`EngineIo`]
//! - `systems`: [`EngineBridge`], the worker thread and position tokens
//!
//! # Request flow
//!
//! 1. The controller bumps its [`PositionToken`] whenever the position changes
//! 2. It sends a best-move or evaluation request tagged with that token
//! 3. The worker runs the search and replies with the same token
//! 4. The controller polls once per tick and drops replies for old tokens

pub mod process;
pub mod resource;
pub mod session;
pub mod systems;
pub mod uci;

pub use process::{EngineIo, KillSwitch, UciProcess};
pub use resource::{
    EngineOption, EngineOptions, EngineSettings, EvaluationResult, OptionKind, OptionValue, Score,
    SearchLimit,
};
pub use session::{EngineIdentity, SessionTimeouts};
pub use systems::{EngineBridge, EngineReply, PositionToken};
