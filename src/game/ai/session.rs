//! Synchronous UCI conversation
//!
//! [`UciSession`] drives one [`EngineIo`] through the handshake, option
//! setting and searches. Every call blocks until the engine has answered or
//! one of its [`SessionTimeouts`] runs out, so it only ever runs on the
//! bridge's worker thread (and during the startup handshake).

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::game::error::{GameError, GameResult};
use crate::game::rules::PositionSnapshot;
use crate::game::types::{Move, PieceColor};

use super::process::EngineIo;
use super::resource::{EngineOptions, EvaluationResult, OptionValue, SearchLimit};
use super::uci::{self, UciMessage};

/// How long the session waits on an engine before giving up on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    /// Longest single read; staleness is checked between reads
    pub poll: Duration,
    /// Budget for `uciok` and each `readyok`
    pub handshake: Duration,
    /// Time allowed past a `movetime` budget before `stop` is sent
    pub move_slack: Duration,
    /// Budget of a depth-limited search
    pub depth_search: Duration,
    /// Time the engine gets to answer `stop` with its `bestmove`
    pub stop_grace: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        SessionTimeouts {
            poll: Duration::from_millis(50),
            handshake: Duration::from_secs(10),
            move_slack: Duration::from_secs(5),
            depth_search: Duration::from_secs(120),
            stop_grace: Duration::from_secs(2),
        }
    }
}

/// What the engine said about itself during the handshake
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineIdentity {
    pub name: Option<String>,
    pub author: Option<String>,
    pub options: EngineOptions,
}

/// Result of one `go`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Raw `bestmove` text, `None` for `(none)`
    pub best_move: Option<String>,
    pub evaluation: EvaluationResult,
    /// `stop` was sent before the engine finished
    pub stopped: bool,
}

impl SearchOutcome {
    /// The best move as a legal-looking move, or a protocol error
    pub fn require_move(&self) -> GameResult<Move> {
        let text = self
            .best_move
            .as_deref()
            .ok_or_else(|| GameError::protocol("engine returned no best move"))?;
        text.parse::<Move>()
            .map_err(|e| GameError::protocol(format!("unparseable best move: {e}")))
    }
}

fn while_waiting(error: GameError, waiting_for: &str) -> GameError {
    match error {
        GameError::EngineProtocol { message } => {
            GameError::protocol(format!("{message} while waiting for {waiting_for}"))
        }
        other => other,
    }
}

pub struct UciSession {
    io: Box<dyn EngineIo>,
    timeouts: SessionTimeouts,
}

impl UciSession {
    pub fn new(io: Box<dyn EngineIo>) -> Self {
        Self::with_timeouts(io, SessionTimeouts::default())
    }

    pub fn with_timeouts(io: Box<dyn EngineIo>, timeouts: SessionTimeouts) -> Self {
        UciSession { io, timeouts }
    }

    /// Next line, failing once `deadline` passes
    fn line_before(&mut self, deadline: Instant, waiting_for: &str) -> GameResult<String> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(GameError::protocol(format!(
                    "engine did not send {waiting_for} in time"
                )));
            }
            let line = self
                .io
                .read_line(remaining)
                .map_err(|e| while_waiting(e, waiting_for))?;
            if let Some(line) = line {
                return Ok(line);
            }
        }
    }

    /// `uci` ... `uciok`, then `isready` ... `readyok`
    pub fn handshake(&mut self) -> GameResult<EngineIdentity> {
        self.io.send_line("uci")?;
        let mut identity = EngineIdentity::default();
        let deadline = Instant::now() + self.timeouts.handshake;
        loop {
            match uci::parse_line(&self.line_before(deadline, "uciok")?) {
                UciMessage::IdName(name) => identity.name = Some(name),
                UciMessage::IdAuthor(author) => identity.author = Some(author),
                UciMessage::Option(option) => {
                    debug!("[ENGINE] Option {} {:?}", option.name, option.kind);
                    identity.options.insert(option);
                }
                UciMessage::UciOk => break,
                _ => {}
            }
        }
        self.sync()?;
        info!(
            "[ENGINE] Connected to {} ({} options)",
            identity.name.as_deref().unwrap_or("unnamed engine"),
            identity.options.len()
        );
        Ok(identity)
    }

    /// `isready` and wait for `readyok`
    pub fn sync(&mut self) -> GameResult<()> {
        self.io.send_line("isready")?;
        let deadline = Instant::now() + self.timeouts.handshake;
        loop {
            if uci::parse_line(&self.line_before(deadline, "readyok")?) == UciMessage::ReadyOk {
                return Ok(());
            }
        }
    }

    pub fn set_option(&mut self, name: &str, value: &OptionValue) -> GameResult<()> {
        self.io.send_line(&uci::setoption_command(name, value))
    }

    pub fn new_game(&mut self) -> GameResult<()> {
        self.io.send_line("ucinewgame")?;
        self.sync()
    }

    /// Search `position` within `limit`
    ///
    /// `is_stale` is polled between reads; once it returns true `stop` is
    /// sent and the search finishes as soon as the engine reports its move.
    /// A search that overruns its budget is stopped the same way. An engine
    /// that then stays silent for [`SessionTimeouts::stop_grace`] is a
    /// protocol error.
    pub fn search(
        &mut self,
        position: &PositionSnapshot,
        side_to_move: PieceColor,
        limit: &SearchLimit,
        mut is_stale: impl FnMut() -> bool,
    ) -> GameResult<SearchOutcome> {
        self.io.send_line(&uci::position_command(position))?;
        self.io.send_line(&uci::go_command(limit))?;

        let budget = match limit {
            SearchLimit::MoveTime(time) => *time + self.timeouts.move_slack,
            SearchLimit::Depth(_) => self.timeouts.depth_search,
        };
        let overrun_at = Instant::now() + budget;
        let mut stop_deadline: Option<Instant> = None;

        let mut evaluation = EvaluationResult {
            side_to_move,
            ..Default::default()
        };
        let mut stopped = false;
        loop {
            let line = self
                .io
                .read_line(self.timeouts.poll)
                .map_err(|e| while_waiting(e, "bestmove"))?;
            if let Some(line) = line {
                match uci::parse_line(&line) {
                    // secondary lines of a multipv search
                    UciMessage::Info(info) if info.multipv.is_some_and(|n| n != 1) => {}
                    UciMessage::Info(info) => {
                        if let Some(depth) = info.depth {
                            evaluation.depth = Some(depth);
                        }
                        if !info.bound {
                            if let Some(score) = info.score {
                                evaluation.score = Some(score);
                            }
                        }
                        if !info.pv.is_empty() {
                            evaluation.principal_variation = uci::parse_pv(&info.pv);
                        }
                    }
                    UciMessage::BestMove(best_move) => {
                        return Ok(SearchOutcome {
                            best_move,
                            evaluation,
                            stopped,
                        });
                    }
                    _ => {}
                }
            }

            let now = Instant::now();
            match stop_deadline {
                Some(deadline) if now >= deadline => {
                    return Err(GameError::protocol(format!(
                        "engine did not answer stop within {:?}",
                        self.timeouts.stop_grace
                    )));
                }
                Some(_) => {}
                None => {
                    if is_stale() {
                        debug!("[ENGINE] Position changed during search, sending stop");
                        stopped = true;
                    } else if now >= overrun_at {
                        warn!("[ENGINE] No bestmove after {:?}, sending stop", budget);
                    } else {
                        continue;
                    }
                    self.io.send_line("stop")?;
                    stop_deadline = Some(now + self.timeouts.stop_grace);
                }
            }
        }
    }

    /// `quit` and release the process
    pub fn quit(&mut self) {
        if let Err(e) = self.io.send_line("quit") {
            warn!("[ENGINE] Failed to send quit: {}", e);
        }
        self.io.shutdown();
    }
}
