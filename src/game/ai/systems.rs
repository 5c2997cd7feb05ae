//! Engine bridge: a worker thread that owns the UCI session
//!
//! The caller never blocks on the engine. Requests go to the worker over a
//! crossbeam channel and replies come back over another, tagged with the
//! [`PositionToken`] of the position they were computed for. The caller
//! drains replies with [`EngineBridge::poll`] once per tick.
//!
//! # Stale requests
//!
//! The bridge shares the latest token with the worker. A queued request whose
//! token is older is answered with [`EngineReply::Skipped`] without touching
//! the engine, and a running search whose token goes stale is told to `stop`.
//! Either way the caller still sees a reply it can drop, so the engine is only
//! ever running one search at a time.
//!
//! # Teardown
//!
//! Dropping the bridge cancels the running search and waits for the worker a
//! bounded time. A worker still stuck after that gets its engine killed
//! through the transport's [`KillSwitch`].

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, error, info, warn};

use crate::game::error::{GameError, GameResult};
use crate::game::rules::PositionSnapshot;
use crate::game::types::{Move, PieceColor};

use super::process::{EngineIo, KillSwitch, UciProcess};
use super::resource::{EngineOptions, EngineSettings, EvaluationResult, OptionValue, SearchLimit};
use super::session::{EngineIdentity, SessionTimeouts, UciSession};

/// Extra wait for the worker on top of the engine's `stop` grace
const JOIN_GRACE: Duration = Duration::from_millis(500);

/// Identifies the position a request was made for
///
/// Tokens only ever increase; any change to the position issues a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PositionToken(pub u64);

impl PositionToken {
    pub fn next(self) -> Self {
        PositionToken(self.0 + 1)
    }
}

enum EngineJob {
    Configure(Vec<(&'static str, OptionValue)>),
    NewGame,
    BestMove {
        token: PositionToken,
        position: PositionSnapshot,
        side_to_move: PieceColor,
        limit: SearchLimit,
    },
    Evaluate {
        token: PositionToken,
        position: PositionSnapshot,
        side_to_move: PieceColor,
        limit: SearchLimit,
    },
    Shutdown,
}

/// Everything the worker sends back
#[derive(Debug)]
pub enum EngineReply {
    BestMove {
        token: PositionToken,
        mv: Move,
        evaluation: EvaluationResult,
    },
    Evaluation {
        token: PositionToken,
        evaluation: EvaluationResult,
    },
    /// The request went stale before or during the search
    Skipped { token: PositionToken },
    /// The engine misbehaved or went away; `token` is `None` for failures
    /// outside a search
    Failed {
        token: Option<PositionToken>,
        error: GameError,
    },
}

impl EngineReply {
    pub fn token(&self) -> Option<PositionToken> {
        match self {
            EngineReply::BestMove { token, .. }
            | EngineReply::Evaluation { token, .. }
            | EngineReply::Skipped { token } => Some(*token),
            EngineReply::Failed { token, .. } => *token,
        }
    }
}

/// Handle to the engine worker
pub struct EngineBridge {
    identity: EngineIdentity,
    applied: EngineSettings,
    jobs: Sender<EngineJob>,
    replies: Receiver<EngineReply>,
    latest: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
    kill: Option<KillSwitch>,
    timeouts: SessionTimeouts,
}

impl EngineBridge {
    /// Launch the engine at `path` and complete the handshake
    pub fn spawn(path: &Path) -> GameResult<Self> {
        info!("[ENGINE] Starting engine {:?}", path);
        let process = UciProcess::spawn(path)?;
        Self::connect(Box::new(process))
    }

    /// Handshake over an existing connection, then hand it to the worker
    ///
    /// The handshake runs on the calling thread; every later exchange happens
    /// on the worker.
    pub fn connect(io: Box<dyn EngineIo>) -> GameResult<Self> {
        Self::connect_with(io, SessionTimeouts::default())
    }

    /// [`Self::connect`] with explicit engine timeouts
    pub fn connect_with(io: Box<dyn EngineIo>, timeouts: SessionTimeouts) -> GameResult<Self> {
        let kill = io.kill_switch();
        let mut session = UciSession::with_timeouts(io, timeouts);
        let identity = match session.handshake() {
            Ok(identity) => identity,
            Err(e) => {
                session.quit();
                return Err(e);
            }
        };
        let applied = EngineSettings::from_defaults(&identity.options);

        let (job_tx, job_rx) = unbounded();
        let (reply_tx, reply_rx) = unbounded();
        let latest = Arc::new(AtomicU64::new(0));
        let worker_latest = Arc::clone(&latest);
        let worker = thread::Builder::new()
            .name("uci-engine".to_string())
            .spawn(move || run_worker(session, job_rx, reply_tx, worker_latest))
            .map_err(|e| GameError::protocol(format!("failed to start engine worker: {e}")))?;

        Ok(EngineBridge {
            identity,
            applied,
            jobs: job_tx,
            replies: reply_rx,
            latest,
            worker: Some(worker),
            kill,
            timeouts,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.identity.name.as_deref()
    }

    /// Options advertised during the handshake
    pub fn options(&self) -> &EngineOptions {
        &self.identity.options
    }

    /// Settings currently in effect on the engine
    pub fn applied_settings(&self) -> &EngineSettings {
        &self.applied
    }

    /// Validate `settings` and send every accepted field to the engine
    ///
    /// Each field is checked on its own against the advertised bounds, so one
    /// bad value never blocks the others. Returns one
    /// [`GameError::EngineConfigRejected`] per refused field; refused fields
    /// keep their previous value in [`Self::applied_settings`].
    pub fn configure(&mut self, settings: &EngineSettings) -> Vec<GameError> {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for (name, value) in settings.to_option_values() {
            match self.identity.options.validate(name, &value) {
                Ok(()) => {
                    self.applied.set(name, &value);
                    accepted.push((name, value));
                }
                Err(e) => {
                    warn!("[SETTINGS] {}", e);
                    rejected.push(e);
                }
            }
        }
        if !accepted.is_empty() {
            debug!("[SETTINGS] Applying {} engine options", accepted.len());
            self.submit(EngineJob::Configure(accepted));
        }
        rejected
    }

    /// Tell the engine a new game starts
    pub fn new_game(&self) {
        self.submit(EngineJob::NewGame);
    }

    /// Mark `token` as the current position
    ///
    /// Requests for older tokens are skipped or stopped.
    pub fn set_current(&self, token: PositionToken) {
        self.latest.fetch_max(token.0, Ordering::AcqRel);
    }

    pub fn request_best_move(
        &self,
        token: PositionToken,
        position: PositionSnapshot,
        side_to_move: PieceColor,
        limit: SearchLimit,
    ) {
        self.set_current(token);
        self.submit(EngineJob::BestMove {
            token,
            position,
            side_to_move,
            limit,
        });
    }

    pub fn request_evaluation(
        &self,
        token: PositionToken,
        position: PositionSnapshot,
        side_to_move: PieceColor,
        limit: SearchLimit,
    ) {
        self.set_current(token);
        self.submit(EngineJob::Evaluate {
            token,
            position,
            side_to_move,
            limit,
        });
    }

    fn submit(&self, job: EngineJob) {
        // the worker only drops its receiver after Shutdown, which only Drop sends
        if self.jobs.send(job).is_err() {
            error!("[ENGINE] Worker is gone, request dropped");
        }
    }

    /// Non-blocking: the next reply if one is ready
    pub fn poll(&self) -> Option<EngineReply> {
        match self.replies.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(EngineReply::Failed {
                token: None,
                error: GameError::protocol("engine worker stopped"),
            }),
        }
    }

    /// Block up to `timeout` for the next reply
    pub fn wait_reply(&self, timeout: Duration) -> Option<EngineReply> {
        match self.replies.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(EngineReply::Failed {
                token: None,
                error: GameError::protocol("engine worker stopped"),
            }),
        }
    }
}

impl Drop for EngineBridge {
    fn drop(&mut self) {
        // cancel whatever is running so the worker reaches Shutdown quickly
        self.latest.store(u64::MAX, Ordering::Release);
        let _ = self.jobs.send(EngineJob::Shutdown);
        let Some(worker) = self.worker.take() else {
            return;
        };

        let grace = self.timeouts.stop_grace + JOIN_GRACE;
        if !wait_finished(&worker, grace) {
            warn!("[ENGINE] Worker still busy after {:?}, killing the engine", grace);
            if let Some(kill) = &self.kill {
                kill();
            }
            if !wait_finished(&worker, JOIN_GRACE) {
                error!("[ENGINE] Worker did not exit, leaving it detached");
                return;
            }
        }
        if worker.join().is_err() {
            error!("[ENGINE] Worker thread panicked");
        }
        debug!("[ENGINE] Bridge shut down");
    }
}

fn wait_finished(worker: &JoinHandle<()>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while !worker.is_finished() {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
    true
}

fn run_worker(
    mut session: UciSession,
    jobs: Receiver<EngineJob>,
    replies: Sender<EngineReply>,
    latest: Arc<AtomicU64>,
) {
    let is_stale = |token: PositionToken| latest.load(Ordering::Acquire) > token.0;
    // after a fatal failure every request is answered with the same error
    let mut dead: Option<String> = None;

    for job in jobs.iter() {
        let reply = match job {
            EngineJob::Shutdown => break,
            _ if dead.is_some() => {
                let message = dead.clone().unwrap_or_default();
                let token = match &job {
                    EngineJob::BestMove { token, .. } | EngineJob::Evaluate { token, .. } => {
                        Some(*token)
                    }
                    _ => None,
                };
                Some(EngineReply::Failed {
                    token,
                    error: GameError::protocol(message),
                })
            }
            EngineJob::Configure(values) => values
                .iter()
                .try_for_each(|(name, value)| session.set_option(name, value))
                .and_then(|()| session.sync())
                .err()
                .map(|error| EngineReply::Failed { token: None, error }),
            EngineJob::NewGame => session
                .new_game()
                .err()
                .map(|error| EngineReply::Failed { token: None, error }),
            EngineJob::BestMove {
                token,
                position,
                side_to_move,
                limit,
            } => Some(if is_stale(token) {
                EngineReply::Skipped { token }
            } else {
                match session.search(&position, side_to_move, &limit, || is_stale(token)) {
                    Ok(outcome) if outcome.stopped => EngineReply::Skipped { token },
                    Ok(outcome) => match outcome.require_move() {
                        Ok(mv) => EngineReply::BestMove {
                            token,
                            mv,
                            evaluation: outcome.evaluation,
                        },
                        Err(error) => EngineReply::Failed {
                            token: Some(token),
                            error,
                        },
                    },
                    Err(error) => EngineReply::Failed {
                        token: Some(token),
                        error,
                    },
                }
            }),
            EngineJob::Evaluate {
                token,
                position,
                side_to_move,
                limit,
            } => Some(if is_stale(token) {
                EngineReply::Skipped { token }
            } else {
                match session.search(&position, side_to_move, &limit, || is_stale(token)) {
                    Ok(outcome) if outcome.stopped => EngineReply::Skipped { token },
                    Ok(outcome) => EngineReply::Evaluation {
                        token,
                        evaluation: outcome.evaluation,
                    },
                    Err(error) => EngineReply::Failed {
                        token: Some(token),
                        error,
                    },
                }
            }),
        };

        if let Some(reply) = reply {
            if let EngineReply::Failed { error, .. } = &reply {
                if error.is_fatal() && dead.is_none() {
                    error!("[ENGINE] {}", error);
                    dead = Some(error.to_string());
                }
            }
            if replies.send(reply).is_err() {
                break;
            }
        }
    }

    session.quit();
    debug!("[ENGINE] Worker exiting");
}
