//! Shared test fixtures
//!
//! [`ScriptedEngine`] is an in-memory UCI engine. It answers the handshake
//! with a Stockfish-like option list, tracks the position it is sent, and
//! replies to `go` with a scripted move or else the first legal move in
//! coordinate order. Every line it receives is kept in a transcript the test
//! can inspect through [`EngineHandle`]. Variants that go quiet after `go`
//! stand in for hung engines.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use xfboard::game::ai::{EngineBridge, EngineIo, KillSwitch, SearchLimit, SessionTimeouts};
use xfboard::game::rules::{ChessRules, RulesEngine};
use xfboard::game::types::{Move, PieceColor, Square};
use xfboard::game::{ControllerConfig, ControllerEvent, GameController, GameError, GameResult};
use xfboard::input::PointerEvent;
use xfboard::game::resources::PromotionPrompt;

pub const STOCKFISH_OPTIONS: &[&str] = &[
    "option name Threads type spin default 1 min 1 max 1024",
    "option name Hash type spin default 16 min 1 max 33554432",
    "option name Ponder type check default false",
    "option name Skill Level type spin default 20 min 0 max 20",
    "option name UCI_LimitStrength type check default false",
    "option name UCI_Elo type spin default 1320 min 1320 max 3190",
    "option name Use NNUE type check default true",
    "option name Clear Hash type button",
];

#[derive(Default)]
struct Script {
    transcript: Vec<String>,
    best_moves: VecDeque<String>,
    score: Option<String>,
    /// closes its output right away
    mute: bool,
    /// never answers `go` (or `stop`)
    ignore_go: bool,
    /// once quiet, reads block until the kill switch fires
    wedged: bool,
    killed: bool,
}

/// Test-side view of a [`ScriptedEngine`]
#[derive(Clone)]
pub struct EngineHandle(Arc<Mutex<Script>>);

impl EngineHandle {
    /// Every line the engine has received so far
    pub fn sent(&self) -> Vec<String> {
        self.0.lock().transcript.clone()
    }

    pub fn received(&self, line: &str) -> bool {
        self.0.lock().transcript.iter().any(|sent| sent == line)
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.0
            .lock()
            .transcript
            .iter()
            .filter(|sent| sent.starts_with(prefix))
            .count()
    }

    /// Answer the next `go` with `bestmove <text>`
    pub fn push_best_move(&self, text: &str) {
        self.0.lock().best_moves.push_back(text.to_string());
    }

    /// Score reported in `info` lines, e.g. `"cp 35"` or `"mate 3"`
    pub fn set_score(&self, score: &str) {
        self.0.lock().score = Some(score.to_string());
    }

    pub fn was_killed(&self) -> bool {
        self.0.lock().killed
    }
}

pub struct ScriptedEngine {
    script: Arc<Mutex<Script>>,
    output: VecDeque<String>,
    position: Option<ChessRules>,
    kill_tx: Sender<()>,
    kill_rx: Receiver<()>,
}

impl ScriptedEngine {
    pub fn new() -> (Self, EngineHandle) {
        let script = Arc::new(Mutex::new(Script::default()));
        let (kill_tx, kill_rx) = unbounded();
        (
            ScriptedEngine {
                script: Arc::clone(&script),
                output: VecDeque::new(),
                position: None,
                kill_tx,
                kill_rx,
            },
            EngineHandle(script),
        )
    }

    /// An engine that closes its output without answering anything
    pub fn mute() -> (Self, EngineHandle) {
        let (engine, handle) = Self::new();
        handle.0.lock().mute = true;
        (engine, handle)
    }

    /// Completes the handshake, then never answers a search
    pub fn silent_search() -> (Self, EngineHandle) {
        let (engine, handle) = Self::new();
        handle.0.lock().ignore_go = true;
        (engine, handle)
    }

    /// Like [`Self::silent_search`], but reads ignore their timeout too
    pub fn wedged() -> (Self, EngineHandle) {
        let (engine, handle) = Self::new();
        {
            let mut script = handle.0.lock();
            script.ignore_go = true;
            script.wedged = true;
        }
        (engine, handle)
    }

    fn set_position(&mut self, command: &str) {
        let tokens: Vec<&str> = command.split_whitespace().skip(1).collect();
        let moves_at = tokens.iter().position(|t| *t == "moves").unwrap_or(tokens.len());
        let rules = match tokens.first() {
            Some(&"startpos") => Some(ChessRules::new()),
            Some(&"fen") => ChessRules::from_fen(&tokens[1..moves_at].join(" ")).ok(),
            _ => None,
        };
        self.position = rules.and_then(|mut rules| {
            for text in tokens.iter().skip(moves_at + 1) {
                let mv: Move = text.parse().ok()?;
                rules.push(&mv).ok()?;
            }
            Some(rules)
        });
    }

    fn search(&mut self) {
        let (scripted, score) = {
            let mut script = self.script.lock();
            if script.ignore_go {
                return;
            }
            (script.best_moves.pop_front(), script.score.clone())
        };
        let fallback = self.position.as_ref().and_then(|rules| {
            let mut moves: Vec<String> = rules.legal_moves().iter().map(|m| m.to_uci()).collect();
            moves.sort();
            moves.into_iter().next()
        });
        let best = scripted.or(fallback).unwrap_or_else(|| "(none)".to_string());
        let score = score.unwrap_or_else(|| "cp 35".to_string());
        if best.parse::<Move>().is_ok() {
            self.output
                .push_back(format!("info depth 10 seldepth 12 multipv 1 score {score} nodes 4242 pv {best}"));
        }
        self.output.push_back(format!("bestmove {best}"));
    }
}

impl EngineIo for ScriptedEngine {
    fn send_line(&mut self, line: &str) -> GameResult<()> {
        let mute = {
            let mut script = self.script.lock();
            script.transcript.push(line.to_string());
            script.mute
        };
        if mute {
            return Ok(());
        }
        match line.split_whitespace().next() {
            Some("uci") => {
                self.output.push_back("id name Scripted 1.0".to_string());
                self.output.push_back("id author xfboard tests".to_string());
                self.output
                    .extend(STOCKFISH_OPTIONS.iter().map(|line| line.to_string()));
                self.output.push_back("uciok".to_string());
            }
            Some("isready") => self.output.push_back("readyok".to_string()),
            Some("position") => self.set_position(line),
            Some("go") => self.search(),
            _ => {}
        }
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> GameResult<Option<String>> {
        let closed = || GameError::EngineProtocol {
            message: "engine closed its output".to_string(),
        };
        let (mute, wedged, killed) = {
            let script = self.script.lock();
            (script.mute, script.wedged, script.killed)
        };
        if killed {
            return Err(closed());
        }
        if let Some(line) = self.output.pop_front() {
            return Ok(Some(line));
        }
        if mute {
            return Err(closed());
        }
        if wedged {
            let _ = self.kill_rx.recv();
            return Err(closed());
        }
        match self.kill_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Err(closed()),
            Err(RecvTimeoutError::Timeout) => Ok(None),
        }
    }

    fn kill_switch(&self) -> Option<KillSwitch> {
        let script = Arc::clone(&self.script);
        let kill_tx = self.kill_tx.clone();
        Some(Arc::new(move || {
            script.lock().killed = true;
            let _ = kill_tx.send(());
        }))
    }
}

pub const SETTLE: Duration = Duration::from_secs(5);

pub fn sq(name: &str) -> Square {
    Square::from_algebraic(name).unwrap()
}

pub fn mv(text: &str) -> Move {
    text.parse().unwrap()
}

/// Poll `condition` until it holds, giving up after [`SETTLE`]
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + SETTLE;
    while !condition() {
        if std::time::Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    true
}

pub fn bridge() -> (EngineBridge, EngineHandle) {
    let (engine, handle) = ScriptedEngine::new();
    let bridge = EngineBridge::connect(Box::new(engine)).unwrap();
    (bridge, handle)
}

pub fn controller_with(
    rules: ChessRules,
    human_color: PieceColor,
) -> (GameController, EngineHandle) {
    let (bridge, handle) = bridge();
    let config = ControllerConfig {
        human_color,
        ..ControllerConfig::default()
    };
    (GameController::new(rules, bridge, config), handle)
}

pub fn controller(human_color: PieceColor) -> (GameController, EngineHandle) {
    controller_with(ChessRules::new(), human_color)
}

/// Timeouts short enough for a test to wait them out
pub fn short_timeouts() -> SessionTimeouts {
    SessionTimeouts {
        poll: Duration::from_millis(10),
        handshake: Duration::from_secs(2),
        move_slack: Duration::from_millis(200),
        depth_search: Duration::from_secs(1),
        stop_grace: Duration::from_millis(200),
    }
}

/// Controller whose engine shakes hands and then never answers a search
pub fn silent_controller(human_color: PieceColor) -> (GameController, EngineHandle) {
    let (engine, handle) = ScriptedEngine::silent_search();
    let bridge = EngineBridge::connect_with(Box::new(engine), short_timeouts()).unwrap();
    let config = ControllerConfig {
        human_color,
        move_limit: SearchLimit::MoveTime(Duration::from_millis(100)),
        ..ControllerConfig::default()
    };
    (GameController::new(ChessRules::new(), bridge, config), handle)
}

/// Press on `from`, move and release on `to`; returns the release result
pub fn drag<P: PromotionPrompt + ?Sized>(
    controller: &mut GameController,
    from: &str,
    to: &str,
    prompt: &mut P,
) -> GameResult<Option<Move>> {
    let mapper = *controller.mapper();
    let orientation = controller.orientation();
    let from = mapper.pixel_center(sq(from), orientation);
    let to = mapper.pixel_center(sq(to), orientation);
    controller.handle_pointer(PointerEvent::Press(from), prompt)?;
    controller.handle_pointer(PointerEvent::Move(to), prompt)?;
    controller.handle_pointer(PointerEvent::Release(to), prompt)
}

/// Wait until the controller has processed the engine's next reply
pub fn settle(controller: &mut GameController) -> Vec<ControllerEvent> {
    controller.tick_blocking(SETTLE)
}
