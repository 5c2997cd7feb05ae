//! Game controller - human vs engine turn sequencing
//!
//! Owns the rules engine, the drag controller, the turn state machine and the
//! engine bridge, and is the only place the position is mutated. The host
//! loop feeds it pointer events and calls [`GameController::tick`] once per
//! frame; neither ever blocks on the engine.
//!
//! # Turn cycle
//!
//! ```text
//! AwaitingHumanInput --legal drop--> HumanMoveApplied --> AwaitingEngineReply
//!        ^                                  |                    |
//!        |                                  v                    v
//!        +---------------------- EngineMoveApplied <---- bestmove reply
//!                      terminal status at any apply --> GameOver
//! ```
//!
//! Every applied move or reset issues a new [`PositionToken`]; engine replies
//! carrying an older token are dropped.

use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::game::ai::{
    EngineBridge, EngineReply, EngineSettings, EvaluationResult, PositionToken, SearchLimit,
};
use crate::game::error::{GameError, GameResult};
use crate::game::resources::{GameStatus, PromotionPrompt, TurnPhase, TurnStateContext};
use crate::game::rules::{ChessRules, RulesEngine};
use crate::game::systems::MoveResolver;
use crate::game::types::{Move, PieceColor};
use crate::input::pointer::{DragEvent, DragInputController, DragState, PointerEvent};
use crate::rendering::board::coordinates::{BoardOrientation, CoordinateMapper};

/// Static controller parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    pub human_color: PieceColor,
    pub board_size_px: u32,
    pub move_limit: SearchLimit,
    pub analysis_limit: SearchLimit,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            human_color: PieceColor::White,
            board_size_px: 800,
            move_limit: SearchLimit::MoveTime(SearchLimit::DEFAULT_MOVE_TIME),
            analysis_limit: SearchLimit::Depth(SearchLimit::DEFAULT_ANALYSIS_DEPTH),
        }
    }
}

/// Something the host should know about after a tick
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    EngineMoved(Move),
    EvaluationUpdated,
    GameOver(GameStatus),
    /// The engine failed; the session cannot continue
    EngineFailed(String),
}

pub struct GameController<R: RulesEngine = ChessRules> {
    rules: R,
    mapper: CoordinateMapper,
    orientation: BoardOrientation,
    drag: DragInputController,
    turn: TurnStateContext,
    engine: EngineBridge,
    move_limit: SearchLimit,
    analysis_limit: SearchLimit,
    token: PositionToken,
    evaluation: Option<EvaluationResult>,
    status: GameStatus,
    last_move: Option<Move>,
    fatal: Option<String>,
}

impl<R: RulesEngine> GameController<R> {
    /// Start a game; if the human plays black the engine is asked to move
    pub fn new(rules: R, engine: EngineBridge, config: ControllerConfig) -> Self {
        let status = rules.status();
        let mut controller = GameController {
            rules,
            mapper: CoordinateMapper::for_board(config.board_size_px),
            orientation: BoardOrientation::for_human(config.human_color),
            drag: DragInputController::new(),
            turn: TurnStateContext::new(config.human_color),
            engine,
            move_limit: config.move_limit,
            analysis_limit: config.analysis_limit,
            token: PositionToken::default(),
            evaluation: None,
            status,
            last_move: None,
            fatal: None,
        };
        controller.engine.new_game();
        controller.begin_turn();
        controller
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn orientation(&self) -> BoardOrientation {
        self.orientation
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn turn(&self) -> &TurnStateContext {
        &self.turn
    }

    pub fn phase(&self) -> TurnPhase {
        self.turn.phase
    }

    pub fn human_color(&self) -> PieceColor {
        self.turn.human_color
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn token(&self) -> PositionToken {
        self.token
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// Latest evaluation of the current position
    pub fn evaluation(&self) -> Option<&EvaluationResult> {
        self.evaluation.as_ref()
    }

    /// Why the session stopped, if the engine failed
    pub fn fatal_error(&self) -> Option<&str> {
        self.fatal.as_deref()
    }

    pub fn engine_name(&self) -> Option<&str> {
        self.engine.name()
    }

    pub fn applied_settings(&self) -> &EngineSettings {
        self.engine.applied_settings()
    }

    /// Feed one pointer event
    ///
    /// Returns the applied move when a drop completed a legal human move.
    ///
    /// # Errors
    /// Non-fatal rejections of a completed drop: [`GameError::IllegalMove`],
    /// [`GameError::PromotionCancelled`] or [`GameError::MoveRejectedWhileBusy`].
    /// The position and turn state are unchanged in every case.
    pub fn handle_pointer<P>(
        &mut self,
        event: PointerEvent,
        prompt: &mut P,
    ) -> GameResult<Option<Move>>
    where
        P: PromotionPrompt + ?Sized,
    {
        let Some(drag_event) = self
            .drag
            .handle(event, &self.mapper, self.orientation, &self.rules)
        else {
            return Ok(None);
        };

        let done = match drag_event {
            DragEvent::PickedUp { .. } | DragEvent::Cancelled { .. } => return Ok(None),
            DragEvent::Dropped(done) => done,
        };

        if !self.turn.phase.accepts_input() {
            debug!("[INPUT] Drop ignored while {:?}", self.turn.phase);
            return Err(GameError::MoveRejectedWhileBusy {
                phase: self.turn.phase,
            });
        }
        if done.origin == done.destination {
            return Ok(None);
        }

        let mv = MoveResolver::resolve(&self.rules, prompt, done.origin, done.destination)?;
        self.apply_human_move(mv)?;
        Ok(Some(mv))
    }

    fn apply_human_move(&mut self, mv: Move) -> GameResult<()> {
        let mover = self.rules.side_to_move();
        self.rules.push(&mv)?;
        self.after_push(mv, mover);
        info!("[TURN] Human played {}", mv);

        self.turn.transition_to(TurnPhase::HumanMoveApplied)?;
        if self.status.is_terminal() {
            self.turn.transition_to(TurnPhase::GameOver)?;
            self.announce_game_over();
        } else {
            self.turn.transition_to(TurnPhase::AwaitingEngineReply)?;
            self.request_engine_move();
        }
        Ok(())
    }

    fn after_push(&mut self, mv: Move, mover: PieceColor) {
        self.last_move = Some(mv);
        self.turn.record_ply(mover);
        self.status = self.rules.status();
        self.advance_token();
    }

    fn advance_token(&mut self) {
        self.token = self.token.next();
        self.evaluation = None;
        self.engine.set_current(self.token);
    }

    fn request_engine_move(&mut self) {
        debug!(
            "[TURN] Asking engine for a move (token {}, {:?})",
            self.token.0, self.move_limit
        );
        self.engine.request_best_move(
            self.token,
            self.rules.position(),
            self.rules.side_to_move(),
            self.move_limit,
        );
    }

    /// Hand the first move to the engine when it is its turn
    fn begin_turn(&mut self) {
        if self.status.is_terminal() {
            self.turn.abort();
            self.announce_game_over();
            return;
        }
        if self.rules.side_to_move() == self.turn.engine_color() {
            match self.turn.transition_to(TurnPhase::AwaitingEngineReply) {
                Ok(()) => self.request_engine_move(),
                Err(e) => error!("[TURN] {}", e),
            }
        }
    }

    fn announce_game_over(&self) {
        info!(
            "[TURN] Game over: {}",
            self.status.message().unwrap_or("game ended")
        );
    }

    /// Ask for an evaluation of the current position
    ///
    /// The result shows up in [`Self::evaluation`] after a later tick, unless
    /// the position changes first.
    pub fn request_evaluation(&mut self) -> GameResult<()> {
        if let Some(reason) = &self.fatal {
            return Err(GameError::protocol(reason.clone()));
        }
        debug!("[ENGINE] Evaluation requested (token {})", self.token.0);
        self.engine.request_evaluation(
            self.token,
            self.rules.position(),
            self.rules.side_to_move(),
            self.analysis_limit,
        );
        Ok(())
    }

    /// Apply settings to the engine; returns one error per refused field
    pub fn configure(&mut self, settings: &EngineSettings) -> Vec<GameError> {
        self.engine.configure(settings)
    }

    /// Start a new game
    ///
    /// `settings`, when given, are applied before the first engine search.
    /// The orientation follows `human_color`. Any outstanding request goes
    /// stale.
    pub fn reset(
        &mut self,
        settings: Option<&EngineSettings>,
        human_color: PieceColor,
    ) -> Vec<GameError> {
        info!("[TURN] New game, human plays {}", human_color.name());
        self.drag.cancel();
        self.rules.reset();
        self.status = self.rules.status();
        self.last_move = None;
        self.advance_token();
        self.turn.reset(human_color);
        self.orientation = BoardOrientation::for_human(human_color);

        self.engine.new_game();
        let rejected = settings
            .map(|settings| self.engine.configure(settings))
            .unwrap_or_default();

        if self.fatal.is_some() {
            self.turn.abort();
        } else {
            self.begin_turn();
        }
        rejected
    }

    /// Drain every ready engine reply without blocking
    pub fn tick(&mut self) -> Vec<ControllerEvent> {
        let mut events = Vec::new();
        while let Some(reply) = self.engine.poll() {
            self.handle_reply(reply, &mut events);
        }
        events
    }

    /// Like [`Self::tick`], but waits up to `timeout` for the first reply
    pub fn tick_blocking(&mut self, timeout: Duration) -> Vec<ControllerEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = Vec::new();
        while events.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.engine.wait_reply(remaining) {
                Some(reply) => self.handle_reply(reply, &mut events),
                None => break,
            }
        }
        events.extend(self.tick());
        events
    }

    fn handle_reply(&mut self, reply: EngineReply, events: &mut Vec<ControllerEvent>) {
        if let EngineReply::Failed { error, token } = reply {
            if error.is_fatal() {
                self.fail(error, events);
            } else {
                warn!("[ENGINE] Request {:?} failed: {}", token, error);
            }
            return;
        }
        if reply.token() != Some(self.token) {
            debug!(
                "[ENGINE] Dropping reply for token {:?}, current is {}",
                reply.token(),
                self.token.0
            );
            return;
        }

        match reply {
            EngineReply::BestMove { mv, .. } => self.apply_engine_move(mv, events),
            EngineReply::Evaluation { evaluation, .. } => {
                self.evaluation = Some(evaluation);
                events.push(ControllerEvent::EvaluationUpdated);
            }
            EngineReply::Skipped { .. } | EngineReply::Failed { .. } => {}
        }
    }

    fn apply_engine_move(&mut self, mv: Move, events: &mut Vec<ControllerEvent>) {
        if !self.turn.phase.is_engine_thinking() {
            warn!("[ENGINE] Unrequested best move {} while {:?}", mv, self.turn.phase);
            return;
        }
        let mover = self.rules.side_to_move();
        if let Err(e) = self.rules.push(&mv) {
            self.fail(GameError::protocol(format!("engine played {e}")), events);
            return;
        }
        self.after_push(mv, mover);
        info!("[TURN] Engine played {}", mv);
        events.push(ControllerEvent::EngineMoved(mv));

        let result = self
            .turn
            .transition_to(TurnPhase::EngineMoveApplied)
            .and_then(|()| {
                if self.status.is_terminal() {
                    self.turn.transition_to(TurnPhase::GameOver)
                } else {
                    self.turn.transition_to(TurnPhase::AwaitingHumanInput)
                }
            });
        if let Err(e) = result {
            error!("[TURN] {}", e);
        }
        if self.status.is_terminal() {
            self.announce_game_over();
            events.push(ControllerEvent::GameOver(self.status));
        }
    }

    fn fail(&mut self, error: GameError, events: &mut Vec<ControllerEvent>) {
        if self.fatal.is_some() {
            return;
        }
        error!("[ENGINE] Fatal: {}", error);
        let message = error.to_string();
        self.fatal = Some(message.clone());
        self.drag.cancel();
        self.turn.abort();
        events.push(ControllerEvent::EngineFailed(message));
    }
}
