//! Terminal front-end
//!
//! Draws the board as text and reads commands from stdin. Moves typed as
//! `e2e4` are replayed as pointer press/move/release at the squares' pixel
//! centres, so they take the same path a mouse drag would.

use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use xfboard::core::{init_logging, AppConfig, Cli};
use xfboard::game::ai::EngineBridge;
use xfboard::game::resources::{FixedPromotion, PromotionChoice, PromotionPrompt};
use xfboard::game::rules::{ChessRules, RulesEngine};
use xfboard::game::types::{Move, PieceColor, PieceKind, Square};
use xfboard::game::{ControllerEvent, GameController, GameError};
use xfboard::input::PointerEvent;
use xfboard::rendering::board::render_board;
use xfboard::ui::{evaluation_text, status_line, SettingsPanel};

/// Extra time allowed on top of the engine's own budget
const REPLY_SLACK: Duration = Duration::from_secs(10);

const HELP: &str = "\
Commands:
  e2e4 / e7e8q     move a piece (promotion letter optional)
  eval             evaluate the current position
  reset            new game with the panel settings
  color            switch sides for the next game
  set <opt> <val>  threads, hash, skill, elo, limit, nnue
  settings         show the panel
  help             this text
  quit             leave";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::from_cli(&cli).context("failed to load configuration")?;
    let mut engine = EngineBridge::spawn(&config.engine_path)
        .with_context(|| format!("failed to start engine {:?}", config.engine_path))?;

    let mut panel = match &config.engine {
        Some(saved) => SettingsPanel::with_settings(engine.options(), saved, config.human_color),
        None => SettingsPanel::from_engine(engine.options(), config.human_color),
    };
    report_rejections(engine.configure(&panel.engine_settings()));

    println!(
        "Playing {} as {}. Type 'help' for commands.",
        engine.name().unwrap_or("the engine"),
        config.human_color.name()
    );
    let mut controller = GameController::new(ChessRules::new(), engine, config.controller_config());
    let reply_timeout = config.move_time + REPLY_SLACK;

    let stdin = io::stdin();
    loop {
        wait_for_engine(&mut controller, reply_timeout);
        print_position(&controller);
        print!("> ");
        io::stdout().flush().context("failed to flush stdout")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("failed to read stdin")? == 0 {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["help"] => println!("{HELP}"),
            ["eval"] => evaluate(&mut controller, reply_timeout),
            ["reset"] => {
                let rejected = controller.reset(Some(&panel.engine_settings()), panel.human_color());
                report_rejections(rejected);
            }
            ["color"] => {
                let color = panel.toggle_human_color();
                println!("Next game you play {}; type 'reset' to start it", color.name());
            }
            ["settings"] => {
                println!("{} settings:", controller.engine_name().unwrap_or("Engine"));
                for label in panel.labels() {
                    println!("  {label}");
                }
            }
            ["set", setting, value] => match panel.apply(setting, value) {
                Ok(caption) => println!("{caption} (applied on reset)"),
                Err(e) => println!("{e}"),
            },
            [text] => match text.parse::<Move>() {
                Ok(mv) => play(&mut controller, mv),
                Err(_) => println!("Unknown command '{text}', type 'help'"),
            },
            _ => println!("Unknown command, type 'help'"),
        }
    }

    info!("Shutting down");
    Ok(())
}

fn print_position(controller: &GameController) {
    println!();
    print!(
        "{}",
        render_board(
            controller.rules(),
            controller.orientation(),
            controller.drag_state(),
            controller.last_move(),
        )
    );
    println!("{}", status_line(controller));
}

/// Why the human cannot lift the piece on `from`, if they cannot
fn lift_refusal<R: RulesEngine>(rules: &R, human: PieceColor, from: Square) -> Option<String> {
    match rules.piece_at(from) {
        None => Some(format!("No piece on {from}")),
        Some(piece) if piece.color != human => Some(format!("You play {}", human.name())),
        Some(_) if rules.side_to_move() != human => Some("Wait for the engine's move".to_string()),
        Some(_) => None,
    }
}

/// Drag the piece on `mv.from` to `mv.to` through the pointer path
fn play(controller: &mut GameController, mv: Move) {
    if let Some(refusal) = lift_refusal(controller.rules(), controller.human_color(), mv.from) {
        println!("{refusal}");
        return;
    }

    let mapper = *controller.mapper();
    let orientation = controller.orientation();
    let from = mapper.pixel_center(mv.from, orientation);
    let to = mapper.pixel_center(mv.to, orientation);

    let mut stdin_prompt = ask_promotion;
    let mut fixed = FixedPromotion(mv.promotion.and_then(promotion_choice));
    let prompt: &mut dyn PromotionPrompt = if mv.promotion.is_some() {
        &mut fixed
    } else {
        &mut stdin_prompt
    };

    for event in [
        PointerEvent::Press(from),
        PointerEvent::Move(to),
        PointerEvent::Release(to),
    ] {
        match controller.handle_pointer(event, &mut *prompt) {
            Ok(Some(applied)) => println!("You played {applied}"),
            Ok(None) => {}
            Err(GameError::IllegalMove { mv }) => println!("Illegal move: {mv}"),
            Err(GameError::PromotionCancelled) => println!("Promotion cancelled"),
            Err(GameError::MoveRejectedWhileBusy { .. }) => println!("Wait for the engine's move"),
            Err(e) => println!("{e}"),
        }
    }
}

fn promotion_choice(kind: PieceKind) -> Option<PromotionChoice> {
    PromotionChoice::ALL
        .into_iter()
        .find(|choice| PieceKind::from(*choice) == kind)
}

fn ask_promotion(color: PieceColor, square: Square) -> Option<PromotionChoice> {
    loop {
        print!(
            "Promote {} pawn on {} to (q/r/b/n, empty to cancel): ",
            color.name(),
            square
        );
        io::stdout().flush().ok()?;
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).ok()? == 0 || answer.trim().is_empty() {
            return None;
        }
        match PromotionChoice::parse(&answer) {
            Some(choice) => return Some(choice),
            None => println!("Please answer q, r, b or n"),
        }
    }
}

fn evaluate(controller: &mut GameController, timeout: Duration) {
    if let Err(e) = controller.request_evaluation() {
        println!("{e}");
        return;
    }
    println!("Analysing...");
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        let events = controller.tick_blocking(Duration::from_millis(200));
        let updated = events.contains(&ControllerEvent::EvaluationUpdated);
        report_events(&events);
        if updated {
            println!("{}", evaluation_text(controller.evaluation(), controller.rules()));
            return;
        }
        if controller.fatal_error().is_some() {
            return;
        }
    }
    warn!("Evaluation did not finish in {:?}", timeout);
    println!("Evaluation: N/A");
}

fn wait_for_engine(controller: &mut GameController, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while controller.phase().is_engine_thinking() && Instant::now() < deadline {
        let events = controller.tick_blocking(Duration::from_millis(200));
        report_events(&events);
    }
    if controller.phase().is_engine_thinking() {
        warn!("Engine has not replied after {:?}", timeout);
    }
}

fn report_events(events: &[ControllerEvent]) {
    for event in events {
        match event {
            ControllerEvent::EngineMoved(mv) => println!("Engine played {mv}"),
            ControllerEvent::GameOver(status) => {
                println!("{}", status.message().unwrap_or("Game over"))
            }
            ControllerEvent::EngineFailed(reason) => {
                println!("Engine failure, the game cannot continue: {reason}")
            }
            ControllerEvent::EvaluationUpdated => {}
        }
    }
}

fn report_rejections(rejected: Vec<GameError>) {
    for error in rejected {
        println!("Setting not applied: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn test_lift_refusal() {
        let mut rules = ChessRules::new();
        assert_eq!(lift_refusal(&rules, PieceColor::White, square("e2")), None);
        assert_eq!(
            lift_refusal(&rules, PieceColor::White, square("e4")).as_deref(),
            Some("No piece on e4")
        );
        assert_eq!(
            lift_refusal(&rules, PieceColor::White, square("e7")).as_deref(),
            Some("You play white")
        );

        rules.push(&"e2e4".parse().unwrap()).unwrap();
        assert_eq!(
            lift_refusal(&rules, PieceColor::White, square("d2")).as_deref(),
            Some("Wait for the engine's move")
        );
        assert_eq!(lift_refusal(&rules, PieceColor::Black, square("e7")), None);
    }
}
