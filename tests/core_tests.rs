//! Integration tests for startup configuration
//!
//! Config file plus command-line flags, the way the binary assembles them,
//! and the settings panel fed from an engine's advertised options.

mod common;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use common::*;
use xfboard::core::{init_logging, AppConfig, Cli, CoreError};
use xfboard::game::ai::{EngineSettings, SearchLimit};
use xfboard::game::types::PieceColor;
use xfboard::ui::{PanelError, SettingsPanel};

fn config_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("xfboard-core-{}-{}", std::process::id(), name));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_flags_override_config_file() {
    //! Values from `--config` are loaded first and flags win over them

    let path = config_file(
        "override.json",
        r#"{
            "engine_path": "/usr/games/stockfish",
            "human_color": "black",
            "move_time": "1s",
            "analysis_depth": 15
        }"#,
    );
    let cli = Cli::parse_from([
        "xfboard",
        "--config",
        path.to_str().unwrap(),
        "--move-time",
        "300ms",
    ]);
    let config = AppConfig::from_cli(&cli);
    fs::remove_file(&path).ok();
    let config = config.unwrap();

    assert_eq!(config.engine_path, PathBuf::from("/usr/games/stockfish"));
    assert_eq!(config.human_color, PieceColor::Black);
    assert_eq!(config.move_time, Duration::from_millis(300));
    assert_eq!(config.analysis_depth, 15);

    let controller = config.controller_config();
    assert_eq!(controller.human_color, PieceColor::Black);
    assert_eq!(controller.move_limit, SearchLimit::MoveTime(Duration::from_millis(300)));
    assert_eq!(controller.analysis_limit, SearchLimit::Depth(15));
}

#[test]
fn test_invalid_values_are_rejected() {
    let path = config_file("zero-depth.json", r#"{ "analysis_depth": 0 }"#);
    let cli = Cli::parse_from(["xfboard", "--config", path.to_str().unwrap()]);
    let result = AppConfig::from_cli(&cli);
    fs::remove_file(&path).ok();
    assert!(matches!(result, Err(CoreError::InvalidConfig { .. })));

    // a flag can repair what the file got wrong
    let path = config_file("zero-depth-fixed.json", r#"{ "analysis_depth": 0 }"#);
    let cli = Cli::parse_from(["xfboard", "--config", path.to_str().unwrap(), "--depth", "4"]);
    let result = AppConfig::from_cli(&cli);
    fs::remove_file(&path).ok();
    assert_eq!(result.unwrap().analysis_depth, 4);
}

#[test]
fn test_bad_duration_flag_fails_to_parse() {
    let result = Cli::try_parse_from(["xfboard", "--move-time", "soon"]);
    assert!(result.is_err());
}

#[test]
fn test_panel_starts_from_engine_defaults() {
    //! Without saved settings the panel shows what the engine advertises

    let (bridge, _engine) = bridge();
    let panel = SettingsPanel::from_engine(bridge.options(), PieceColor::White);
    assert_eq!(
        panel.labels(),
        vec![
            "White",
            "Threads: 1",
            "Hash: 16",
            "Skill Level: 20",
            "UCI Elo: 1320",
            "Limit Strength: Off",
            "Use NNUE: On",
        ]
    );
}

#[test]
fn test_saved_settings_are_clamped_to_engine_range() {
    let (bridge, _engine) = bridge();
    let saved = EngineSettings {
        skill_level: 40,
        uci_elo: 1000,
        ..EngineSettings::default()
    };
    let mut panel = SettingsPanel::with_settings(bridge.options(), &saved, PieceColor::Black);
    let settings = panel.engine_settings();
    assert_eq!(settings.skill_level, 20);
    assert_eq!(settings.uci_elo, 1320);
    assert_eq!(panel.human_color(), PieceColor::Black);

    assert_eq!(panel.apply("elo", "2000").unwrap(), "UCI Elo: 2000");
    assert!(matches!(
        panel.apply("elo", "strong"),
        Err(PanelError::InvalidValue { .. })
    ));
    assert!(matches!(
        panel.apply("ponder", "on"),
        Err(PanelError::UnknownSetting(_))
    ));
    assert_eq!(panel.engine_settings().uci_elo, 2000);
}

#[test]
fn test_panel_settings_configure_engine() {
    //! Whatever the panel produces is accepted by the engine it came from

    let (mut bridge, engine) = bridge();
    let mut panel = SettingsPanel::from_engine(bridge.options(), PieceColor::White);
    panel.toggle_limit_strength();
    panel.apply("threads", "4").unwrap();

    let rejected = bridge.configure(&panel.engine_settings());
    assert!(rejected.is_empty());
    assert_eq!(bridge.applied_settings().threads, 4);
    assert!(bridge.applied_settings().limit_strength);

    drop(bridge);
    assert!(engine.received("setoption name Threads value 4"));
    assert!(engine.received("setoption name UCI_LimitStrength value true"));
}

#[test]
fn test_logging_init_is_idempotent() {
    init_logging(1);
    init_logging(2);
    tracing::info!("[SETTINGS] logging initialised twice");
}
