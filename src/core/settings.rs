//! Application configuration
//!
//! [`AppConfig`] is read once at startup from an optional JSON file and then
//! overridden by command-line flags. It is never written back.
//!
//! # File Location
//!
//! `--config <path>` if given, otherwise `config.json` in the platform config
//! directory (e.g. `~/.config/xfboard/config.json`). A missing file means
//! defaults; an unreadable or malformed one is an error.
//!
//! ```json
//! {
//!   "engine_path": "/usr/bin/stockfish",
//!   "human_color": "black",
//!   "move_time": "250ms",
//!   "engine": { "skill_level": 5, "limit_strength": false }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::{CoreError, CoreResult};
use crate::game::ai::{EngineSettings, SearchLimit};
use crate::game::controller::ControllerConfig;
use crate::game::types::PieceColor;

/// Config filename
const CONFIG_FILENAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Engine executable; a bare name is looked up on `PATH`
    pub engine_path: PathBuf,
    pub board_size_px: u32,
    pub human_color: PieceColor,
    /// Time the engine gets per move
    #[serde(with = "humantime_serde")]
    pub move_time: Duration,
    /// Depth of evaluation requests
    pub analysis_depth: u32,
    /// Strength settings applied at startup; engine defaults when absent
    pub engine: Option<EngineSettings>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine_path: PathBuf::from("stockfish"),
            board_size_px: 800,
            human_color: PieceColor::White,
            move_time: SearchLimit::DEFAULT_MOVE_TIME,
            analysis_depth: SearchLimit::DEFAULT_ANALYSIS_DEPTH,
            engine: None,
        }
    }
}

/// Command-line flags
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "xfboard", version, about = "Play chess against a UCI engine")]
pub struct Cli {
    /// JSON config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Engine executable
    #[arg(long, value_name = "PATH")]
    pub engine: Option<PathBuf>,

    /// Board size in pixels (eight squares per side)
    #[arg(long, value_name = "PX")]
    pub board_size: Option<u32>,

    /// Play the black pieces
    #[arg(long)]
    pub black: bool,

    /// Engine time per move, e.g. `100ms` or `2s`
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub move_time: Option<Duration>,

    /// Evaluation search depth
    #[arg(long, value_name = "PLIES")]
    pub depth: Option<u32>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Platform config path, `None` when no home directory can be found
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "xfboard").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

impl AppConfig {
    /// Read `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            debug!("[SETTINGS] No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| CoreError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig =
            serde_json::from_str(&contents).map_err(|source| CoreError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        info!("[SETTINGS] Loaded config from {:?}", path);
        Ok(config)
    }

    /// File from `--config` or the default location, then flag overrides
    pub fn from_cli(cli: &Cli) -> CoreResult<Self> {
        let mut config = match cli.config.clone().or_else(default_config_path) {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(engine) = &cli.engine {
            self.engine_path = engine.clone();
        }
        if let Some(size) = cli.board_size {
            self.board_size_px = size;
        }
        if cli.black {
            self.human_color = PieceColor::Black;
        }
        if let Some(move_time) = cli.move_time {
            self.move_time = move_time;
        }
        if let Some(depth) = cli.depth {
            self.analysis_depth = depth;
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.board_size_px < 8 {
            return Err(CoreError::InvalidConfig {
                message: format!("board size {} is smaller than 8 pixels", self.board_size_px),
            });
        }
        if self.move_time.is_zero() {
            return Err(CoreError::InvalidConfig {
                message: "move time must be positive".to_string(),
            });
        }
        if self.analysis_depth == 0 {
            return Err(CoreError::InvalidConfig {
                message: "analysis depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            human_color: self.human_color,
            board_size_px: self.board_size_px,
            move_limit: SearchLimit::MoveTime(self.move_time),
            analysis_limit: SearchLimit::Depth(self.analysis_depth),
        }
    }
}
