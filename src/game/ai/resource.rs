//! Engine configuration and result types
//!
//! Configures the engine opponent's strength and describes what comes back
//! from it. Option bounds are never hard-coded: they are whatever the engine
//! advertised in its `option` lines at startup.
//!
//! # Settings → UCI options
//!
//! | Field            | UCI option          | Kind  |
//! |------------------|---------------------|-------|
//! | `threads`        | `Threads`           | spin  |
//! | `hash_mb`        | `Hash`              | spin  |
//! | `skill_level`    | `Skill Level`       | spin  |
//! | `uci_elo`        | `UCI_Elo`           | spin  |
//! | `limit_strength` | `UCI_LimitStrength` | check |
//! | `use_nnue`       | `Use NNUE`          | check |

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::error::{GameError, GameResult};
use crate::game::types::{Centipawns, Move, PieceColor};

pub const OPT_THREADS: &str = "Threads";
pub const OPT_HASH: &str = "Hash";
pub const OPT_SKILL_LEVEL: &str = "Skill Level";
pub const OPT_UCI_ELO: &str = "UCI_Elo";
pub const OPT_LIMIT_STRENGTH: &str = "UCI_LimitStrength";
pub const OPT_USE_NNUE: &str = "Use NNUE";

/// Value of one engine option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Spin(i64),
    Check(bool),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Spin(v) => write!(f, "{v}"),
            OptionValue::Check(v) => write!(f, "{v}"),
            OptionValue::Text(v) => write!(f, "{v}"),
        }
    }
}

/// Type and bounds of an advertised option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionKind {
    Spin { default: i64, min: i64, max: i64 },
    Check { default: bool },
    Combo { default: String, vars: Vec<String> },
    Text { default: String },
    Button,
}

/// One `option name ... type ...` line from the handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOption {
    pub name: String,
    pub kind: OptionKind,
}

impl EngineOption {
    /// Check `value` against the advertised type and bounds
    pub fn validate(&self, value: &OptionValue) -> GameResult<()> {
        match (&self.kind, value) {
            (OptionKind::Spin { min, max, .. }, OptionValue::Spin(v)) => {
                if v < min {
                    Err(GameError::config_rejected(
                        &self.name,
                        format!("value {v} below min {min}"),
                    ))
                } else if v > max {
                    Err(GameError::config_rejected(
                        &self.name,
                        format!("value {v} above max {max}"),
                    ))
                } else {
                    Ok(())
                }
            }
            (OptionKind::Check { .. }, OptionValue::Check(_)) => Ok(()),
            (OptionKind::Combo { vars, .. }, OptionValue::Text(v)) => {
                if vars.iter().any(|var| var.eq_ignore_ascii_case(v)) {
                    Ok(())
                } else {
                    Err(GameError::config_rejected(
                        &self.name,
                        format!("'{v}' is not one of {vars:?}"),
                    ))
                }
            }
            (OptionKind::Text { .. }, OptionValue::Text(_)) => Ok(()),
            (kind, value) => Err(GameError::config_rejected(
                &self.name,
                format!("value {value} does not fit option type {kind:?}"),
            )),
        }
    }
}

/// Options advertised by the engine, looked up case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    options: HashMap<String, EngineOption>,
}

impl EngineOptions {
    pub fn insert(&mut self, option: EngineOption) {
        self.options.insert(option.name.to_ascii_lowercase(), option);
    }

    pub fn get(&self, name: &str) -> Option<&EngineOption> {
        self.options.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// `(min, max)` of a spin option
    pub fn spin_bounds(&self, name: &str) -> Option<(i64, i64)> {
        match self.get(name)?.kind {
            OptionKind::Spin { min, max, .. } => Some((min, max)),
            _ => None,
        }
    }

    pub fn spin_default(&self, name: &str) -> Option<i64> {
        match self.get(name)?.kind {
            OptionKind::Spin { default, .. } => Some(default),
            _ => None,
        }
    }

    pub fn check_default(&self, name: &str) -> Option<bool> {
        match self.get(name)?.kind {
            OptionKind::Check { default } => Some(default),
            _ => None,
        }
    }

    /// Validate one value against the advertised option
    pub fn validate(&self, name: &str, value: &OptionValue) -> GameResult<()> {
        self.get(name)
            .ok_or_else(|| GameError::config_rejected(name, "option not advertised by engine"))?
            .validate(value)
    }
}

/// Engine strength settings as chosen on the settings panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub threads: i64,
    pub hash_mb: i64,
    pub skill_level: i64,
    pub uci_elo: i64,
    pub limit_strength: bool,
    pub use_nnue: bool,
}

impl Default for EngineSettings {
    /// Stockfish's usual defaults, used before an engine has been asked
    fn default() -> Self {
        Self {
            threads: 1,
            hash_mb: 16,
            skill_level: 20,
            uci_elo: 1320,
            limit_strength: true,
            use_nnue: false,
        }
    }
}

impl EngineSettings {
    /// Settings seeded from the engine's advertised defaults
    ///
    /// Fields the engine does not advertise keep [`EngineSettings::default`].
    pub fn from_defaults(options: &EngineOptions) -> Self {
        let fallback = Self::default();
        Self {
            threads: options.spin_default(OPT_THREADS).unwrap_or(fallback.threads),
            hash_mb: options.spin_default(OPT_HASH).unwrap_or(fallback.hash_mb),
            skill_level: options
                .spin_default(OPT_SKILL_LEVEL)
                .unwrap_or(fallback.skill_level),
            uci_elo: options.spin_default(OPT_UCI_ELO).unwrap_or(fallback.uci_elo),
            limit_strength: options
                .check_default(OPT_LIMIT_STRENGTH)
                .unwrap_or(fallback.limit_strength),
            use_nnue: options.check_default(OPT_USE_NNUE).unwrap_or(fallback.use_nnue),
        }
    }

    /// One `(option, value)` pair per field, in the order they are sent
    pub fn to_option_values(&self) -> Vec<(&'static str, OptionValue)> {
        vec![
            (OPT_THREADS, OptionValue::Spin(self.threads)),
            (OPT_HASH, OptionValue::Spin(self.hash_mb)),
            (OPT_SKILL_LEVEL, OptionValue::Spin(self.skill_level)),
            (OPT_UCI_ELO, OptionValue::Spin(self.uci_elo)),
            (OPT_LIMIT_STRENGTH, OptionValue::Check(self.limit_strength)),
            (OPT_USE_NNUE, OptionValue::Check(self.use_nnue)),
        ]
    }

    /// Overwrite the field backing `option` with `value`
    ///
    /// Returns false if `option` is not one of the six settings or the value
    /// has the wrong type.
    pub fn set(&mut self, option: &str, value: &OptionValue) -> bool {
        let name = option.to_ascii_lowercase();
        match (name.as_str(), value) {
            ("threads", OptionValue::Spin(v)) => self.threads = *v,
            ("hash", OptionValue::Spin(v)) => self.hash_mb = *v,
            ("skill level", OptionValue::Spin(v)) => self.skill_level = *v,
            ("uci_elo", OptionValue::Spin(v)) => self.uci_elo = *v,
            ("uci_limitstrength", OptionValue::Check(v)) => self.limit_strength = *v,
            ("use nnue", OptionValue::Check(v)) => self.use_nnue = *v,
            _ => return false,
        }
        true
    }
}

/// Time or depth budget of one engine request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    MoveTime(Duration),
    Depth(u32),
}

impl SearchLimit {
    /// Per-move budget of the engine's replies
    pub const DEFAULT_MOVE_TIME: Duration = Duration::from_millis(100);

    /// Depth of evaluation requests
    pub const DEFAULT_ANALYSIS_DEPTH: u32 = 20;
}

/// Engine score from the side to move's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(Centipawns),
    /// Mate in N moves; negative when the side to move is getting mated
    Mate(i32),
}

impl Score {
    /// Same score from the other side's point of view
    pub fn flipped(self) -> Self {
        match self {
            Score::Centipawns(cp) => Score::Centipawns(Centipawns(-cp.value())),
            Score::Mate(n) => Score::Mate(-n),
        }
    }
}

/// Score plus principal variation of one analysis
///
/// At most one of centipawns/mate is present by construction; no score at
/// all means "no evaluation yet".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvaluationResult {
    pub score: Option<Score>,
    pub principal_variation: Vec<Move>,
    pub depth: Option<u32>,
    /// Side to move in the analysed position
    pub side_to_move: PieceColor,
}

impl EvaluationResult {
    pub fn score_centipawns(&self) -> Option<i32> {
        match self.score? {
            Score::Centipawns(cp) => Some(cp.value()),
            Score::Mate(_) => None,
        }
    }

    /// Mate distance in plies, signed like the mate score
    pub fn mate_in_plies(&self) -> Option<i32> {
        match self.score? {
            Score::Mate(n) if n > 0 => Some(2 * n - 1),
            Score::Mate(n) => Some(2 * n),
            Score::Centipawns(_) => None,
        }
    }

    /// Score from white's point of view
    pub fn white_score(&self) -> Option<Score> {
        self.score.map(|score| match self.side_to_move {
            PieceColor::White => score,
            PieceColor::Black => score.flipped(),
        })
    }

    pub fn has_score(&self) -> bool {
        self.score.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stockfish_like() -> EngineOptions {
        let mut options = EngineOptions::default();
        for (name, default, min, max) in [
            (OPT_THREADS, 1, 1, 1024),
            (OPT_HASH, 16, 1, 33554432),
            (OPT_SKILL_LEVEL, 20, 0, 20),
            (OPT_UCI_ELO, 1320, 1320, 3190),
        ] {
            options.insert(EngineOption {
                name: name.to_string(),
                kind: OptionKind::Spin { default, min, max },
            });
        }
        options.insert(EngineOption {
            name: OPT_LIMIT_STRENGTH.to_string(),
            kind: OptionKind::Check { default: false },
        });
        options
    }

    #[test]
    fn test_settings_seeded_from_engine_defaults() {
        let settings = EngineSettings::from_defaults(&stockfish_like());
        assert_eq!(settings.threads, 1);
        assert_eq!(settings.skill_level, 20);
        assert!(!settings.limit_strength);
        // not advertised, keeps the fallback
        assert!(!settings.use_nnue);
    }

    #[test]
    fn test_validate_bounds() {
        let options = stockfish_like();
        assert!(options.validate("Skill Level", &OptionValue::Spin(5)).is_ok());
        assert!(options.validate("skill level", &OptionValue::Spin(5)).is_ok());

        let err = options
            .validate(OPT_UCI_ELO, &OptionValue::Spin(9000))
            .unwrap_err();
        assert!(matches!(err, GameError::EngineConfigRejected { .. }));
        assert!(err.to_string().contains("above max 3190"));

        assert!(options.validate(OPT_HASH, &OptionValue::Spin(0)).is_err());
        assert!(options.validate(OPT_THREADS, &OptionValue::Check(true)).is_err());
        assert!(options.validate(OPT_USE_NNUE, &OptionValue::Check(true)).is_err());
    }

    #[test]
    fn test_option_values_cover_every_field() {
        let settings = EngineSettings::default();
        let names: Vec<&str> = settings.to_option_values().iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                OPT_THREADS,
                OPT_HASH,
                OPT_SKILL_LEVEL,
                OPT_UCI_ELO,
                OPT_LIMIT_STRENGTH,
                OPT_USE_NNUE
            ]
        );
    }

    #[test]
    fn test_settings_set_by_option_name() {
        let mut settings = EngineSettings::default();
        assert!(settings.set("Skill Level", &OptionValue::Spin(3)));
        assert!(settings.set("uci_limitstrength", &OptionValue::Check(false)));
        assert!(!settings.set("Threads", &OptionValue::Check(true)));
        assert!(!settings.set("Ponder", &OptionValue::Check(true)));
        assert_eq!(settings.skill_level, 3);
        assert!(!settings.limit_strength);
    }

    #[test]
    fn test_evaluation_exclusive_scores() {
        let mut eval = EvaluationResult {
            score: Some(Score::Centipawns(Centipawns(35))),
            ..Default::default()
        };
        assert_eq!(eval.score_centipawns(), Some(35));
        assert_eq!(eval.mate_in_plies(), None);

        eval.score = Some(Score::Mate(3));
        assert_eq!(eval.score_centipawns(), None);
        assert_eq!(eval.mate_in_plies(), Some(5));

        eval.score = Some(Score::Mate(-2));
        assert_eq!(eval.mate_in_plies(), Some(-4));

        assert!(!EvaluationResult::default().has_score());
    }

    #[test]
    fn test_white_pov_score() {
        let eval = EvaluationResult {
            score: Some(Score::Centipawns(Centipawns(50))),
            side_to_move: PieceColor::Black,
            ..Default::default()
        };
        assert_eq!(eval.white_score(), Some(Score::Centipawns(Centipawns(-50))));
    }
}
