//! Engine settings panel model
//!
//! Sliders for the numeric engine options, toggles for the two boolean ones
//! and the human colour switch. Slider ranges come from the bounds the engine
//! advertised, so a slider can never hold a value the engine would refuse.
//! Nothing is sent until the panel's settings are applied on reset.

use crate::game::ai::resource::{
    EngineOptions, EngineSettings, OPT_HASH, OPT_SKILL_LEVEL, OPT_THREADS, OPT_UCI_ELO,
};
use crate::game::types::PieceColor;

/// A panel command that could not be applied
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    #[error("Unknown setting '{0}' (threads, hash, skill, elo, limit, nnue)")]
    UnknownSetting(String),
    #[error("Invalid value '{value}' for {setting}")]
    InvalidValue { setting: String, value: String },
}

/// One numeric option slider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slider {
    pub option: &'static str,
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
    value: i64,
}

impl Slider {
    fn new(option: &'static str, label: &'static str, options: &EngineOptions, start: i64) -> Self {
        let (min, max) = options.spin_bounds(option).unwrap_or((start, start));
        Slider {
            option,
            label,
            min,
            max,
            value: start.clamp(min, max),
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Move the slider; returns the clamped value it landed on
    pub fn set(&mut self, value: i64) -> i64 {
        self.value = value.clamp(self.min, self.max);
        self.value
    }

    pub fn caption(&self) -> String {
        format!("{}: {}", self.label, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPanel {
    pub threads: Slider,
    pub hash: Slider,
    pub skill_level: Slider,
    pub uci_elo: Slider,
    limit_strength: bool,
    use_nnue: bool,
    human_color: PieceColor,
}

impl SettingsPanel {
    /// Panel starting from the engine's own defaults
    pub fn from_engine(options: &EngineOptions, human_color: PieceColor) -> Self {
        Self::with_settings(options, &EngineSettings::from_defaults(options), human_color)
    }

    /// Panel starting from saved settings, clamped to the engine's bounds
    pub fn with_settings(
        options: &EngineOptions,
        settings: &EngineSettings,
        human_color: PieceColor,
    ) -> Self {
        SettingsPanel {
            threads: Slider::new(OPT_THREADS, "Threads", options, settings.threads),
            hash: Slider::new(OPT_HASH, "Hash", options, settings.hash_mb),
            skill_level: Slider::new(OPT_SKILL_LEVEL, "Skill Level", options, settings.skill_level),
            uci_elo: Slider::new(OPT_UCI_ELO, "UCI Elo", options, settings.uci_elo),
            limit_strength: settings.limit_strength,
            use_nnue: settings.use_nnue,
            human_color,
        }
    }

    pub fn toggle_limit_strength(&mut self) -> bool {
        self.limit_strength = !self.limit_strength;
        self.limit_strength
    }

    pub fn toggle_use_nnue(&mut self) -> bool {
        self.use_nnue = !self.use_nnue;
        self.use_nnue
    }

    pub fn toggle_human_color(&mut self) -> PieceColor {
        self.human_color = self.human_color.opposite();
        self.human_color
    }

    /// Colour the human plays after the next reset
    pub fn human_color(&self) -> PieceColor {
        self.human_color
    }

    /// Settings sent to the engine on reset
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            threads: self.threads.value(),
            hash_mb: self.hash.value(),
            skill_level: self.skill_level.value(),
            uci_elo: self.uci_elo.value(),
            limit_strength: self.limit_strength,
            use_nnue: self.use_nnue,
        }
    }

    /// Captions in panel order
    pub fn labels(&self) -> Vec<String> {
        vec![
            if self.human_color == PieceColor::White {
                "White".to_string()
            } else {
                "Black".to_string()
            },
            self.threads.caption(),
            self.hash.caption(),
            self.skill_level.caption(),
            self.uci_elo.caption(),
            format!("Limit Strength: {}", on_off(self.limit_strength)),
            format!("Use NNUE: {}", on_off(self.use_nnue)),
        ]
    }

    /// Apply a `set <setting> <value>` command
    ///
    /// Returns the caption of the changed control.
    pub fn apply(&mut self, setting: &str, value: &str) -> Result<String, PanelError> {
        let invalid = || PanelError::InvalidValue {
            setting: setting.to_string(),
            value: value.to_string(),
        };
        let slider = match setting.to_ascii_lowercase().as_str() {
            "threads" => &mut self.threads,
            "hash" => &mut self.hash,
            "skill" | "skill_level" => &mut self.skill_level,
            "elo" | "uci_elo" => &mut self.uci_elo,
            "limit" | "limit_strength" => {
                self.limit_strength = parse_switch(value).ok_or_else(invalid)?;
                return Ok(format!("Limit Strength: {}", on_off(self.limit_strength)));
            }
            "nnue" | "use_nnue" => {
                self.use_nnue = parse_switch(value).ok_or_else(invalid)?;
                return Ok(format!("Use NNUE: {}", on_off(self.use_nnue)));
            }
            _ => return Err(PanelError::UnknownSetting(setting.to_string())),
        };
        let parsed: i64 = value.trim().parse().map_err(|_| invalid())?;
        slider.set(parsed);
        Ok(slider.caption())
    }
}

fn on_off(state: bool) -> &'static str {
    if state {
        "On"
    } else {
        "Off"
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
