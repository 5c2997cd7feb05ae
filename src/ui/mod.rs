//! User interface models
//!
//! Plain data and formatting behind the on-screen panels; the front-end
//! decides how to draw them.
//!
//! # Modules
//!
//! - `game_ui` - status line, game-over banner, evaluation and PV text
//! - `settings_panel` - engine option sliders, toggles, human colour

pub mod game_ui;
pub mod settings_panel;

pub use game_ui::{evaluation_text, format_pv, status_line};
pub use settings_panel::{PanelError, SettingsPanel, Slider};
