//! UCI wire format
//!
//! Formatting of the commands the bridge sends and parsing of the lines the
//! engine writes back. Nothing here touches a process.

use crate::game::rules::PositionSnapshot;
use crate::game::types::{Centipawns, Move};

use super::resource::{EngineOption, OptionKind, OptionValue, Score, SearchLimit};

/// One parsed line of engine output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciMessage {
    IdName(String),
    IdAuthor(String),
    Option(EngineOption),
    UciOk,
    ReadyOk,
    Info(InfoLine),
    /// `bestmove <move> [ponder <move>]`; `None` for `(none)`/`0000`
    BestMove(Option<String>),
    /// Anything else, which the protocol says to ignore
    Other(String),
}

/// Fields of an `info` line this crate cares about
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InfoLine {
    pub depth: Option<u32>,
    pub multipv: Option<u32>,
    pub score: Option<Score>,
    /// `lowerbound`/`upperbound` scores are not exact
    pub bound: bool,
    pub pv: Vec<String>,
}

/// Parse one line of engine output
pub fn parse_line(line: &str) -> UciMessage {
    let line = line.trim();
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("id") => match tokens.next() {
            Some("name") => UciMessage::IdName(rest(tokens)),
            Some("author") => UciMessage::IdAuthor(rest(tokens)),
            _ => UciMessage::Other(line.to_string()),
        },
        Some("option") => match parse_option(line) {
            Some(option) => UciMessage::Option(option),
            None => UciMessage::Other(line.to_string()),
        },
        Some("uciok") => UciMessage::UciOk,
        Some("readyok") => UciMessage::ReadyOk,
        Some("info") => UciMessage::Info(parse_info(tokens)),
        Some("bestmove") => match tokens.next() {
            Some("(none)") | Some("0000") | None => UciMessage::BestMove(None),
            Some(mv) => UciMessage::BestMove(Some(mv.to_string())),
        },
        _ => UciMessage::Other(line.to_string()),
    }
}

fn rest<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}

/// `option name <name...> type <kind> [default ..] [min ..] [max ..] [var ..]*`
fn parse_option(line: &str) -> Option<EngineOption> {
    const KEYWORDS: [&str; 6] = ["name", "type", "default", "min", "max", "var"];

    let tokens: Vec<&str> = line.split_whitespace().skip(1).collect();
    let mut name: Vec<&str> = Vec::new();
    let mut kind: Option<&str> = None;
    let mut default: Vec<&str> = Vec::new();
    let mut min = None;
    let mut max = None;
    let mut vars: Vec<String> = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let keyword = tokens[i];
        let start = i + 1;
        let mut end = start;
        // option names may contain spaces, but never the keyword "type"
        while end < tokens.len()
            && !(KEYWORDS.contains(&tokens[end]) && (keyword != "name" || tokens[end] == "type"))
        {
            end += 1;
        }
        let value = &tokens[start..end];
        match keyword {
            "name" => name = value.to_vec(),
            "type" => kind = value.first().copied(),
            "default" => default = value.to_vec(),
            "min" => min = value.first().and_then(|v| v.parse::<i64>().ok()),
            "max" => max = value.first().and_then(|v| v.parse::<i64>().ok()),
            "var" => vars.push(value.join(" ")),
            _ => {}
        }
        i = end;
    }

    if name.is_empty() {
        return None;
    }
    let default = default.join(" ");
    let kind = match kind? {
        "spin" => OptionKind::Spin {
            default: default.parse().ok()?,
            min: min?,
            max: max?,
        },
        "check" => OptionKind::Check {
            default: default == "true",
        },
        "combo" => OptionKind::Combo { default, vars },
        "string" => OptionKind::Text {
            default: if default == "<empty>" {
                String::new()
            } else {
                default
            },
        },
        "button" => OptionKind::Button,
        _ => return None,
    };
    Some(EngineOption {
        name: name.join(" "),
        kind,
    })
}

fn parse_info<'a>(mut tokens: impl Iterator<Item = &'a str>) -> InfoLine {
    let mut info = InfoLine::default();
    while let Some(token) = tokens.next() {
        match token {
            "depth" => info.depth = tokens.next().and_then(|v| v.parse().ok()),
            "multipv" => info.multipv = tokens.next().and_then(|v| v.parse().ok()),
            "score" => {
                info.score = match (tokens.next(), tokens.next().and_then(|v| v.parse().ok())) {
                    (Some("cp"), Some(cp)) => Some(Score::Centipawns(Centipawns(cp))),
                    (Some("mate"), Some(n)) => Some(Score::Mate(n)),
                    _ => None,
                };
            }
            "lowerbound" | "upperbound" => info.bound = true,
            "pv" => {
                info.pv = tokens.by_ref().map(str::to_string).collect();
            }
            // free text up to end of line
            "string" => break,
            _ => {}
        }
    }
    info
}

/// `position startpos|fen <fen> [moves ...]`
pub fn position_command(position: &PositionSnapshot) -> String {
    let mut command = match &position.start_fen {
        Some(fen) => format!("position fen {fen}"),
        None => "position startpos".to_string(),
    };
    if !position.moves.is_empty() {
        command.push_str(" moves");
        for mv in &position.moves {
            command.push(' ');
            command.push_str(&mv.to_uci());
        }
    }
    command
}

pub fn go_command(limit: &SearchLimit) -> String {
    match limit {
        SearchLimit::MoveTime(duration) => format!("go movetime {}", duration.as_millis().max(1)),
        SearchLimit::Depth(depth) => format!("go depth {}", (*depth).max(1)),
    }
}

pub fn setoption_command(name: &str, value: &OptionValue) -> String {
    format!("setoption name {name} value {value}")
}

/// Parse a PV, stopping at the first move that is not coordinate notation
pub fn parse_pv(pv: &[String]) -> Vec<Move> {
    pv.iter().map_while(|text| text.parse::<Move>().ok()).collect()
}
