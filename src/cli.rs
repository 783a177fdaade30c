//! Command-line argument parsing for the replay tool
//!
//! The replay tool drives one entry with a script of intents, one per line:
//!
//! ```text
//! # comments and blank lines are ignored
//! type ff00aa          # insert characters one by one
//! key shift+word-left  # movement, backspace, delete, enter
//! select-all
//! place 3              # click at byte offset
//! drag 5               # extend selection to byte offset
//! copy
//! paste primary        # clipboard when omitted
//! foreign clipboard 255, 0, 0   # another client owns the slot
//! pump                 # deliver pending selection events
//! tick 200             # advance the clock in milliseconds
//! commit
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::clipboard::Slot;
use crate::editable::{EntryMsg, MoveTarget, ValidationPolicy};

/// Replay text entry intents against a color entry
#[derive(Parser, Debug)]
#[command(
    name = "pixelprism",
    version,
    about = "Replay text entry intents against a color entry"
)]
pub struct CliArgs {
    /// Script of intents (reads stdin when omitted)
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Kind of entry to drive
    #[arg(short, long, value_enum, default_value_t = KindArg::Hex)]
    pub kind: KindArg,

    /// Initial text
    #[arg(long, value_name = "TEXT")]
    pub initial: Option<String>,

    /// Config file (defaults to ~/.config/pixelprism/config.yaml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print snapshots as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Print the entry after every step, not just at the end
    #[arg(short, long)]
    pub verbose: bool,

    /// Bridge the clipboard slot to the OS clipboard
    #[arg(long)]
    pub system_clipboard: bool,
}

/// Entry presets selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Text,
    Integer,
    Float,
    Hex,
    RgbInteger,
    RgbFloat,
}

impl KindArg {
    pub fn policy(self) -> ValidationPolicy {
        match self {
            KindArg::Text => ValidationPolicy::text(),
            KindArg::Integer => ValidationPolicy::integer(),
            KindArg::Float => ValidationPolicy::float(),
            KindArg::Hex => ValidationPolicy::hex(),
            KindArg::RgbInteger => ValidationPolicy::rgb_integer(),
            KindArg::RgbFloat => ValidationPolicy::rgb_float(),
        }
    }
}

/// One line of a replay script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Intent(EntryMsg),
    /// Insert each character as its own intent
    Type(String),
    /// Replace the text programmatically
    SetText(String),
    /// A foreign client claims `slot` and serves `text`
    Foreign { slot: Slot, text: String },
    Pump,
    Tick(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

/// Parse a whole script. Lines are 1-indexed in errors.
pub fn parse_script(source: &str) -> Result<Vec<Step>, ScriptError> {
    source
        .lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let line = strip_comment(raw).trim();
            (!line.is_empty()).then(|| {
                parse_step(line).map_err(|message| ScriptError {
                    line: i + 1,
                    message,
                })
            })
        })
        .collect()
}

fn strip_comment(line: &str) -> &str {
    // Trailing comments need two spaces before `#` so `set #FF00AA` survives
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find("  #") {
        Some(i) => &line[..i],
        None => line,
    }
}

fn parse_step(line: &str) -> Result<Step, String> {
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest),
        None => (line, ""),
    };

    match command {
        "type" => Ok(Step::Type(rest.to_string())),
        "set" => Ok(Step::SetText(rest.to_string())),
        "key" => parse_key(rest.trim()).map(Step::Intent),
        "place" | "drag" => {
            let offset = rest
                .trim()
                .parse()
                .map_err(|_| format!("expected a byte offset, got {:?}", rest))?;
            Ok(Step::Intent(EntryMsg::PlaceCursor {
                offset,
                extend: command == "drag",
            }))
        }
        "select-all" => Ok(Step::Intent(EntryMsg::SelectAll)),
        "select-word" => Ok(Step::Intent(EntryMsg::SelectWord)),
        "copy" => Ok(Step::Intent(EntryMsg::Copy)),
        "cut" => Ok(Step::Intent(EntryMsg::Cut)),
        "paste" => Ok(Step::Intent(EntryMsg::Paste(parse_slot(rest.trim())?))),
        "undo" => Ok(Step::Intent(EntryMsg::Undo)),
        "redo" => Ok(Step::Intent(EntryMsg::Redo)),
        "clear" => Ok(Step::Intent(EntryMsg::Clear)),
        "commit" => Ok(Step::Intent(EntryMsg::Commit)),
        "foreign" => {
            let (slot, text) = rest.split_once(' ').unwrap_or((rest, ""));
            Ok(Step::Foreign {
                slot: parse_slot(slot)?,
                text: text.to_string(),
            })
        }
        "pump" => Ok(Step::Pump),
        "tick" => {
            let ms = rest
                .trim()
                .parse()
                .map_err(|_| format!("expected milliseconds, got {:?}", rest))?;
            Ok(Step::Tick(Duration::from_millis(ms)))
        }
        other => Err(format!("unknown command {:?}", other)),
    }
}

fn parse_slot(name: &str) -> Result<Slot, String> {
    match name {
        "" | "clipboard" => Ok(Slot::Clipboard),
        "primary" => Ok(Slot::Primary),
        other => Err(format!("unknown slot {:?}", other)),
    }
}

fn parse_key(spec: &str) -> Result<EntryMsg, String> {
    let (shift, key) = match spec.strip_prefix("shift+") {
        Some(key) => (true, key),
        None => (false, spec),
    };

    let target = match key {
        "backspace" if !shift => return Ok(EntryMsg::DeleteBackward),
        "delete" if !shift => return Ok(EntryMsg::DeleteForward),
        "enter" if !shift => return Ok(EntryMsg::Commit),
        "left" => MoveTarget::Left,
        "right" => MoveTarget::Right,
        "home" => MoveTarget::LineStart,
        "end" => MoveTarget::LineEnd,
        "word-left" => MoveTarget::WordLeft,
        "word-right" => MoveTarget::WordRight,
        _ => return Err(format!("unknown key {:?}", spec)),
    };

    Ok(if shift {
        EntryMsg::MoveWithSelection(target)
    } else {
        EntryMsg::Move(target)
    })
}
