//! Line-oriented event scripts for driving a session without a window.
//!
//! ```text
//! # draw and keep a horizon on the first frame
//! down left 120 340
//! move 400 352
//! up 700 361
//! validate
//! next
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::drawing::{PointerButton, PointerEvent};
use crate::session::KeyCommand;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Pointer(PointerEvent),
    Key(KeyCommand),
    Next,
    Back,
    Offset(String),
    Thickness(String),
    Load(PathBuf),
    Save,
}

/// Parse a whole script, skipping blank lines and `#` comments
pub fn parse_script(text: &str) -> Result<Vec<ScriptCommand>, ScriptError> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let line = raw.split('#').next().unwrap_or("").trim();
            (!line.is_empty()).then_some((i + 1, line))
        })
        .map(|(line_no, line)| {
            line.parse::<ScriptCommand>().map_err(|err| match err {
                ScriptError::UnknownCommand { command, .. } => ScriptError::UnknownCommand {
                    line: line_no,
                    command,
                },
                ScriptError::Malformed { message, .. } => ScriptError::Malformed {
                    line: line_no,
                    message,
                },
            })
        })
        .collect()
}

fn malformed(message: impl Into<String>) -> ScriptError {
    ScriptError::Malformed {
        line: 0,
        message: message.into(),
    }
}

fn coords(args: &[&str]) -> Result<(i32, i32), ScriptError> {
    let [x, y] = args else {
        return Err(malformed(format!("expected 'X Y', got {:?}", args.join(" "))));
    };
    let x = x
        .parse()
        .map_err(|_| malformed(format!("invalid x coordinate '{x}'")))?;
    let y = y
        .parse()
        .map_err(|_| malformed(format!("invalid y coordinate '{y}'")))?;
    Ok((x, y))
}

fn single<'a>(command: &str, args: &[&'a str]) -> Result<&'a str, ScriptError> {
    match args {
        [value] => Ok(*value),
        _ => Err(malformed(format!("'{command}' takes exactly one argument"))),
    }
}

impl FromStr for ScriptCommand {
    type Err = ScriptError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or("");
        let args: Vec<&str> = words.collect();

        let parsed = match command {
            "down" => {
                let Some((button, rest)) = args.split_first() else {
                    return Err(malformed("'down' needs a button and coordinates"));
                };
                let button = match *button {
                    "left" | "primary" => PointerButton::Primary,
                    "right" | "secondary" => PointerButton::Secondary,
                    other => return Err(malformed(format!("unknown button '{other}'"))),
                };
                let (x, y) = coords(rest)?;
                Self::Pointer(PointerEvent::Down { button, x, y })
            }
            "move" => {
                let (x, y) = coords(&args)?;
                Self::Pointer(PointerEvent::Move { x, y })
            }
            "up" => {
                let (x, y) = coords(&args)?;
                Self::Pointer(PointerEvent::Up { x, y })
            }
            "cancel" => Self::Pointer(PointerEvent::Cancel),
            "validate" => Self::Key(KeyCommand::Validate),
            "delete" => Self::Key(KeyCommand::Delete),
            "show" => Self::Key(KeyCommand::Show),
            "hide" => Self::Key(KeyCommand::Hide),
            "propagate" => Self::Key(KeyCommand::PropagateBackward),
            "next" => Self::Next,
            "back" => Self::Back,
            "offset" => Self::Offset(single(command, &args)?.to_string()),
            "thickness" => Self::Thickness(single(command, &args)?.to_string()),
            "load" => Self::Load(PathBuf::from(single(command, &args)?)),
            "save" => Self::Save,
            other => {
                return Err(ScriptError::UnknownCommand {
                    line: 0,
                    command: other.to_string(),
                })
            }
        };
        Ok(parsed)
    }
}
