//! Text commands accepted by the session.

use heapviz_core::{BranchingFactor, HeapOrder};
use heapviz_engine::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user-initiated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "arg", rename_all = "snake_case")]
pub enum HeapCommand {
    Insert(Value),
    Extract,
    Heapify,
    Random,
    Clear,
    SetBranchingFactor(BranchingFactor),
    SetOrder(HeapOrder),
}

impl fmt::Display for HeapCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapCommand::Insert(v) => write!(f, "insert {v}"),
            HeapCommand::Extract => write!(f, "extract"),
            HeapCommand::Heapify => write!(f, "heapify"),
            HeapCommand::Random => write!(f, "random"),
            HeapCommand::Clear => write!(f, "clear"),
            HeapCommand::SetBranchingFactor(d) => write!(f, "d {d}"),
            HeapCommand::SetOrder(order) => write!(f, "order {order}"),
        }
    }
}

/// Rejected command text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    UnexpectedArgument(String),
    InvalidNumber(String),
    InvalidBranchingFactor(String),
    InvalidOrder(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "empty command"),
            CommandError::Unknown(word) => write!(f, "unknown command `{word}`"),
            CommandError::MissingArgument(command) => {
                write!(f, "`{command}` needs an argument")
            }
            CommandError::UnexpectedArgument(arg) => write!(f, "unexpected argument `{arg}`"),
            CommandError::InvalidNumber(text) => {
                write!(f, "please enter a valid number, got `{text}`")
            }
            CommandError::InvalidBranchingFactor(text) => write!(
                f,
                "branching factor must be an integer of at least {}, got `{text}`",
                BranchingFactor::MIN
            ),
            CommandError::InvalidOrder(text) => {
                write!(f, "order must be `min` or `max`, got `{text}`")
            }
        }
    }
}

impl std::error::Error for CommandError {}

impl FromStr for HeapCommand {
    type Err = CommandError;

    /// Parse one command. A bare integer is shorthand for `insert`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };
        let arg = words.next();
        if let Some(extra) = words.next() {
            return Err(CommandError::UnexpectedArgument(extra.to_string()));
        }

        let command = match head.to_ascii_lowercase().as_str() {
            "insert" | "i" | "push" => {
                let arg = arg.ok_or(CommandError::MissingArgument("insert"))?;
                return parse_value(arg).map(HeapCommand::Insert);
            }
            "d" | "branching" => {
                let arg = arg.ok_or(CommandError::MissingArgument("d"))?;
                let d = arg
                    .parse::<usize>()
                    .ok()
                    .and_then(|d| BranchingFactor::new(d).ok())
                    .ok_or_else(|| CommandError::InvalidBranchingFactor(arg.to_string()))?;
                return Ok(HeapCommand::SetBranchingFactor(d));
            }
            "order" => {
                let arg = arg.ok_or(CommandError::MissingArgument("order"))?;
                let order = arg
                    .parse::<HeapOrder>()
                    .map_err(|_| CommandError::InvalidOrder(arg.to_string()))?;
                return Ok(HeapCommand::SetOrder(order));
            }
            "min" => HeapCommand::SetOrder(HeapOrder::Min),
            "max" => HeapCommand::SetOrder(HeapOrder::Max),
            "extract" | "pop" | "x" => HeapCommand::Extract,
            "heapify" | "build" => HeapCommand::Heapify,
            "random" | "rand" => HeapCommand::Random,
            "clear" | "reset" => HeapCommand::Clear,
            _ if arg.is_none() && looks_numeric(head) => {
                return parse_value(head).map(HeapCommand::Insert);
            }
            _ => return Err(CommandError::Unknown(head.to_string())),
        };

        match arg {
            Some(extra) => Err(CommandError::UnexpectedArgument(extra.to_string())),
            None => Ok(command),
        }
    }
}

fn looks_numeric(word: &str) -> bool {
    word.trim_start_matches(['-', '+'])
        .starts_with(|c: char| c.is_ascii_digit())
}

fn parse_value(text: &str) -> Result<Value, CommandError> {
    text.parse::<Value>()
        .map_err(|_| CommandError::InvalidNumber(text.to_string()))
}

/// Parse a script of commands separated by `;` or newlines.
///
/// Blank entries and `#` comments are skipped. The whole script is rejected
/// if any command fails to parse.
pub fn parse_script(script: &str) -> Result<Vec<HeapCommand>, CommandError> {
    script
        .split([';', '\n'])
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::parse)
        .collect()
}
