//! The error taxonomy shared by the parser, the board state, and the session
//! handler. Every variant knows both its wire category token and, via
//! `Display`, the human-readable message that follows it on the wire.

use std::fmt;

/// Failures raised while validating or mutating the board.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Note at ({x}, {y}) would leave the board")]
    OutOfBounds { x: u32, y: u32 },

    #[error("Complete overlap not allowed with note id={id}")]
    Overlap { id: u64 },

    #[error("No note covers ({x}, {y})")]
    PinMiss { x: u32, y: u32 },

    #[error("No pin at ({x}, {y})")]
    NoPin { x: u32, y: u32 },
}

/// Failures raised while parsing a single command line.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("{command} expects {expected} field(s), got {got}")]
    WrongArity {
        command: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("field {field} must be a non-negative integer, got {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("unknown GET criterion {0:?}")]
    UnknownCriterion(String),

    #[error("criterion {0} may only appear once")]
    DuplicateCriterion(&'static str),

    #[error("contains= requires an X and a Y value")]
    IncompleteContains,
}

/// Failures raised while validating process launch arguments.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("expected at least 6 arguments: port boardW boardH noteW noteH color...")]
    TooFewArguments,

    #[error("{field} must be a positive integer, got {value:?}")]
    NotAPositiveInteger { field: &'static str, value: String },

    #[error("at least one color must be supplied")]
    NoColors,
}

/// Any failure that can reach the session boundary and must be rendered as a
/// single `ERROR <CATEGORY> <message>` wire line.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Board(#[from] BoardError),

    /// Unexpected internal failure. Must be exceedingly rare; the session
    /// continues regardless.
    #[error("{0}")]
    Server(String),
}

impl ReplyError {
    /// The stable, uppercase wire token for this failure.
    pub fn category(&self) -> &'static str {
        match self {
            ReplyError::Command(_) => "INVALID_FORMAT",
            ReplyError::Board(BoardError::InvalidColor(_)) => "INVALID_COLOR",
            ReplyError::Board(BoardError::OutOfBounds { .. }) => "OUT_OF_BOUNDS",
            ReplyError::Board(BoardError::Overlap { .. }) => "OVERLAP_ERROR",
            ReplyError::Board(BoardError::PinMiss { .. }) => "PIN_MISS",
            ReplyError::Board(BoardError::NoPin { .. }) => "NO_PIN",
            ReplyError::Server(_) => "SERVER_ERROR",
        }
    }
}

impl fmt::Display for ReplyErrorLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ERROR {} {}", self.0.category(), self.0)
    }
}

/// Wraps a [`ReplyError`] so it formats as a complete `ERROR ...` wire line.
pub struct ReplyErrorLine<'a>(pub &'a ReplyError);
