//! Parsing of what the engine writes on stdout.

pub mod parser;

pub use parser::{parse_uci_message, parse_uci_move, UciMessage};

/// A line from the engine that could not be understood. The reader task logs
/// and skips these; they never abort an evaluation.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    #[error("malformed engine line: {0}")]
    MalformedMessage(String),
    #[error("unrecognized engine line: {0}")]
    UnknownMessage(String),
    #[error("invalid UCI move '{0}'")]
    InvalidMove(String),
    #[error("invalid square '{0}'")]
    InvalidSquare(String),
    #[error("invalid promotion in '{0}'")]
    InvalidPromotion(String),
}
