//! Errors reported by rules operations
//!
//! Every operation that fails leaves its inputs untouched, so the caller may just report the error
//! and go on.

use crate::moves::uci::{self, RawParseError};
use crate::types::{GameStatus, SquareParseError};

use thiserror::Error;

/// Reason why a string is not valid notation
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum NotationError {
    #[error("bad square: {0}")]
    Square(#[from] SquareParseError),
    #[error("bad move: {0}")]
    Move(#[from] RawParseError),
    /// A pawn reaches the last rank, but the piece to promote is not given
    #[error("move {0} needs a promotion piece")]
    MissingPromotion(uci::Move),
}

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum Error {
    #[error("invalid notation: {0}")]
    InvalidNotation(#[from] NotationError),
    #[error("illegal move {0}")]
    IllegalMove(uci::Move),
    /// The game has already ended with the given status
    #[error("game over: {0}")]
    GameOver(GameStatus),
}

impl From<SquareParseError> for Error {
    fn from(e: SquareParseError) -> Error {
        Error::InvalidNotation(e.into())
    }
}

impl From<RawParseError> for Error {
    fn from(e: RawParseError) -> Error {
        Error::InvalidNotation(e.into())
    }
}
