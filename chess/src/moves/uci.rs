//! Moves in long algebraic notation, like `e2e4` or `e7e8q`

use super::base::{self, PromotePiece};
use crate::error::{Error, NotationError};
use crate::position::Position;
use crate::legal;
use crate::types::{Square, SquareParseError};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing a move in long algebraic notation
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawParseError {
    #[error("non-ASCII data in move")]
    NonAscii,
    #[error("bad string length")]
    BadLength,
    #[error("bad source: {0}")]
    BadSrc(SquareParseError),
    #[error("bad destination: {0}")]
    BadDst(SquareParseError),
    #[error("bad promote char {0:?}")]
    BadPromote(char),
}

/// Move in long algebraic notation
///
/// This is only the textual form: it doesn't know the move kind, so it must be resolved against a
/// position with [`Move::into_move()`] before it can be applied.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Move {
    pub src: Square,
    pub dst: Square,
    pub promote: Option<PromotePiece>,
}

impl Move {
    /// Finds the legal move in `pos` written as `self`
    ///
    /// A promotion written without the piece letter is reported as
    /// [`NotationError::MissingPromotion`], as it may stand for any of the four moves.
    pub fn into_move(self, pos: &Position) -> Result<base::Move, Error> {
        let mut same_squares = false;
        for mv in &legal::legal_moves(pos) {
            if mv.src() == self.src && mv.dst() == self.dst {
                if mv.promote() == self.promote {
                    return Ok(*mv);
                }
                same_squares = true;
            }
        }
        if same_squares && self.promote.is_none() {
            return Err(NotationError::MissingPromotion(self).into());
        }
        Err(Error::IllegalMove(self))
    }
}

impl From<base::Move> for Move {
    #[inline]
    fn from(mv: base::Move) -> Move {
        Move {
            src: mv.src(),
            dst: mv.dst(),
            promote: mv.promote(),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)?;
        if let Some(p) = self.promote {
            write!(f, "{}", p.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = RawParseError;

    fn from_str(s: &str) -> Result<Move, Self::Err> {
        if !s.is_ascii() {
            return Err(RawParseError::NonAscii);
        }
        if !matches!(s.len(), 4 | 5) {
            return Err(RawParseError::BadLength);
        }
        let src = Square::from_str(&s[0..2]).map_err(RawParseError::BadSrc)?;
        let dst = Square::from_str(&s[2..4]).map_err(RawParseError::BadDst)?;
        let promote = match s.as_bytes().get(4) {
            Some(&b) => Some(
                PromotePiece::from_char(b as char).ok_or(RawParseError::BadPromote(b as char))?,
            ),
            None => None,
        };
        Ok(Move { src, dst, promote })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::MoveKind;
    use crate::types::{CastlingSide, Color, File, Rank};

    #[test]
    fn test_parse() {
        let e2 = Square::from_parts(File::E, Rank::R2);
        let e4 = Square::from_parts(File::E, Rank::R4);
        assert_eq!(
            Move::from_str("e2e4"),
            Ok(Move {
                src: e2,
                dst: e4,
                promote: None
            })
        );
        assert_eq!(Move::from_str("e2e4").unwrap().to_string(), "e2e4");
        assert_eq!(Move::from_str("a7a8n").unwrap().to_string(), "a7a8n");

        assert_eq!(Move::from_str("e2e"), Err(RawParseError::BadLength));
        assert_eq!(Move::from_str("e2e4qq"), Err(RawParseError::BadLength));
        assert_eq!(Move::from_str("е2e4"), Err(RawParseError::NonAscii));
        assert_eq!(
            Move::from_str("i2e4"),
            Err(RawParseError::BadSrc(SquareParseError::UnexpectedFileChar('i')))
        );
        assert_eq!(
            Move::from_str("e2e9"),
            Err(RawParseError::BadDst(SquareParseError::UnexpectedRankChar('9')))
        );
        assert_eq!(Move::from_str("e7e8k"), Err(RawParseError::BadPromote('k')));
        assert_eq!(Move::from_str("e7e8Q"), Err(RawParseError::BadPromote('Q')));
    }

    #[test]
    fn test_resolve() {
        let pos = Position::initial();
        let mv = base::Move::from_uci("e2e4", &pos).unwrap();
        assert_eq!(mv.kind(), MoveKind::Normal);

        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(
            base::Move::from_uci("e1g1", &pos),
            Ok(base::Move::castling(Color::White, CastlingSide::King))
        );
        assert_eq!(
            base::Move::from_uci("e1c1", &pos),
            Ok(base::Move::castling(Color::White, CastlingSide::Queen))
        );

        let pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        assert_eq!(
            base::Move::from_uci("e5d6", &pos).unwrap().kind(),
            MoveKind::EnPassant
        );
    }

    #[test]
    fn test_resolve_errors() {
        let pos = Position::from_fen("8/4P2k/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let missing = Move::from_str("e7e8").unwrap();
        assert_eq!(
            base::Move::from_uci("e7e8", &pos),
            Err(Error::InvalidNotation(NotationError::MissingPromotion(missing)))
        );
        assert_eq!(
            base::Move::from_uci("e7e8r", &pos).unwrap().promote(),
            Some(PromotePiece::Rook)
        );

        // No pawn move reaches e8, so there is nothing to promote
        let pos = Position::from_fen("4k3/8/8/8/8/8/4P3/K7 w - - 0 1").unwrap();
        let bad = Move::from_str("e2e8").unwrap();
        assert_eq!(base::Move::from_uci("e2e8", &pos), Err(Error::IllegalMove(bad)));

        // Blocked promotion
        let pos = Position::from_fen("4k3/4P3/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let bad = Move::from_str("e7e8").unwrap();
        assert_eq!(base::Move::from_uci("e7e8", &pos), Err(Error::IllegalMove(bad)));

        let pos = Position::initial();
        let bad = Move::from_str("e2e5").unwrap();
        assert_eq!(base::Move::from_uci("e2e5", &pos), Err(Error::IllegalMove(bad)));
        let bad = Move::from_str("e2e4q").unwrap();
        assert_eq!(base::Move::from_uci("e2e4q", &pos), Err(Error::IllegalMove(bad)));
        assert!(matches!(
            base::Move::from_uci("e2", &pos),
            Err(Error::InvalidNotation(_))
        ));
    }
}
