use super::uci;
use crate::error::Error;
use crate::position::Position;
use crate::types::{CastlingSide, Color, File, PieceKind, Rank, Square};
use crate::{castling, geometry, legal};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Move kind
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// Any move or capture not listed below, including pawn pushes
    Normal = 0,
    /// Castling; the move goes from the king's source to its destination square
    Castle = 1,
    /// En passant capture; the destination is the en passant target square
    EnPassant = 2,
    /// Pawn promotion, either with or without capture
    Promotion = 3,
}

/// Target piece for promotion
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PromotePiece {
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
}

impl PromotePiece {
    pub const ALL: [PromotePiece; 4] = [
        PromotePiece::Knight,
        PromotePiece::Bishop,
        PromotePiece::Rook,
        PromotePiece::Queen,
    ];

    /// Lowercase letter used in long algebraic notation
    pub fn as_char(&self) -> char {
        PieceKind::from(*self).as_char()
    }

    pub fn from_char(c: char) -> Option<PromotePiece> {
        PieceKind::from_char(c)?.try_into().ok()
    }
}

impl From<PromotePiece> for PieceKind {
    #[inline]
    fn from(p: PromotePiece) -> Self {
        match p {
            PromotePiece::Knight => PieceKind::Knight,
            PromotePiece::Bishop => PieceKind::Bishop,
            PromotePiece::Rook => PieceKind::Rook,
            PromotePiece::Queen => PieceKind::Queen,
        }
    }
}

impl TryFrom<PieceKind> for PromotePiece {
    type Error = ();

    #[inline]
    fn try_from(p: PieceKind) -> Result<Self, Self::Error> {
        match p {
            PieceKind::Knight => Ok(PromotePiece::Knight),
            PieceKind::Bishop => Ok(PromotePiece::Bishop),
            PieceKind::Rook => Ok(PromotePiece::Rook),
            PieceKind::Queen => Ok(PromotePiece::Queen),
            _ => Err(()),
        }
    }
}

/// Chess move
///
/// A move only describes what happens on the board; whether it can be played depends on the
/// position. Every move returned by the move generator is well-formed, and a move created by hand
/// must be well-formed too (see [`Move::new()`]). The promotion piece is set if and only if the kind
/// is [`MoveKind::Promotion`].
///
/// Moves are applied with [`Position::make_move()`], which rejects any move that is not legal in the
/// given position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    src: Square,
    dst: Square,
    promote: Option<PromotePiece>,
}

/// Error creating move
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CreateError {
    #[error("move is not well-formed")]
    NotWellFormed,
}

fn is_pawn_step(src: Square, dst: Square, from: Rank, to: Rank) -> bool {
    src.rank() == from
        && dst.rank() == to
        && src.file().index().abs_diff(dst.file().index()) <= 1
}

impl Move {
    /// Creates a move from its raw parts, checking that it is well-formed
    ///
    /// A move is well-formed if there exists a position where it may be played by either side.
    pub fn new(
        kind: MoveKind,
        src: Square,
        dst: Square,
        promote: Option<PromotePiece>,
    ) -> Result<Move, CreateError> {
        let mv = Move {
            kind,
            src,
            dst,
            promote,
        };
        match mv.is_well_formed() {
            true => Ok(mv),
            false => Err(CreateError::NotWellFormed),
        }
    }

    /// Creates a move of kind [`MoveKind::Normal`]
    #[inline]
    pub const fn normal(src: Square, dst: Square) -> Move {
        Move {
            kind: MoveKind::Normal,
            src,
            dst,
            promote: None,
        }
    }

    #[inline]
    pub const fn promotion(src: Square, dst: Square, promote: PromotePiece) -> Move {
        Move {
            kind: MoveKind::Promotion,
            src,
            dst,
            promote: Some(promote),
        }
    }

    #[inline]
    pub const fn en_passant(src: Square, dst: Square) -> Move {
        Move {
            kind: MoveKind::EnPassant,
            src,
            dst,
            promote: None,
        }
    }

    /// Creates a castling move made by `color` towards `side`
    #[inline]
    pub const fn castling(color: Color, side: CastlingSide) -> Move {
        Move {
            kind: MoveKind::Castle,
            src: castling::king_src(color),
            dst: castling::king_dst(color, side),
            promote: None,
        }
    }

    /// Parses a move in long algebraic notation and resolves it against the legal moves in `pos`
    ///
    /// Fails with [`Error::InvalidNotation`] if the string is malformed or if a pawn reaches the last
    /// rank without a promotion letter. Fails with [`Error::IllegalMove`] if the move is well-formed
    /// but cannot be played in `pos`.
    pub fn from_uci(s: &str, pos: &Position) -> Result<Move, Error> {
        uci::Move::from_str(s)?.into_move(pos)
    }

    /// Returns `true` if the move is well-formed
    pub fn is_well_formed(&self) -> bool {
        if self.src == self.dst || self.promote.is_some() != (self.kind == MoveKind::Promotion) {
            return false;
        }
        match self.kind {
            MoveKind::Normal => true,
            MoveKind::Castle => [Color::White, Color::Black].iter().any(|&c| {
                self.src == castling::king_src(c)
                    && (self.dst == castling::king_dst(c, CastlingSide::King)
                        || self.dst == castling::king_dst(c, CastlingSide::Queen))
            }),
            MoveKind::EnPassant => [Color::White, Color::Black].iter().any(|&c| {
                is_pawn_step(
                    self.src,
                    self.dst,
                    geometry::enpassant_src_rank(c),
                    geometry::enpassant_dst_rank(c),
                ) && self.src.file() != self.dst.file()
            }),
            MoveKind::Promotion => [Color::White, Color::Black].iter().any(|&c| {
                is_pawn_step(
                    self.src,
                    self.dst,
                    geometry::promote_src_rank(c),
                    geometry::promote_dst_rank(c),
                )
            }),
        }
    }

    /// Returns `true` if the move is legal in `pos`
    #[inline]
    pub fn is_legal(&self, pos: &Position) -> bool {
        legal::is_legal(pos, *self)
    }

    #[inline]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    #[inline]
    pub const fn src(&self) -> Square {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Square {
        self.dst
    }

    #[inline]
    pub const fn promote(&self) -> Option<PromotePiece> {
        self.promote
    }

    /// Returns the castling side if this is a castling move
    #[inline]
    pub fn castling_side(&self) -> Option<CastlingSide> {
        if self.kind != MoveKind::Castle {
            return None;
        }
        match self.dst.file() {
            File::G => Some(CastlingSide::King),
            _ => Some(CastlingSide::Queen),
        }
    }

    /// Converts this move into its long algebraic form
    #[inline]
    pub fn uci(&self) -> uci::Move {
        (*self).into()
    }
}

impl fmt::Display for Move {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.uci().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_well_formed() {
        assert!(Move::new(MoveKind::Normal, sq("g1"), sq("f3"), None).is_ok());
        assert!(Move::new(MoveKind::Normal, sq("e2"), sq("e4"), None).is_ok());
        assert_eq!(
            Move::new(MoveKind::Normal, sq("e2"), sq("e2"), None),
            Err(CreateError::NotWellFormed)
        );
        assert_eq!(
            Move::new(MoveKind::Normal, sq("e7"), sq("e8"), Some(PromotePiece::Queen)),
            Err(CreateError::NotWellFormed)
        );
        assert_eq!(
            Move::new(MoveKind::Promotion, sq("e7"), sq("e8"), None),
            Err(CreateError::NotWellFormed)
        );
        assert!(Move::new(MoveKind::Promotion, sq("e7"), sq("d8"), Some(PromotePiece::Knight)).is_ok());
        assert!(Move::new(MoveKind::Promotion, sq("b2"), sq("b1"), Some(PromotePiece::Rook)).is_ok());
        assert_eq!(
            Move::new(MoveKind::Promotion, sq("e6"), sq("e7"), Some(PromotePiece::Queen)),
            Err(CreateError::NotWellFormed)
        );
        assert_eq!(
            Move::new(MoveKind::Castle, sq("e1"), sq("g1"), None),
            Ok(Move::castling(Color::White, CastlingSide::King))
        );
        assert_eq!(
            Move::new(MoveKind::Castle, sq("e8"), sq("c8"), None),
            Ok(Move::castling(Color::Black, CastlingSide::Queen))
        );
        assert_eq!(
            Move::new(MoveKind::Castle, sq("e1"), sq("f1"), None),
            Err(CreateError::NotWellFormed)
        );
        assert!(Move::new(MoveKind::EnPassant, sq("e5"), sq("d6"), None).is_ok());
        assert!(Move::new(MoveKind::EnPassant, sq("d4"), sq("e3"), None).is_ok());
        assert_eq!(
            Move::new(MoveKind::EnPassant, sq("e5"), sq("e6"), None),
            Err(CreateError::NotWellFormed)
        );
    }

    #[test]
    fn test_accessors() {
        let mv = Move::promotion(sq("a7"), sq("b8"), PromotePiece::Queen);
        assert_eq!(mv.kind(), MoveKind::Promotion);
        assert_eq!(mv.src(), sq("a7"));
        assert_eq!(mv.dst(), sq("b8"));
        assert_eq!(mv.promote(), Some(PromotePiece::Queen));
        assert_eq!(mv.castling_side(), None);
        assert_eq!(mv.to_string(), "a7b8q");

        let mv = Move::castling(Color::Black, CastlingSide::King);
        assert_eq!(mv.src(), sq("e8"));
        assert_eq!(mv.dst(), sq("g8"));
        assert_eq!(mv.castling_side(), Some(CastlingSide::King));
        assert_eq!(mv.to_string(), "e8g8");
    }

    #[test]
    fn test_promote_piece() {
        for p in PromotePiece::ALL {
            assert_eq!(PromotePiece::from_char(p.as_char()), Some(p));
        }
        assert_eq!(PromotePiece::from_char('k'), None);
        assert_eq!(PromotePiece::from_char('p'), None);
        assert_eq!(PromotePiece::Knight.as_char(), 'n');
    }
}
