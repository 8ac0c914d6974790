//! Side to move lifted to the type level, so hot paths get monomorphized per color
//!
//! Pawn geometry lives here as well: everything about pawns except the direction of a push is the
//! same for both colors.

use crate::bitboard::Bitboard;
use crate::bitboard_consts;
use crate::types::{self, File};

pub trait Color {
    const COLOR: types::Color;
    /// Index of the first square on the back rank
    const CASTLING_OFFSET: usize;
    /// Index change of a single pawn push
    const PAWN_FORWARD: isize;
    type Inv: Color;

    /// Moves every square of `b` one rank towards the opponent
    fn pawn_push(b: Bitboard) -> Bitboard;

    /// Pawn captures towards the A file
    #[inline]
    fn pawn_capture_left(b: Bitboard) -> Bitboard {
        Self::pawn_push((b & !bitboard_consts::file(File::A)).shr(1))
    }

    /// Pawn captures towards the H file
    #[inline]
    fn pawn_capture_right(b: Bitboard) -> Bitboard {
        Self::pawn_push((b & !bitboard_consts::file(File::H)).shl(1))
    }
}

pub struct White;
pub struct Black;

// Rank 8 has the lowest indices, so White moves towards zero
impl Color for White {
    const COLOR: types::Color = types::Color::White;
    const CASTLING_OFFSET: usize = 56;
    const PAWN_FORWARD: isize = -8;
    type Inv = Black;

    #[inline]
    fn pawn_push(b: Bitboard) -> Bitboard {
        b.shr(8)
    }
}

impl Color for Black {
    const COLOR: types::Color = types::Color::Black;
    const CASTLING_OFFSET: usize = 0;
    const PAWN_FORWARD: isize = 8;
    type Inv = White;

    #[inline]
    fn pawn_push(b: Bitboard) -> Bitboard {
        b.shl(8)
    }
}
