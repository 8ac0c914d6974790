//! Attack tables
//!
//! Near attacks (king, knight, pawn) are plain lookups. Sliders walk a precomputed ray and cut it at
//! the first occupied square, which stays in the result: whether it is a capture or a friendly piece
//! is decided by the caller with a mask.

use crate::bitboard::Bitboard;
use crate::types::{Color, Piece, PieceKind, Square};

#[inline]
const fn bb(val: u64) -> Bitboard {
    Bitboard::from_raw(val)
}

include!(concat!(env!("OUT_DIR"), "/near_attacks.rs"));
include!(concat!(env!("OUT_DIR"), "/rays.rs"));

const DIAG_DIRS: [usize; 4] = [1, 3, 5, 7];
const LINE_DIRS: [usize; 4] = [0, 2, 4, 6];

#[inline]
fn ray(dir: usize, sq: Square, occupied: Bitboard) -> Bitboard {
    let full = RAYS[dir][sq.index()];
    let blockers = full & occupied;
    // Directions 0..4 go towards higher indices, so the nearest blocker is the lowest bit
    let nearest = if dir < 4 {
        blockers.first()
    } else {
        blockers.last()
    };
    match nearest {
        Some(b) => full ^ RAYS[dir][b.index()],
        None => full,
    }
}

#[inline]
pub fn king(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index()]
}

#[inline]
pub fn knight(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index()]
}

/// Squares attacked by a pawn of color `color` standing on `sq`
///
/// Only diagonal captures are attacks; pushes never are.
#[inline]
pub fn pawn(color: Color, sq: Square) -> Bitboard {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[sq.index()],
        Color::Black => BLACK_PAWN_ATTACKS[sq.index()],
    }
}

#[inline]
pub fn bishop(sq: Square, occupied: Bitboard) -> Bitboard {
    DIAG_DIRS
        .iter()
        .fold(Bitboard::EMPTY, |acc, &d| acc | ray(d, sq, occupied))
}

#[inline]
pub fn rook(sq: Square, occupied: Bitboard) -> Bitboard {
    LINE_DIRS
        .iter()
        .fold(Bitboard::EMPTY, |acc, &d| acc | ray(d, sq, occupied))
}

#[inline]
pub fn queen(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop(sq, occupied) | rook(sq, occupied)
}

type AttackRule = fn(Color, Square, Bitboard) -> Bitboard;

/// Movement rules indexed by [`PieceKind::index()`]
const RULES: [AttackRule; PieceKind::COUNT] = [
    |c, sq, _| pawn(c, sq),
    |_, sq, _| king(sq),
    |_, sq, _| knight(sq),
    |_, sq, occ| bishop(sq, occ),
    |_, sq, occ| rook(sq, occ),
    |_, sq, occ| queen(sq, occ),
];

/// Returns the squares attacked by `piece` standing on `sq` when `occupied` squares are taken
#[inline]
pub fn attacks(piece: Piece, sq: Square, occupied: Bitboard) -> Bitboard {
    RULES[piece.kind().index()](piece.color(), sq, occupied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{File, Rank};

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn squares(list: &[&str]) -> Bitboard {
        list.iter().fold(Bitboard::EMPTY, |b, s| b.with(sq(s)))
    }

    #[test]
    fn test_near() {
        assert_eq!(king(sq("a1")), squares(&["a2", "b2", "b1"]));
        assert_eq!(knight(sq("b1")), squares(&["a3", "c3", "d2"]));
        assert_eq!(knight(sq("e4")).len(), 8);
        assert_eq!(pawn(Color::White, sq("e4")), squares(&["d5", "f5"]));
        assert_eq!(pawn(Color::Black, sq("e4")), squares(&["d3", "f3"]));
        assert_eq!(pawn(Color::White, sq("a2")), squares(&["b3"]));
        assert_eq!(pawn(Color::Black, sq("h7")), squares(&["g6"]));
    }

    #[test]
    fn test_sliders() {
        assert_eq!(rook(sq("a1"), Bitboard::EMPTY).len(), 14);
        assert_eq!(bishop(sq("d4"), Bitboard::EMPTY).len(), 13);
        assert_eq!(queen(sq("d4"), Bitboard::EMPTY).len(), 27);

        let occupied = squares(&["d6", "b4", "d2", "f6"]);
        assert_eq!(
            rook(sq("d4"), occupied),
            squares(&["d5", "d6", "c4", "b4", "e4", "f4", "g4", "h4", "d3", "d2"])
        );
        assert_eq!(
            bishop(sq("d4"), occupied),
            squares(&["e5", "f6", "c5", "b6", "a7", "c3", "b2", "a1", "e3", "f2", "g1"])
        );
    }

    #[test]
    fn test_dispatch() {
        let occupied = squares(&["e2", "e7"]);
        let e4 = Square::from_parts(File::E, Rank::R4);
        for kind in PieceKind::ALL {
            let white = Piece::new(Color::White, kind);
            let expected = match kind {
                PieceKind::Pawn => pawn(Color::White, e4),
                PieceKind::King => king(e4),
                PieceKind::Knight => knight(e4),
                PieceKind::Bishop => bishop(e4, occupied),
                PieceKind::Rook => rook(e4, occupied),
                PieceKind::Queen => queen(e4, occupied),
            };
            assert_eq!(attacks(white, e4, occupied), expected);
        }
        assert_eq!(
            attacks(Piece::new(Color::Black, PieceKind::Pawn), e4, occupied),
            pawn(Color::Black, e4)
        );
    }
}
