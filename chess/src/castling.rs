use crate::bitboard::Bitboard;
use crate::geometry;
use crate::types::{CastlingSide, Color, File, Square};

/// Squares between the king and the rook, which must be empty
#[inline]
pub const fn pass(c: Color, s: CastlingSide) -> Bitboard {
    let x = match s {
        CastlingSide::King => 0x60,
        CastlingSide::Queen => 0x0e,
    };
    Bitboard::from_raw(match c {
        Color::White => x << 56,
        Color::Black => x,
    })
}

/// Initial squares of the king and the rook; touching any of them loses the right
#[inline]
pub const fn srcs(c: Color, s: CastlingSide) -> Bitboard {
    let x = match s {
        CastlingSide::King => 0x90,
        CastlingSide::Queen => 0x11,
    };
    Bitboard::from_raw(match c {
        Color::White => x << 56,
        Color::Black => x,
    })
}

pub const ALL_SRCS: Bitboard = Bitboard::from_raw(0x91 | (0x91 << 56));

pub const fn king_src(c: Color) -> Square {
    Square::from_parts(File::E, geometry::castling_rank(c))
}

/// Square the king crosses on its way
pub const fn king_transit(c: Color, s: CastlingSide) -> Square {
    let file = match s {
        CastlingSide::King => File::F,
        CastlingSide::Queen => File::D,
    };
    Square::from_parts(file, geometry::castling_rank(c))
}

pub const fn king_dst(c: Color, s: CastlingSide) -> Square {
    let file = match s {
        CastlingSide::King => File::G,
        CastlingSide::Queen => File::C,
    };
    Square::from_parts(file, geometry::castling_rank(c))
}

pub const fn rook_src(c: Color, s: CastlingSide) -> Square {
    let file = match s {
        CastlingSide::King => File::H,
        CastlingSide::Queen => File::A,
    };
    Square::from_parts(file, geometry::castling_rank(c))
}

/// The rook always lands on the square the king crossed
pub const fn rook_dst(c: Color, s: CastlingSide) -> Square {
    king_transit(c, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks() {
        let sq = |s: &str| s.parse::<Square>().unwrap();
        assert_eq!(
            pass(Color::White, CastlingSide::King),
            Bitboard::EMPTY.with(sq("f1")).with(sq("g1"))
        );
        assert_eq!(
            pass(Color::Black, CastlingSide::Queen),
            Bitboard::EMPTY.with(sq("b8")).with(sq("c8")).with(sq("d8"))
        );
        assert_eq!(
            srcs(Color::White, CastlingSide::Queen),
            Bitboard::EMPTY.with(sq("a1")).with(sq("e1"))
        );
        assert_eq!(
            srcs(Color::Black, CastlingSide::King),
            Bitboard::EMPTY.with(sq("e8")).with(sq("h8"))
        );
        assert_eq!(king_dst(Color::Black, CastlingSide::Queen), sq("c8"));
        assert_eq!(rook_dst(Color::White, CastlingSide::King), sq("f1"));
    }
}
