use crate::types::{CastlingRights, CastlingSide, Color, Piece, Square};

include!(concat!(env!("OUT_DIR"), "/zobrist.rs"));

#[inline]
pub fn pieces(piece: Piece, sq: Square) -> u64 {
    PIECES[piece.index()][sq.index()]
}

#[inline]
pub fn enpassant(sq: Square) -> u64 {
    ENPASSANT[sq.index()]
}

#[inline]
pub fn castling(rights: CastlingRights) -> u64 {
    CASTLING[rights.index()]
}

/// Hash change caused by relocating the king and the rook when castling
#[inline]
pub fn castling_delta(color: Color, side: CastlingSide) -> u64 {
    match side {
        CastlingSide::Queen => CASTLING_QUEENSIDE[color.index()],
        CastlingSide::King => CASTLING_KINGSIDE[color.index()],
    }
}
