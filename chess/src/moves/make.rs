//! Applying moves to positions

use super::base::{Move, MoveKind};
use crate::bitboard::Bitboard;
use crate::error::Error;
use crate::position::Position;
use crate::types::{CastlingRights, CastlingSide, Color, Piece, PieceKind, Square};
use crate::{castling, generic, legal, zobrist};

/// Metadata necessary to undo the applied move
#[derive(Debug, Copy, Clone)]
pub(crate) struct RawUndo {
    hash: u64,
    dst_cell: Option<Piece>,
    castling: CastlingRights,
    ep_target: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u16,
}

fn update_castling(p: &mut Position, change: Bitboard) {
    if (change & castling::ALL_SRCS).is_empty() {
        return;
    }

    let mut rights = p.r.castling;
    for c in [Color::White, Color::Black] {
        for s in [CastlingSide::Queen, CastlingSide::King] {
            if (change & castling::srcs(c, s)).is_nonempty() {
                rights.unset(c, s);
            }
        }
    }

    if rights != p.r.castling {
        p.hash ^= zobrist::castling(p.r.castling);
        p.r.castling = rights;
        p.hash ^= zobrist::castling(p.r.castling);
    }
}

/// Removes the captured piece `cell` from `sq`, if any
#[inline]
fn take<C: generic::Color>(p: &mut Position, cell: Option<Piece>, sq: Square) {
    if let Some(taken) = cell {
        let bb = Bitboard::from_square(sq);
        p.hash ^= zobrist::pieces(taken, sq);
        *p.color_mut(C::COLOR.inv()) ^= bb;
        *p.piece_mut(taken) ^= bb;
    }
}

#[inline]
fn untake<C: generic::Color>(p: &mut Position, cell: Option<Piece>, sq: Square) {
    if let Some(taken) = cell {
        let bb = Bitboard::from_square(sq);
        *p.color_mut(C::COLOR.inv()) |= bb;
        *p.piece_mut(taken) |= bb;
    }
}

#[inline]
fn do_make_enpassant<C: generic::Color>(p: &mut Position, mv: Move, inv: bool) {
    let taken_sq = Square::from_parts(mv.dst().file(), mv.src().rank());
    let taken = Bitboard::from_square(taken_sq);
    let change = Bitboard::from_square(mv.src()) | Bitboard::from_square(mv.dst());
    let our_pawn = Piece::new(C::COLOR, PieceKind::Pawn);
    let their_pawn = Piece::new(C::COLOR.inv(), PieceKind::Pawn);
    if inv {
        p.r.put(mv.src(), Some(our_pawn));
        p.r.put(mv.dst(), None);
        p.r.put(taken_sq, Some(their_pawn));
    } else {
        p.r.put(mv.src(), None);
        p.r.put(mv.dst(), Some(our_pawn));
        p.r.put(taken_sq, None);
        p.hash ^= zobrist::pieces(our_pawn, mv.src())
            ^ zobrist::pieces(our_pawn, mv.dst())
            ^ zobrist::pieces(their_pawn, taken_sq);
    }
    *p.color_mut(C::COLOR) ^= change;
    *p.piece_mut(our_pawn) ^= change;
    *p.color_mut(C::COLOR.inv()) ^= taken;
    *p.piece_mut(their_pawn) ^= taken;
}

#[inline]
fn do_make_castling<C: generic::Color>(p: &mut Position, side: CastlingSide, inv: bool) {
    let king = Piece::new(C::COLOR, PieceKind::King);
    let rook = Piece::new(C::COLOR, PieceKind::Rook);
    let king_src = castling::king_src(C::COLOR);
    let king_dst = castling::king_dst(C::COLOR, side);
    let rook_src = castling::rook_src(C::COLOR, side);
    let rook_dst = castling::rook_dst(C::COLOR, side);
    if inv {
        p.r.put(king_dst, None);
        p.r.put(rook_dst, None);
        p.r.put(king_src, Some(king));
        p.r.put(rook_src, Some(rook));
    } else {
        p.r.put(king_src, None);
        p.r.put(rook_src, None);
        p.r.put(king_dst, Some(king));
        p.r.put(rook_dst, Some(rook));
        p.hash ^= zobrist::castling_delta(C::COLOR, side);
    }
    // Bits of the king and the rook within the back rank
    let (king_bits, rook_bits) = match side {
        CastlingSide::King => (0x50_u64, 0xa0_u64),
        CastlingSide::Queen => (0x14_u64, 0x09_u64),
    };
    *p.color_mut(C::COLOR) ^= Bitboard::from_raw((king_bits | rook_bits) << C::CASTLING_OFFSET);
    *p.piece_mut(rook) ^= Bitboard::from_raw(rook_bits << C::CASTLING_OFFSET);
    *p.piece_mut(king) ^= Bitboard::from_raw(king_bits << C::CASTLING_OFFSET);
    if !inv {
        update_castling(p, castling::srcs(C::COLOR, side));
    }
}

fn do_make_move<C: generic::Color>(p: &mut Position, mv: Move) -> RawUndo {
    let src_cell = p.get(mv.src());
    let dst_cell = p.get(mv.dst());
    let undo = RawUndo {
        hash: p.hash,
        dst_cell,
        castling: p.r.castling,
        ep_target: p.r.ep_target,
        halfmove_clock: p.r.halfmove_clock,
        fullmove_number: p.r.fullmove_number,
    };
    let moved = match src_cell {
        Some(piece) => piece,
        None => unreachable!("no piece on the source square of {}", mv),
    };
    let src = Bitboard::from_square(mv.src());
    let dst = Bitboard::from_square(mv.dst());
    let change = src | dst;
    if let Some(target) = p.r.ep_target {
        p.hash ^= zobrist::enpassant(target);
        p.r.ep_target = None;
    }

    match mv.kind() {
        MoveKind::Normal => {
            p.r.put(mv.src(), None);
            p.r.put(mv.dst(), Some(moved));
            p.hash ^= zobrist::pieces(moved, mv.src()) ^ zobrist::pieces(moved, mv.dst());
            take::<C>(p, dst_cell, mv.dst());
            *p.color_mut(C::COLOR) ^= change;
            *p.piece_mut(moved) ^= change;
            if moved.kind() == PieceKind::Pawn
                && mv.src().rank().index().abs_diff(mv.dst().rank().index()) == 2
            {
                let skipped = Square::from_index((mv.src().index() + mv.dst().index()) / 2);
                p.r.ep_target = Some(skipped);
                p.hash ^= zobrist::enpassant(skipped);
            }
            update_castling(p, change);
        }
        MoveKind::Promotion => {
            let kind = match mv.promote() {
                Some(piece) => PieceKind::from(piece),
                None => unreachable!("promotion without a piece"),
            };
            let promoted = Piece::new(C::COLOR, kind);
            p.r.put(mv.src(), None);
            p.r.put(mv.dst(), Some(promoted));
            p.hash ^= zobrist::pieces(moved, mv.src()) ^ zobrist::pieces(promoted, mv.dst());
            take::<C>(p, dst_cell, mv.dst());
            *p.color_mut(C::COLOR) ^= change;
            *p.piece_mut(moved) ^= src;
            *p.piece_mut(promoted) ^= dst;
            update_castling(p, change);
        }
        MoveKind::Castle => {
            let side = mv.castling_side().unwrap_or(CastlingSide::King);
            do_make_castling::<C>(p, side, false);
        }
        MoveKind::EnPassant => {
            do_make_enpassant::<C>(p, mv, false);
        }
    }

    if dst_cell.is_some() || moved.kind() == PieceKind::Pawn {
        p.r.halfmove_clock = 0;
    } else {
        p.r.halfmove_clock = p.r.halfmove_clock.saturating_add(1);
    }
    p.r.side = C::COLOR.inv();
    p.hash ^= zobrist::MOVE_SIDE;
    if C::COLOR == Color::Black {
        p.r.fullmove_number = p.r.fullmove_number.saturating_add(1);
    }
    p.all = p.white | p.black;

    undo
}

fn do_unmake_move<C: generic::Color>(p: &mut Position, mv: Move, u: RawUndo) {
    let src = Bitboard::from_square(mv.src());
    let dst = Bitboard::from_square(mv.dst());
    let change = src | dst;
    let dst_cell = u.dst_cell;

    match mv.kind() {
        MoveKind::Normal => {
            let moved = p.get(mv.dst());
            p.r.put(mv.src(), moved);
            p.r.put(mv.dst(), dst_cell);
            if let Some(piece) = moved {
                *p.color_mut(C::COLOR) ^= change;
                *p.piece_mut(piece) ^= change;
            }
            untake::<C>(p, dst_cell, mv.dst());
        }
        MoveKind::Promotion => {
            let pawn = Piece::new(C::COLOR, PieceKind::Pawn);
            let promoted = p.get(mv.dst());
            p.r.put(mv.src(), Some(pawn));
            p.r.put(mv.dst(), dst_cell);
            *p.color_mut(C::COLOR) ^= change;
            *p.piece_mut(pawn) ^= src;
            if let Some(piece) = promoted {
                *p.piece_mut(piece) ^= dst;
            }
            untake::<C>(p, dst_cell, mv.dst());
        }
        MoveKind::Castle => {
            let side = mv.castling_side().unwrap_or(CastlingSide::King);
            do_make_castling::<C>(p, side, true);
        }
        MoveKind::EnPassant => {
            do_make_enpassant::<C>(p, mv, true);
        }
    }

    p.hash = u.hash;
    p.r.castling = u.castling;
    p.r.ep_target = u.ep_target;
    p.r.halfmove_clock = u.halfmove_clock;
    p.r.fullmove_number = u.fullmove_number;
    p.r.side = C::COLOR;
    p.all = p.white | p.black;
}

#[cfg(feature = "selftest")]
fn selftest(p: &Position) {
    let rebuilt = Position::build(p.r);
    assert_eq!(p.hash, rebuilt.hash, "incremental hash diverged");
    assert_eq!(p.white, rebuilt.white);
    assert_eq!(p.black, rebuilt.black);
    assert_eq!(p.all, rebuilt.all);
    assert_eq!(p.pieces, rebuilt.pieces);
}

/// Makes the pseudo-legal move `mv` on `p` in place
///
/// The mover's king may be left in check, in which case the caller must roll the move back with
/// [`unmake_move_unchecked()`] before using `p` for anything else.
pub(crate) fn make_move_unchecked(p: &mut Position, mv: Move) -> RawUndo {
    let u = match p.r.side {
        Color::White => do_make_move::<generic::White>(p, mv),
        Color::Black => do_make_move::<generic::Black>(p, mv),
    };
    #[cfg(feature = "selftest")]
    selftest(p);
    u
}

/// Rolls back the move `mv` previously made with [`make_move_unchecked()`]
pub(crate) fn unmake_move_unchecked(p: &mut Position, mv: Move, u: RawUndo) {
    match p.r.side {
        Color::White => do_unmake_move::<generic::Black>(p, mv, u),
        Color::Black => do_unmake_move::<generic::White>(p, mv, u),
    }
    #[cfg(feature = "selftest")]
    selftest(p);
}

/// Applies `mv` to a copy of `p`, checking that `mv` is legal first
pub(crate) fn make_move(p: &Position, mv: Move) -> Result<Position, Error> {
    legal::validate(p, mv)?;
    let mut res = p.clone();
    let _ = make_move_unchecked(&mut res, mv);
    Ok(res)
}
