//! Pseudo-legal move generation and attack detection
//!
//! Pseudo-legal moves follow the movement rules of each piece but may leave the mover's king in check.
//! Castling is the exception: the king's path is checked for attacks right here, so a generated
//! castling is legal as soon as the rest of the position allows it.

use crate::bitboard::Bitboard;
use crate::moves::{Move, PromotePiece};
use crate::position::Position;
use crate::types::{CastlingSide, Color, Piece, PieceKind, Square};
use crate::{attack, bitboard_consts, castling, generic, geometry};

use std::convert::Infallible;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::slice;

use arrayvec::ArrayVec;

/// Pieces whose moves are exactly their attacks
const ATTACK_MOVERS: [PieceKind; 5] = [
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
    PieceKind::King,
];

pub(crate) fn do_is_square_attacked<C: generic::Color>(p: &Position, sq: Square) -> bool {
    // Pawn attacks are traced back from the target, so the opposite color's table is used
    let pawn_attacks = attack::pawn(C::COLOR.inv(), sq);

    if (p.piece2(C::COLOR, PieceKind::Pawn) & pawn_attacks).is_nonempty()
        || (p.piece2(C::COLOR, PieceKind::King) & attack::king(sq)).is_nonempty()
        || (p.piece2(C::COLOR, PieceKind::Knight) & attack::knight(sq)).is_nonempty()
    {
        return true;
    }

    (attack::bishop(sq, p.all) & p.piece_diag(C::COLOR)).is_nonempty()
        || (attack::rook(sq, p.all) & p.piece_line(C::COLOR)).is_nonempty()
}

/// Returns `true` if `sq` is attacked by any piece of color `color`
pub fn is_square_attacked(p: &Position, sq: Square, color: Color) -> bool {
    match color {
        Color::White => do_is_square_attacked::<generic::White>(p, sq),
        Color::Black => do_is_square_attacked::<generic::Black>(p, sq),
    }
}

/// Returns the pieces of color `color` which attack `sq`
pub fn square_attackers(p: &Position, sq: Square, color: Color) -> Bitboard {
    (p.piece2(color, PieceKind::Pawn) & attack::pawn(color.inv(), sq))
        | (p.piece2(color, PieceKind::King) & attack::king(sq))
        | (p.piece2(color, PieceKind::Knight) & attack::knight(sq))
        | (attack::bishop(sq, p.all) & p.piece_diag(color))
        | (attack::rook(sq, p.all) & p.piece_line(color))
}

/// Returns all the squares attacked by the pieces of color `color`
///
/// Squares occupied by `color`'s own pieces are included if they are defended. Pawns attack only
/// diagonally, so the squares in front of them are not included unless something else attacks them.
pub fn attacked_squares(p: &Position, color: Color) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for kind in PieceKind::ALL {
        let piece = Piece::new(color, kind);
        for sq in p.piece(piece) {
            res |= attack::attacks(piece, sq, p.all);
        }
    }
    res
}

pub(crate) trait MaybeMovePush {
    type Err;

    fn push(&mut self, m: Move) -> Result<(), Self::Err>;
}

/// List of moves which fits every position
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Move, 256>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, 256>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = arrayvec::IntoIter<Move, 256>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

/// Sink for generated moves
pub trait MovePush {
    fn push(&mut self, m: Move);
}

impl<const N: usize> MovePush for ArrayVec<Move, N> {
    fn push(&mut self, m: Move) {
        ArrayVec::push(self, m);
    }
}

impl MovePush for MoveList {
    fn push(&mut self, m: Move) {
        self.0.push(m);
    }
}

impl MovePush for Vec<Move> {
    fn push(&mut self, m: Move) {
        Vec::push(self, m);
    }
}

impl<T: MovePush> MaybeMovePush for T {
    type Err = Infallible;

    fn push(&mut self, m: Move) -> Result<(), Self::Err> {
        <Self as MovePush>::push(self, m);
        Ok(())
    }
}

/// Returns the square `delta` index steps before `sq`
#[inline]
fn step_back(sq: Square, delta: isize) -> Square {
    Square::from_index(sq.index().wrapping_sub(delta as usize))
}

pub(crate) struct MoveGenImpl<'a, P, C> {
    pos: &'a Position,
    dst: &'a mut P,
    _c: PhantomData<C>,
}

impl<'a, P: MaybeMovePush, C: generic::Color> MoveGenImpl<'a, P, C> {
    pub(crate) fn new(pos: &'a Position, dst: &'a mut P, _c: C) -> Self {
        MoveGenImpl {
            pos,
            dst,
            _c: PhantomData,
        }
    }

    fn add_pawn_move<const IS_PROMOTE: bool>(
        &mut self,
        src: Square,
        dst: Square,
    ) -> Result<(), P::Err> {
        if IS_PROMOTE {
            for piece in PromotePiece::ALL {
                self.dst.push(Move::promotion(src, dst, piece))?;
            }
            Ok(())
        } else {
            self.dst.push(Move::normal(src, dst))
        }
    }

    fn gen_pawn_push<const IS_PROMOTE: bool>(&mut self, pawns: Bitboard) -> Result<(), P::Err> {
        for dst in C::pawn_push(pawns) & !self.pos.all {
            self.add_pawn_move::<IS_PROMOTE>(step_back(dst, C::PAWN_FORWARD), dst)?;
        }
        Ok(())
    }

    fn gen_pawn_double(&mut self, pawns: Bitboard) -> Result<(), P::Err> {
        let single = C::pawn_push(pawns) & !self.pos.all;
        for dst in C::pawn_push(single) & !self.pos.all {
            self.dst.push(Move::normal(step_back(dst, 2 * C::PAWN_FORWARD), dst))?;
        }
        Ok(())
    }

    fn gen_pawn_capture<const IS_PROMOTE: bool>(&mut self, pawns: Bitboard) -> Result<(), P::Err> {
        let enemy = self.pos.color(C::COLOR.inv());
        for dst in C::pawn_capture_left(pawns) & enemy {
            self.add_pawn_move::<IS_PROMOTE>(step_back(dst, C::PAWN_FORWARD - 1), dst)?;
        }
        for dst in C::pawn_capture_right(pawns) & enemy {
            self.add_pawn_move::<IS_PROMOTE>(step_back(dst, C::PAWN_FORWARD + 1), dst)?;
        }
        Ok(())
    }

    fn gen_pawn_enpassant(&mut self) -> Result<(), P::Err> {
        let target = match self.pos.r.ep_target {
            Some(target) => target,
            None => return Ok(()),
        };
        let victim = Square::from_parts(target.file(), geometry::enpassant_src_rank(C::COLOR));
        if self.pos.get(victim) != Some(Piece::new(C::COLOR.inv(), PieceKind::Pawn)) {
            return Ok(());
        }
        // Our pawns able to capture on the target are the ones a pawn on the target would attack
        let capturers =
            self.pos.piece2(C::COLOR, PieceKind::Pawn) & attack::pawn(C::COLOR.inv(), target);
        for src in capturers {
            self.dst.push(Move::en_passant(src, target))?;
        }
        Ok(())
    }

    fn gen_pawns(&mut self) -> Result<(), P::Err> {
        let promote_mask = bitboard_consts::rank(geometry::promote_src_rank(C::COLOR));
        let double_mask = bitboard_consts::rank(geometry::double_move_src_rank(C::COLOR));
        let pawns = self.pos.piece2(C::COLOR, PieceKind::Pawn);
        self.gen_pawn_push::<false>(pawns & !promote_mask)?;
        self.gen_pawn_push::<true>(pawns & promote_mask)?;
        self.gen_pawn_double(pawns & double_mask)?;
        self.gen_pawn_capture::<false>(pawns & !promote_mask)?;
        self.gen_pawn_capture::<true>(pawns & promote_mask)?;
        self.gen_pawn_enpassant()
    }

    /// Moves of all the pieces except pawns, looked up through the attack rule table
    fn gen_pieces(&mut self) -> Result<(), P::Err> {
        let allowed = !self.pos.color(C::COLOR);
        for kind in ATTACK_MOVERS {
            let piece = Piece::new(C::COLOR, kind);
            for src in self.pos.piece(piece) {
                for dst in attack::attacks(piece, src, self.pos.all) & allowed {
                    self.dst.push(Move::normal(src, dst))?;
                }
            }
        }
        Ok(())
    }

    fn gen_castling_side(&mut self, side: CastlingSide) -> Result<(), P::Err> {
        if !self.pos.r.castling.has(C::COLOR, side) {
            return Ok(());
        }
        if (castling::pass(C::COLOR, side) & self.pos.all).is_nonempty() {
            return Ok(());
        }
        let path = [
            castling::king_src(C::COLOR),
            castling::king_transit(C::COLOR, side),
            castling::king_dst(C::COLOR, side),
        ];
        if path
            .iter()
            .any(|&sq| do_is_square_attacked::<C::Inv>(self.pos, sq))
        {
            return Ok(());
        }
        self.dst.push(Move::castling(C::COLOR, side))
    }

    fn gen_castling(&mut self) -> Result<(), P::Err> {
        self.gen_castling_side(CastlingSide::King)?;
        self.gen_castling_side(CastlingSide::Queen)
    }

    pub(crate) fn gen_all(&mut self) -> Result<(), P::Err> {
        self.gen_pawns()?;
        self.gen_pieces()?;
        self.gen_castling()
    }

    /// Same as [`MoveGenImpl::gen_all()`], but in the order which finds a legal move sooner
    pub(crate) fn gen_all_for_detect(&mut self) -> Result<(), P::Err> {
        self.gen_pieces()?;
        self.gen_pawns()?;
        // No position has castling as the only legal move
        Ok(())
    }
}

/// Pushes all the pseudo-legal moves in `pos` into `dst`
pub fn pseudo_legal_into<P: MovePush>(pos: &Position, dst: &mut P) {
    let _ = match pos.r.side {
        Color::White => MoveGenImpl::new(pos, dst, generic::White).gen_all(),
        Color::Black => MoveGenImpl::new(pos, dst, generic::Black).gen_all(),
    };
}

/// Returns all the pseudo-legal moves in `pos`
pub fn pseudo_legal(pos: &Position) -> MoveList {
    let mut res = MoveList::new();
    pseudo_legal_into(pos, &mut res);
    res
}
