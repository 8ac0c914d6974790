//! Legality filter: moves that don't leave the mover's own king in check
//!
//! Every move is checked by playing it on a private copy of the position and looking whether the
//! mover's king is attacked afterwards. The position passed in is never touched.

use crate::error::Error;
use crate::generic;
use crate::movegen::{self, MaybeMovePush, MoveGenImpl, MoveList, MovePush};
use crate::moves::{self, Move};
use crate::position::Position;
use crate::types::Color;

struct LegalFilter<'a, P> {
    pos: Position,
    inner: &'a mut P,
}

impl<'a, P: MaybeMovePush> LegalFilter<'a, P> {
    fn new(pos: Position, inner: &'a mut P) -> Self {
        Self { pos, inner }
    }
}

impl<'a, P: MaybeMovePush> MaybeMovePush for LegalFilter<'a, P> {
    type Err = P::Err;

    fn push(&mut self, mv: Move) -> Result<(), Self::Err> {
        if is_legal_pseudo(&mut self.pos, mv) {
            self.inner.push(mv)
        } else {
            Ok(())
        }
    }
}

/// Stops the generation as soon as any move arrives
struct ErrOnFirst;

impl MaybeMovePush for ErrOnFirst {
    type Err = ();

    fn push(&mut self, _mv: Move) -> Result<(), ()> {
        Err(())
    }
}

/// Plays the pseudo-legal move `mv` on `pos` and takes it back
fn is_legal_pseudo(pos: &mut Position, mv: Move) -> bool {
    let u = moves::make_move_unchecked(pos, mv);
    let ok = !pos.is_opponent_king_attacked();
    moves::unmake_move_unchecked(pos, mv, u);
    ok
}

/// Pushes all the legal moves in `pos` into `dst`
pub fn legal_moves_into<P: MovePush>(pos: &Position, dst: &mut P) {
    let mut filter = LegalFilter::new(pos.clone(), dst);
    let _ = match pos.side() {
        Color::White => MoveGenImpl::new(pos, &mut filter, generic::White).gen_all(),
        Color::Black => MoveGenImpl::new(pos, &mut filter, generic::Black).gen_all(),
    };
}

/// Returns all the legal moves in `pos`
pub fn legal_moves(pos: &Position) -> MoveList {
    let mut res = MoveList::new();
    legal_moves_into(pos, &mut res);
    res
}

/// Returns `true` if the side to move has at least one legal move
///
/// Much faster than checking [`legal_moves()`] for emptiness, as it stops at the first legal move.
pub fn has_legal_moves(pos: &Position) -> bool {
    let mut err_on_first = ErrOnFirst;
    let mut filter = LegalFilter::new(pos.clone(), &mut err_on_first);
    (match pos.side() {
        Color::White => MoveGenImpl::new(pos, &mut filter, generic::White).gen_all_for_detect(),
        Color::Black => MoveGenImpl::new(pos, &mut filter, generic::Black).gen_all_for_detect(),
    })
    .is_err()
}

/// Returns `true` if the king of color `color` is attacked
pub fn is_in_check(pos: &Position, color: Color) -> bool {
    movegen::is_square_attacked(pos, pos.king_pos(color), color.inv())
}

/// Returns `true` if the side to move is in check and has no legal moves
pub fn is_checkmate(pos: &Position) -> bool {
    is_in_check(pos, pos.side()) && !has_legal_moves(pos)
}

/// Returns `true` if the side to move is not in check, but has no legal moves
pub fn is_stalemate(pos: &Position) -> bool {
    !is_in_check(pos, pos.side()) && !has_legal_moves(pos)
}

/// Returns `true` if `mv` is one of [`legal_moves()`] in `pos`
pub fn is_legal(pos: &Position, mv: Move) -> bool {
    match pos.get(mv.src()) {
        Some(piece) if piece.color() == pos.side() => {}
        _ => return false,
    }
    movegen::pseudo_legal(pos).contains(&mv) && is_legal_pseudo(&mut pos.clone(), mv)
}

/// Same as [`is_legal()`], but reports [`Error::IllegalMove`]
pub fn validate(pos: &Position, mv: Move) -> Result<(), Error> {
    match is_legal(pos, mv) {
        true => Ok(()),
        false => Err(Error::IllegalMove(mv.uci())),
    }
}
