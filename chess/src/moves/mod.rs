mod base;
mod make;

pub mod uci;

pub use base::*;

pub(crate) use make::{make_move, make_move_unchecked, unmake_move_unchecked};

pub type UciMove = uci::Move;
