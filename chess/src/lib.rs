//! # Gambit
//!
//! Chess rules engine: legal move generation, move application and game end detection.
//!
//! The main entry points are [`Position`], which is an immutable chess position that produces new
//! positions on each move, and [`Game`], which tracks the history and tells when the game is over.
//!
//! ```
//! use gambit::{legal, Game, GameStatus, Position};
//!
//! let pos = Position::initial();
//! assert_eq!(legal::legal_moves(&pos).len(), 20);
//!
//! let next = pos.make_uci("e2e4").unwrap();
//! assert_eq!(next.ep_target(), Some("e3".parse().unwrap()));
//!
//! let mut game = Game::new(next);
//! game.apply_uci("e7e5").unwrap();
//! assert_eq!(game.status(), GameStatus::InProgress);
//! ```

mod castling;
mod generic;
mod zobrist;

pub mod attack;
pub mod error;
pub mod game;
pub mod legal;
pub mod movegen;
pub mod moves;
pub mod position;

pub use gambit_base::{bitboard, bitboard_consts, geometry, types};

pub use bitboard::Bitboard;
pub use error::Error;
pub use game::Game;
pub use movegen::MoveList;
pub use moves::{Move, MoveKind, PromotePiece};
pub use position::{Position, RawPosition};
pub use types::{
    CastlingRights, CastlingSide, Color, File, GameStatus, Piece, PieceKind, Rank, Square,
};
