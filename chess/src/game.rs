//! Game state tracking: move history, repetitions and game end detection

use crate::error::Error;
use crate::legal;
use crate::movegen::MoveList;
use crate::moves::Move;
use crate::position::{FenParseError, Position, RawPosition};
use crate::types::GameStatus;

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Number of half-moves without captures and pawn moves which draws the game
pub const FIFTY_MOVE_LIMIT: u16 = 100;

/// Number of occurrences of the same position which draws the game
pub const REPETITION_LIMIT: usize = 3;

/// Error applying a list of moves with [`Game::from_uci_list()`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot apply move #{}: {}", .index + 1, .source)]
pub struct UciListError {
    /// Zero-based index of the failed move in the list
    pub index: usize,
    pub source: Error,
}

/// Occurrence counts of positions
///
/// Positions are compared in full by placement, side to move, castling rights and en passant
/// target, so a zobrist hash collision can't fake a repetition.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
struct HashRepeat(HashMap<RawPosition, usize>);

fn repeat_key(p: &Position) -> RawPosition {
    RawPosition {
        halfmove_clock: 0,
        fullmove_number: 1,
        ..*p.raw()
    }
}

impl HashRepeat {
    fn push(&mut self, p: &Position) {
        *self.0.entry(repeat_key(p)).or_insert(0) += 1;
    }

    fn pop(&mut self, p: &Position) {
        let key = repeat_key(p);
        if let Some(r) = self.0.get_mut(&key) {
            *r -= 1;
            if *r == 0 {
                self.0.remove(&key);
            }
        }
    }

    fn count(&self, p: &Position) -> usize {
        self.0.get(&repeat_key(p)).copied().unwrap_or(0)
    }
}

/// Chess game: the starting position, the moves made so far and the current status
///
/// Every successful [`Game::apply_move()`] appends the move together with the resulting position to
/// the history and re-evaluates the status. Once the game is finished, no more moves are accepted
/// until the last one is taken back with [`Game::undo()`].
///
/// # Example
///
/// ```
/// # use gambit::{Game, GameStatus, Color};
/// #
/// let mut game = Game::new_initial();
/// for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
///     game.apply_uci(mv).unwrap();
/// }
/// assert_eq!(game.status(), GameStatus::Checkmate(Color::Black));
/// assert!(game.legal_moves().is_empty());
/// assert_eq!(game.uci_list().to_string(), "f2f3 e7e5 g2g4 d8h4");
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    initial: Position,
    history: Vec<(Move, Position)>,
    repeat: HashRepeat,
    status: GameStatus,
}

fn eval_status(pos: &Position, repeat: &HashRepeat) -> GameStatus {
    if !pos.has_legal_moves() {
        return if pos.is_check() {
            GameStatus::Checkmate(pos.side().inv())
        } else {
            GameStatus::Stalemate
        };
    }
    if pos.halfmove_clock() >= FIFTY_MOVE_LIMIT {
        return GameStatus::DrawFiftyMove;
    }
    if repeat.count(pos) >= REPETITION_LIMIT {
        return GameStatus::DrawRepetition;
    }
    if pos.is_insufficient_material() {
        return GameStatus::DrawInsufficientMaterial;
    }
    GameStatus::InProgress
}

impl Game {
    /// Starts a new game from `pos`
    ///
    /// The status is evaluated right away, so a game started from a finished position is already
    /// over.
    pub fn new(pos: Position) -> Game {
        let mut repeat = HashRepeat::default();
        repeat.push(&pos);
        let status = eval_status(&pos, &repeat);
        Game {
            initial: pos,
            history: Vec::new(),
            repeat,
            status,
        }
    }

    pub fn new_initial() -> Game {
        Game::new(Position::initial())
    }

    pub fn from_fen(fen: &str) -> Result<Game, FenParseError> {
        Ok(Game::new(Position::from_fen(fen)?))
    }

    /// Starts a new game from `pos` and applies whitespace-separated moves from `uci_list`
    pub fn from_uci_list(pos: Position, uci_list: &str) -> Result<Game, UciListError> {
        let mut res = Game::new(pos);
        for (index, token) in uci_list.split_ascii_whitespace().enumerate() {
            res.apply_uci(token)
                .map_err(|source| UciListError { index, source })?;
        }
        Ok(res)
    }

    /// Position before the first move
    #[inline]
    pub fn initial(&self) -> &Position {
        &self.initial
    }

    /// Position after the last move
    #[inline]
    pub fn current(&self) -> &Position {
        self.history.last().map_or(&self.initial, |(_, p)| p)
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// Number of moves made
    #[inline]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Moves made so far, each one with the position it led to
    #[inline]
    pub fn history(&self) -> &[(Move, Position)] {
        &self.history
    }

    /// How many times the current position has occurred in the game
    pub fn repeat_count(&self) -> usize {
        self.repeat.count(self.current())
    }

    /// Returns the legal moves in the current position, or nothing if the game is finished
    pub fn legal_moves(&self) -> MoveList {
        if self.is_finished() {
            return MoveList::new();
        }
        legal::legal_moves(self.current())
    }

    /// Applies `mv` and re-evaluates the game status
    ///
    /// On error, the game is left unchanged.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), Error> {
        if self.is_finished() {
            return Err(Error::GameOver(self.status));
        }
        let next = self.current().make_move(mv)?;
        self.repeat.push(&next);
        self.status = eval_status(&next, &self.repeat);
        self.history.push((mv, next));
        Ok(())
    }

    /// Parses a move in long algebraic notation and applies it
    pub fn apply_uci(&mut self, s: &str) -> Result<(), Error> {
        if self.is_finished() {
            return Err(Error::GameOver(self.status));
        }
        let mv = Move::from_uci(s, self.current())?;
        self.apply_move(mv)
    }

    /// Takes back the last move and returns it
    ///
    /// Returns `None` if no moves were made.
    pub fn undo(&mut self) -> Option<Move> {
        let (mv, pos) = self.history.pop()?;
        self.repeat.pop(&pos);
        self.status = eval_status(self.current(), &self.repeat);
        Some(mv)
    }

    /// Returns the moves made so far, separated by spaces, in long algebraic notation
    pub fn uci_list(&self) -> UciList<'_> {
        UciList(self)
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new_initial()
    }
}

/// Wrapper to display the moves of a [`Game`]
pub struct UciList<'a>(&'a Game);

impl<'a> fmt::Display for UciList<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for (i, (mv, _)) in self.0.history.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", mv)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotationError;
    use crate::types::{Color, Square};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn play(game: &mut Game, moves: &[&str]) {
        for mv in moves {
            game.apply_uci(mv).unwrap();
        }
    }

    #[test]
    fn test_first_move() {
        let mut game = Game::new_initial();
        game.apply_uci("e2e4").unwrap();
        let pos = game.current();
        assert_eq!(pos.ep_target(), Some(sq("e3")));
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.side(), Color::Black);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.len(), 1);
        assert_eq!(game.history()[0].0, Move::normal(sq("e2"), sq("e4")));
        assert_eq!(game.initial(), &Position::initial());
    }

    #[test]
    fn test_fools_mate() {
        let mut game = Game::new_initial();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(game.status(), GameStatus::Checkmate(Color::Black));
        assert_eq!(game.status().winner(), Some(Color::Black));
        assert!(game.is_finished());
        assert!(game.legal_moves().is_empty());
        assert!(legal::is_checkmate(game.current()));

        let before = game.current().clone();
        assert_eq!(
            game.apply_uci("a2a3"),
            Err(Error::GameOver(GameStatus::Checkmate(Color::Black)))
        );
        assert_eq!(
            game.apply_move(Move::normal(sq("a2"), sq("a3"))),
            Err(Error::GameOver(GameStatus::Checkmate(Color::Black)))
        );
        assert_eq!(game.current(), &before);
        assert_eq!(game.len(), 4);
    }

    #[test]
    fn test_stalemate() {
        let game = Game::from_fen("k7/8/1Q6/8/8/8/8/7K b - - 0 1").unwrap();
        assert_eq!(game.status(), GameStatus::Stalemate);
        assert!(game.legal_moves().is_empty());

        let mut game = Game::from_fen("k7/8/8/1Q6/8/8/8/7K w - - 0 1").unwrap();
        assert_eq!(game.status(), GameStatus::InProgress);
        game.apply_uci("b5b6").unwrap();
        assert_eq!(game.status(), GameStatus::Stalemate);
        assert!(game.status().is_draw());
        assert!(!legal::is_checkmate(game.current()));
        assert!(game.legal_moves().is_empty());
    }

    #[test]
    fn test_illegal_keeps_state() {
        let mut game = Game::new_initial();
        play(&mut game, &["e2e4"]);
        let before = game.current().clone();
        assert_eq!(
            game.apply_uci("e4e6"),
            Err(Error::IllegalMove("e4e6".parse().unwrap()))
        );
        assert_eq!(
            game.apply_move(Move::normal(sq("d2"), sq("d4"))),
            Err(Error::IllegalMove("d2d4".parse().unwrap()))
        );
        assert!(matches!(
            game.apply_uci("e7e9"),
            Err(Error::InvalidNotation(_))
        ));
        assert!(matches!(game.apply_uci("e7"), Err(Error::InvalidNotation(_))));
        assert_eq!(game.current(), &before);
        assert_eq!(game.len(), 1);
        assert_eq!(game.repeat_count(), 1);
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_missing_promotion() {
        let mut game = Game::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        assert_eq!(
            game.apply_uci("e7e8"),
            Err(Error::InvalidNotation(NotationError::MissingPromotion(
                "e7e8".parse().unwrap()
            )))
        );
        game.apply_uci("e7e8n").unwrap();
        assert_eq!(game.current().as_fen(), "4N3/8/8/8/8/8/k7/4K3 b - - 0 1");
    }

    #[test]
    fn test_fifty_moves() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 98 60").unwrap();
        game.apply_uci("a1a2").unwrap();
        assert_eq!(game.current().halfmove_clock(), 99);
        assert_eq!(game.status(), GameStatus::InProgress);
        game.apply_uci("e8e7").unwrap();
        assert_eq!(game.current().halfmove_clock(), 100);
        assert_eq!(game.status(), GameStatus::DrawFiftyMove);

        // A pawn move just before the limit resets the counter
        let mut game = Game::from_fen("4k3/8/8/8/8/8/P7/R3K3 w - - 99 60").unwrap();
        game.apply_uci("a2a3").unwrap();
        assert_eq!(game.current().halfmove_clock(), 0);
        assert_eq!(game.status(), GameStatus::InProgress);

        // Mate on the hundredth half-move is still a mate
        let mut game = Game::from_fen("k7/8/1K6/8/8/8/8/7R w - - 99 80").unwrap();
        game.apply_uci("h1h8").unwrap();
        assert_eq!(game.current().halfmove_clock(), 100);
        assert_eq!(game.status(), GameStatus::Checkmate(Color::White));
    }

    #[test]
    fn test_repetition() {
        let mut game = Game::new_initial();
        let cycle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        play(&mut game, &cycle);
        assert_eq!(game.repeat_count(), 2);
        assert_eq!(game.status(), GameStatus::InProgress);
        play(&mut game, &cycle[..3]);
        assert_eq!(game.status(), GameStatus::InProgress);
        play(&mut game, &cycle[3..]);
        assert_eq!(game.repeat_count(), 3);
        assert_eq!(game.status(), GameStatus::DrawRepetition);
        assert!(game.legal_moves().is_empty());

        assert_eq!(game.undo(), Some(Move::normal(sq("f6"), sq("g8"))));
        assert_eq!(game.status(), GameStatus::InProgress);
        game.apply_uci("f6g8").unwrap();
        assert_eq!(game.status(), GameStatus::DrawRepetition);
    }

    #[test]
    fn test_repetition_with_enpassant() {
        // After 1. e4 the target square is recorded, so the same piece placement with the target
        // doesn't count as a repetition of the one without it
        let mut game = Game::new_initial();
        play(&mut game, &["e2e4"]);
        let with_target = game.current().zobrist_hash();
        play(&mut game, &["g8f6", "g1f3", "f6g8", "f3g1"]);
        assert_ne!(game.current().zobrist_hash(), with_target);
        assert_eq!(game.repeat_count(), 1);
    }

    #[test]
    fn test_repetition_needs_same_rights() {
        // The pieces come back, but the castling rights don't
        let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let cycle = ["h1h2", "h8h7", "h2h1", "h7h8"];
        play(&mut game, &cycle);
        assert_eq!(game.repeat_count(), 1);
        play(&mut game, &cycle);
        assert_eq!(game.repeat_count(), 2);
        play(&mut game, &cycle);
        assert_eq!(game.repeat_count(), 3);
        assert_eq!(game.status(), GameStatus::DrawRepetition);

        // Move counters differ between the occurrences, which doesn't matter
        let first = &game.history()[3].1;
        assert_ne!(first.fullmove_number(), game.current().fullmove_number());
        assert_eq!(first.raw().cells, game.current().raw().cells);
    }

    #[test]
    fn test_insufficient_material() {
        let game = Game::from_fen("8/8/8/4k3/8/8/3N4/4K3 w - - 0 1").unwrap();
        assert_eq!(game.status(), GameStatus::DrawInsufficientMaterial);

        for fen in [
            "4k3/8/8/8/3n4/8/3N4/4K3 w - - 0 1",
            "4k3/8/8/8/3b4/8/3N4/4K3 w - - 0 1",
            "4k3/8/8/8/3b4/8/2B5/4K3 w - - 0 1",
        ] {
            let game = Game::from_fen(fen).unwrap();
            assert_eq!(game.status(), GameStatus::DrawInsufficientMaterial, "{}", fen);
        }

        // Capturing down to king and bishop against king and knight
        let mut game = Game::from_fen("4k3/8/8/8/3b4/4R3/3N4/4K3 b - - 0 1").unwrap();
        assert_eq!(game.status(), GameStatus::InProgress);
        game.apply_uci("d4e3").unwrap();
        assert_eq!(game.status(), GameStatus::DrawInsufficientMaterial);

        let mut game = Game::from_fen("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1").unwrap();
        assert_eq!(game.status(), GameStatus::InProgress);
        game.apply_uci("e1d2").unwrap();
        assert_eq!(game.status(), GameStatus::DrawInsufficientMaterial);
        assert_eq!(
            game.apply_uci("e8e7"),
            Err(Error::GameOver(GameStatus::DrawInsufficientMaterial))
        );
    }

    #[test]
    fn test_enpassant_expires() {
        let mut game = Game::new_initial();
        play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);
        assert_eq!(game.current().ep_target(), Some(sq("d6")));

        let mut now = game.clone();
        now.apply_uci("e5d6").unwrap();
        assert_eq!(now.current().get(sq("d5")), None);

        play(&mut game, &["h2h3", "h7h6"]);
        assert_eq!(game.current().ep_target(), None);
        assert_eq!(
            game.apply_uci("e5d6"),
            Err(Error::IllegalMove("e5d6".parse().unwrap()))
        );
        assert_eq!(
            game.apply_move(Move::en_passant(sq("e5"), sq("d6"))),
            Err(Error::IllegalMove("e5d6".parse().unwrap()))
        );
    }

    #[test]
    fn test_castling_after_king_moved() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let mut game = Game::from_fen(fen).unwrap();
        play(&mut game, &["e1f1", "e8f8", "f1e1", "f8e8"]);
        assert_eq!(
            game.apply_uci("e1g1"),
            Err(Error::IllegalMove("e1g1".parse().unwrap()))
        );
        assert_eq!(
            game.apply_uci("e1c1"),
            Err(Error::IllegalMove("e1c1".parse().unwrap()))
        );

        let mut game = Game::from_fen(fen).unwrap();
        play(&mut game, &["h1h2", "a8a7", "h2h1", "a7a8"]);
        assert!(game.apply_uci("e1g1").is_err());
        play(&mut game, &["e1c1"]);
        assert!(game.apply_uci("e8c8").is_err());
        play(&mut game, &["e8g8"]);
        assert_eq!(game.current().as_fen(), "r4rk1/8/8/8/8/8/8/2KR3R w - - 6 4");
    }

    #[test]
    fn test_uci_list() {
        let game = Game::from_uci_list(Position::initial(), "e2e4  e7e5\tg1f3").unwrap();
        assert_eq!(game.len(), 3);
        assert_eq!(game.uci_list().to_string(), "e2e4 e7e5 g1f3");

        let err = Game::from_uci_list(Position::initial(), "e2e4 e7e5 e4e5").unwrap_err();
        assert_eq!(
            err,
            UciListError {
                index: 2,
                source: Error::IllegalMove("e4e5".parse().unwrap()),
            }
        );
        assert_eq!(err.to_string(), "cannot apply move #3: illegal move e4e5");
    }

    #[test]
    fn test_undo() {
        let mut game = Game::new_initial();
        assert_eq!(game.undo(), None);
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(game.undo(), Some(Move::normal(sq("d8"), sq("h4"))));
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.len(), 3);
        assert!(!game.legal_moves().is_empty());
        while game.undo().is_some() {}
        assert!(game.is_empty());
        assert_eq!(game.current(), &Position::initial());
        assert_eq!(game.repeat_count(), 1);
    }

    #[test]
    fn test_random_playouts() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..20 {
            let mut game = Game::new_initial();
            while !game.is_finished() && game.len() < 200 {
                let pos = game.current().clone();
                let moves = game.legal_moves();
                assert_eq!(pos.zobrist_hash(), pos.raw().zobrist_hash());
                assert!(!(legal::is_checkmate(&pos) && legal::is_stalemate(&pos)));
                assert!(!moves.is_empty());
                for &mv in moves.iter() {
                    let next = pos.make_move(mv).unwrap();
                    assert!(!legal::is_in_check(&next, pos.side()));
                    assert_eq!(next.side(), pos.side().inv());
                }
                let mv = *moves.choose(&mut rng).unwrap();
                game.apply_move(mv).unwrap();
            }
            let pos = game.current();
            match game.status() {
                GameStatus::Checkmate(winner) => {
                    assert!(legal::is_checkmate(pos));
                    assert_eq!(winner, pos.side().inv());
                    assert!(legal::legal_moves(pos).is_empty());
                }
                GameStatus::Stalemate => {
                    assert!(legal::is_stalemate(pos));
                    assert!(legal::legal_moves(pos).is_empty());
                }
                GameStatus::DrawFiftyMove => assert!(pos.halfmove_clock() >= FIFTY_MOVE_LIMIT),
                GameStatus::DrawRepetition => assert!(game.repeat_count() >= REPETITION_LIMIT),
                GameStatus::DrawInsufficientMaterial => assert!(pos.is_insufficient_material()),
                GameStatus::InProgress => assert_eq!(game.len(), 200),
            }
        }
    }
}
