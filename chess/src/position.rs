//! Position and related things

use crate::bitboard::Bitboard;
use crate::error::Error;
use crate::moves::Move;
use crate::types::{
    self, CastlingRights, CastlingSide, Color, File, Piece, PieceKind, Rank, Square,
};
use crate::{bitboard_consts, geometry, legal, movegen, moves, zobrist};

use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Position validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// En passant target lies on a wrong rank for the side to move
    #[error("invalid en passant target {0}")]
    InvalidEnpassant(Square),
    /// No more than 16 pieces of each color are allowed
    #[error("too many pieces of color {0:?}")]
    TooManyPieces(Color),
    #[error("no king of color {0:?}")]
    NoKing(Color),
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the first or on the last rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Square),
    /// The side which is not to move is in check
    #[error("opponent's king is attacked")]
    OpponentKingAttacked,
}

/// Error parsing the piece placement part of FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CellsParseError {
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    #[error("too many ranks")]
    Overflow,
    #[error("not enough ranks")]
    Underflow,
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error parsing [`RawPosition`] from FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawFenParseError {
    #[error("non-ASCII data in FEN")]
    NonAscii,
    #[error("board not specified")]
    NoBoard,
    #[error("bad board: {0}")]
    Board(#[from] CellsParseError),
    #[error("no move side")]
    NoMoveSide,
    #[error("bad move side: {0}")]
    MoveSide(#[from] types::ColorParseError),
    #[error("no castling rights")]
    NoCastling,
    #[error("bad castling rights: {0}")]
    Castling(#[from] types::CastlingRightsParseError),
    #[error("no en passant")]
    NoEnpassant,
    #[error("bad en passant: {0}")]
    Enpassant(#[from] types::SquareParseError),
    #[error("invalid en passant rank {0}")]
    InvalidEnpassantRank(Rank),
    #[error("bad halfmove clock: {0}")]
    HalfmoveClock(ParseIntError),
    #[error("bad fullmove number: {0}")]
    FullmoveNumber(ParseIntError),
    #[error("extra data in FEN")]
    ExtraData,
}

/// Error parsing [`Position`] from FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FenParseError {
    #[error("cannot parse fen: {0}")]
    Fen(#[from] RawFenParseError),
    #[error("invalid position: {0}")]
    Valid(#[from] ValidateError),
}

/// Unvalidated chess position
///
/// Holds everything that describes a position, but may contain nonsense. Use it to set up positions
/// programmatically, then convert into [`Position`] with [`Position::try_from()`].
///
/// # Example
///
/// ```
/// # use gambit::{RawPosition, Position, File, Rank, Color, Piece, PieceKind, Square, CastlingRights};
/// #
/// let mut raw = RawPosition {
///     cells: [None; 64],
///     side: Color::White,
///     castling: CastlingRights::EMPTY,
///     ep_target: None,
///     halfmove_clock: 10,
///     fullmove_number: 42,
/// };
/// raw.put(Square::from_parts(File::B, Rank::R2), Some(Piece::new(Color::White, PieceKind::King)));
/// raw.put(Square::from_parts(File::D, Rank::R5), Some(Piece::new(Color::Black, PieceKind::King)));
///
/// let pos: Position = raw.try_into().unwrap();
/// assert_eq!(pos.as_fen(), "8/8/8/3k4/8/8/1K6/8 w - - 10 42");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawPosition {
    /// Board contents, indexed by [`Square::index()`]
    pub cells: [Option<Piece>; 64],
    pub side: Color,
    pub castling: CastlingRights,
    /// Square skipped by the pawn which has just made a double push
    ///
    /// It is set after every double push, even if no pawn can capture en passant, and is cleared
    /// after any other move.
    pub ep_target: Option<Square>,
    /// Number of half-moves since the last pawn move or capture
    pub halfmove_clock: u16,
    /// Move number, incremented after each move by Black
    pub fullmove_number: u16,
}

impl RawPosition {
    /// Returns an empty board with White to move
    #[inline]
    pub const fn empty() -> RawPosition {
        RawPosition {
            cells: [None; 64],
            side: Color::White,
            castling: CastlingRights::EMPTY,
            ep_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn initial() -> RawPosition {
        let mut res = RawPosition {
            castling: CastlingRights::FULL,
            ..RawPosition::empty()
        };
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, kind) in File::iter().zip(back) {
            for color in [Color::White, Color::Black] {
                let back_sq = Square::from_parts(file, geometry::castling_rank(color));
                let pawn_sq = Square::from_parts(file, geometry::double_move_src_rank(color));
                res.put(back_sq, Some(Piece::new(color, kind)));
                res.put(pawn_sq, Some(Piece::new(color, PieceKind::Pawn)));
            }
        }
        res
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<RawPosition, RawFenParseError> {
        RawPosition::from_str(fen)
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.index()]
    }

    #[inline]
    pub fn put(&mut self, sq: Square, cell: Option<Piece>) {
        self.cells[sq.index()] = cell;
    }

    /// Computes the Zobrist hash from scratch
    ///
    /// The hash covers the board, the side to move, castling rights and the en passant target,
    /// but not the move counters.
    pub fn zobrist_hash(&self) -> u64 {
        let mut hash = if self.side == Color::White {
            zobrist::MOVE_SIDE
        } else {
            0
        };
        if let Some(sq) = self.ep_target {
            hash ^= zobrist::enpassant(sq);
        }
        hash ^= zobrist::castling(self.castling);
        for (i, cell) in self.cells.iter().enumerate() {
            if let Some(piece) = cell {
                hash ^= zobrist::pieces(*piece, Square::from_index(i));
            }
        }
        hash
    }

    /// Wraps the position to pretty-print it with the given style
    ///
    /// ```
    /// # use gambit::{RawPosition, position::PrettyStyle};
    /// #
    /// let r = RawPosition::initial();
    ///
    /// let res = r#"
    /// 8|rnbqkbnr
    /// 7|pppppppp
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|PPPPPPPP
    /// 1|RNBQKBNR
    /// -+--------
    /// W|abcdefgh
    /// "#;
    /// assert_eq!(r.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    /// ```
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { raw: self, style }
    }

    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }
}

impl Default for RawPosition {
    #[inline]
    fn default() -> RawPosition {
        RawPosition::empty()
    }
}

/// Valid chess position
///
/// This is the type every rules operation works with. It wraps a [`RawPosition`] that passed
/// validation, together with bitboards and the Zobrist hash that are kept up to date incrementally.
///
/// A `Position` is never changed once it is handed out: applying a move with [`Position::make_move()`]
/// returns a new one. Positions are plain values, so they can be sent and shared between threads
/// freely.
#[derive(Debug, Clone)]
pub struct Position {
    pub(crate) r: RawPosition,
    pub(crate) hash: u64,
    pub(crate) white: Bitboard,
    pub(crate) black: Bitboard,
    pub(crate) all: Bitboard,
    pub(crate) pieces: [Bitboard; Piece::COUNT],
}

impl Position {
    pub fn initial() -> Position {
        Position::build(RawPosition::initial())
    }

    pub fn from_fen(fen: &str) -> Result<Position, FenParseError> {
        Position::from_str(fen)
    }

    /// Fills bitboards and the hash, without any checks
    pub(crate) fn build(r: RawPosition) -> Position {
        let mut white = Bitboard::EMPTY;
        let mut black = Bitboard::EMPTY;
        let mut pieces = [Bitboard::EMPTY; Piece::COUNT];
        for (idx, cell) in r.cells.iter().enumerate() {
            let sq = Square::from_index(idx);
            if let Some(piece) = cell {
                match piece.color() {
                    Color::White => white.set(sq),
                    Color::Black => black.set(sq),
                };
                pieces[piece.index()].set(sq);
            }
        }
        Position {
            r,
            hash: r.zobrist_hash(),
            white,
            black,
            all: white | black,
            pieces,
        }
    }

    #[inline]
    pub fn raw(&self) -> &RawPosition {
        &self.r
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.r.get(sq)
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.r.side
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.r.castling
    }

    #[inline]
    pub fn ep_target(&self) -> Option<Square> {
        self.r.ep_target
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.r.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.r.fullmove_number
    }

    /// Returns the squares occupied by the pieces of color `c`
    #[inline]
    pub fn color(&self, c: Color) -> Bitboard {
        match c {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    #[inline]
    pub(crate) fn color_mut(&mut self, c: Color) -> &mut Bitboard {
        match c {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.all
    }

    /// Returns the squares occupied by `piece`
    #[inline]
    pub fn piece(&self, piece: Piece) -> Bitboard {
        self.pieces[piece.index()]
    }

    #[inline]
    pub fn piece2(&self, c: Color, kind: PieceKind) -> Bitboard {
        self.piece(Piece::new(c, kind))
    }

    #[inline]
    pub(crate) fn piece_mut(&mut self, piece: Piece) -> &mut Bitboard {
        &mut self.pieces[piece.index()]
    }

    #[inline]
    pub(crate) fn piece_diag(&self, c: Color) -> Bitboard {
        self.piece2(c, PieceKind::Bishop) | self.piece2(c, PieceKind::Queen)
    }

    #[inline]
    pub(crate) fn piece_line(&self, c: Color) -> Bitboard {
        self.piece2(c, PieceKind::Rook) | self.piece2(c, PieceKind::Queen)
    }

    #[inline]
    pub fn king_pos(&self, c: Color) -> Square {
        let king = self.piece2(c, PieceKind::King).as_raw();
        // Every valid position has exactly one king of each color
        Square::from_index(king.trailing_zeros() as usize)
    }

    /// Returns the Zobrist hash of the position
    ///
    /// The hash is maintained incrementally and equals [`RawPosition::zobrist_hash()`]. It covers
    /// placement, side to move, castling rights and en passant target, but not the move counters.
    /// Different positions may still share a hash, so equal hashes alone don't prove a repetition.
    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    /// Applies a legal move and returns the resulting position
    ///
    /// Fails with [`Error::IllegalMove`] if `mv` is not legal here; `self` is left intact in any case.
    pub fn make_move(&self, mv: Move) -> Result<Position, Error> {
        moves::make_move(self, mv)
    }

    /// Parses a move in long algebraic notation and applies it
    pub fn make_uci(&self, s: &str) -> Result<Position, Error> {
        let mv = Move::from_uci(s, self)?;
        moves::make_move(self, mv)
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        legal::is_in_check(self, self.r.side)
    }

    #[inline]
    pub fn has_legal_moves(&self) -> bool {
        legal::has_legal_moves(self)
    }

    #[inline]
    pub(crate) fn is_opponent_king_attacked(&self) -> bool {
        let c = self.r.side;
        movegen::is_square_attacked(self, self.king_pos(c.inv()), c)
    }

    /// Returns `true` if neither side can ever checkmate, whatever the moves
    ///
    /// Such positions are:
    ///
    /// - each side has either a lone king or a king with a single minor piece
    /// - kings and any number of bishops, all standing on squares of one color
    pub fn is_insufficient_material(&self) -> bool {
        let kings = self.piece2(Color::White, PieceKind::King)
            | self.piece2(Color::Black, PieceKind::King);
        let rest = self.all ^ kings;
        if rest.is_empty() {
            return true;
        }

        let minors = PieceKind::ALL
            .iter()
            .filter(|k| k.is_minor())
            .fold(Bitboard::EMPTY, |b, &k| {
                b | self.piece2(Color::White, k) | self.piece2(Color::Black, k)
            });
        if rest == minors && (rest & self.white).len() <= 1 && (rest & self.black).len() <= 1 {
            return true;
        }

        let bishops = self.piece2(Color::White, PieceKind::Bishop)
            | self.piece2(Color::Black, PieceKind::Bishop);
        rest == bishops
            && ((rest & bitboard_consts::CELLS_LIGHT).is_empty()
                || (rest & bitboard_consts::CELLS_DARK).is_empty())
    }

    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        self.r.pretty(style)
    }

    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }
}

impl Default for Position {
    fn default() -> Position {
        Position::initial()
    }
}

impl PartialEq for Position {
    #[inline]
    fn eq(&self, other: &Position) -> bool {
        self.r == other.r
    }
}

impl Eq for Position {}

impl Hash for Position {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.r.hash(state)
    }
}

impl TryFrom<RawPosition> for Position {
    type Error = ValidateError;

    fn try_from(mut raw: RawPosition) -> Result<Position, ValidateError> {
        if let Some(target) = raw.ep_target {
            if target.rank() != geometry::enpassant_dst_rank(raw.side) {
                return Err(ValidateError::InvalidEnpassant(target));
            }
            // Drop the target if no pawn could have just skipped it
            let victim = Square::from_parts(target.file(), geometry::enpassant_src_rank(raw.side));
            if raw.get(victim) != Some(Piece::new(raw.side.inv(), PieceKind::Pawn))
                || raw.get(target).is_some()
            {
                raw.ep_target = None;
            }
        }

        for color in [Color::White, Color::Black] {
            let rank = geometry::castling_rank(color);
            let has = |file: File, kind: PieceKind| {
                raw.get(Square::from_parts(file, rank)) == Some(Piece::new(color, kind))
            };
            let (king, rook_a, rook_h) = (
                has(File::E, PieceKind::King),
                has(File::A, PieceKind::Rook),
                has(File::H, PieceKind::Rook),
            );
            if !king {
                raw.castling.unset_color(color);
            }
            if !rook_a {
                raw.castling.unset(color, CastlingSide::Queen);
            }
            if !rook_h {
                raw.castling.unset(color, CastlingSide::King);
            }
        }

        let res = Position::build(raw);

        for color in [Color::White, Color::Black] {
            if res.color(color).len() > 16 {
                return Err(ValidateError::TooManyPieces(color));
            }
            let king = res.piece2(color, PieceKind::King);
            if king.is_empty() {
                return Err(ValidateError::NoKing(color));
            }
            if king.len() > 1 {
                return Err(ValidateError::TooManyKings(color));
            }
        }

        let pawns =
            res.piece2(Color::White, PieceKind::Pawn) | res.piece2(Color::Black, PieceKind::Pawn);
        if let Some(sq) = (pawns & bitboard_consts::BACK_RANKS).first() {
            return Err(ValidateError::InvalidPawn(sq));
        }

        if res.is_opponent_king_attacked() {
            return Err(ValidateError::OpponentKingAttacked);
        }

        Ok(res)
    }
}

impl TryFrom<&RawPosition> for Position {
    type Error = ValidateError;

    fn try_from(raw: &RawPosition) -> Result<Position, ValidateError> {
        (*raw).try_into()
    }
}

fn parse_cells(s: &str) -> Result<[Option<Piece>; 64], CellsParseError> {
    type Error = CellsParseError;

    let mut file = 0_usize;
    let mut rank = 0_usize;
    let mut pos = 0_usize;
    let mut cells = [None; 64];
    for b in s.bytes() {
        match b {
            b'1'..=b'8' => {
                let add = (b - b'0') as usize;
                if file + add > 8 {
                    return Err(Error::RankOverflow(Rank::from_index(rank)));
                }
                file += add;
                pos += add;
            }
            b'/' => {
                if file < 8 {
                    return Err(Error::RankUnderflow(Rank::from_index(rank)));
                }
                rank += 1;
                file = 0;
                if rank >= 8 {
                    return Err(Error::Overflow);
                }
            }
            _ => {
                if file >= 8 {
                    return Err(Error::RankOverflow(Rank::from_index(rank)));
                }
                cells[pos] =
                    Some(Piece::from_char(b as char).ok_or(Error::UnexpectedChar(b as char))?);
                file += 1;
                pos += 1;
            }
        };
    }

    if file < 8 {
        return Err(Error::RankUnderflow(Rank::from_index(rank)));
    }
    if rank < 7 {
        return Err(Error::Underflow);
    }

    Ok(cells)
}

fn parse_ep_target(s: &str, side: Color) -> Result<Option<Square>, RawFenParseError> {
    if s == "-" {
        return Ok(None);
    }
    let target = Square::from_str(s)?;
    if target.rank() != geometry::enpassant_dst_rank(side) {
        return Err(RawFenParseError::InvalidEnpassantRank(target.rank()));
    }
    Ok(Some(target))
}

impl FromStr for RawPosition {
    type Err = RawFenParseError;

    fn from_str(s: &str) -> Result<RawPosition, Self::Err> {
        type Error = RawFenParseError;

        if !s.is_ascii() {
            return Err(Error::NonAscii);
        }
        let mut iter = s.split(' ').fuse();

        let cells = parse_cells(iter.next().ok_or(Error::NoBoard)?)?;
        let side = Color::from_str(iter.next().ok_or(Error::NoMoveSide)?)?;
        let castling = CastlingRights::from_str(iter.next().ok_or(Error::NoCastling)?)?;
        let ep_target = parse_ep_target(iter.next().ok_or(Error::NoEnpassant)?, side)?;
        let halfmove_clock = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::HalfmoveClock)?,
            None => 0,
        };
        let fullmove_number = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::FullmoveNumber)?,
            None => 1,
        };

        if iter.next().is_some() {
            return Err(Error::ExtraData);
        }

        Ok(RawPosition {
            cells,
            side,
            castling,
            ep_target,
            halfmove_clock,
            fullmove_number,
        })
    }
}

impl FromStr for Position {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Position, Self::Err> {
        Ok(RawPosition::from_str(s)?.try_into()?)
    }
}

fn format_cells(cells: &[Option<Piece>; 64], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for rank in Rank::iter() {
        if rank.index() != 0 {
            write!(f, "/")?;
        }
        let mut empty = 0_u8;
        for file in File::iter() {
            match cells[Square::from_parts(file, rank).index()] {
                None => empty += 1,
                Some(piece) => {
                    if empty != 0 {
                        write!(f, "{}", empty)?;
                        empty = 0;
                    }
                    write!(f, "{}", piece)?;
                }
            }
        }
        if empty != 0 {
            write!(f, "{}", empty)?;
        }
    }
    Ok(())
}

impl Display for RawPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_cells(&self.cells, f)?;
        write!(f, " {} {}", self.side, self.castling)?;
        match self.ep_target {
            Some(sq) => write!(f, " {}", sq)?,
            None => write!(f, " -")?,
        };
        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.r.fmt(f)
    }
}

/// Style for [`RawPosition::pretty()`] and [`Position::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    Ascii,
    Utf8,
}

/// Pretty-printing wrapper returned by [`Position::pretty()`]
pub struct Pretty<'a> {
    raw: &'a RawPosition,
    style: PrettyStyle,
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;
    const WHITE_INDICATOR: char;
    const BLACK_INDICATOR: char;

    fn piece(p: Piece) -> char;

    fn indicator(c: Color) -> char {
        match c {
            Color::White => Self::WHITE_INDICATOR,
            Color::Black => Self::BLACK_INDICATOR,
        }
    }

    fn fmt(r: &RawPosition, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter() {
            write!(f, "{}{}", rank, Self::VERT_FRAME)?;
            for file in File::iter() {
                let ch = match r.get(Square::from_parts(file, rank)) {
                    Some(p) => Self::piece(p),
                    None => '.',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", Self::HORZ_FRAME, Self::ANGLE_FRAME)?;
        for _ in File::iter() {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, "{}{}", Self::indicator(r.side), Self::VERT_FRAME)?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';
    const WHITE_INDICATOR: char = 'W';
    const BLACK_INDICATOR: char = 'B';

    fn piece(p: Piece) -> char {
        p.as_char()
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';
    const WHITE_INDICATOR: char = '○';
    const BLACK_INDICATOR: char = '●';

    fn piece(p: Piece) -> char {
        p.as_utf8_char()
    }
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(self.raw, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(self.raw, f),
        }
    }
}
