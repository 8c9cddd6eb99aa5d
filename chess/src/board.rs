//! Board and related things

use crate::between;
use crate::bitboard::Bitboard;
use crate::moves::{Geometry, Move, Projection};
use crate::shape::{self, ShapeError};
use crate::types::{AddressParseError, Color, Coord, File, Piece, PieceKind, Rank};

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Display};
use std::mem;
use std::str::FromStr;
use thiserror::Error;

/// Board validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum BoardError {
    /// One of the sides doesn't have a king
    #[error("no king of color {0}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0}")]
    TooManyKings(Color),
    /// Two pieces share the same identifier
    #[error("duplicate piece identifier {0}")]
    DuplicateId(u32),
}

/// Error parsing a board layout such as `"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"`
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum LayoutParseError {
    /// Rank is too large
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    /// Rank is too small
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    /// Too many ranks
    #[error("too many ranks")]
    Overflow,
    /// Not enough ranks
    #[error("not enough ranks")]
    Underflow,
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
    /// Layout is well-formed, but the position is not valid
    #[error("invalid position: {0}")]
    Invalid(#[from] BoardError),
}

/// Reason why a move cannot be made
///
/// The variants are listed in the order in which [`Board::validate_move()`] checks them, and the
/// first failing check wins.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    #[error("start and destination may not be the same square ({0})")]
    SameSquare(Coord),
    #[error("square {0} is empty")]
    EmptySquare(Coord),
    #[error("{kind} at {at} is not owned by {side}", kind = .piece.kind())]
    NotOwned {
        piece: Piece,
        at: Coord,
        side: Color,
    },
    #[error("{0}")]
    Shape(#[from] ShapeError),
    #[error("target square {0} is occupied by own piece")]
    TargetOccupied(Coord),
    #[error("target square {0} is out of bounds")]
    OutOfBounds(Coord),
    #[error("path is blocked by {kind} at {at}", kind = .blocker.kind())]
    Collision { blocker: Piece, at: Coord },
}

/// King of the given color together with the square it stands on
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct King {
    color: Color,
    address: Coord,
}

impl King {
    #[inline]
    pub const fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub const fn address(&self) -> Coord {
        self.address
    }

    #[inline]
    pub(crate) fn relocated(self, address: Coord) -> King {
        King { address, ..self }
    }
}

/// Square of the board together with its occupant
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Square {
    coord: Coord,
    piece: Option<Piece>,
}

impl Square {
    #[inline]
    pub const fn coord(&self) -> Coord {
        self.coord
    }

    #[inline]
    pub const fn file(&self) -> File {
        self.coord.file()
    }

    #[inline]
    pub const fn rank(&self) -> Rank {
        self.coord.rank()
    }

    /// Two-character name of the square, e.g. `"e4"`
    pub fn address(&self) -> String {
        self.coord.to_string()
    }

    /// Color of the square itself
    #[inline]
    pub const fn color(&self) -> Color {
        self.coord.shade()
    }

    #[inline]
    pub const fn piece(&self) -> Option<Piece> {
        self.piece
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.piece.is_none()
    }
}

/// Squares of the board split by occupancy
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Grouping {
    armies: [Bitboard; 2],
}

impl Grouping {
    #[inline]
    pub fn army(&self, c: Color) -> Bitboard {
        self.armies[c.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.armies[0] | self.armies[1]
    }

    #[inline]
    pub fn empty(&self) -> Bitboard {
        !self.occupied()
    }
}

/// Chess board
///
/// Besides the pieces, the board keeps the position of both kings, so they can be found without
/// scanning. The cache is updated only by [`Board::execute_move()`], which is the only way to
/// move a piece.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Piece>; 64],
    kings: [Coord; 2],
}

impl Board {
    /// Creates the initial position
    ///
    /// Pieces are numbered from a1 towards h8, so White gets identifiers `0..16` and Black gets
    /// `16..32`.
    pub fn initial() -> Board {
        let mut cells = [None; 64];
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
        let rows = [
            (Rank::R1, Color::White, Some(back)),
            (Rank::R2, Color::White, None),
            (Rank::R7, Color::Black, None),
            (Rank::R8, Color::Black, Some(back)),
        ];
        let mut id = 0;
        for (rank, color, pieces) in rows {
            for file in File::iter() {
                let kind = pieces.map_or(PieceKind::Pawn, |p| p[file.index()]);
                cells[Coord::from_parts(file, rank).index()] = Some(Piece::new(id, color, kind));
                id += 1;
            }
        }
        Board {
            cells,
            kings: [
                Coord::from_parts(File::E, Rank::R1),
                Coord::from_parts(File::E, Rank::R8),
            ],
        }
    }

    /// Creates a board from the pieces on each square, indexed by [`Coord::index()`]
    pub fn from_cells(cells: [Option<Piece>; 64]) -> Result<Board, BoardError> {
        let mut kings = [None; 2];
        let mut ids = HashSet::new();
        for coord in Coord::iter() {
            let piece = match cells[coord.index()] {
                Some(p) => p,
                None => continue,
            };
            if !ids.insert(piece.id()) {
                return Err(BoardError::DuplicateId(piece.id()));
            }
            if piece.kind() == PieceKind::King {
                let slot = &mut kings[piece.color().index()];
                if slot.is_some() {
                    return Err(BoardError::TooManyKings(piece.color()));
                }
                *slot = Some(coord);
            }
        }
        let white = kings[0].ok_or(BoardError::NoKing(Color::White))?;
        let black = kings[1].ok_or(BoardError::NoKing(Color::Black))?;
        Ok(Board {
            cells,
            kings: [white, black],
        })
    }

    /// Parses the board from a layout string
    ///
    /// The layout lists the ranks from the eighth to the first, separated by `/`. Pieces are
    /// written as letters (uppercase for White), and runs of empty squares as digits. Pieces get
    /// their identifiers in the order from a1 towards h8.
    pub fn from_layout(s: &str) -> Result<Board, LayoutParseError> {
        Ok(Board::from_cells(parse_layout(s)?)?)
    }

    /// Formats the board as a layout string accepted by [`Board::from_layout()`]
    pub fn as_layout(&self) -> String {
        self.to_string()
    }

    #[inline]
    pub fn get(&self, c: Coord) -> Option<Piece> {
        self.cells[c.index()]
    }

    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Option<Piece> {
        self.get(Coord::from_parts(file, rank))
    }

    #[inline]
    pub fn square(&self, c: Coord) -> Square {
        Square {
            coord: c,
            piece: self.get(c),
        }
    }

    /// Looks up a square by its address, e.g. `"e4"`
    pub fn square_at(&self, address: &str) -> Result<Square, AddressParseError> {
        Ok(self.square(Coord::from_str(address)?))
    }

    /// Iterates over all the squares, from a1 towards h8
    pub fn squares(&self) -> impl Iterator<Item = Square> + '_ {
        Coord::iter().map(move |c| self.square(c))
    }

    /// Returns all the squares occupied by pieces of color `c`
    pub fn squares_by_army(&self, c: Color) -> Vec<Square> {
        self.squares()
            .filter(|s| s.piece().map(|p| p.color()) == Some(c))
            .collect()
    }

    /// Returns the squares occupied by pieces of color `c`
    pub fn army(&self, c: Color) -> Bitboard {
        self.squares_by_army(c).into_iter().map(|s| s.coord()).collect()
    }

    /// Splits the squares into White's army, Black's army and empty squares in one pass
    pub fn group_squares(&self) -> Grouping {
        let mut armies = [Bitboard::EMPTY; 2];
        for c in Coord::iter() {
            if let Some(p) = self.get(c) {
                armies[p.color().index()].set(c);
            }
        }
        Grouping { armies }
    }

    #[inline]
    pub fn king(&self, c: Color) -> King {
        King {
            color: c,
            address: self.kings[c.index()],
        }
    }

    #[inline]
    pub fn kings(&self) -> [King; 2] {
        [self.king(Color::White), self.king(Color::Black)]
    }

    /// Returns the squares strictly between the endpoints of `mv`, starting next to the source
    pub fn slice_between(&self, mv: Move) -> ArrayVec<Square, 6> {
        between::between(mv)
            .into_iter()
            .map(|c| self.square(c))
            .collect()
    }

    /// Returns the occupant of `c` as if the move behind `projection` were made
    fn projected(&self, c: Coord, projection: Option<Projection>) -> Option<Piece> {
        match projection {
            Some(p) if c == p.vacated => None,
            Some(p) if c == p.filled => self.get(p.vacated).or_else(|| self.get(c)),
            _ => self.get(c),
        }
    }

    /// Checks whether the side `side` may make the move `mv`
    ///
    /// Only the board is examined, so castling, check and the turn order are not taken into
    /// account. If `projection` is given, the board is examined as if that move had been made:
    /// its source counts as empty and its destination as occupied by the moving piece.
    pub fn validate_move(
        &self,
        mv: Move,
        side: Color,
        projection: Option<Projection>,
    ) -> Result<(), ValidateError> {
        let (src, dst) = (mv.src(), mv.dst());
        if src == dst {
            return Err(ValidateError::SameSquare(src));
        }
        let piece = self
            .projected(src, projection)
            .ok_or(ValidateError::EmptySquare(src))?;
        if piece.color() != side {
            return Err(ValidateError::NotOwned {
                piece,
                at: src,
                side,
            });
        }
        let target = self.projected(dst, projection);
        shape::validate(piece, mv, target)?;
        if target.map(|p| p.color()) == Some(side) {
            return Err(ValidateError::TargetOccupied(dst));
        }
        if !dst.is_on_board() {
            return Err(ValidateError::OutOfBounds(dst));
        }
        if mv.geometry() != Geometry::Irregular && mv.distance() > 1 {
            for at in between::between(mv) {
                if let Some(blocker) = self.projected(at, projection) {
                    return Err(ValidateError::Collision { blocker, at });
                }
            }
        }
        Ok(())
    }

    /// Moves the piece from the source of `mv` to its destination without any validation
    ///
    /// Returns the piece which stood on the destination before, if any.
    pub fn execute_move(&mut self, mv: Move) -> Option<Piece> {
        let piece = self.cells[mv.src().index()].take();
        let captured = mem::replace(&mut self.cells[mv.dst().index()], piece);
        if let Some(p) = piece {
            if p.kind() == PieceKind::King {
                self.kings[p.color().index()] = mv.dst();
            }
        }
        #[cfg(feature = "selftest")]
        assert!(self.check_king_cache(), "king cache is broken after {}", mv);
        captured
    }

    /// Places `piece` on `c` directly, returning the previous occupant
    ///
    /// Used to remove captured pieces, to bring them back and to promote pawns. Kings never go
    /// through here.
    pub(crate) fn put(&mut self, c: Coord, piece: Option<Piece>) -> Option<Piece> {
        debug_assert!(
            piece.map(|p| p.kind()) != Some(PieceKind::King)
                && self.get(c).map(|p| p.kind()) != Some(PieceKind::King),
            "kings must be moved with execute_move()"
        );
        mem::replace(&mut self.cells[c.index()], piece)
    }

    /// Returns `true` if the cached king positions agree with the pieces on the board
    pub fn check_king_cache(&self) -> bool {
        Color::iter().all(|color| {
            let count = self
                .cells
                .iter()
                .flatten()
                .filter(|p| p.is(color, PieceKind::King))
                .count();
            let cached = self.get(self.kings[color.index()]);
            count == 1 && cached.map_or(false, |p| p.is(color, PieceKind::King))
        })
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::initial()
    }
}

fn parse_layout(s: &str) -> Result<[Option<Piece>; 64], LayoutParseError> {
    type Error = LayoutParseError;

    let mut file = 0_usize;
    let mut row = 0_usize;
    let mut cells = [None; 64];
    let rank = |row: usize| Rank::from_index(7 - row);
    for ch in s.chars() {
        match ch {
            '1'..='8' => {
                let add = (u32::from(ch) - u32::from('0')) as usize;
                if file + add > 8 {
                    return Err(Error::RankOverflow(rank(row)));
                }
                file += add;
            }
            '/' => {
                if file < 8 {
                    return Err(Error::RankUnderflow(rank(row)));
                }
                row += 1;
                file = 0;
                if row >= 8 {
                    return Err(Error::Overflow);
                }
            }
            _ => {
                if file >= 8 {
                    return Err(Error::RankOverflow(rank(row)));
                }
                let piece = Piece::from_char(0, ch).ok_or(Error::UnexpectedChar(ch))?;
                cells[Coord::from_parts(File::from_index(file), rank(row)).index()] = Some(piece);
                file += 1;
            }
        }
    }

    if file < 8 {
        return Err(Error::RankUnderflow(rank(row)));
    }
    if row < 7 {
        return Err(Error::Underflow);
    }

    let mut id = 0;
    for p in cells.iter_mut().flatten() {
        *p = Piece::new(id, p.color(), p.kind());
        id += 1;
    }
    Ok(cells)
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in (0..8).rev().map(Rank::from_index) {
            if rank != Rank::R8 {
                write!(f, "/")?;
            }
            let mut empty = 0;
            for file in File::iter() {
                let piece = match self.get2(file, rank) {
                    Some(p) => p,
                    None => {
                        empty += 1;
                        continue;
                    }
                };
                if empty != 0 {
                    write!(f, "{}", empty)?;
                    empty = 0;
                }
                write!(f, "{}", piece.as_char())?;
            }
            if empty != 0 {
                write!(f, "{}", empty)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = LayoutParseError;

    fn from_str(s: &str) -> Result<Board, Self::Err> {
        Board::from_layout(s)
    }
}
