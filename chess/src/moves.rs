//! Moves and their geometry

use crate::types::{AddressParseError, Coord};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing a move written as `"<from>-<to>"`
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum MoveParseError {
    /// The string is not of the form `"e2-e4"`
    #[error("move must be formatted as <from>-<to>, e.g. \"a2-a3\", got {0:?}")]
    BadFormat(String),
    /// Bad source square
    #[error("bad source: {0}")]
    BadSrc(AddressParseError),
    /// Bad destination square
    #[error("bad destination: {0}")]
    BadDst(AddressParseError),
}

/// Classification of a move by the line it follows
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Geometry {
    /// Along a rank or a file
    Straight,
    /// Along a diagonal
    Diagonal,
    /// Neither of the above, e.g. a knight jump
    Irregular,
}

/// Hypothetical application of a move
///
/// When a board is examined under a projection, [`vacated`](Projection::vacated) is treated as
/// empty and [`filled`](Projection::filled) is treated as holding the moving piece, without the
/// board being modified.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Projection {
    pub vacated: Coord,
    pub filled: Coord,
}

/// Move from one square to another
///
/// The move itself knows nothing about the piece which makes it. Whether it is legal is decided
/// by [`Board::validate_move()`](crate::board::Board::validate_move).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Move {
    src: Coord,
    dst: Coord,
}

impl Move {
    #[inline]
    pub const fn new(src: Coord, dst: Coord) -> Move {
        Move { src, dst }
    }

    #[inline]
    pub const fn src(&self) -> Coord {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Coord {
        self.dst
    }

    /// Signed file difference between destination and source
    #[inline]
    pub const fn delta_file(&self) -> isize {
        self.dst.file().index() as isize - self.src.file().index() as isize
    }

    /// Signed rank difference between destination and source
    #[inline]
    pub const fn delta_rank(&self) -> isize {
        self.dst.rank().index() as isize - self.src.rank().index() as isize
    }

    /// Number of files crossed
    #[inline]
    pub const fn width(&self) -> usize {
        self.delta_file().unsigned_abs()
    }

    /// Number of ranks crossed
    #[inline]
    pub const fn length(&self) -> usize {
        self.delta_rank().unsigned_abs()
    }

    /// Number of king steps needed to cover the move
    #[inline]
    pub const fn distance(&self) -> usize {
        let (w, l) = (self.width(), self.length());
        if w > l {
            w
        } else {
            l
        }
    }

    pub const fn geometry(&self) -> Geometry {
        let (w, l) = (self.width(), self.length());
        if w == 0 || l == 0 {
            Geometry::Straight
        } else if w == l {
            Geometry::Diagonal
        } else {
            Geometry::Irregular
        }
    }

    #[inline]
    pub const fn reversed(self) -> Move {
        Move {
            src: self.dst,
            dst: self.src,
        }
    }

    #[inline]
    pub const fn projection(&self) -> Projection {
        Projection {
            vacated: self.src,
            filled: self.dst,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}-{}", self.src, self.dst)
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Move, Self::Err> {
        let (src, dst) = match s.split_once('-') {
            Some((src, dst)) if s.chars().count() == 5 => (src, dst),
            _ => return Err(MoveParseError::BadFormat(s.to_string())),
        };
        let src = Coord::from_str(src).map_err(MoveParseError::BadSrc)?;
        let dst = Coord::from_str(dst).map_err(MoveParseError::BadDst)?;
        Ok(Move { src, dst })
    }
}

impl From<Move> for String {
    fn from(mv: Move) -> String {
        mv.to_string()
    }
}

impl TryFrom<String> for Move {
    type Error = MoveParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Move::from_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{File, Rank};

    fn mv(s: &str) -> Move {
        Move::from_str(s).unwrap()
    }

    #[test]
    fn test_parse() {
        let m = mv("e2-e4");
        assert_eq!(m.src(), Coord::from_parts(File::E, Rank::R2));
        assert_eq!(m.dst(), Coord::from_parts(File::E, Rank::R4));
        assert_eq!(m.to_string(), "e2-e4");
        assert_eq!(mv("G1-F3").to_string(), "g1-f3");

        assert_eq!(
            Move::from_str("e2e4"),
            Err(MoveParseError::BadFormat("e2e4".to_string()))
        );
        assert_eq!(
            Move::from_str("e2-e4-"),
            Err(MoveParseError::BadFormat("e2-e4-".to_string()))
        );
        assert_eq!(
            Move::from_str("e2+e4"),
            Err(MoveParseError::BadFormat("e2+e4".to_string()))
        );
        assert!(matches!(
            Move::from_str("z2-e4"),
            Err(MoveParseError::BadSrc(AddressParseError::UnexpectedFile(_, 'z')))
        ));
        assert!(matches!(
            Move::from_str("e2-e9"),
            Err(MoveParseError::BadDst(AddressParseError::UnexpectedRank(_, '9')))
        ));
        assert!(matches!(
            Move::from_str("e2e-4"),
            Err(MoveParseError::BadSrc(AddressParseError::BadLength(_)))
        ));
    }

    #[test]
    fn test_geometry() {
        assert_eq!(mv("a1-a8").geometry(), Geometry::Straight);
        assert_eq!(mv("a1-h1").geometry(), Geometry::Straight);
        assert_eq!(mv("c1-h6").geometry(), Geometry::Diagonal);
        assert_eq!(mv("h6-c1").geometry(), Geometry::Diagonal);
        assert_eq!(mv("g1-f3").geometry(), Geometry::Irregular);
        assert_eq!(mv("a1-c8").geometry(), Geometry::Irregular);

        let m = mv("b1-c3");
        assert_eq!((m.width(), m.length(), m.distance()), (1, 2, 2));
        assert_eq!((m.delta_file(), m.delta_rank()), (1, 2));
        let m = mv("h8-a1");
        assert_eq!((m.delta_file(), m.delta_rank()), (-7, -7));
        assert_eq!(m.distance(), 7);
    }

    #[test]
    fn test_reversed() {
        let m = mv("d7-d5");
        assert_eq!(m.reversed(), mv("d5-d7"));
        assert_eq!(m.reversed().reversed(), m);
        let p = m.projection();
        assert_eq!((p.vacated, p.filled), (m.src(), m.dst()));
    }

    #[test]
    fn test_serde() {
        let m = mv("b8-c6");
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"b8-c6\"");
        assert_eq!(serde_json::from_str::<Move>("\"b8-c6\"").unwrap(), m);
        assert!(serde_json::from_str::<Move>("\"b8c6\"").is_err());
    }
}
