//! Core chess types

pub use castellan_base::types::{
    AddressParseError, Color, Coord, File, PieceKind, PieceKindParseError, Rank,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chess piece
///
/// Besides color and kind, every piece carries an identifier which stays the same for the whole
/// game, even after promotion. The identifier is what the action log uses to tell whether a
/// piece has already moved.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    id: u32,
    color: Color,
    kind: PieceKind,
}

impl Piece {
    #[inline]
    pub const fn new(id: u32, color: Color, kind: PieceKind) -> Piece {
        Piece { id, color, kind }
    }

    #[inline]
    pub const fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub const fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[inline]
    pub const fn is(&self, color: Color, kind: PieceKind) -> bool {
        self.color as u8 == color as u8 && self.kind as u8 == kind as u8
    }

    /// Returns the same piece (same identifier and color) turned into `kind`
    #[inline]
    pub const fn with_kind(self, kind: PieceKind) -> Piece {
        Piece { kind, ..self }
    }

    /// Returns a letter for the piece, uppercase for White and lowercase for Black
    pub fn as_char(&self) -> char {
        let c = self.kind.as_char();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    /// Parses a piece letter as returned by [`Piece::as_char()`]
    pub fn from_char(id: u32, c: char) -> Option<Piece> {
        let kind = PieceKind::from_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(id, color, kind))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.color.as_char(), self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_char() {
        let rook = Piece::new(3, Color::White, PieceKind::Rook);
        assert_eq!(rook.as_char(), 'R');
        assert_eq!(Piece::from_char(3, 'R'), Some(rook));
        assert_eq!(
            Piece::from_char(7, 'q'),
            Some(Piece::new(7, Color::Black, PieceKind::Queen))
        );
        assert_eq!(Piece::from_char(7, 'x'), None);
        assert_eq!(rook.to_string(), "wR");
    }

    #[test]
    fn test_with_kind() {
        let pawn = Piece::new(12, Color::Black, PieceKind::Pawn);
        let queen = pawn.with_kind(PieceKind::Queen);
        assert_eq!(queen.id(), 12);
        assert!(queen.is(Color::Black, PieceKind::Queen));
        assert!(!queen.is(Color::White, PieceKind::Queen));
    }
}
