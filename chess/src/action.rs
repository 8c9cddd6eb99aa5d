//! Records of moves made during a game

use crate::moves::Move;
use crate::types::{Coord, Piece, PieceKind};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Piece removed from the board by a move
///
/// The address is usually the destination of the move, but a pawn may also capture a piece
/// standing in its way when making a double step.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capture {
    pub piece: Piece,
    pub address: Coord,
}

/// Move made during a game
///
/// Actions are never modified after they are logged, except that a promotion may be attached
/// to the last one when the player picks the new piece.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    piece: Piece,
    #[serde(rename = "move")]
    mv: Move,
    capture: Option<Capture>,
    promotion: Option<PieceKind>,
    castling: bool,
}

impl Action {
    #[inline]
    pub const fn new(piece: Piece, mv: Move, capture: Option<Capture>) -> Action {
        Action {
            piece,
            mv,
            capture,
            promotion: None,
            castling: false,
        }
    }

    /// Creates one of the two actions which make up castling
    #[inline]
    pub const fn castling(piece: Piece, mv: Move) -> Action {
        Action {
            piece,
            mv,
            capture: None,
            promotion: None,
            castling: true,
        }
    }

    /// Piece which made the move, as it was before the move
    #[inline]
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    #[inline]
    pub const fn mv(&self) -> Move {
        self.mv
    }

    #[inline]
    pub const fn capture(&self) -> Option<Capture> {
        self.capture
    }

    /// Kind the pawn was promoted to, if any
    #[inline]
    pub const fn promotion(&self) -> Option<PieceKind> {
        self.promotion
    }

    #[inline]
    pub const fn is_castling(&self) -> bool {
        self.castling
    }

    #[inline]
    pub(crate) const fn with_promotion(self, kind: PieceKind) -> Action {
        Action {
            promotion: Some(kind),
            ..self
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{} {}", self.piece, self.mv)?;
        if let Some(capture) = self.capture {
            write!(f, " x{}", capture.piece.kind())?;
            if capture.address != self.mv.dst() {
                write!(f, "@{}", capture.address)?;
            }
        }
        if let Some(kind) = self.promotion {
            write!(f, " ={}", kind)?;
        }
        if self.castling {
            write!(f, " (castling)")?;
        }
        Ok(())
    }
}

/// Returns `true` if the piece with identifier `id` appears in `actions`
pub fn has_moved(actions: &[Action], id: u32) -> bool {
    actions.iter().any(|a| a.piece.id() == id)
}
