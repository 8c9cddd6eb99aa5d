//! Movement shape of each piece kind
//!
//! Shape checks look only at the piece, the move and the piece standing on the destination.
//! Whether the path is clear is decided elsewhere.

use crate::moves::{Geometry, Move};
use crate::types::{Color, Piece, PieceKind};

use castellan_base::geometry;
use thiserror::Error;

/// Move does not follow the movement rules of the piece
#[derive(Debug, Copy, Clone, Error, Eq, PartialEq)]
#[error("{kind} cannot move like this: {reason}")]
pub struct ShapeError {
    pub kind: PieceKind,
    pub reason: &'static str,
}

type Verdict = Result<(), &'static str>;

fn pawn(color: Color, mv: Move, target: Option<Piece>) -> Verdict {
    let forward = geometry::pawn_forward_delta(color);
    let (df, dr) = (mv.delta_file(), mv.delta_rank());
    if df == 0 && (dr == forward || dr == 2 * forward) {
        if target.is_some() {
            return Err("pawns cannot capture straight ahead");
        }
        if dr == 2 * forward && mv.src().rank() != geometry::pawn_home_rank(color) {
            return Err("double step is allowed only from the starting rank");
        }
        return Ok(());
    }
    if df.abs() == 1 && dr == forward {
        return match target {
            Some(p) if p.color() != color => Ok(()),
            _ => Err("pawns move diagonally only to capture"),
        };
    }
    Err("pawns move one square forward, two from the starting rank, or capture diagonally")
}

fn knight(mv: Move) -> Verdict {
    match (mv.width(), mv.length()) {
        (1, 2) | (2, 1) => Ok(()),
        _ => Err("knights move in an L shape"),
    }
}

fn bishop(mv: Move) -> Verdict {
    match mv.geometry() {
        Geometry::Diagonal => Ok(()),
        _ => Err("bishops move along diagonals"),
    }
}

fn rook(mv: Move) -> Verdict {
    match mv.geometry() {
        Geometry::Straight => Ok(()),
        _ => Err("rooks move along ranks and files"),
    }
}

fn queen(mv: Move) -> Verdict {
    match mv.geometry() {
        Geometry::Straight | Geometry::Diagonal => Ok(()),
        Geometry::Irregular => Err("queens move along ranks, files and diagonals"),
    }
}

fn king(mv: Move) -> Verdict {
    if mv.distance() == 1 {
        Ok(())
    } else {
        Err("kings move one square in any direction")
    }
}

/// Checks that `piece` may make `mv` when `target` stands on the destination square
///
/// `target` matters only for pawns, which capture differently from how they move.
pub fn validate(piece: Piece, mv: Move, target: Option<Piece>) -> Result<(), ShapeError> {
    let verdict = match piece.kind() {
        PieceKind::Pawn => pawn(piece.color(), mv, target),
        PieceKind::Knight => knight(mv),
        PieceKind::Bishop => bishop(mv),
        PieceKind::Rook => rook(mv),
        PieceKind::Queen => queen(mv),
        PieceKind::King => king(mv),
    };
    verdict.map_err(|reason| ShapeError {
        kind: piece.kind(),
        reason,
    })
}
