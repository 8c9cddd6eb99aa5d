//! Castling rules

use crate::action::{self, Action};
use crate::board::Board;
use crate::moves::Move;
use crate::threat::Threat;
use crate::types::{Color, Coord, Piece, PieceKind};

use thiserror::Error;

/// Reason why castling is not allowed
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CastleError {
    #[error("{0} has already castled")]
    AlreadyCastled(Color),
    #[error("there is no own rook at {0}")]
    NotARook(Coord),
    #[error("the king has already moved")]
    KingMoved,
    #[error("the rook at {0} has already moved")]
    RookMoved(Coord),
    #[error("the rook at {0} is not on the rank of the king")]
    DifferentRank(Coord),
    #[error("the rook at {0} is too close to the king")]
    RookTooClose(Coord),
    #[error("path is blocked by {kind} at {at}", kind = .blocker.kind())]
    PathBlocked { blocker: Piece, at: Coord },
    #[error("king would pass through attacked square {at} ({threat})")]
    KingAttacked { at: Coord, threat: Threat },
}

/// Castling which passed all the checks and may be executed
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CastlePlan {
    pub king: Piece,
    pub rook: Piece,
    /// King goes two squares towards the rook
    pub king_move: Move,
    /// Rook goes to the square the king crossed
    pub rook_move: Move,
}

/// Checks whether `side` may castle with the rook standing on `rook_at`
///
/// Castling is allowed once per game. Neither the king nor the rook may have moved before, the
/// rook must stand on the rank of the king at least three files away, the squares between them
/// must be empty and the king may not start on, pass through or arrive at an attacked square.
pub fn plan(
    board: &Board,
    actions: &[Action],
    side: Color,
    castled: bool,
    rook_at: Coord,
) -> Result<CastlePlan, CastleError> {
    if castled {
        return Err(CastleError::AlreadyCastled(side));
    }
    let rook = board
        .get(rook_at)
        .filter(|p| p.is(side, PieceKind::Rook))
        .ok_or(CastleError::NotARook(rook_at))?;
    let king_at = board.king(side).address();
    let king = board
        .get(king_at)
        .filter(|p| p.is(side, PieceKind::King))
        .ok_or(CastleError::KingMoved)?;
    if action::has_moved(actions, king.id()) {
        return Err(CastleError::KingMoved);
    }
    if action::has_moved(actions, rook.id()) {
        return Err(CastleError::RookMoved(rook_at));
    }

    let line = Move::new(king_at, rook_at);
    if line.delta_rank() != 0 {
        return Err(CastleError::DifferentRank(rook_at));
    }
    if line.width() < 3 {
        return Err(CastleError::RookTooClose(rook_at));
    }
    if let Some(square) = board.slice_between(line).into_iter().find(|s| !s.is_empty()) {
        if let Some(blocker) = square.piece() {
            return Err(CastleError::PathBlocked {
                blocker,
                at: square.coord(),
            });
        }
    }

    if let Some(threat) = board.detect_threat(side, None) {
        return Err(CastleError::KingAttacked {
            at: king_at,
            threat,
        });
    }
    let dir = line.delta_file().signum();
    let mut path = [king_at; 2];
    for (step, slot) in (1..).zip(path.iter_mut()) {
        let at = king_at
            .try_shift(dir * step, 0)
            .ok_or(CastleError::RookTooClose(rook_at))?;
        if let Some(threat) = board.detect_threat(side, Some(Move::new(king_at, at))) {
            return Err(CastleError::KingAttacked { at, threat });
        }
        *slot = at;
    }

    Ok(CastlePlan {
        king,
        rook,
        king_move: Move::new(king_at, path[1]),
        rook_move: Move::new(rook_at, path[0]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn c(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    fn mv(s: &str) -> Move {
        Move::from_str(s).unwrap()
    }

    #[test]
    fn test_kingside() {
        let board = Board::from_layout("r3k2r/8/8/8/8/8/8/R3K2R").unwrap();
        let plan = plan(&board, &[], Color::White, false, c("h1")).unwrap();
        assert_eq!(plan.king_move, mv("e1-g1"));
        assert_eq!(plan.rook_move, mv("h1-f1"));
        assert!(plan.king.is(Color::White, PieceKind::King));
        assert!(plan.rook.is(Color::White, PieceKind::Rook));
    }

    #[test]
    fn test_queenside() {
        let board = Board::from_layout("r3k2r/8/8/8/8/8/8/R3K2R").unwrap();
        let plan = plan(&board, &[], Color::Black, false, c("a8")).unwrap();
        assert_eq!(plan.king_move, mv("e8-c8"));
        assert_eq!(plan.rook_move, mv("a8-d8"));
    }

    #[test]
    fn test_refused() {
        let board = Board::from_layout("r3k2r/8/8/8/8/8/8/R3K2R").unwrap();
        assert_eq!(
            plan(&board, &[], Color::White, true, c("h1")),
            Err(CastleError::AlreadyCastled(Color::White))
        );
        assert_eq!(
            plan(&board, &[], Color::White, false, c("h8")),
            Err(CastleError::NotARook(c("h8")))
        );
        assert_eq!(
            plan(&board, &[], Color::White, false, c("e1")),
            Err(CastleError::NotARook(c("e1")))
        );

        let rook = board.get(c("h1")).unwrap();
        let king = board.get(c("e1")).unwrap();
        let log = [Action::new(rook, mv("h1-h2"), None)];
        assert_eq!(
            plan(&board, &log, Color::White, false, c("h1")),
            Err(CastleError::RookMoved(c("h1")))
        );
        assert!(plan(&board, &log, Color::White, false, c("a1")).is_ok());
        let log = [Action::new(king, mv("e1-e2"), None)];
        assert_eq!(
            plan(&board, &log, Color::White, false, c("a1")),
            Err(CastleError::KingMoved)
        );
    }

    #[test]
    fn test_geometry() {
        let board = Board::from_layout("4k3/8/8/8/8/8/7R/4K1R1").unwrap();
        assert_eq!(
            plan(&board, &[], Color::White, false, c("h2")),
            Err(CastleError::DifferentRank(c("h2")))
        );
        assert_eq!(
            plan(&board, &[], Color::White, false, c("g1")),
            Err(CastleError::RookTooClose(c("g1")))
        );

        let board = Board::from_layout("4k3/8/8/8/8/8/8/R1N1K2R").unwrap();
        assert!(matches!(
            plan(&board, &[], Color::White, false, c("a1")),
            Err(CastleError::PathBlocked { at, .. }) if at == c("c1")
        ));
        assert!(plan(&board, &[], Color::White, false, c("h1")).is_ok());
    }

    #[test]
    fn test_attacked() {
        let board = Board::from_layout("4r1k1/8/8/8/8/8/8/R3K2R").unwrap();
        assert!(matches!(
            plan(&board, &[], Color::White, false, c("h1")),
            Err(CastleError::KingAttacked { at, .. }) if at == c("e1")
        ));

        let board = Board::from_layout("5rk1/8/8/8/8/8/8/R3K2R").unwrap();
        assert!(matches!(
            plan(&board, &[], Color::White, false, c("h1")),
            Err(CastleError::KingAttacked { at, .. }) if at == c("f1")
        ));
        assert!(plan(&board, &[], Color::White, false, c("a1")).is_ok());

        let board = Board::from_layout("2r3k1/8/8/8/8/8/8/R3K2R").unwrap();
        assert!(matches!(
            plan(&board, &[], Color::White, false, c("a1")),
            Err(CastleError::KingAttacked { at, threat })
                if at == c("c1") && threat.attacker() == c("c8")
        ));

        // the rook itself may pass an attacked square
        let board = Board::from_layout("1r4k1/8/8/8/8/8/8/R3K2R").unwrap();
        assert!(plan(&board, &[], Color::White, false, c("a1")).is_ok());
    }
}
