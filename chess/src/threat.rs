//! Check detection

use crate::board::{Board, King};
use crate::moves::Move;
use crate::types::{Color, Coord, Piece, PieceKind};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Enemy piece attacking a king
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Threat {
    attacker: Coord,
    piece: Piece,
    king: King,
}

impl Threat {
    /// Square of the attacking piece
    #[inline]
    pub const fn attacker(&self) -> Coord {
        self.attacker
    }

    /// Attacking piece
    #[inline]
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    /// Attacked king
    ///
    /// If the threat was detected for a hypothetical king move, this is where the king would
    /// stand after the move.
    #[inline]
    pub const fn king(&self) -> King {
        self.king
    }

    /// Move from the attacker to the king
    #[inline]
    pub const fn line(&self) -> Move {
        Move::new(self.attacker, self.king.address())
    }
}

impl fmt::Display for Threat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "{} king at {} is attacked by {} at {}",
            self.king.color(),
            self.king.address(),
            self.piece.kind(),
            self.attacker
        )
    }
}

impl Board {
    /// Finds an enemy piece attacking the king of color `c`
    ///
    /// If `hypothetical` is given, the board is examined as if that move had been made. When the
    /// move relocates the king itself, its destination is examined instead of the current square.
    /// An enemy piece standing on the destination of the move counts as captured and cannot
    /// attack.
    pub fn detect_threat(&self, c: Color, hypothetical: Option<Move>) -> Option<Threat> {
        let mut king = self.king(c);
        if let Some(mv) = hypothetical {
            if mv.src() == king.address() {
                king = king.relocated(mv.dst());
            }
        }
        let projection = hypothetical.map(|mv| mv.projection());
        let enemy = c.inv();
        for attacker in self.army(enemy) {
            if projection.map_or(false, |p| p.filled == attacker) {
                continue;
            }
            let line = Move::new(attacker, king.address());
            if self.validate_move(line, enemy, projection).is_ok() {
                let piece = self.get(attacker)?;
                return Some(Threat {
                    attacker,
                    piece,
                    king,
                });
            }
        }
        None
    }

    /// Returns `true` if the king of color `c` is attacked
    #[inline]
    pub fn is_check(&self, c: Color) -> bool {
        self.detect_threat(c, None).is_some()
    }

    /// Returns `true` if `side` may make `mv` without leaving its own king attacked
    ///
    /// Moves onto the enemy king are never legal.
    pub fn is_legal(&self, mv: Move, side: Color) -> bool {
        self.get(mv.dst()).map_or(true, |p| p.kind() != PieceKind::King)
            && self.validate_move(mv, side, None).is_ok()
            && self.detect_threat(side, Some(mv)).is_none()
    }

    fn legal_moves_iter(&self, side: Color) -> impl Iterator<Item = Move> + '_ {
        let groups = self.group_squares();
        let (own, targets) = (groups.army(side), !groups.army(side));
        own.into_iter()
            .flat_map(move |src| targets.into_iter().map(move |dst| Move::new(src, dst)))
            .filter(move |&mv| self.is_legal(mv, side))
    }

    /// Lists all the moves `side` may make
    ///
    /// Castling and pawn captures on the double step path are not listed.
    pub fn legal_moves(&self, side: Color) -> Vec<Move> {
        self.legal_moves_iter(side).collect()
    }

    pub fn has_legal_moves(&self, side: Color) -> bool {
        self.legal_moves_iter(side).next().is_some()
    }
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
    fn test_initial() {
        let board = Board::initial();
        assert_eq!(board.detect_threat(Color::White, None), None);
        assert_eq!(board.detect_threat(Color::Black, None), None);
        assert!(!board.is_check(Color::White));
    }

    #[test]
    fn test_simple() {
        let board = Board::from_layout("4r1k1/8/8/8/8/8/8/4K3").unwrap();
        let threat = board.detect_threat(Color::White, None).unwrap();
        assert_eq!(threat.attacker(), c("e8"));
        assert_eq!(threat.piece().kind(), PieceKind::Rook);
        assert_eq!(threat.king().address(), c("e1"));
        assert_eq!(threat.line(), mv("e8-e1"));
        assert_eq!(
            threat.to_string(),
            "white king at e1 is attacked by R at e8"
        );
        assert_eq!(board.detect_threat(Color::Black, None), None);

        let board = Board::from_layout("6k1/8/8/8/8/8/3p4/4K3").unwrap();
        let threat = board.detect_threat(Color::White, None).unwrap();
        assert_eq!(threat.attacker(), c("d2"));
        let board = Board::from_layout("6k1/8/8/8/8/3p4/8/4K3").unwrap();
        assert_eq!(board.detect_threat(Color::White, None), None);
        let board = Board::from_layout("6k1/8/8/8/8/5n2/8/4K3").unwrap();
        assert!(board.is_check(Color::White));
    }

    #[test]
    fn test_hypothetical() {
        let board = Board::from_layout("4r1k1/8/8/8/8/8/4B3/4K3").unwrap();
        assert_eq!(board.detect_threat(Color::White, None), None);
        // the bishop is pinned
        let threat = board.detect_threat(Color::White, Some(mv("e2-d3"))).unwrap();
        assert_eq!(threat.attacker(), c("e8"));
        // king steps into the file of the rook
        assert_eq!(board.detect_threat(Color::White, Some(mv("e1-d1"))), None);
        let board = Board::from_layout("3r2k1/8/8/8/8/8/4B3/4K3").unwrap();
        let threat = board.detect_threat(Color::White, Some(mv("e1-d2"))).unwrap();
        assert_eq!(threat.king().address(), c("d2"));
        assert_eq!(board.detect_threat(Color::White, Some(mv("e1-f1"))), None);
    }

    #[test]
    fn test_capture_attacker() {
        let board = Board::from_layout("6k1/8/8/8/8/8/4r3/R3K3").unwrap();
        let threat = board.detect_threat(Color::White, None).unwrap();
        assert_eq!(threat.attacker(), c("e2"));
        // capturing the rook with the king removes the threat
        assert_eq!(board.detect_threat(Color::White, Some(mv("e1-e2"))), None);
        // moving the other rook does not
        assert!(board
            .detect_threat(Color::White, Some(mv("a1-a2")))
            .is_some());
    }

    #[test]
    fn test_legal_moves() {
        let board = Board::initial();
        assert_eq!(board.legal_moves(Color::White).len(), 20);
        assert_eq!(board.legal_moves(Color::Black).len(), 20);
        assert!(board.is_legal(mv("g8-f6"), Color::Black));
        assert!(!board.is_legal(mv("g8-f6"), Color::White));

        // the bishop is pinned, so only the king may move
        let board = Board::from_layout("4r1k1/8/8/8/8/8/4B3/4K3").unwrap();
        let mut moves = board
            .legal_moves(Color::White)
            .into_iter()
            .filter(|m| m.src() == c("e1"))
            .map(|m| m.to_string())
            .collect::<Vec<_>>();
        moves.sort();
        assert_eq!(moves, vec!["e1-d1", "e1-d2", "e1-f1", "e1-f2"]);
        assert!(!board.is_legal(mv("e2-d3"), Color::White));

        let board = Board::from_layout("k7/8/1Q6/8/8/8/8/7K").unwrap();
        assert!(!board.has_legal_moves(Color::Black));
        assert!(!board.is_check(Color::Black));

        // black is in check with white to move, yet the king is not up for capture
        let board = Board::from_layout("R3k3/8/8/8/8/8/8/4K3").unwrap();
        assert!(board.is_check(Color::Black));
        assert!(board.validate_move(mv("a8-e8"), Color::White, None).is_ok());
        assert!(!board.is_legal(mv("a8-e8"), Color::White));
        assert!(board
            .legal_moves(Color::White)
            .iter()
            .all(|m| m.dst() != c("e8")));
    }

    #[test]
    fn test_pawn_attacks_projected_king() {
        let board = Board::from_layout("6k1/8/8/8/8/8/3p4/5K2").unwrap();
        assert_eq!(board.detect_threat(Color::White, None), None);
        let threat = board.detect_threat(Color::White, Some(mv("f1-e1"))).unwrap();
        assert_eq!(threat.attacker(), c("d2"));
        assert_eq!(board.detect_threat(Color::White, Some(mv("f1-g1"))), None);
    }
}
