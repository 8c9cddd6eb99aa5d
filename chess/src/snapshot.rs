//! Serializable snapshot of a game

use crate::action::Action;
use crate::board::{Board, BoardError};
use crate::game::Game;
use crate::types::{Color, Coord, File, Piece, PieceKind, Rank};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error restoring a game from a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("bad JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The grid is not 8 ranks of 8 squares
    #[error("expected 8 ranks of 8 squares")]
    BadShape,
    /// Square is not where its coordinates say it is
    #[error("square {0} is misplaced in the grid")]
    Misplaced(Coord),
    #[error("invalid position: {0}")]
    Board(#[from] BoardError),
    /// The side which just moved left its king attacked
    #[error("{0} king is attacked while it is not {0}'s turn")]
    OpponentKingAttacked(Color),
    /// Taking back the action does not lead to a valid position
    #[error("action #{} does not match the position", .0 + 1)]
    ActionMismatch(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquareSnapshot {
    pub rank: usize,
    pub file: usize,
    pub address: Coord,
    pub color: Color,
    pub piece: Option<Piece>,
}

/// Board, action log and turn of a game
///
/// `squares[r][f]` holds the square on rank `r` and file `f`, both counted from zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub squares: Vec<Vec<SquareSnapshot>>,
    pub actions: Vec<Action>,
    pub active_color: Color,
    #[serde(default)]
    pub castled: [bool; 2],
}

impl GameSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<GameSnapshot, SnapshotError> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Game {
    pub fn snapshot(&self) -> GameSnapshot {
        let board = self.board();
        let squares: Vec<Vec<SquareSnapshot>> = Rank::iter()
            .map(|rank| {
                File::iter()
                    .map(|file| {
                        let square = board.square(Coord::from_parts(file, rank));
                        SquareSnapshot {
                            rank: rank.index(),
                            file: file.index(),
                            address: square.coord(),
                            color: square.color(),
                            piece: square.piece(),
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        GameSnapshot {
            squares,
            actions: self.actions().to_vec(),
            active_color: self.side(),
            castled: [self.castled(Color::White), self.castled(Color::Black)],
        }
    }

    /// Rebuilds the game from a snapshot
    ///
    /// The grid is checked to be well-formed and to hold a valid position. The pending
    /// promotion and the threat are recomputed.
    pub fn restore(snapshot: GameSnapshot) -> Result<Game, SnapshotError> {
        if snapshot.squares.len() != 8 || snapshot.squares.iter().any(|row| row.len() != 8) {
            return Err(SnapshotError::BadShape);
        }
        let mut cells = [None; 64];
        for (r, row) in snapshot.squares.iter().enumerate() {
            for (f, square) in row.iter().enumerate() {
                let expected = Coord::from_parts(File::from_index(f), Rank::from_index(r));
                if square.address != expected
                    || square.rank != r
                    || square.file != f
                    || square.color != expected.shade()
                {
                    return Err(SnapshotError::Misplaced(square.address));
                }
                cells[expected.index()] = square.piece;
            }
        }
        let board = Board::from_cells(cells)?;
        let side = snapshot.active_color;
        if board.is_check(side.inv()) {
            return Err(SnapshotError::OpponentKingAttacked(side.inv()));
        }
        check_actions(&board, &snapshot.actions)?;

        let mut castled = snapshot.castled;
        for a in snapshot.actions.iter().filter(|a| a.is_castling()) {
            castled[a.piece().color().index()] = true;
        }
        Ok(Game::from_parts(board, snapshot.actions, side, castled))
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        self.snapshot().to_json()
    }

    pub fn from_json(s: &str) -> Result<Game, SnapshotError> {
        Game::restore(GameSnapshot::from_json(s)?)
    }
}

/// Takes back all the `actions` on a copy of `board`, checking that each of them can be undone
fn check_actions(board: &Board, actions: &[Action]) -> Result<(), SnapshotError> {
    let mut board = board.clone();
    for (pos, action) in actions.iter().enumerate().rev() {
        let mismatch = SnapshotError::ActionMismatch(pos);
        let mv = action.mv();
        let piece = action.piece();
        let standing = match action.promotion() {
            Some(PieceKind::Pawn | PieceKind::King) => return Err(mismatch),
            Some(_) if piece.kind() != PieceKind::Pawn => return Err(mismatch),
            Some(kind) => piece.with_kind(kind),
            None => piece,
        };
        if board.get(mv.dst()) != Some(standing) || board.get(mv.src()).is_some() {
            return Err(mismatch);
        }
        board.execute_move(mv.reversed());
        if action.promotion().is_some() {
            board.put(mv.src(), Some(piece));
        }

        if let Some(c) = action.capture() {
            let on_board = board
                .squares()
                .any(|s| s.piece().map_or(false, |p| p.id() == c.piece.id()));
            if c.piece.kind() == PieceKind::King
                || c.piece.color() == piece.color()
                || on_board
                || board.get(c.address).is_some()
            {
                return Err(mismatch);
            }
            board.put(c.address, Some(c.piece));
        }
    }
    Ok(())
}
