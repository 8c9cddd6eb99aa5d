//! # castellan
//!
//! Rule-checking chess engine. It keeps the board and the log of moves, checks every move
//! against the movement rules of the piece, refuses moves which leave the own king attacked,
//! and supports castling, promotion and undo. A simple automated opponent is included.
//!
//! ```
//! use castellan::{Color, Game};
//!
//! let mut game = Game::new();
//! game.make_move("e2-e4").unwrap();
//! game.make_move("e7-e5").unwrap();
//! assert_eq!(game.side(), Color::White);
//! assert!(game.make_move("e1-e3").is_err());
//! game.undo().unwrap();
//! assert_eq!(game.side(), Color::Black);
//! ```

pub mod action;
pub mod board;
pub mod castling;
pub mod game;
pub mod moves;
pub mod opponent;
pub mod shape;
pub mod snapshot;
pub mod threat;
pub mod types;

mod between;

pub use castellan_base::{bitboard, geometry};

pub use action::{Action, Capture};
pub use bitboard::Bitboard;
pub use board::{Board, King, Square};
pub use game::{Game, GameError};
pub use moves::Move;
pub use opponent::{Heuristic, Opponent, Reply};
pub use snapshot::GameSnapshot;
pub use threat::Threat;
pub use types::{Color, Coord, File, Piece, PieceKind, Rank};
