//! Simple automated opponent
//!
//! The opponent does not search. It lists every move which keeps its king safe, shuffles them,
//! and picks the first one, optionally preferring captures.

use crate::bitboard::Bitboard;
use crate::game::{Game, GameError};
use crate::moves::Move;
use crate::types::{Color, PieceKind};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How the opponent orders the candidate moves after shuffling them
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heuristic {
    /// Any candidate may be picked
    Random,
    /// Captures are picked before quiet moves
    #[default]
    CapturesFirst,
}

/// Move the opponent may make
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub mv: Move,
    pub capture: bool,
}

/// Result of the opponent's turn
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Reply {
    /// The opponent made the move
    Moved(Move),
    /// The side to move is checkmated
    Checkmated(Color),
    /// The side to move has no moves but is not in check
    NoMoves,
}

/// Lists the moves the side to move may make, in board order
///
/// When the king is attacked, only the moves which capture the attacker, block its line or move
/// the king are considered.
pub fn candidates(game: &Game) -> Vec<Candidate> {
    let board = game.board();
    let side = game.side();
    let groups = board.group_squares();
    let own = groups.army(side);
    let enemy = groups.army(side.inv());
    let king = board.king(side).address();

    let targets = match game.pending_threat() {
        Some(threat) => board
            .slice_between(threat.line())
            .into_iter()
            .map(|s| s.coord())
            .collect::<Bitboard>()
            .with(threat.attacker()),
        None => !own,
    };

    let mut res = Vec::new();
    for src in own {
        let dsts = if src == king { !own } else { targets };
        for dst in dsts {
            let mv = Move::new(src, dst);
            if board.is_legal(mv, side) {
                res.push(Candidate {
                    mv,
                    capture: enemy.has(dst),
                });
            }
        }
    }
    res
}

/// Automated opponent
#[derive(Debug, Clone)]
pub struct Opponent<R = StdRng> {
    heuristic: Heuristic,
    rng: R,
}

impl Opponent<StdRng> {
    /// Creates an opponent seeded from the system entropy
    pub fn new(heuristic: Heuristic) -> Self {
        Opponent::with_rng(heuristic, StdRng::from_entropy())
    }

    /// Creates an opponent which makes the same choices in the same positions
    pub fn seeded(heuristic: Heuristic, seed: u64) -> Self {
        Opponent::with_rng(heuristic, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Opponent<R> {
    pub fn with_rng(heuristic: Heuristic, rng: R) -> Self {
        Opponent { heuristic, rng }
    }

    #[inline]
    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Picks a move for the side to move, or returns `None` if there are no moves
    pub fn choose(&mut self, game: &Game) -> Option<Move> {
        let mut moves = candidates(game);
        moves.shuffle(&mut self.rng);
        if self.heuristic == Heuristic::CapturesFirst {
            moves.sort_by_key(|c| !c.capture);
        }
        moves.first().map(|c| c.mv)
    }

    /// Makes a move for the side to move
    ///
    /// The move goes through [`Game::push()`] like any other. A pawn reaching the last rank is
    /// promoted to a queen.
    pub fn play(&mut self, game: &mut Game) -> Result<Reply, GameError> {
        if let Some(c) = game.checkmate() {
            return Ok(Reply::Checkmated(c));
        }
        let side = game.side();
        match self.choose(game) {
            Some(mv) => {
                game.push(mv)?;
                if game.pending_promotion().is_some() {
                    game.promote(PieceKind::Queen)?;
                }
                Ok(Reply::Moved(mv))
            }
            None => match game.detect_checkmate() {
                Some(_) => Ok(Reply::Checkmated(side)),
                None => Ok(Reply::NoMoves),
            },
        }
    }
}

impl Game {
    /// Lets `opponent` make a move for the side to move
    #[inline]
    pub fn auto_move<R: Rng>(&mut self, opponent: &mut Opponent<R>) -> Result<Reply, GameError> {
        opponent.play(self)
    }
}
