//! Game state: turn order, the action log and everything built on top of it

use crate::action::{self, Action, Capture};
use crate::board::{Board, LayoutParseError, ValidateError};
use crate::castling::{self, CastleError};
use crate::moves::{Move, MoveParseError};
use crate::threat::Threat;
use crate::types::{
    AddressParseError, Color, Coord, Piece, PieceKind, PieceKindParseError,
};

use castellan_base::geometry;
use std::str::FromStr;
use thiserror::Error;

/// Error making a move or castling
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Move string is malformed
    #[error("cannot parse move: {0}")]
    Parse(#[from] MoveParseError),
    /// Square address is malformed
    #[error("cannot parse square: {0}")]
    Address(#[from] AddressParseError),
    /// Piece letter is malformed
    #[error("cannot parse piece: {0}")]
    PieceKind(#[from] PieceKindParseError),
    /// Move breaks the movement rules
    #[error("illegal move: {0}")]
    Validate(#[from] ValidateError),
    /// Move would leave the own king attacked
    #[error("illegal move: {0}")]
    Check(Threat),
    /// Move would take the enemy king off the board
    #[error("illegal move: cannot capture the king at {0}")]
    KingCapture(Coord),
    /// Castling is not allowed
    #[error("cannot castle: {0}")]
    Castle(#[from] CastleError),
    #[error("cannot undo: no moves found")]
    NothingToUndo,
    /// The pawn which reached the last rank must be promoted before the game goes on
    #[error("pawn at {0} must be promoted first")]
    PromotionPending(Coord),
    #[error("no pawn awaits promotion")]
    NoPendingPromotion,
    #[error("cannot promote to {0}")]
    BadPromotion(PieceKind),
    /// The game is over
    #[error("game is finished: {0} is checkmated")]
    Finished(Color),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot apply move #{}: {}", .pos + 1, .source)]
pub struct MoveListError {
    pub pos: usize,
    pub source: GameError,
}

/// Pawn which reached the last rank and waits for the player to pick a new piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PendingPromotion {
    pub piece: Piece,
    pub at: Coord,
}

/// Chess game
///
/// The game owns the board and the log of all the actions made so far. The log is the only
/// place which knows whether a piece has already moved, and undoing a move just pops it from
/// the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    actions: Vec<Action>,
    side: Color,
    castled: [bool; 2],
    promotion: Option<PendingPromotion>,
    threat: Option<Threat>,
    checkmate: Option<Color>,
}

impl Game {
    /// Starts a new game from the initial position
    pub fn new() -> Game {
        Game::from_board(Board::initial(), Color::White)
    }

    /// Starts a new game from the given position, with `side` to move
    pub fn from_board(board: Board, side: Color) -> Game {
        Game::from_parts(board, Vec::new(), side, [false; 2])
    }

    pub fn from_layout(layout: &str, side: Color) -> Result<Game, LayoutParseError> {
        Ok(Game::from_board(Board::from_layout(layout)?, side))
    }

    /// Starts a new game from the given position and applies the moves from `list`
    ///
    /// See [`Game::push_list()`] for the format of the list.
    pub fn from_move_list(board: Board, side: Color, list: &str) -> Result<Game, MoveListError> {
        let mut res = Game::from_board(board, side);
        res.push_list(list)?;
        Ok(res)
    }

    pub(crate) fn from_parts(
        board: Board,
        actions: Vec<Action>,
        side: Color,
        castled: [bool; 2],
    ) -> Game {
        let promotion = actions.last().and_then(|a| {
            let piece = a.piece();
            let at = a.mv().dst();
            let waiting = piece.kind() == PieceKind::Pawn
                && a.promotion().is_none()
                && at.rank() == geometry::promote_rank(piece.color())
                && board.get(at) == Some(piece);
            waiting.then_some(PendingPromotion { piece, at })
        });
        let mut res = Game {
            board,
            actions,
            side,
            castled,
            promotion,
            threat: None,
            checkmate: None,
        };
        res.refresh_threat();
        res
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[inline]
    pub fn last_action(&self) -> Option<&Action> {
        self.actions.last()
    }

    /// Side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn castled(&self, c: Color) -> bool {
        self.castled[c.index()]
    }

    #[inline]
    pub fn pending_promotion(&self) -> Option<PendingPromotion> {
        self.promotion
    }

    /// Threat against the king of the side to move, if any
    #[inline]
    pub fn pending_threat(&self) -> Option<Threat> {
        self.threat
    }

    /// Color of the checkmated side, if any
    #[inline]
    pub fn checkmate(&self) -> Option<Color> {
        self.checkmate
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.checkmate.is_some()
    }

    /// Returns `true` if `piece` appears in the action log
    pub fn has_moved(&self, piece: Piece) -> bool {
        action::has_moved(&self.actions, piece.id())
    }

    /// Looks up the piece on the square with the given address, e.g. `"e4"`
    pub fn piece_at(&self, address: &str) -> Result<Option<Piece>, GameError> {
        Ok(self.board.square_at(address)?.piece())
    }

    /// Lists all the moves the side to move may make
    pub fn legal_moves(&self) -> Vec<Move> {
        self.board.legal_moves(self.side)
    }

    fn ensure_playable(&self) -> Result<(), GameError> {
        if let Some(c) = self.checkmate {
            return Err(GameError::Finished(c));
        }
        if let Some(p) = self.promotion {
            return Err(GameError::PromotionPending(p.at));
        }
        Ok(())
    }

    /// Makes a move written as `"e2-e4"`
    pub fn make_move(&mut self, s: &str) -> Result<(), GameError> {
        self.push(Move::from_str(s)?)
    }

    /// Makes a move
    ///
    /// Besides regular moves, the following are accepted:
    ///
    /// - moving an unmoved rook onto the own king castles with that rook;
    /// - moving the king two squares along its rank castles with the nearest rook in that
    ///   direction;
    /// - a pawn making a double step captures an enemy piece other than the king standing in its
    ///   way.
    ///
    /// If the move fails, the game is left unchanged.
    pub fn push(&mut self, mv: Move) -> Result<(), GameError> {
        self.ensure_playable()?;
        let side = self.side;
        let capture = match self.board.validate_move(mv, side, None) {
            Ok(()) => self.board.get(mv.dst()).map(|piece| Capture {
                piece,
                address: mv.dst(),
            }),
            Err(ValidateError::TargetOccupied(_)) if self.is_rook_onto_king(mv) => {
                return self.castle_at(mv.src());
            }
            Err(err @ ValidateError::Shape(_)) => match self.castling_rook(mv) {
                Some(rook_at) => return self.castle_at(rook_at),
                None => return Err(err.into()),
            },
            Err(ValidateError::Collision { blocker, at }) if self.is_pawn_push_over(mv, blocker) => {
                Some(Capture {
                    piece: blocker,
                    address: at,
                })
            }
            Err(err) => return Err(err.into()),
        };
        if let Some(c) = capture.filter(|c| c.piece.kind() == PieceKind::King) {
            return Err(GameError::KingCapture(c.address));
        }

        let piece = self
            .board
            .get(mv.src())
            .ok_or(ValidateError::EmptySquare(mv.src()))?;
        if let Some(c) = capture {
            if c.address != mv.dst() {
                self.board.put(c.address, None);
            }
        }
        self.board.execute_move(mv);
        self.actions.push(Action::new(piece, mv, capture));

        if let Some(threat) = self.board.detect_threat(side, Some(mv)) {
            self.revert_last();
            return Err(GameError::Check(threat));
        }

        if piece.kind() == PieceKind::Pawn && mv.dst().rank() == geometry::promote_rank(side) {
            self.promotion = Some(PendingPromotion { piece, at: mv.dst() });
        }
        self.finish_turn();
        Ok(())
    }

    /// Applies the moves from a whitespace-separated list, e.g. `"e2-e4 e7-e5 g1-f3"`
    ///
    /// A move may be followed by `=` and a piece letter to promote the pawn, e.g. `"a7-a8=Q"`.
    pub fn push_list(&mut self, list: &str) -> Result<(), MoveListError> {
        for (pos, token) in list.split_ascii_whitespace().enumerate() {
            let (mv, promote) = match token.split_once('=') {
                Some((mv, kind)) => (mv, Some(kind)),
                None => (token, None),
            };
            let res = self.make_move(mv).and_then(|_| match promote {
                Some(kind) => self.promote(PieceKind::from_str(kind)?),
                None => Ok(()),
            });
            res.map_err(|source| MoveListError { pos, source })?;
        }
        Ok(())
    }

    fn is_rook_onto_king(&self, mv: Move) -> bool {
        let side = self.side;
        self.board
            .get(mv.src())
            .map_or(false, |p| p.is(side, PieceKind::Rook))
            && self
                .board
                .get(mv.dst())
                .map_or(false, |p| p.is(side, PieceKind::King))
    }

    /// Returns the rook to castle with if `mv` is a king going two squares along its rank
    fn castling_rook(&self, mv: Move) -> Option<Coord> {
        let side = self.side;
        let king = self.board.get(mv.src())?;
        if !king.is(side, PieceKind::King) || mv.delta_rank() != 0 || mv.width() != 2 {
            return None;
        }
        let dir = mv.delta_file().signum();
        let mut cur = mv.dst();
        loop {
            cur = cur.try_shift(dir, 0)?;
            if let Some(p) = self.board.get(cur) {
                return p.is(side, PieceKind::Rook).then_some(cur);
            }
        }
    }

    fn is_pawn_push_over(&self, mv: Move, blocker: Piece) -> bool {
        blocker.color() != self.side
            && blocker.kind() != PieceKind::King
            && self
                .board
                .get(mv.src())
                .map_or(false, |p| p.kind() == PieceKind::Pawn)
    }

    /// Castles with the rook on the square with the given address
    pub fn castle(&mut self, rook: &str) -> Result<(), GameError> {
        self.castle_at(Coord::from_str(rook)?)
    }

    /// Castles with the rook on `rook_at`
    ///
    /// The king goes two squares towards the rook, and the rook goes to the square the king
    /// crossed. Both moves are logged as castling actions and undone together.
    pub fn castle_at(&mut self, rook_at: Coord) -> Result<(), GameError> {
        self.ensure_playable()?;
        let side = self.side;
        let plan = castling::plan(
            &self.board,
            &self.actions,
            side,
            self.castled[side.index()],
            rook_at,
        )?;
        self.board.execute_move(plan.king_move);
        self.board.execute_move(plan.rook_move);
        self.actions.push(Action::castling(plan.king, plan.king_move));
        self.actions.push(Action::castling(plan.rook, plan.rook_move));
        self.castled[side.index()] = true;
        self.finish_turn();
        Ok(())
    }

    /// Replaces the pawn waiting for promotion with a piece of kind `kind`
    ///
    /// The piece keeps the identifier of the pawn.
    pub fn promote(&mut self, kind: PieceKind) -> Result<(), GameError> {
        let pending = self.promotion.ok_or(GameError::NoPendingPromotion)?;
        if matches!(kind, PieceKind::Pawn | PieceKind::King) {
            return Err(GameError::BadPromotion(kind));
        }
        self.board.put(pending.at, Some(pending.piece.with_kind(kind)));
        if let Some(last) = self.actions.last_mut() {
            *last = last.with_promotion(kind);
        }
        self.promotion = None;
        self.refresh_threat();
        Ok(())
    }

    /// Takes back the last move
    ///
    /// Castling is taken back as a whole. The turn goes back to the side which made the move.
    pub fn undo(&mut self) -> Result<(), GameError> {
        let last = self.revert_last().ok_or(GameError::NothingToUndo)?;
        let mover = last.piece().color();
        if last.is_castling() {
            while self
                .actions
                .last()
                .map_or(false, |a| a.is_castling() && a.piece().color() == mover)
            {
                self.revert_last();
            }
            self.castled[mover.index()] = false;
        }
        self.side = mover;
        self.promotion = None;
        self.refresh_threat();
        Ok(())
    }

    /// Pops the last action and reverts its effect on the board
    fn revert_last(&mut self) -> Option<Action> {
        let action = self.actions.pop()?;
        let mv = action.mv();
        self.board.execute_move(mv.reversed());
        if action.promotion().is_some() {
            self.board.put(mv.src(), Some(action.piece()));
        }
        if let Some(c) = action.capture() {
            self.board.put(c.address, Some(c.piece));
        }
        Some(action)
    }

    /// Checks whether the side to move is checkmated, and records it if so
    pub fn detect_checkmate(&mut self) -> Option<Color> {
        let side = self.side;
        if self.board.is_check(side) && !self.board.has_legal_moves(side) {
            self.checkmate = Some(side);
        }
        self.checkmate
    }

    fn finish_turn(&mut self) {
        self.side = self.side.inv();
        self.refresh_threat();
    }

    fn refresh_threat(&mut self) {
        self.threat = self.board.detect_threat(self.side, None);
        self.checkmate = None;
        if self.threat.is_some() {
            self.detect_checkmate();
        }
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}
