use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::board::{Coord, CoordError, PieceKind, Side, SquareIndex, PROMOTION_KINDS};
use crate::ledger::client::MoveArgument;
use crate::ledger::events::{BoardSnapshot, GamePhaseEvent};
use crate::ledger::types::ContractRef;

const LOG_TARGET: &str = "fow_chess_client::game::engine";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("board is read-only until it is your turn")]
    NotYourTurn,
    #[error("a move is already being submitted")]
    SubmissionInFlight,
    #[error("choose a promotion piece first")]
    PromotionChoicePending,
    #[error("no piece on {0}")]
    EmptySquare(Coord),
    #[error("no piece has been lifted")]
    NothingLifted,
    #[error("no promotion is pending")]
    NoPromotionPending,
    #[error("{0:?} is not a legal promotion kind")]
    InvalidPromotion(PieceKind),
    #[error(transparent)]
    Coord(#[from] CoordError),
}

/// Protocol position of the engine between user gestures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovePhase {
    Idle,
    PieceLifted { from: SquareIndex },
    PromotionPending { from: SquareIndex, to: SquareIndex },
    Submitting,
}

/// Ephemeral move under assembly; discarded unconditionally once the
/// exercise request is issued or the gesture is abandoned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMove {
    pub from: Coord,
    pub to: Coord,
    pub promotion: Option<PieceKind>,
}

/// What a completed drop asks the caller to do next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// The move is complete: issue exactly one exercise with this argument.
    Submit(MoveArgument),
    /// The pawn reached its last rank; submission is suspended until a
    /// promotion kind is chosen.
    PromotionRequired,
}

/// Whether the viewer may move on this board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoardRole {
    /// The selected game is the viewer's active turn on this contract.
    Active { contract: ContractRef },
    /// Any other phase: the last known position renders read-only.
    ReadOnly,
}

/// State machine translating drag-and-drop gestures on the selected game
/// into a validated move request:
/// `Idle -> PieceLifted -> (PromotionPending ->) Submitting -> Idle`.
///
/// The board held here is an optimistic working copy for immediate visual
/// feedback only; the next authoritative snapshot replaces it wholesale
/// whether or not the ledger accepted the move.
pub struct MoveProtocolEngine {
    role: BoardRole,
    side: Side,
    board: BoardSnapshot,
    phase: MovePhase,
}

impl MoveProtocolEngine {
    /// Build an engine for the currently selected event. Only phases that
    /// carry a board yield an engine; only `ActiveTurn` yields one that
    /// accepts gestures.
    pub fn for_selection(event: &GamePhaseEvent) -> Option<Self> {
        let board = event.board()?;
        let role = match event {
            GamePhaseEvent::ActiveTurn(active) => BoardRole::Active {
                contract: active.contract.clone(),
            },
            _ => BoardRole::ReadOnly,
        };
        Some(Self {
            role,
            side: board.side,
            board: board.pieces.clone(),
            phase: MovePhase::Idle,
        })
    }

    pub fn role(&self) -> &BoardRole {
        &self.role
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn phase(&self) -> MovePhase {
        self.phase
    }

    /// The optimistic board as it should currently be displayed.
    pub fn board(&self) -> &BoardSnapshot {
        &self.board
    }

    pub fn contract(&self) -> Option<&ContractRef> {
        match &self.role {
            BoardRole::Active { contract } => Some(contract),
            BoardRole::ReadOnly => None,
        }
    }

    /// Whether a new drag may start right now.
    pub fn allow_drag(&self) -> bool {
        matches!(self.role, BoardRole::Active { .. }) && self.phase == MovePhase::Idle
    }

    /// Pick a piece up. Rejected outright on read-only boards and while a
    /// submission is outstanding; lifting a second piece before dropping
    /// restarts the gesture.
    pub fn lift(&mut self, from: SquareIndex) -> Result<(), MoveError> {
        if matches!(self.role, BoardRole::ReadOnly) {
            return Err(MoveError::NotYourTurn);
        }
        match self.phase {
            MovePhase::Idle | MovePhase::PieceLifted { .. } => {}
            MovePhase::PromotionPending { .. } => return Err(MoveError::PromotionChoicePending),
            MovePhase::Submitting => return Err(MoveError::SubmissionInFlight),
        }
        let coord = Coord::from_index(from)?;
        if self.board.piece_at(from).is_none() {
            return Err(MoveError::EmptySquare(coord));
        }
        self.phase = MovePhase::PieceLifted { from };
        Ok(())
    }

    /// Drop the lifted piece. A pawn of the moving side landing on its own
    /// last rank interrupts into `PromotionPending`; every other drop
    /// completes the move and moves the engine to `Submitting`.
    pub fn drop_piece(&mut self, to: SquareIndex) -> Result<DropOutcome, MoveError> {
        let from = match self.phase {
            MovePhase::PieceLifted { from } => from,
            MovePhase::Idle => return Err(MoveError::NothingLifted),
            MovePhase::PromotionPending { .. } => return Err(MoveError::PromotionChoicePending),
            MovePhase::Submitting => return Err(MoveError::SubmissionInFlight),
        };
        let to_coord = Coord::from_index(to)?;
        let piece = self
            .board
            .piece_at(from)
            .ok_or(MoveError::EmptySquare(Coord::from_index(from)?))?;

        // Promotion is judged relative to the moving side, not to the
        // absolute board orientation.
        if piece.is_pawn()
            && piece.owner == self.side
            && to_coord.rank() == self.side.promotion_rank()
        {
            debug!(target: LOG_TARGET, to = %to_coord, "pawn reached last rank, awaiting promotion");
            self.phase = MovePhase::PromotionPending { from, to };
            return Ok(DropOutcome::PromotionRequired);
        }

        let argument = self.assemble(from, to, None)?;
        Ok(DropOutcome::Submit(argument))
    }

    /// Resolve a pending promotion and complete the move.
    pub fn choose_promotion(&mut self, kind: PieceKind) -> Result<MoveArgument, MoveError> {
        let (from, to) = match self.phase {
            MovePhase::PromotionPending { from, to } => (from, to),
            _ => return Err(MoveError::NoPromotionPending),
        };
        if !PROMOTION_KINDS.contains(&kind) {
            return Err(MoveError::InvalidPromotion(kind));
        }
        self.assemble(from, to, Some(kind))
    }

    /// Called when the exercise request completes, success or failure. The
    /// optimistic overlay is not rolled back; the next authoritative
    /// snapshot supersedes it either way.
    pub fn finish_submission(&mut self) {
        if self.phase == MovePhase::Submitting {
            self.phase = MovePhase::Idle;
        }
    }

    /// Replace the working board with a fresh authoritative snapshot,
    /// discarding any optimistic overlay and in-progress gesture.
    pub fn apply_selection(&mut self, event: &GamePhaseEvent) -> bool {
        match MoveProtocolEngine::for_selection(event) {
            Some(fresh) => {
                *self = fresh;
                true
            }
            None => false,
        }
    }

    fn assemble(
        &mut self,
        from: SquareIndex,
        to: SquareIndex,
        promotion: Option<PieceKind>,
    ) -> Result<MoveArgument, MoveError> {
        let pending = PendingMove {
            from: Coord::from_index(from)?,
            to: Coord::from_index(to)?,
            promotion,
        };
        // Optimistic feedback only: clear the source, occupy the target
        // (capturing whatever stood there).
        let piece = self
            .board
            .piece_at(from)
            .ok_or(MoveError::EmptySquare(pending.from))?;
        self.board.clear_square(from);
        self.board.set_piece(to, piece);
        self.phase = MovePhase::Submitting;
        debug!(
            target: LOG_TARGET,
            from = %pending.from,
            to = %pending.to,
            promote = ?pending.promotion,
            "move assembled for submission"
        );
        Ok(MoveArgument {
            from: pending.from,
            to: pending.to,
            promote: pending.promotion,
        })
    }
}
