//! User actions against game-phase contracts. Every action is a single
//! fire-and-forget exercise: one request per user gesture, no retry, the
//! stream loop delivers the resulting state change.

use thiserror::Error;
use tracing::{info, warn};

use crate::game::engine::{MoveProtocolEngine, MovePhase};
use crate::ledger::client::{
    ChessChoice, ExerciseError, ExerciseOutcome, MoveArgument, SharedLedgerClient,
};
use crate::ledger::events::{ActiveGame, DrawClaim, GamePhaseEvent, PhaseKind, ProposedGame};
use crate::ledger::types::ContractRef;

const LOG_TARGET: &str = "fow_chess_client::game::actions";

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("action not available in {0:?} phase")]
    WrongPhase(PhaseKind),
    #[error("no completed move awaiting submission")]
    NoMovePending,
    #[error(transparent)]
    Exercise(#[from] ExerciseError),
}

/// Issues exercises on behalf of the viewer. Holds no per-game state; the
/// engine and the reconciler's selection decide what is exercised.
pub struct GameActions {
    client: SharedLedgerClient,
}

impl GameActions {
    pub fn new(client: SharedLedgerClient) -> Self {
        Self { client }
    }

    /// Submit the move the engine just completed. Exactly one exercise is
    /// issued; whatever the outcome, the engine returns to `Idle` and the
    /// next authoritative snapshot supersedes its optimistic overlay.
    pub async fn submit_move(
        &self,
        engine: &mut MoveProtocolEngine,
        argument: MoveArgument,
    ) -> Result<ExerciseOutcome, ActionError> {
        if engine.phase() != MovePhase::Submitting {
            return Err(ActionError::NoMovePending);
        }
        let contract = engine
            .contract()
            .cloned()
            .ok_or(ActionError::NoMovePending)?;
        let result = self
            .exercise(&contract, ChessChoice::Move(argument))
            .await;
        engine.finish_submission();
        Ok(result?)
    }

    pub async fn accept_proposal(
        &self,
        proposal: &ProposedGame,
    ) -> Result<ExerciseOutcome, ActionError> {
        Ok(self
            .exercise(&proposal.contract, ChessChoice::Accept)
            .await?)
    }

    /// Claim a draw from the active side (threefold repetition, fifty-move
    /// rule); the ledger decides whether the claim holds.
    pub async fn claim_draw(&self, active: &ActiveGame) -> Result<ExerciseOutcome, ActionError> {
        Ok(self
            .exercise(&active.contract, ChessChoice::DrawClaim)
            .await?)
    }

    /// Offer the opponent a draw. The choice name depends on which side of
    /// the turn the viewer currently holds.
    pub async fn request_draw(
        &self,
        event: &GamePhaseEvent,
    ) -> Result<ExerciseOutcome, ActionError> {
        let choice = match event {
            GamePhaseEvent::ActiveTurn(_) => ChessChoice::ActiveDrawProposal,
            GamePhaseEvent::PassiveTurn(_) => ChessChoice::PassiveDrawProposal,
            other => return Err(ActionError::WrongPhase(other.kind())),
        };
        Ok(self.exercise(event.contract_ref(), choice).await?)
    }

    pub async fn surrender(
        &self,
        event: &GamePhaseEvent,
    ) -> Result<ExerciseOutcome, ActionError> {
        let choice = match event {
            GamePhaseEvent::ActiveTurn(_) => ChessChoice::ActiveSurrender,
            GamePhaseEvent::PassiveTurn(_) => ChessChoice::PassiveSurrender,
            other => return Err(ActionError::WrongPhase(other.kind())),
        };
        Ok(self.exercise(event.contract_ref(), choice).await?)
    }

    pub async fn accept_draw(&self, claim: &DrawClaim) -> Result<ExerciseOutcome, ActionError> {
        Ok(self
            .exercise(&claim.contract, ChessChoice::AcceptDrawRequest)
            .await?)
    }

    async fn exercise(
        &self,
        contract: &ContractRef,
        choice: ChessChoice,
    ) -> Result<ExerciseOutcome, ExerciseError> {
        info!(
            target: LOG_TARGET,
            %contract,
            choice = choice.name(),
            "exercising choice"
        );
        match self.client.exercise(contract, choice).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(target: LOG_TARGET, %contract, %err, "exercise failed");
                Err(err)
            }
        }
    }
}
