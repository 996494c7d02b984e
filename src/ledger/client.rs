use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::board::{Coord, PieceKind};
use crate::ledger::types::ContractRef;

/// Argument of the `Move` choice, in the ledger's wire shape: uppercase
/// coordinates and an optional promotion kind (`null` for ordinary moves).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveArgument {
    pub from: Coord,
    pub to: Coord,
    pub promote: Option<PieceKind>,
}

/// The choices this client exercises against game-phase contracts. Choice
/// names match the ledger templates; which one applies depends on the
/// phase kind of the contract being exercised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChessChoice {
    Move(MoveArgument),
    Accept,
    DrawClaim,
    ActiveDrawProposal,
    PassiveDrawProposal,
    ActiveSurrender,
    PassiveSurrender,
    AcceptDrawRequest,
}

impl ChessChoice {
    pub fn name(&self) -> &'static str {
        match self {
            ChessChoice::Move(_) => "Move",
            ChessChoice::Accept => "Accept",
            ChessChoice::DrawClaim => "DrawClaim",
            ChessChoice::ActiveDrawProposal => "ActiveDrawProposal",
            ChessChoice::PassiveDrawProposal => "PassiveDrawProposal",
            ChessChoice::ActiveSurrender => "ActiveSurrender",
            ChessChoice::PassiveSurrender => "PassiveSurrender",
            ChessChoice::AcceptDrawRequest => "AcceptDrawRequest",
        }
    }

    /// Wire argument for the choice; every choice but `Move` takes the
    /// empty record.
    pub fn argument(&self) -> Value {
        match self {
            ChessChoice::Move(arg) => {
                serde_json::to_value(arg).expect("move argument serializes")
            }
            _ => Value::Object(Default::default()),
        }
    }
}

/// Result of a successful exercise: the choice's return value and the
/// events the ledger emitted for it, both opaque to this core.
#[derive(Clone, Debug, Default)]
pub struct ExerciseOutcome {
    pub return_value: Value,
    pub events: Vec<Value>,
}

#[derive(Debug, Error)]
pub enum ExerciseError {
    /// The contract was archived before the request landed; the game has
    /// already advanced past this phase.
    #[error("contract {0} is no longer active")]
    StaleContract(ContractRef),
    /// The ledger's own validation refused the choice (e.g. illegal move).
    #[error("choice rejected by ledger: {0}")]
    Rejected(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Seam to the ledger's request/response side. Implementations perform the
/// actual transport; this core only ever fires one request per completed
/// user action and never retries.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn exercise(
        &self,
        contract: &ContractRef,
        choice: ChessChoice,
    ) -> Result<ExerciseOutcome, ExerciseError>;
}

pub type SharedLedgerClient = Arc<dyn LedgerClient>;
