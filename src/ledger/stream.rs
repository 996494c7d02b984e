//! Per-phase stream normalization.
//!
//! Each phase kind arrives on its own live query stream shaped as
//! `{loading, contracts}`. The normalizer turns one such raw stream into
//! tagged [`GamePhaseEvent`]s and withholds everything while the stream is
//! still loading, so "stream not yet open" is never mistaken for "zero
//! games exist".

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::ledger::events::{
    ActiveGame, DrawClaim, EndProposal, FinishedGame, GameDetails, GameOutcome, GamePhaseEvent,
    PassiveGame, PhaseKind, ProposedGame, SideBoard,
};
use crate::ledger::types::{ContractRef, Party};

const LOG_TARGET: &str = "fow_chess_client::ledger::stream";

// ---- Raw wire shape -------------------------------------------------------------------------

/// One create event as the transport layer hands it over: an opaque
/// contract reference plus the undecoded template payload.
#[derive(Clone, Debug, Deserialize)]
pub struct RawCreateEvent {
    #[serde(rename = "contractId")]
    pub contract_id: ContractRef,
    pub payload: Value,
}

/// One delivery of a per-kind live query: the full current contract set,
/// or a loading marker while the subscription is still opening.
#[derive(Clone, Debug, Deserialize)]
pub struct RawQueryUpdate {
    pub loading: bool,
    #[serde(default)]
    pub contracts: Vec<RawCreateEvent>,
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("malformed {kind:?} payload on {contract}: {source}")]
    Decode {
        kind: PhaseKind,
        contract: ContractRef,
        #[source]
        source: serde_json::Error,
    },
}

// ---- Payload mirrors ------------------------------------------------------------------------
// Wire field names follow the ledger templates; these exist only to decode.

#[derive(Deserialize)]
struct ActiveTurnPayload {
    game: GameDetails,
    player: Party,
    active: SideBoard,
}

#[derive(Deserialize)]
struct PassiveTurnPayload {
    game: GameDetails,
    player: Party,
    passive: SideBoard,
}

#[derive(Deserialize)]
struct DrawClaimPayload {
    game: GameDetails,
    player: Party,
}

#[derive(Deserialize)]
struct EndProposalPayload {
    game: GameDetails,
    player: Party,
    state: SideBoard,
}

#[derive(Deserialize)]
struct GameResultPayload {
    #[serde(flatten)]
    game: GameDetails,
    #[serde(rename = "drawOrWinner")]
    outcome: GameOutcome,
}

// ---- Normalizer -----------------------------------------------------------------------------

/// Adapts one raw stream of a single phase kind into tagged events.
#[derive(Debug)]
pub struct PhaseNormalizer {
    kind: PhaseKind,
    live: bool,
}

impl PhaseNormalizer {
    pub fn new(kind: PhaseKind) -> Self {
        Self { kind, live: false }
    }

    pub fn kind(&self) -> PhaseKind {
        self.kind
    }

    /// Whether the underlying subscription has confirmed it is open.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Normalize one raw delivery. Returns `None` while the stream is
    /// loading; afterwards, the decoded events in delivery order.
    pub fn normalize(
        &mut self,
        update: RawQueryUpdate,
    ) -> Result<Option<Vec<GamePhaseEvent>>, StreamError> {
        if update.loading {
            self.live = false;
            debug!(target: LOG_TARGET, kind = ?self.kind, "stream still loading");
            return Ok(None);
        }
        self.live = true;
        let mut events = Vec::with_capacity(update.contracts.len());
        for raw in update.contracts {
            events.push(self.decode(raw)?);
        }
        Ok(Some(events))
    }

    fn decode(&self, raw: RawCreateEvent) -> Result<GamePhaseEvent, StreamError> {
        let contract = raw.contract_id;
        let decode_err = |source| StreamError::Decode {
            kind: self.kind,
            contract: contract.clone(),
            source,
        };
        let event = match self.kind {
            PhaseKind::Proposed => {
                let game: GameDetails =
                    serde_json::from_value(raw.payload).map_err(decode_err)?;
                GamePhaseEvent::Proposed(ProposedGame { contract, game })
            }
            PhaseKind::ActiveTurn => {
                let p: ActiveTurnPayload =
                    serde_json::from_value(raw.payload).map_err(decode_err)?;
                GamePhaseEvent::ActiveTurn(ActiveGame {
                    contract,
                    game: p.game,
                    player: p.player,
                    board: p.active,
                })
            }
            PhaseKind::PassiveTurn => {
                let p: PassiveTurnPayload =
                    serde_json::from_value(raw.payload).map_err(decode_err)?;
                GamePhaseEvent::PassiveTurn(PassiveGame {
                    contract,
                    game: p.game,
                    player: p.player,
                    board: p.passive,
                })
            }
            PhaseKind::DrawClaimed => {
                let p: DrawClaimPayload =
                    serde_json::from_value(raw.payload).map_err(decode_err)?;
                GamePhaseEvent::DrawClaimed(DrawClaim {
                    contract,
                    game: p.game,
                    claimer: p.player,
                })
            }
            PhaseKind::EndProposed => {
                let p: EndProposalPayload =
                    serde_json::from_value(raw.payload).map_err(decode_err)?;
                GamePhaseEvent::EndProposed(EndProposal {
                    contract,
                    game: p.game,
                    proposed_by: p.player,
                    board: p.state,
                })
            }
            PhaseKind::Finished => {
                let p: GameResultPayload =
                    serde_json::from_value(raw.payload).map_err(decode_err)?;
                GamePhaseEvent::Finished(FinishedGame {
                    contract,
                    game: p.game,
                    outcome: p.outcome,
                })
            }
        };
        Ok(event)
    }
}

// ---- Async feed -----------------------------------------------------------------------------

/// One phase kind's live feed: raw updates in, normalized batches out.
pub struct PhaseFeed {
    normalizer: PhaseNormalizer,
    updates: mpsc::Receiver<RawQueryUpdate>,
}

impl PhaseFeed {
    pub fn new(kind: PhaseKind, updates: mpsc::Receiver<RawQueryUpdate>) -> Self {
        Self {
            normalizer: PhaseNormalizer::new(kind),
            updates,
        }
    }

    pub fn kind(&self) -> PhaseKind {
        self.normalizer.kind()
    }

    /// The next non-loading batch, or `None` once the transport closes the
    /// subscription.
    pub async fn next_events(&mut self) -> Option<Result<Vec<GamePhaseEvent>, StreamError>> {
        loop {
            let update = self.updates.recv().await?;
            match self.normalizer.normalize(update) {
                Ok(None) => continue,
                Ok(Some(events)) => return Some(Ok(events)),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
