use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::ledger::events::GamePhaseEvent;
use crate::ledger::types::GameKey;
use crate::session::context::PlayerContext;

const LOG_TARGET: &str = "fow_chess_client::session::reconciler";

/// A by-value, versioned snapshot of the session table, published to
/// consumers after every observation. `version` is monotonic and bumps on
/// every `observe` call even when the table content is unchanged; it is a
/// liveness signal, not a semantic value.
#[derive(Clone, Debug, Default)]
pub struct SessionView {
    pub version: u64,
    pub selected: Option<GameKey>,
    /// Current entry per game, in first-observation order.
    pub games: Vec<(GameKey, GamePhaseEvent)>,
}

impl SessionView {
    pub fn get(&self, key: &GameKey) -> Option<&GamePhaseEvent> {
        self.games
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, event)| event)
    }

    pub fn selected_event(&self) -> Option<&GamePhaseEvent> {
        self.selected.as_ref().and_then(|key| self.get(key))
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("no game with key {0}")]
    UnknownGame(GameKey),
}

struct TableState {
    entries: HashMap<GameKey, GamePhaseEvent>,
    order: Vec<GameKey>,
    selected: Option<GameKey>,
    version: u64,
}

/// Merges the six independently ordered phase streams into one keyed table
/// of "current visible state per game".
///
/// Merge rule: last-observed-wins per key, across all phase kinds. The
/// streams carry no cross-kind ordering, so an event for a phase the
/// ledger has already advanced past can land after a newer one from a
/// different stream; the reconciler deliberately keeps whatever arrived
/// last rather than guessing at a logical order.
pub struct SessionReconciler {
    ctx: PlayerContext,
    state: RwLock<TableState>,
    updates: watch::Sender<SessionView>,
}

impl SessionReconciler {
    pub fn new(ctx: PlayerContext) -> Self {
        let (updates, _) = watch::channel(SessionView::default());
        Self {
            ctx,
            state: RwLock::new(TableState {
                entries: HashMap::new(),
                order: Vec::new(),
                selected: None,
                version: 0,
            }),
            updates,
        }
    }

    pub fn context(&self) -> &PlayerContext {
        &self.ctx
    }

    /// Fold one batch of events into the table. Called once per normalizer
    /// whenever its stream reports a non-loading change; batches from
    /// different kinds may interleave in any order.
    pub fn observe(&self, events: impl IntoIterator<Item = GamePhaseEvent>) {
        let view = {
            let mut state = self.state.write().expect("session table poisoned");
            for event in events {
                let key = event.game_key();
                if state.selected.is_none() {
                    info!(
                        target: LOG_TARGET,
                        party = %self.ctx.party,
                        game = %key,
                        "selecting first observed game"
                    );
                    state.selected = Some(key.clone());
                }
                if !state.entries.contains_key(&key) {
                    state.order.push(key.clone());
                }
                debug!(
                    target: LOG_TARGET,
                    game = %key,
                    phase = ?event.kind(),
                    contract = %event.contract_ref(),
                    "observed phase event"
                );
                state.entries.insert(key, event);
            }
            state.version += 1;
            Self::view_of(&state)
        };
        self.updates.send_replace(view);
    }

    /// Explicit user tab switch; the only way selection moves once set.
    pub fn select(&self, key: &GameKey) -> Result<(), SelectError> {
        let view = {
            let mut state = self.state.write().expect("session table poisoned");
            if !state.entries.contains_key(key) {
                return Err(SelectError::UnknownGame(key.clone()));
            }
            state.selected = Some(key.clone());
            state.version += 1;
            Self::view_of(&state)
        };
        self.updates.send_replace(view);
        Ok(())
    }

    pub fn view(&self) -> SessionView {
        let state = self.state.read().expect("session table poisoned");
        Self::view_of(&state)
    }

    /// Subscribe to versioned views; one is published per observation.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.updates.subscribe()
    }

    /// The same subscription as a `Stream` of views, for consumers that
    /// compose with stream combinators.
    pub fn view_stream(&self) -> tokio_stream::wrappers::WatchStream<SessionView> {
        tokio_stream::wrappers::WatchStream::new(self.updates.subscribe())
    }

    /// Number of observations folded so far (including no-op batches).
    pub fn observations(&self) -> u64 {
        self.state.read().expect("session table poisoned").version
    }

    fn view_of(state: &TableState) -> SessionView {
        let games = state
            .order
            .iter()
            .map(|key| {
                let event = state
                    .entries
                    .get(key)
                    .expect("ordered key present in table")
                    .clone();
                (key.clone(), event)
            })
            .collect();
        SessionView {
            version: state.version,
            selected: state.selected.clone(),
            games,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, PieceKind, Side};
    use crate::ledger::events::{
        ActiveGame, BoardSnapshot, FinishedGame, GameDetails, GameOutcome, GamePhaseEvent,
        PassiveGame, PhaseKind, ProposedGame, SideBoard,
    };
    use crate::ledger::types::{ContractRef, GameLabel, Party};
    use crate::session::context::AliasMap;

    fn sample_ctx() -> PlayerContext {
        PlayerContext::new(Party::new("alice"), AliasMap::new())
    }

    fn sample_game(label: &str) -> GameDetails {
        GameDetails {
            label: GameLabel::new(label),
            proposer: Party::new("alice"),
            opponent: Party::new("bob"),
            desired_side: Side::White,
        }
    }

    fn sample_board(side: Side) -> SideBoard {
        SideBoard {
            side,
            pieces: BoardSnapshot::from_pairs([(0, Piece::new(side, PieceKind::King))]),
            in_check: false,
        }
    }

    fn proposed(label: &str, contract: &str) -> GamePhaseEvent {
        GamePhaseEvent::Proposed(ProposedGame {
            contract: ContractRef::new(contract),
            game: sample_game(label),
        })
    }

    fn active(label: &str, contract: &str) -> GamePhaseEvent {
        GamePhaseEvent::ActiveTurn(ActiveGame {
            contract: ContractRef::new(contract),
            game: sample_game(label),
            player: Party::new("alice"),
            board: sample_board(Side::White),
        })
    }

    fn passive(label: &str, contract: &str) -> GamePhaseEvent {
        GamePhaseEvent::PassiveTurn(PassiveGame {
            contract: ContractRef::new(contract),
            game: sample_game(label),
            player: Party::new("alice"),
            board: sample_board(Side::Black),
        })
    }

    fn finished(label: &str, contract: &str, winner: &str) -> GamePhaseEvent {
        GamePhaseEvent::Finished(FinishedGame {
            contract: ContractRef::new(contract),
            game: sample_game(label),
            outcome: GameOutcome::Winner(Party::new(winner)),
        })
    }

    #[test]
    fn last_observed_event_wins_per_key() {
        let reconciler = SessionReconciler::new(sample_ctx());
        reconciler.observe([proposed("g1", "#1:0")]);
        reconciler.observe([active("g1", "#2:0")]);
        reconciler.observe([finished("g1", "#3:0", "alice")]);

        let view = reconciler.view();
        assert_eq!(view.len(), 1);
        let key = proposed("g1", "#1:0").game_key();
        assert_eq!(view.get(&key).unwrap().kind(), PhaseKind::Finished);
    }

    #[test]
    fn stale_phase_still_wins_when_observed_last() {
        // A passive-turn event delivered after the finished event keeps the
        // table on the stale phase: delivery order, not logical order.
        let reconciler = SessionReconciler::new(sample_ctx());
        reconciler.observe([finished("g1", "#3:0", "alice")]);
        reconciler.observe([passive("g1", "#2:0")]);

        let view = reconciler.view();
        let key = passive("g1", "#2:0").game_key();
        assert_eq!(view.get(&key).unwrap().kind(), PhaseKind::PassiveTurn);
    }

    #[test]
    fn selection_is_set_once_to_the_first_key_observed() {
        let reconciler = SessionReconciler::new(sample_ctx());
        reconciler.observe([proposed("g1", "#1:0")]);
        let first_key = proposed("g1", "#1:0").game_key();
        assert_eq!(reconciler.view().selected, Some(first_key.clone()));

        // Later arrivals, including brand-new games, never move selection.
        reconciler.observe([proposed("g2", "#4:0"), active("g3", "#5:0")]);
        reconciler.observe([finished("g1", "#3:0", "bob")]);
        assert_eq!(reconciler.view().selected, Some(first_key));
    }

    #[test]
    fn explicit_select_switches_and_validates() {
        let reconciler = SessionReconciler::new(sample_ctx());
        reconciler.observe([proposed("g1", "#1:0"), proposed("g2", "#2:0")]);

        let second = proposed("g2", "#2:0").game_key();
        reconciler.select(&second).unwrap();
        assert_eq!(reconciler.view().selected, Some(second));

        let missing = proposed("nope", "#9:9").game_key();
        assert_eq!(
            reconciler.select(&missing),
            Err(SelectError::UnknownGame(missing))
        );
    }

    #[test]
    fn observation_counter_bumps_even_when_content_is_unchanged() {
        let reconciler = SessionReconciler::new(sample_ctx());
        reconciler.observe([proposed("g1", "#1:0")]);
        let before = reconciler.observations();

        // Same event again: table content identical, counter still moves.
        reconciler.observe([proposed("g1", "#1:0")]);
        assert_eq!(reconciler.observations(), before + 1);

        // Even an empty batch counts as an observation.
        reconciler.observe(Vec::new());
        assert_eq!(reconciler.observations(), before + 2);
    }

    #[test]
    fn games_keep_first_observation_order() {
        let reconciler = SessionReconciler::new(sample_ctx());
        reconciler.observe([proposed("g1", "#1:0")]);
        reconciler.observe([proposed("g2", "#2:0")]);
        reconciler.observe([active("g1", "#3:0")]);

        let view = reconciler.view();
        let labels: Vec<_> = view
            .games
            .iter()
            .map(|(_, e)| e.game().label.as_str().to_string())
            .collect();
        assert_eq!(labels, ["g1", "g2"]);
    }

    #[test]
    fn full_phase_sequence_ends_on_the_finished_event() {
        use crate::session::view::status_line;

        let game = GameDetails {
            label: GameLabel::new("g1"),
            proposer: Party::new("partyA"),
            opponent: Party::new("partyB"),
            desired_side: Side::White,
        };
        let key = game.game_key();
        let finished = GamePhaseEvent::Finished(FinishedGame {
            contract: ContractRef::new("#3:0"),
            game: game.clone(),
            outcome: GameOutcome::Winner(Party::new("partyA")),
        });

        let ctx = PlayerContext::new(Party::new("partyB"), AliasMap::new());
        let reconciler = SessionReconciler::new(ctx.clone());
        reconciler.observe([GamePhaseEvent::Proposed(ProposedGame {
            contract: ContractRef::new("#1:0"),
            game: game.clone(),
        })]);
        reconciler.observe([GamePhaseEvent::ActiveTurn(ActiveGame {
            contract: ContractRef::new("#2:0"),
            game,
            player: Party::new("partyB"),
            board: sample_board(Side::Black),
        })]);
        reconciler.observe([finished.clone()]);

        let view = reconciler.view();
        assert_eq!(view.get(&key), Some(&finished));
        assert_eq!(status_line(&ctx, view.get(&key).unwrap()), "partyA won!");
    }

    #[tokio::test]
    async fn subscribers_receive_versioned_views() {
        let reconciler = SessionReconciler::new(sample_ctx());
        let mut updates = reconciler.subscribe();

        reconciler.observe([proposed("g1", "#1:0")]);
        updates.changed().await.unwrap();
        let view = updates.borrow_and_update().clone();
        assert_eq!(view.version, 1);
        assert_eq!(view.len(), 1);

        reconciler.observe(Vec::new());
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().version, 2);
    }

    #[tokio::test]
    async fn view_stream_yields_each_published_view() {
        use futures::StreamExt;

        let reconciler = SessionReconciler::new(sample_ctx());
        let mut views = reconciler.view_stream();
        // WatchStream yields the current value first.
        assert_eq!(views.next().await.unwrap().version, 0);

        reconciler.observe([proposed("g1", "#1:0")]);
        let view = views.next().await.unwrap();
        assert_eq!(view.version, 1);
        assert_eq!(view.len(), 1);
    }
}
