use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::ledger::events::GamePhaseEvent;
use crate::ledger::stream::{PhaseFeed, StreamError};
use crate::session::reconciler::SessionReconciler;

const LOG_TARGET: &str = "fow_chess_client::session::worker";

fn spawn_named_task<F, S>(name: S, future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
    S: Into<String>,
{
    let name_owned = name.into();
    #[cfg(tokio_unstable)]
    {
        tokio::task::Builder::new().name(&name_owned).spawn(future)
    }
    #[cfg(not(tokio_unstable))]
    {
        use tracing::Instrument;
        let span = tracing::info_span!("task", task_name = %name_owned);
        tokio::spawn(future.instrument(span))
    }
}

#[derive(Debug, Error)]
pub enum SessionWorkerError {
    #[error("phase stream failed: {0}")]
    Stream(#[from] StreamError),
}

/// Single consumer of every phase feed: batches are funnelled through one
/// channel so the reconciler's table has exactly one writer.
pub struct SessionWorker {
    reconciler: Arc<SessionReconciler>,
    batches: mpsc::Receiver<Vec<GamePhaseEvent>>,
}

impl SessionWorker {
    pub fn new(
        reconciler: Arc<SessionReconciler>,
        batches: mpsc::Receiver<Vec<GamePhaseEvent>>,
    ) -> Self {
        Self {
            reconciler,
            batches,
        }
    }

    pub async fn run(mut self) -> Result<(), SessionWorkerError> {
        while let Some(batch) = self.batches.recv().await {
            self.reconciler.observe(batch);
        }
        info!(target: LOG_TARGET, "all phase feeds closed, session worker stopping");
        Ok(())
    }
}

/// Drives one phase feed, forwarding each normalized batch into the
/// worker's funnel. Ends when the transport closes the feed or the worker
/// goes away.
pub fn spawn_phase_feed(
    mut feed: PhaseFeed,
    batches: mpsc::Sender<Vec<GamePhaseEvent>>,
) -> JoinHandle<Result<(), SessionWorkerError>> {
    let kind = feed.kind();
    spawn_named_task(format!("phase-feed-{kind:?}"), async move {
        while let Some(result) = feed.next_events().await {
            let events = match result {
                Ok(events) => events,
                Err(err) => {
                    error!(target: LOG_TARGET, kind = ?kind, %err, "phase feed failed");
                    return Err(err.into());
                }
            };
            if batches.send(events).await.is_err() {
                debug!(target: LOG_TARGET, kind = ?kind, "session worker gone, dropping feed");
                break;
            }
        }
        Ok(())
    })
}

/// Running session plumbing: the worker task plus one task per phase feed.
pub struct SessionTasks {
    pub worker: JoinHandle<Result<(), SessionWorkerError>>,
    pub feeds: Vec<JoinHandle<Result<(), SessionWorkerError>>>,
}

/// Wire a set of phase feeds into the reconciler and start everything.
pub fn spawn_session(
    reconciler: Arc<SessionReconciler>,
    feeds: Vec<PhaseFeed>,
    channel_capacity: usize,
) -> SessionTasks {
    let (batch_tx, batch_rx) = mpsc::channel(channel_capacity);
    let feed_handles = feeds
        .into_iter()
        .map(|feed| spawn_phase_feed(feed, batch_tx.clone()))
        .collect();
    drop(batch_tx);
    let worker = SessionWorker::new(reconciler, batch_rx);
    SessionTasks {
        worker: spawn_named_task("session-worker", worker.run()),
        feeds: feed_handles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::events::PhaseKind;
    use crate::ledger::stream::RawQueryUpdate;
    use crate::ledger::types::Party;
    use crate::session::context::{AliasMap, PlayerContext};
    use serde_json::json;

    fn sample_reconciler() -> Arc<SessionReconciler> {
        Arc::new(SessionReconciler::new(PlayerContext::new(
            Party::new("alice"),
            AliasMap::new(),
        )))
    }

    fn proposal_update(label: &str, contract: &str) -> RawQueryUpdate {
        RawQueryUpdate {
            loading: false,
            contracts: vec![serde_json::from_value(json!({
                "contractId": contract,
                "payload": {
                    "gameId": label,
                    "proposer": "alice",
                    "opponent": "bob",
                    "desiredSide": "White"
                }
            }))
            .unwrap()],
        }
    }

    #[tokio::test]
    async fn worker_reconciles_batches_from_multiple_feeds() {
        let reconciler = sample_reconciler();
        let mut updates = reconciler.subscribe();

        let (proposed_tx, proposed_rx) = mpsc::channel(4);
        let (finished_tx, finished_rx) = mpsc::channel(4);
        let tasks = spawn_session(
            Arc::clone(&reconciler),
            vec![
                PhaseFeed::new(PhaseKind::Proposed, proposed_rx),
                PhaseFeed::new(PhaseKind::Finished, finished_rx),
            ],
            8,
        );

        proposed_tx
            .send(proposal_update("g1", "#1:0"))
            .await
            .unwrap();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().len(), 1);

        // Closing both transports drains the funnel and stops the worker.
        drop(proposed_tx);
        drop(finished_tx);
        tasks.worker.await.unwrap().unwrap();
        for feed in tasks.feeds {
            feed.await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn loading_updates_never_reach_the_reconciler() {
        let reconciler = sample_reconciler();
        let (tx, rx) = mpsc::channel(4);
        let tasks = spawn_session(
            Arc::clone(&reconciler),
            vec![PhaseFeed::new(PhaseKind::Proposed, rx)],
            8,
        );

        tx.send(RawQueryUpdate {
            loading: true,
            contracts: Vec::new(),
        })
        .await
        .unwrap();
        drop(tx);
        tasks.worker.await.unwrap().unwrap();

        // The loading-only stream produced no observations at all.
        assert_eq!(reconciler.observations(), 0);
        assert!(reconciler.view().is_empty());
    }
}
