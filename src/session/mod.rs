pub mod context;
pub mod reconciler;
pub mod view;
pub mod worker;

pub use context::{AliasMap, PlayerContext};
pub use reconciler::{SelectError, SessionReconciler, SessionView};
pub use worker::{spawn_phase_feed, spawn_session, SessionTasks, SessionWorker, SessionWorkerError};
