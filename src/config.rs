use serde::{Deserialize, Serialize};

use crate::ledger::types::Party;

/// Default depth of the funnel between phase feeds and the session worker.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Client-side session configuration: who is viewing and how the stream
/// plumbing is sized. Transport endpoints and authentication live in the
/// surrounding application, not here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    pub party: Party,
    /// Display alias for the viewing party, if one is registered.
    pub alias: Option<String>,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

impl ClientConfig {
    pub fn new(party: Party) -> Self {
        Self {
            party,
            alias: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}
