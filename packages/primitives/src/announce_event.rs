//! The `event` a peer reports in an announce request.
use serde::{Deserialize, Serialize};

/// Announce events. A peer sends `started` when a download begins,
/// `completed` when it finishes and `stopped` when it leaves the swarm; the
/// regular keep-alive announces in between carry no event at all.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnnounceEvent {
    Started,
    Stopped,
    Completed,
    None,
}

impl AnnounceEvent {
    /// Whether this announce removes the peer from the swarm.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        matches!(self, AnnounceEvent::Stopped)
    }
}
