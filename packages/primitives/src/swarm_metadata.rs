//! Aggregate counters for one swarm.
use serde::Serialize;

/// The swarm counters a tracker reports: how many peers have the whole file
/// (`complete`, the seeders), how many are still downloading (`incomplete`,
/// the leechers), and how many have ever finished (`downloaded`, a lifetime
/// counter that ignores peer expiry).
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwarmMetadata {
    pub downloaded: u32,
    pub complete: u32,
    pub incomplete: u32,
}

impl SwarmMetadata {
    #[must_use]
    pub fn zeroed() -> Self {
        Self::default()
    }
}
