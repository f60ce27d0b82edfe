//! Primitive types shared by the Bittrack tracker crates.
//!
//! This package contains the domain types that more than one crate in the
//! workspace needs: the torrent [`InfoHash`](info_hash::InfoHash), the peer
//! identifier and swarm-facing peer record, the announce event, and a couple
//! of small newtypes.
pub mod announce_event;
pub mod info_hash;
pub mod peer;
pub mod swarm_metadata;

use serde::{Deserialize, Serialize};

/// Duration since the Unix Epoch. The tracker's timestamp type: peer expiry
/// times are absolute `DurationSinceUnixEpoch` values.
pub type DurationSinceUnixEpoch = std::time::Duration;

/// A number of bytes reported by a peer (`uploaded`, `downloaded`, `left`).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumberOfBytes(pub i64);

impl NumberOfBytes {
    #[must_use]
    pub fn new(bytes: i64) -> Self {
        Self(bytes)
    }
}
