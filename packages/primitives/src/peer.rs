//! Peer types used by the tracker.
//!
//! A peer is identified inside a swarm by its 20-byte [`Id`]. The tracker
//! stores one row per `(infohash, peer id)` pair; what other peers get to see
//! of that row is the [`SwarmPeer`] projection (id, address and port).
use std::net::IpAddr;
use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

pub const PEER_ID_BYTES_LEN: usize = 20;

/// The 20-byte peer id a client picks for itself.
///
/// By convention the first bytes encode the client implementation and
/// version (`-qB4520-…` for qBittorrent 4.5.2), but the tracker treats the
/// id as opaque bytes.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct Id(pub [u8; 20]);

impl Id {
    /// Returns the internal byte array.
    #[must_use]
    pub fn to_bytes(self) -> [u8; 20] {
        self.0
    }

    /// Converts to a 40-character lowercase hex string.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        let mut chars = [0u8; 40];
        binascii::bin2hex(&self.0, &mut chars).expect("output buffer fits 20 bytes of hex");
        std::str::from_utf8(&chars).expect("hex digits are ASCII").to_owned()
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl TryFrom<&[u8]> for Id {
    type Error = IdConversionError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != PEER_ID_BYTES_LEN {
            return Err(IdConversionError::InvalidByteLength {
                location: Location::caller(),
                len: bytes.len(),
            });
        }
        let mut id = Self([0u8; PEER_ID_BYTES_LEN]);
        id.0.copy_from_slice(bytes);
        Ok(id)
    }
}

impl TryFrom<Vec<u8>> for Id {
    type Error = IdConversionError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Id::try_from(bytes.as_slice())
    }
}

/// Error returned when a value cannot be converted into a peer [`Id`].
#[derive(Error, Debug)]
pub enum IdConversionError {
    #[error("peer id must be 20 bytes, got {len} in {location}")]
    InvalidByteLength {
        location: &'static Location<'static>,
        len: usize,
    },
}

/// Whether a peer has the whole file.
///
/// A peer becomes `Complete` when it announces `left=0` or an explicit
/// `event=completed`; once complete it never regresses on a later announce
/// that carries no event.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Complete,
    Incomplete,
}

impl Status {
    /// The column value the persistence layer stores.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Complete => "complete",
            Status::Incomplete => "incomplete",
        }
    }
}

impl std::str::FromStr for Status {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(Status::Complete),
            "incomplete" => Ok(Status::Incomplete),
            other => Err(InvalidStatus {
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Error, Debug)]
#[error("unknown peer status `{value}`")]
pub struct InvalidStatus {
    pub value: String,
}

/// A peer as presented to other members of the swarm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwarmPeer {
    pub peer_id: Id,
    pub ip: IpAddr,
    pub port: u16,
}

pub mod fixture {
    use std::net::{IpAddr, Ipv4Addr};

    use super::{Id, SwarmPeer};

    #[derive(Debug)]
    pub struct SwarmPeerBuilder {
        peer: SwarmPeer,
    }

    impl Default for SwarmPeerBuilder {
        fn default() -> Self {
            Self {
                peer: SwarmPeer {
                    peer_id: Id(*b"-qB00000000000000000"),
                    ip: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
                    port: 8080,
                },
            }
        }
    }

    impl SwarmPeerBuilder {
        #[must_use]
        pub fn with_peer_id(mut self, peer_id: Id) -> Self {
            self.peer.peer_id = peer_id;
            self
        }

        #[must_use]
        pub fn with_ip(mut self, ip: IpAddr) -> Self {
            self.peer.ip = ip;
            self
        }

        #[must_use]
        pub fn with_port(mut self, port: u16) -> Self {
            self.peer.port = port;
            self
        }

        #[must_use]
        pub fn build(self) -> SwarmPeer {
            self.peer
        }
    }
}
