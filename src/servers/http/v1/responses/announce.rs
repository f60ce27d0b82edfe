//! `Announce` response for the HTTP tracker.
//!
//! There are two formats, selected per request:
//!
//! - [`Dictionary`]: `peers` is a list of per-peer dictionaries.
//! - [`Compact`]: `peers` is a packed byte string, six bytes per IPv4 peer
//!   (BEP 23); IPv6 peers go into `peers6`, eighteen bytes each (BEP 07).
use std::net::IpAddr;

use bittrack_bencode::{ben_bytes, ben_int, ben_map, Value};
use bittrack_primitives::peer::SwarmPeer;
use bittrack_primitives::swarm_metadata::SwarmMetadata;

use crate::core::AnnounceData;

/// Dictionary-mode `announce` response.
///
/// ```rust
/// use std::net::{IpAddr, Ipv4Addr};
/// use bittrack::servers::http::v1::responses::announce::Dictionary;
/// use bittrack::core::AnnounceData;
/// use bittrack_configuration::AnnouncePolicy;
/// use bittrack_primitives::peer::{self, SwarmPeer};
/// use bittrack_primitives::swarm_metadata::SwarmMetadata;
///
/// let data = AnnounceData {
///     peers: vec![SwarmPeer {
///         peer_id: peer::Id(*b"-qB00000000000000001"),
///         ip: IpAddr::V4(Ipv4Addr::new(105, 105, 105, 105)),
///         port: 28784,
///     }],
///     stats: SwarmMetadata { downloaded: 0, complete: 333, incomplete: 444 },
///     policy: AnnouncePolicy::new(111),
/// };
///
/// let body = Dictionary::new(data, true).body();
///
/// let expected = b"d8:completei333e10:incompletei444e8:intervali111e5:peersld2:ip15:105.105.105.1057:peer id20:-qB000000000000000014:porti28784eeee";
/// assert_eq!(body, expected.to_vec());
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Dictionary {
    data: AnnounceData,
    /// Whether each peer entry carries its `peer id` (dropped when the
    /// request said `no_peer_id=1`).
    include_peer_id: bool,
}

impl Dictionary {
    #[must_use]
    pub fn new(data: AnnounceData, include_peer_id: bool) -> Self {
        Self { data, include_peer_id }
    }

    fn peer_map(&self, peer: &SwarmPeer) -> Value {
        if self.include_peer_id {
            ben_map! {
                "ip" => ben_bytes!(peer.ip.to_string()),
                "peer id" => ben_bytes!(peer.peer_id.to_bytes().to_vec()),
                "port" => ben_int!(i64::from(peer.port)),
            }
        } else {
            ben_map! {
                "ip" => ben_bytes!(peer.ip.to_string()),
                "port" => ben_int!(i64::from(peer.port)),
            }
        }
    }

    /// Returns the bencoded body.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        let peers = Value::List(self.data.peers.iter().map(|peer| self.peer_map(peer)).collect());

        response_map(&self.data.stats, self.data.policy.interval, peers, None).encode()
    }
}

/// Compact `announce` response.
///
/// _"To reduce the size of tracker responses and to reduce memory and
/// computational requirements in trackers, trackers may return peers as a
/// packed string rather than as a bencoded list."_
#[derive(Debug, PartialEq, Eq)]
pub struct Compact {
    data: AnnounceData,
}

impl Compact {
    /// Returns the bencoded body.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        response_map(
            &self.data.stats,
            self.data.policy.interval,
            Value::Bytes(self.peers_v4_bytes()),
            Some(Value::Bytes(self.peers_v6_bytes())),
        )
        .encode()
    }

    /// Six bytes per IPv4 peer: the address then the port, both big endian.
    fn peers_v4_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::new();
        for peer in &self.data.peers {
            if let IpAddr::V4(ip) = peer.ip {
                bytes.extend_from_slice(&ip.octets());
                bytes.extend_from_slice(&peer.port.to_be_bytes());
            }
        }
        bytes
    }

    /// Eighteen bytes per IPv6 peer.
    fn peers_v6_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::new();
        for peer in &self.data.peers {
            if let IpAddr::V6(ip) = peer.ip {
                bytes.extend_from_slice(&ip.octets());
                bytes.extend_from_slice(&peer.port.to_be_bytes());
            }
        }
        bytes
    }
}

impl From<AnnounceData> for Compact {
    fn from(data: AnnounceData) -> Self {
        Self { data }
    }
}

fn response_map(stats: &SwarmMetadata, interval: u32, peers: Value, peers_v6: Option<Value>) -> Value {
    let mut response = ben_map! {
        "complete" => ben_int!(i64::from(stats.complete)),
        "incomplete" => ben_int!(i64::from(stats.incomplete)),
        "interval" => ben_int!(i64::from(interval)),
        "peers" => peers,
    };

    if let (Some(peers_v6), Value::Dict(entries)) = (peers_v6, &mut response) {
        entries.insert(b"peers6".to_vec(), peers_v6);
    }

    response
}
