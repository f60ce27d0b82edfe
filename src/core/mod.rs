//! The core tracker domain layer.
//!
//! It contains the generic `BitTorrent` tracker logic which is independent
//! of the delivery layer: registering torrents, handling `announce` and
//! `scrape` requests, and the swarm bookkeeping both need. Typically this
//! module is used by a higher module that owns the network layer:
//!
//! ```text
//! Delivery layer     Domain layer
//!
//!     HTTP tracker |> Core tracker
//! Publish console  |
//! ```
//!
//! # Announce
//!
//! A swarm is the set of peers downloading the same torrent. Each peer
//! announces itself periodically; the tracker upserts the peer's row and
//! answers with the other members of the swarm plus the seeder/leecher
//! counts. Peer liveness is TTL-driven: a regular announce refreshes the
//! row for twice the announce interval, an `event=stopped` announce expires
//! it immediately, and eviction is lazy (expired rows just stop matching
//! queries; no background sweep is required).
//!
//! A peer that announces `event=completed` is promoted to the `complete`
//! status and keeps it on later event-less announces.
//!
//! # Scrape
//!
//! A scrape returns the aggregate counters of one swarm: live seeders, live
//! leechers and the lifetime number of completed downloads.
//!
//! # Shared state
//!
//! The tracker itself is stateless; all shared mutable state lives behind
//! the [`databases::Database`] port and mutual exclusion is delegated to
//! the database's row-level semantics. Announces for the same peer may
//! interleave; the last completed write wins, which matches the protocol's
//! idempotent, poll-driven model.
pub mod databases;
pub mod error;
pub mod torrent;

use std::collections::HashMap;
use std::net::IpAddr;
use std::panic::Location;

use bittrack_configuration::{AnnouncePolicy, Configuration};
use bittrack_primitives::announce_event::AnnounceEvent;
use bittrack_primitives::info_hash::InfoHash;
use bittrack_primitives::peer::{self, SwarmPeer};
use bittrack_primitives::swarm_metadata::SwarmMetadata;
use bittrack_primitives::NumberOfBytes;
use derive_more::Constructor;

use self::databases::Database;
use self::error::Error;
use self::torrent::Torrent;

/// The domain layer tracker service.
///
/// It handles the `announce` and `scrape` requests and owns the
/// persistence driver. It is not responsible for the network layer; the
/// delivery layer resolves the peer IP (connection address, configured
/// default or the `ip` request param) before calling in.
pub struct Tracker {
    policy: AnnouncePolicy,
    compact_default: bool,
    default_peer_ip: Option<IpAddr>,
    /// The database driver, built from the configuration.
    pub database: Box<dyn Database>,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("policy", &self.policy)
            .field("compact_default", &self.compact_default)
            .field("default_peer_ip", &self.default_peer_ip)
            .finish_non_exhaustive()
    }
}

/// One announce as the delivery layer hands it over: the peer's identity,
/// resolved IP, listening port, progress counters and the reported event.
#[derive(Clone, Debug, PartialEq, Eq, Constructor)]
pub struct PeerAnnounce {
    pub info_hash: InfoHash,
    pub peer_id: peer::Id,
    pub ip: IpAddr,
    pub port: u16,
    pub uploaded: NumberOfBytes,
    pub downloaded: NumberOfBytes,
    pub left: NumberOfBytes,
    pub event: AnnounceEvent,
}

/// Structure that holds the data returned by the `announce` request.
#[derive(Clone, Debug, PartialEq, Eq, Constructor)]
pub struct AnnounceData {
    /// The peers downloading the same torrent, excluding the peer that made
    /// the request.
    pub peers: Vec<SwarmPeer>,
    /// Swarm statistics.
    pub stats: SwarmMetadata,
    pub policy: AnnouncePolicy,
}

/// Structure that holds the data returned by the `scrape` request.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct ScrapeData {
    /// A map of infohashes and swarm metadata for each scraped torrent.
    pub files: HashMap<InfoHash, SwarmMetadata>,
}

impl ScrapeData {
    /// Creates a new empty `ScrapeData` with no files (torrents).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds a torrent to the `ScrapeData`.
    pub fn add_file(&mut self, info_hash: &InfoHash, swarm_metadata: SwarmMetadata) {
        self.files.insert(*info_hash, swarm_metadata);
    }
}

impl Tracker {
    /// `Tracker` constructor.
    ///
    /// # Errors
    ///
    /// Will return an [`enum@Error`] if the database cannot be opened or the
    /// configured `default_ip` is not an IP literal.
    pub fn new(config: &Configuration) -> Result<Tracker, Error> {
        let database = databases::driver::build(&config.database.driver, &config.database.path)?;

        let default_peer_ip = config
            .default_ip
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|err| Error::Configuration {
                message: format!("default_ip: {err}"),
                location: Location::caller(),
            })?;

        Ok(Tracker {
            policy: config.announce_policy,
            compact_default: config.compact_default,
            default_peer_ip,
            database,
        })
    }

    #[must_use]
    pub fn get_announce_policy(&self) -> AnnouncePolicy {
        self.policy
    }

    /// Whether announce responses default to the compact peer format when
    /// the request does not say.
    #[must_use]
    pub fn compact_by_default(&self) -> bool {
        self.compact_default
    }

    /// The configured fallback IP recorded for peers whose announce does
    /// not carry an `ip` param.
    #[must_use]
    pub fn get_default_peer_ip(&self) -> Option<IpAddr> {
        self.default_peer_ip
    }

    /// It handles an announce request: upserts the peer's row and returns
    /// the current swarm.
    ///
    /// The row's TTL follows the reported event: `stopped` expires the row
    /// immediately, anything else keeps it for twice the announce interval.
    /// An explicit `completed` promotes the peer's status; any other event
    /// leaves the stored status untouched.
    ///
    /// # Errors
    ///
    /// Will return `Error::TorrentNotFound` if the infohash does not belong
    /// to an active torrent, or a database error.
    pub async fn announce(&self, announce: &PeerAnnounce) -> Result<AnnounceData, Error> {
        if !self.database.has_torrent(&announce.info_hash).await? {
            return Err(Error::TorrentNotFound {
                location: Location::caller(),
            });
        }

        let ttl = if announce.event.is_stopped() {
            0
        } else {
            self.policy.interval * 2
        };

        let status = match announce.event {
            AnnounceEvent::Completed => Some(peer::Status::Complete),
            _ => None,
        };

        // Save first: the response must reflect this announce. The peer's
        // own row is excluded from the peer list by id, so the read does
        // not need to observe its own write.
        self.database.save_announce(announce, status, Some(ttl)).await?;

        let peers = self.database.get_peers(&announce.info_hash, &announce.peer_id).await?;
        let (complete, incomplete) = self.database.get_peer_stats(&announce.info_hash).await?;

        Ok(AnnounceData {
            peers,
            stats: SwarmMetadata {
                downloaded: 0,
                complete,
                incomplete,
            },
            policy: self.policy,
        })
    }

    /// It handles a scrape request for one torrent.
    ///
    /// # Errors
    ///
    /// Will return `Error::TorrentNotFound` if the infohash does not belong
    /// to an active torrent, or a database error.
    pub async fn scrape(&self, info_hash: &InfoHash) -> Result<ScrapeData, Error> {
        if !self.database.has_torrent(info_hash).await? {
            return Err(Error::TorrentNotFound {
                location: Location::caller(),
            });
        }

        let (complete, incomplete) = self.database.get_peer_stats(info_hash).await?;
        let downloaded = self.database.get_downloads(info_hash).await?;

        let mut scrape_data = ScrapeData::empty();
        scrape_data.add_file(
            info_hash,
            SwarmMetadata {
                downloaded,
                complete,
                incomplete,
            },
        );

        Ok(scrape_data)
    }

    /// It registers a torrent so peers can start announcing against it.
    ///
    /// # Errors
    ///
    /// Will return a database error if the record cannot be saved.
    pub async fn publish(&self, torrent: &Torrent) -> Result<(), Error> {
        self.database.save_torrent(torrent).await?;
        Ok(())
    }

    /// The `(infohash, length)` pairs of all active torrents.
    ///
    /// # Errors
    ///
    /// Will return a database error if the listing cannot be loaded.
    pub async fn torrents(&self) -> Result<Vec<(InfoHash, u64)>, Error> {
        Ok(self.database.list_torrents().await?)
    }
}

pub mod fixture {
    //! Builders for tests that need announces and torrent records.
    use std::net::{IpAddr, Ipv4Addr};

    use bittrack_primitives::announce_event::AnnounceEvent;
    use bittrack_primitives::info_hash::InfoHash;
    use bittrack_primitives::peer;
    use bittrack_primitives::NumberOfBytes;

    use super::PeerAnnounce;
    use crate::core::torrent::{Status, Torrent};

    #[must_use]
    pub fn sample_info_hash() -> InfoHash {
        "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0"
            .parse()
            .expect("hardcoded infohash is valid")
    }

    /// A minimal active torrent record for `sample_info_hash`.
    #[must_use]
    pub fn sample_torrent() -> Torrent {
        Torrent {
            info_hash: sample_info_hash(),
            length: 1000,
            piece_length: 256,
            pieces: vec![0u8; 80],
            name: "sample.bin".to_string(),
            path: "/tmp/sample.bin".to_string(),
            private: false,
            announce_list: vec![vec!["http://tracker.test/announce".to_string()]],
            nodes: vec![],
            url_list: vec![],
            created_by: None,
            status: Status::Active,
        }
    }

    #[derive(Debug)]
    pub struct PeerAnnounceBuilder {
        announce: PeerAnnounce,
    }

    impl Default for PeerAnnounceBuilder {
        fn default() -> Self {
            Self {
                announce: PeerAnnounce {
                    info_hash: sample_info_hash(),
                    peer_id: peer::Id(*b"-qB00000000000000001"),
                    ip: IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)),
                    port: 8080,
                    uploaded: NumberOfBytes::new(0),
                    downloaded: NumberOfBytes::new(0),
                    left: NumberOfBytes::new(1000),
                    event: AnnounceEvent::None,
                },
            }
        }
    }

    impl PeerAnnounceBuilder {
        #[must_use]
        pub fn with_info_hash(mut self, info_hash: InfoHash) -> Self {
            self.announce.info_hash = info_hash;
            self
        }

        #[must_use]
        pub fn with_peer_id(mut self, peer_id: peer::Id) -> Self {
            self.announce.peer_id = peer_id;
            self
        }

        #[must_use]
        pub fn with_ip(mut self, ip: IpAddr) -> Self {
            self.announce.ip = ip;
            self
        }

        #[must_use]
        pub fn with_port(mut self, port: u16) -> Self {
            self.announce.port = port;
            self
        }

        #[must_use]
        pub fn with_left(mut self, left: i64) -> Self {
            self.announce.left = NumberOfBytes::new(left);
            self
        }

        #[must_use]
        pub fn with_event(mut self, event: AnnounceEvent) -> Self {
            self.announce.event = event;
            self
        }

        #[must_use]
        pub fn build(self) -> PeerAnnounce {
            self.announce
        }
    }
}
