//! The persistence module.
//!
//! Persistence is implemented with one [`Database`] trait. There is
//! currently a single driver, [`Sqlite`](crate::core::databases::sqlite::Sqlite);
//! [`driver::build`] is the seam where another one would plug in.
//!
//! The persistent objects are:
//!
//! - [Torrents](#torrents)
//! - [Peers](#peers)
//!
//! # Torrents
//!
//! One row per published torrent, keyed by the infohash. Besides the fields
//! that make up the `info` dictionary (`length`, `pieces_length`, `pieces`,
//! `name`) the row keeps the source file path, the tracker/webseed/node
//! lists as opaque serialized blobs, and an `active`/`inactive` status.
//! Inactive torrents are invisible to announce, scrape and listing.
//!
//! # Peers
//!
//! One row per `(infohash, peer id)` pair, updated on every announce. The
//! IP is stored packed (4 bytes for IPv4, 16 for IPv6). The `expires`
//! column drives liveness: a peer is live while `expires` is in the future,
//! and eviction is lazy — expired rows simply stop matching the queries.
//! The `status` column records whether the peer ever completed the
//! download, and deliberately survives expiry so the lifetime download
//! counter keeps counting.
pub mod driver;
pub mod error;
pub mod sqlite;

use async_trait::async_trait;
use bittrack_primitives::info_hash::InfoHash;
use bittrack_primitives::peer;

use self::error::Error;
use crate::core::torrent::Torrent;
use crate::core::PeerAnnounce;

/// The persistence trait. It contains all the methods to interact with the
/// database.
#[async_trait]
pub trait Database: Sync + Send {
    /// It instantiates a new database driver.
    ///
    /// # Errors
    ///
    /// Will return an `Error` if the connection (pool) cannot be created.
    fn new(db_path: &str) -> Result<Self, Error>
    where
        Self: std::marker::Sized;

    // Schema

    /// It generates the database tables. SQL queries are hardcoded in the
    /// trait implementation.
    ///
    /// # Context: Schema
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to create the tables.
    fn create_database_tables(&self) -> Result<(), Error>;

    /// It drops the database tables.
    ///
    /// # Context: Schema
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to drop the tables.
    fn drop_database_tables(&self) -> Result<(), Error>;

    /// It discards any per-process connection state and reconnects.
    ///
    /// Deployments that pre-fork workers after the driver has opened its
    /// connection must call this in the child before the first query;
    /// sharing a driver socket across forked processes corrupts it.
    ///
    /// # Context: Schema
    ///
    /// # Errors
    ///
    /// Will return an `Error` if the new connection cannot be established.
    fn reset_after_fork(&self) -> Result<(), Error>;

    // Torrents

    /// It inserts or updates a torrent record, keyed by its infohash.
    ///
    /// # Context: Torrents
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to save.
    async fn save_torrent(&self, torrent: &Torrent) -> Result<(), Error>;

    /// It loads a torrent record by infohash, regardless of status.
    ///
    /// # Context: Torrents
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to load.
    async fn get_torrent(&self, info_hash: &InfoHash) -> Result<Option<Torrent>, Error>;

    /// It checks whether an *active* torrent with the given infohash exists.
    ///
    /// # Context: Torrents
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to load.
    async fn has_torrent(&self, info_hash: &InfoHash) -> Result<bool, Error>;

    /// It lists the `(infohash, length)` pairs of all active torrents.
    ///
    /// # Context: Torrents
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to load.
    async fn list_torrents(&self) -> Result<Vec<(InfoHash, u64)>, Error>;

    // Peers

    /// It inserts or updates the peer's row for the announced torrent,
    /// keyed by `(infohash, peer id)`.
    ///
    /// `status` is null-preserving: `None` keeps whatever status the row
    /// already has (so a peer that completed once stays `complete`), while
    /// `Some` overwrites it. The row's expiry becomes `now + ttl` seconds;
    /// a `ttl` of zero expires the row immediately and `None` falls back to
    /// a one-year default.
    ///
    /// # Context: Peers
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to save.
    async fn save_announce(
        &self,
        announce: &PeerAnnounce,
        status: Option<peer::Status>,
        ttl_seconds: Option<u32>,
    ) -> Result<(), Error>;

    /// It returns the live peers of a swarm, excluding the peer with
    /// `excluded_peer_id` (the requester never sees itself).
    ///
    /// # Context: Peers
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to load.
    async fn get_peers(&self, info_hash: &InfoHash, excluded_peer_id: &peer::Id) -> Result<Vec<peer::SwarmPeer>, Error>;

    /// It counts the live peers of a swarm: `(complete, incomplete)`,
    /// split on whether the peer has bytes left to download.
    ///
    /// # Context: Peers
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to load.
    async fn get_peer_stats(&self, info_hash: &InfoHash) -> Result<(u32, u32), Error>;

    /// It counts the peers that have ever completed the download. The
    /// count ignores expiry: it is a lifetime statistic, not a liveness
    /// one.
    ///
    /// # Context: Peers
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to load.
    async fn get_downloads(&self, info_hash: &InfoHash) -> Result<u32, Error>;
}
