//! The `SQLite3` database driver.
use std::net::IpAddr;
use std::panic::Location;
use std::str::FromStr;
use std::sync::RwLock;

use async_trait::async_trait;
use bittrack_bencode::Value;
use bittrack_clock::clock::Time;
use bittrack_configuration::Driver;
use bittrack_primitives::info_hash::InfoHash;
use bittrack_primitives::peer;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::rusqlite::params;
use r2d2_sqlite::SqliteConnectionManager;

use super::{Database, Error};
use crate::core::torrent::{Status, Torrent};
use crate::core::PeerAnnounce;
use crate::CurrentClock;

const DRIVER: Driver = Driver::Sqlite3;

/// Expiry applied when an announce does not carry a TTL.
const DEFAULT_TTL_SECONDS: u32 = 31_536_000; // one year

pub struct Sqlite {
    db_path: String,
    /// The pool is behind a lock so that [`Database::reset_after_fork`] and
    /// the reconnect-and-retry path can swap it for a fresh one.
    pool: RwLock<Pool<SqliteConnectionManager>>,
}

impl Sqlite {
    fn build_pool(db_path: &str) -> Result<Pool<SqliteConnectionManager>, Error> {
        let manager = SqliteConnectionManager::file(db_path);
        Pool::new(manager).map_err(|err| (err, DRIVER).into())
    }

    /// Hands out a pooled connection, reconnecting and retrying once when
    /// the pool reports the connection lost. A second failure propagates.
    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, Error> {
        let first_attempt = self.pool.read().expect("pool lock is not poisoned").get();

        match first_attempt {
            Ok(conn) => Ok(conn),
            Err(_lost) => {
                self.reconnect()?;
                self.pool
                    .read()
                    .expect("pool lock is not poisoned")
                    .get()
                    .map_err(|err| (err, DRIVER).into())
            }
        }
    }

    fn reconnect(&self) -> Result<(), Error> {
        let pool = Self::build_pool(&self.db_path)?;
        *self.pool.write().expect("pool lock is not poisoned") = pool;
        Ok(())
    }

    fn now_seconds() -> i64 {
        i64::try_from(CurrentClock::now().as_secs()).expect("timestamp fits in i64")
    }
}

#[async_trait]
impl Database for Sqlite {
    /// It instantiates a new `SQLite3` database driver.
    ///
    /// Refer to [`databases::Database::new`](crate::core::databases::Database::new).
    ///
    /// # Errors
    ///
    /// Will return an `Error` if `db_path` is not able to back an `SQLite`
    /// database.
    fn new(db_path: &str) -> Result<Sqlite, Error> {
        Ok(Sqlite {
            db_path: db_path.to_owned(),
            pool: RwLock::new(Self::build_pool(db_path)?),
        })
    }

    /// Refer to [`databases::Database::create_database_tables`](crate::core::databases::Database::create_database_tables).
    fn create_database_tables(&self) -> Result<(), Error> {
        let create_torrents_table = "
        CREATE TABLE IF NOT EXISTS torrents (
            info_hash BLOB NOT NULL PRIMARY KEY,
            length INTEGER NOT NULL,
            pieces_length INTEGER NOT NULL,
            pieces BLOB NOT NULL,
            name TEXT NOT NULL,
            path TEXT NOT NULL,
            private INTEGER DEFAULT 0 NOT NULL,
            announce_list BLOB NOT NULL,
            nodes BLOB NOT NULL,
            url_list BLOB NOT NULL,
            created_by TEXT,
            status TEXT DEFAULT 'active' NOT NULL
        );";

        let create_peers_table = "
        CREATE TABLE IF NOT EXISTS peers (
            info_hash BLOB NOT NULL,
            peer_id BLOB NOT NULL,
            ip_address BLOB NOT NULL,
            port INTEGER NOT NULL,
            bytes_downloaded INTEGER DEFAULT 0 NOT NULL,
            bytes_uploaded INTEGER DEFAULT 0 NOT NULL,
            bytes_left INTEGER DEFAULT 0 NOT NULL,
            status TEXT DEFAULT 'incomplete' NOT NULL,
            expires INTEGER,
            PRIMARY KEY (info_hash, peer_id)
        );";

        let conn = self.conn()?;

        conn.execute(create_torrents_table, []).map_err(|err| (err, DRIVER))?;
        conn.execute(create_peers_table, []).map_err(|err| (err, DRIVER))?;

        Ok(())
    }

    /// Refer to [`databases::Database::drop_database_tables`](crate::core::databases::Database::drop_database_tables).
    fn drop_database_tables(&self) -> Result<(), Error> {
        let conn = self.conn()?;

        conn.execute("DROP TABLE IF EXISTS peers;", [])
            .and_then(|_| conn.execute("DROP TABLE IF EXISTS torrents;", []))
            .map_err(|err| (err, DRIVER))?;

        Ok(())
    }

    /// Refer to [`databases::Database::reset_after_fork`](crate::core::databases::Database::reset_after_fork).
    fn reset_after_fork(&self) -> Result<(), Error> {
        self.reconnect()
    }

    /// Refer to [`databases::Database::save_torrent`](crate::core::databases::Database::save_torrent).
    async fn save_torrent(&self, torrent: &Torrent) -> Result<(), Error> {
        let conn = self.conn()?;

        let insert = conn
            .execute(
                "INSERT INTO torrents (info_hash, length, pieces_length, pieces, name, path, private, announce_list, nodes, url_list, created_by, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 ON CONFLICT(info_hash) DO UPDATE SET
                    length = ?2, pieces_length = ?3, pieces = ?4, name = ?5, path = ?6, private = ?7,
                    announce_list = ?8, nodes = ?9, url_list = ?10, created_by = ?11, status = ?12",
                params![
                    torrent.info_hash.bytes().to_vec(),
                    i64::try_from(torrent.length).expect("file length fits in i64"),
                    torrent.piece_length,
                    torrent.pieces,
                    torrent.name,
                    torrent.path,
                    torrent.private,
                    encode_tiers(&torrent.announce_list),
                    encode_nodes(&torrent.nodes),
                    encode_strings(&torrent.url_list),
                    torrent.created_by,
                    torrent.status.as_str(),
                ],
            )
            .map_err(|err| (err, DRIVER))?;

        if insert == 0 {
            Err(Error::InsertFailed {
                driver: DRIVER,
                location: Location::caller(),
            })
        } else {
            Ok(())
        }
    }

    /// Refer to [`databases::Database::get_torrent`](crate::core::databases::Database::get_torrent).
    async fn get_torrent(&self, info_hash: &InfoHash) -> Result<Option<Torrent>, Error> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT length, pieces_length, pieces, name, path, private, announce_list, nodes, url_list, created_by, status
                 FROM torrents WHERE info_hash = ?1",
            )
            .map_err(|err| (err, DRIVER))?;

        let mut rows = stmt
            .query(params![info_hash.bytes().to_vec()])
            .map_err(|err| (err, DRIVER))?;

        let Some(row) = rows.next().map_err(|err| (err, DRIVER))? else {
            return Ok(None);
        };

        let length: i64 = row.get(0).map_err(|err| (err, DRIVER))?;
        let pieces_length: u32 = row.get(1).map_err(|err| (err, DRIVER))?;
        let pieces: Vec<u8> = row.get(2).map_err(|err| (err, DRIVER))?;
        let name: String = row.get(3).map_err(|err| (err, DRIVER))?;
        let path: String = row.get(4).map_err(|err| (err, DRIVER))?;
        let private: bool = row.get(5).map_err(|err| (err, DRIVER))?;
        let announce_list: Vec<u8> = row.get(6).map_err(|err| (err, DRIVER))?;
        let nodes: Vec<u8> = row.get(7).map_err(|err| (err, DRIVER))?;
        let url_list: Vec<u8> = row.get(8).map_err(|err| (err, DRIVER))?;
        let created_by: Option<String> = row.get(9).map_err(|err| (err, DRIVER))?;
        let status: String = row.get(10).map_err(|err| (err, DRIVER))?;

        Ok(Some(Torrent {
            info_hash: *info_hash,
            length: u64::try_from(length).map_err(|_| corrupt_row("negative torrent length"))?,
            piece_length: pieces_length,
            pieces,
            name,
            path,
            private,
            announce_list: decode_tiers(&announce_list)?,
            nodes: decode_nodes(&nodes)?,
            url_list: decode_strings(&url_list)?,
            created_by,
            status: Status::from_str(&status).map_err(|err| corrupt_row(&err.to_string()))?,
        }))
    }

    /// Refer to [`databases::Database::has_torrent`](crate::core::databases::Database::has_torrent).
    async fn has_torrent(&self, info_hash: &InfoHash) -> Result<bool, Error> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT 1 FROM torrents WHERE info_hash = ?1 AND status = 'active'")
            .map_err(|err| (err, DRIVER))?;

        let mut rows = stmt
            .query(params![info_hash.bytes().to_vec()])
            .map_err(|err| (err, DRIVER))?;

        Ok(rows.next().map_err(|err| (err, DRIVER))?.is_some())
    }

    /// Refer to [`databases::Database::list_torrents`](crate::core::databases::Database::list_torrents).
    async fn list_torrents(&self) -> Result<Vec<(InfoHash, u64)>, Error> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT info_hash, length FROM torrents WHERE status = 'active'")
            .map_err(|err| (err, DRIVER))?;

        let torrent_iter = stmt
            .query_map([], |row| {
                let info_hash: Vec<u8> = row.get(0)?;
                let length: i64 = row.get(1)?;
                Ok((info_hash, length))
            })
            .map_err(|err| (err, DRIVER))?;

        let mut torrents = Vec::new();
        for row in torrent_iter.filter_map(std::result::Result::ok) {
            let (info_hash, length) = row;
            torrents.push((
                InfoHash::try_from(info_hash).map_err(|err| corrupt_row(&err.to_string()))?,
                u64::try_from(length).map_err(|_| corrupt_row("negative torrent length"))?,
            ));
        }

        Ok(torrents)
    }

    /// Refer to [`databases::Database::save_announce`](crate::core::databases::Database::save_announce).
    async fn save_announce(
        &self,
        announce: &PeerAnnounce,
        status: Option<peer::Status>,
        ttl_seconds: Option<u32>,
    ) -> Result<(), Error> {
        let conn = self.conn()?;

        let ttl = ttl_seconds.unwrap_or(DEFAULT_TTL_SECONDS);
        let expires = Self::now_seconds() + i64::from(ttl);

        // Each byte counter binds to its same-named column.
        let insert = conn
            .execute(
                "INSERT INTO peers (info_hash, peer_id, ip_address, port, bytes_downloaded, bytes_uploaded, bytes_left, status, expires)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, COALESCE(?8, 'incomplete'), ?9)
                 ON CONFLICT(info_hash, peer_id) DO UPDATE SET
                    ip_address = ?3, port = ?4, bytes_downloaded = ?5, bytes_uploaded = ?6, bytes_left = ?7,
                    status = COALESCE(?8, peers.status), expires = ?9",
                params![
                    announce.info_hash.bytes().to_vec(),
                    announce.peer_id.to_bytes().to_vec(),
                    pack_ip(&announce.ip),
                    announce.port,
                    announce.downloaded.0,
                    announce.uploaded.0,
                    announce.left.0,
                    status.map(|status| status.as_str()),
                    expires,
                ],
            )
            .map_err(|err| (err, DRIVER))?;

        if insert == 0 {
            Err(Error::InsertFailed {
                driver: DRIVER,
                location: Location::caller(),
            })
        } else {
            Ok(())
        }
    }

    /// Refer to [`databases::Database::get_peers`](crate::core::databases::Database::get_peers).
    async fn get_peers(&self, info_hash: &InfoHash, excluded_peer_id: &peer::Id) -> Result<Vec<peer::SwarmPeer>, Error> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT peer_id, ip_address, port FROM peers
                 WHERE info_hash = ?1 AND peer_id != ?2 AND (expires IS NULL OR expires > ?3)",
            )
            .map_err(|err| (err, DRIVER))?;

        let peer_iter = stmt
            .query_map(
                params![
                    info_hash.bytes().to_vec(),
                    excluded_peer_id.to_bytes().to_vec(),
                    Self::now_seconds(),
                ],
                |row| {
                    let peer_id: Vec<u8> = row.get(0)?;
                    let ip_address: Vec<u8> = row.get(1)?;
                    let port: u16 = row.get(2)?;
                    Ok((peer_id, ip_address, port))
                },
            )
            .map_err(|err| (err, DRIVER))?;

        let mut peers = Vec::new();
        for row in peer_iter.filter_map(std::result::Result::ok) {
            let (peer_id, ip_address, port) = row;
            peers.push(peer::SwarmPeer {
                peer_id: peer::Id::try_from(peer_id).map_err(|err| corrupt_row(&err.to_string()))?,
                ip: unpack_ip(&ip_address)?,
                port,
            });
        }

        Ok(peers)
    }

    /// Refer to [`databases::Database::get_peer_stats`](crate::core::databases::Database::get_peer_stats).
    async fn get_peer_stats(&self, info_hash: &InfoHash) -> Result<(u32, u32), Error> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT
                    SUM(CASE WHEN bytes_left = 0 THEN 1 ELSE 0 END),
                    SUM(CASE WHEN bytes_left != 0 THEN 1 ELSE 0 END)
                 FROM peers
                 WHERE info_hash = ?1 AND (expires IS NULL OR expires > ?2)",
            )
            .map_err(|err| (err, DRIVER))?;

        let (complete, incomplete): (Option<u32>, Option<u32>) = stmt
            .query_row(params![info_hash.bytes().to_vec(), Self::now_seconds()], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .map_err(|err| (err, DRIVER))?;

        Ok((complete.unwrap_or(0), incomplete.unwrap_or(0)))
    }

    /// Refer to [`databases::Database::get_downloads`](crate::core::databases::Database::get_downloads).
    ///
    /// The query intentionally has no expiry filter: peers that completed
    /// and later went away still count.
    async fn get_downloads(&self, info_hash: &InfoHash) -> Result<u32, Error> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT COUNT(*) FROM peers WHERE info_hash = ?1 AND status = 'complete'")
            .map_err(|err| (err, DRIVER))?;

        let downloads: u32 = stmt
            .query_row(params![info_hash.bytes().to_vec()], |row| row.get(0))
            .map_err(|err| (err, DRIVER))?;

        Ok(downloads)
    }
}

#[track_caller]
fn corrupt_row(message: &str) -> Error {
    Error::CorruptRow {
        driver: DRIVER,
        message: message.to_owned(),
        location: Location::caller(),
    }
}

/// Packs an IP address into its 4- or 16-byte network form.
fn pack_ip(ip: &IpAddr) -> Vec<u8> {
    match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

/// Unpacks a stored 4- or 16-byte address back into an [`IpAddr`].
fn unpack_ip(bytes: &[u8]) -> Result<IpAddr, Error> {
    match bytes.len() {
        4 => {
            let mut octets = [0u8; 4];
            octets.copy_from_slice(bytes);
            Ok(IpAddr::from(octets))
        }
        16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(bytes);
            Ok(IpAddr::from(octets))
        }
        len => Err(corrupt_row(&format!("packed IP address of {len} bytes"))),
    }
}

// The tracker-side lists are stored as opaque serialized blobs; bencode is
// the serialization already in the workspace.

fn encode_strings(list: &[String]) -> Vec<u8> {
    Value::List(list.iter().map(|item| Value::from(item.clone())).collect()).encode()
}

fn decode_strings(blob: &[u8]) -> Result<Vec<String>, Error> {
    let value = bittrack_bencode::decode(blob).map_err(|err| corrupt_row(&err.to_string()))?;
    value
        .as_list()
        .ok_or_else(|| corrupt_row("serialized list is not a bencode list"))?
        .iter()
        .map(|item| {
            item.as_str()
                .map(ToOwned::to_owned)
                .ok_or_else(|| corrupt_row("serialized list item is not a string"))
        })
        .collect()
}

fn encode_tiers(tiers: &[Vec<String>]) -> Vec<u8> {
    Value::List(
        tiers
            .iter()
            .map(|tier| Value::List(tier.iter().map(|url| Value::from(url.clone())).collect()))
            .collect(),
    )
    .encode()
}

fn decode_tiers(blob: &[u8]) -> Result<Vec<Vec<String>>, Error> {
    let value = bittrack_bencode::decode(blob).map_err(|err| corrupt_row(&err.to_string()))?;
    value
        .as_list()
        .ok_or_else(|| corrupt_row("serialized tier list is not a bencode list"))?
        .iter()
        .map(|tier| {
            tier.as_list()
                .ok_or_else(|| corrupt_row("serialized tier is not a bencode list"))?
                .iter()
                .map(|url| {
                    url.as_str()
                        .map(ToOwned::to_owned)
                        .ok_or_else(|| corrupt_row("serialized tier item is not a string"))
                })
                .collect()
        })
        .collect()
}

fn encode_nodes(nodes: &[(String, u16)]) -> Vec<u8> {
    Value::List(
        nodes
            .iter()
            .map(|(host, port)| Value::List(vec![Value::from(host.clone()), Value::Integer(i64::from(*port))]))
            .collect(),
    )
    .encode()
}

fn decode_nodes(blob: &[u8]) -> Result<Vec<(String, u16)>, Error> {
    let value = bittrack_bencode::decode(blob).map_err(|err| corrupt_row(&err.to_string()))?;
    value
        .as_list()
        .ok_or_else(|| corrupt_row("serialized node list is not a bencode list"))?
        .iter()
        .map(|node| {
            let pair = node
                .as_list()
                .ok_or_else(|| corrupt_row("serialized node is not a bencode pair"))?;
            let host = pair
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| corrupt_row("serialized node host is not a string"))?;
            let port = pair
                .get(1)
                .and_then(Value::as_integer)
                .and_then(|port| u16::try_from(port).ok())
                .ok_or_else(|| corrupt_row("serialized node port is not a port number"))?;
            Ok((host.to_owned(), port))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use bittrack_clock::clock::Time;
    use bittrack_primitives::peer;
    use tempfile::TempDir;

    use super::{Database, Sqlite, DEFAULT_TTL_SECONDS};
    use crate::core::fixture::{sample_info_hash, sample_torrent, PeerAnnounceBuilder};
    use crate::core::torrent::Status;
    use crate::CurrentClock;

    fn ephemeral_database() -> (Sqlite, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("tracker.db");
        let database = Sqlite::new(db_path.to_str().unwrap()).unwrap();
        database.create_database_tables().unwrap();
        (database, temp_dir)
    }

    #[tokio::test]
    async fn it_should_save_and_load_a_torrent_record() {
        let (database, _temp_dir) = ephemeral_database();

        let mut torrent = sample_torrent();
        torrent.nodes = vec![("router.test".to_string(), 6881)];
        torrent.url_list = vec!["http://seed.test/file".to_string()];
        torrent.created_by = Some("bittrack test".to_string());

        database.save_torrent(&torrent).await.unwrap();

        let loaded = database.get_torrent(&torrent.info_hash).await.unwrap().unwrap();

        assert_eq!(loaded, torrent);
        assert!(database.has_torrent(&torrent.info_hash).await.unwrap());
        assert_eq!(
            database.list_torrents().await.unwrap(),
            vec![(torrent.info_hash, torrent.length)]
        );
    }

    #[tokio::test]
    async fn it_should_upsert_a_torrent_record_on_the_infohash() {
        let (database, _temp_dir) = ephemeral_database();

        let mut torrent = sample_torrent();
        database.save_torrent(&torrent).await.unwrap();

        torrent.name = "renamed.bin".to_string();
        database.save_torrent(&torrent).await.unwrap();

        let loaded = database.get_torrent(&torrent.info_hash).await.unwrap().unwrap();

        assert_eq!(loaded.name, "renamed.bin");
        assert_eq!(database.list_torrents().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn it_should_hide_inactive_torrents_from_discovery() {
        let (database, _temp_dir) = ephemeral_database();

        let mut torrent = sample_torrent();
        torrent.status = Status::Inactive;
        database.save_torrent(&torrent).await.unwrap();

        assert!(!database.has_torrent(&torrent.info_hash).await.unwrap());
        assert!(database.list_torrents().await.unwrap().is_empty());
        // The record itself is still there.
        assert!(database.get_torrent(&torrent.info_hash).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn it_should_save_an_announce_and_return_the_other_live_peers() {
        let (database, _temp_dir) = ephemeral_database();

        let first = PeerAnnounceBuilder::default()
            .with_peer_id(peer::Id(*b"-qB00000000000000001"))
            .with_ip(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 5)))
            .with_port(6881)
            .build();
        let second = PeerAnnounceBuilder::default()
            .with_peer_id(peer::Id(*b"-qB00000000000000002"))
            .build();

        database.save_announce(&first, None, Some(120)).await.unwrap();
        database.save_announce(&second, None, Some(120)).await.unwrap();

        let peers = database.get_peers(&sample_info_hash(), &second.peer_id).await.unwrap();

        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].peer_id, first.peer_id);
        assert_eq!(peers[0].ip, IpAddr::V4(Ipv4Addr::new(192, 0, 2, 5)));
        assert_eq!(peers[0].port, 6881);
    }

    #[tokio::test]
    async fn it_should_store_ipv6_addresses_packed_and_round_trip_them() {
        let (database, _temp_dir) = ephemeral_database();

        let v6 = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1));
        let announcing = PeerAnnounceBuilder::default()
            .with_peer_id(peer::Id(*b"-qB00000000000000001"))
            .with_ip(v6)
            .build();

        database.save_announce(&announcing, None, Some(120)).await.unwrap();

        let peers = database
            .get_peers(&sample_info_hash(), &peer::Id(*b"-qB00000000000000099"))
            .await
            .unwrap();

        assert_eq!(peers[0].ip, v6);

        let stored_len: usize = {
            let conn = database.conn().unwrap();
            conn.query_row("SELECT length(ip_address) FROM peers", [], |row| row.get(0))
                .unwrap()
        };
        assert_eq!(stored_len, 16);
    }

    #[tokio::test]
    async fn it_should_bind_uploaded_and_downloaded_to_their_own_columns() {
        let (database, _temp_dir) = ephemeral_database();

        let mut announce = PeerAnnounceBuilder::default().build();
        announce.uploaded = bittrack_primitives::NumberOfBytes::new(111);
        announce.downloaded = bittrack_primitives::NumberOfBytes::new(222);

        database.save_announce(&announce, None, Some(120)).await.unwrap();

        let (uploaded, downloaded): (i64, i64) = {
            let conn = database.conn().unwrap();
            conn.query_row(
                "SELECT bytes_uploaded, bytes_downloaded FROM peers",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap()
        };

        assert_eq!(uploaded, 111);
        assert_eq!(downloaded, 222);
    }

    #[tokio::test]
    async fn it_should_expire_a_peer_immediately_with_a_zero_ttl() {
        let (database, _temp_dir) = ephemeral_database();

        let announce = PeerAnnounceBuilder::default().build();
        database.save_announce(&announce, None, Some(0)).await.unwrap();

        let peers = database
            .get_peers(&sample_info_hash(), &peer::Id(*b"-qB00000000000000099"))
            .await
            .unwrap();
        let (complete, incomplete) = database.get_peer_stats(&sample_info_hash()).await.unwrap();

        assert!(peers.is_empty());
        assert_eq!((complete, incomplete), (0, 0));
    }

    #[tokio::test]
    async fn it_should_default_the_ttl_to_one_year_when_none_is_given() {
        let (database, _temp_dir) = ephemeral_database();

        let announce = PeerAnnounceBuilder::default().build();
        database.save_announce(&announce, None, None).await.unwrap();

        let expires: i64 = {
            let conn = database.conn().unwrap();
            conn.query_row("SELECT expires FROM peers", [], |row| row.get(0)).unwrap()
        };

        let now = i64::try_from(CurrentClock::now().as_secs()).unwrap();
        assert_eq!(expires, now + i64::from(DEFAULT_TTL_SECONDS));
    }

    #[tokio::test]
    async fn it_should_not_regress_a_complete_peer_when_the_status_is_none() {
        let (database, _temp_dir) = ephemeral_database();

        let announce = PeerAnnounceBuilder::default().with_left(0).build();

        database
            .save_announce(&announce, Some(peer::Status::Complete), Some(120))
            .await
            .unwrap();
        database.save_announce(&announce, None, Some(120)).await.unwrap();

        assert_eq!(database.get_downloads(&sample_info_hash()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn it_should_split_peer_stats_on_bytes_left() {
        let (database, _temp_dir) = ephemeral_database();

        let seeder = PeerAnnounceBuilder::default()
            .with_peer_id(peer::Id(*b"-qB00000000000000001"))
            .with_left(0)
            .build();
        let leecher = PeerAnnounceBuilder::default()
            .with_peer_id(peer::Id(*b"-qB00000000000000002"))
            .with_left(512)
            .build();

        database.save_announce(&seeder, None, Some(120)).await.unwrap();
        database.save_announce(&leecher, None, Some(120)).await.unwrap();

        assert_eq!(database.get_peer_stats(&sample_info_hash()).await.unwrap(), (1, 1));
    }

    #[tokio::test]
    async fn it_should_count_downloads_over_expired_peers() {
        let (database, _temp_dir) = ephemeral_database();

        let announce = PeerAnnounceBuilder::default().with_left(0).build();
        database
            .save_announce(&announce, Some(peer::Status::Complete), Some(0))
            .await
            .unwrap();

        assert_eq!(database.get_peer_stats(&sample_info_hash()).await.unwrap(), (0, 0));
        assert_eq!(database.get_downloads(&sample_info_hash()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn it_should_survive_a_reset_after_fork() {
        let (database, _temp_dir) = ephemeral_database();

        database.save_torrent(&sample_torrent()).await.unwrap();
        database.reset_after_fork().unwrap();

        assert!(database.has_torrent(&sample_info_hash()).await.unwrap());
    }
}
