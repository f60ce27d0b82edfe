//! Torrent records.
//!
//! A [`Torrent`] is the stored description of one published file: the
//! metadata that ends up in the `info` dictionary of the `.torrent` blob
//! plus the tracker-side attributes (trackers, webseeds, status). Records
//! are identified by their [`InfoHash`] and owned by the persistence layer;
//! the [`builder`] assembles them from a file on disk.
pub mod builder;
pub mod slicer;

use bittrack_primitives::info_hash::InfoHash;

/// Whether a torrent takes part in discovery. Inactive torrents are kept in
/// the database but are invisible to announce, scrape and listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }
}

impl std::str::FromStr for Status {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            other => Err(InvalidStatus {
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[error("unknown torrent status `{value}`")]
pub struct InvalidStatus {
    pub value: String,
}

/// A stored torrent.
///
/// Invariants:
///
/// - `pieces` is a whole number of 20-byte SHA-1 digests, one per piece:
///   `pieces.len() == 20 * length.div_ceil(piece_length)`.
/// - `info_hash` is the SHA-1 of the bencoded info dictionary
///   `{length, name, piece length, pieces}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Torrent {
    pub info_hash: InfoHash,
    pub length: u64,
    pub piece_length: u32,
    pub pieces: Vec<u8>,
    pub name: String,
    pub path: String,
    pub private: bool,
    /// Tracker URL tiers, outer order meaningful.
    pub announce_list: Vec<Vec<String>>,
    /// DHT bootstrap nodes as `(host, port)` pairs.
    pub nodes: Vec<(String, u16)>,
    /// Webseed URLs.
    pub url_list: Vec<String>,
    pub created_by: Option<String>,
    pub status: Status,
}

impl Torrent {
    /// Number of pieces the file is split into.
    #[must_use]
    pub fn piece_count(&self) -> u64 {
        self.length.div_ceil(u64::from(self.piece_length))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Status;

    #[test]
    fn torrent_status_should_round_trip_through_its_column_value() {
        assert_eq!(Status::from_str(Status::Active.as_str()).unwrap(), Status::Active);
        assert_eq!(Status::from_str(Status::Inactive.as_str()).unwrap(), Status::Inactive);
        assert!(Status::from_str("paused").is_err());
    }
}
