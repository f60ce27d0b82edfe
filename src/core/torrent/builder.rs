//! Building torrent records and `.torrent` blobs from a file on disk.
use std::panic::Location;
use std::path::{Path, PathBuf};

use bittrack_bencode::{ben_int, ben_list, ben_map, Value};
use bittrack_primitives::info_hash::InfoHash;
use sha1::{Digest, Sha1};

use super::slicer::FileSlicer;
use super::{Status, Torrent};
use crate::core::error::Error;

/// One entry of a caller-supplied announce list: either a bare URL or a
/// whole tier. Bare URLs are wrapped into single-element tiers when the
/// blob is assembled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnounceEntry {
    Url(String),
    Tier(Vec<String>),
}

impl AnnounceEntry {
    fn into_tier(self) -> Vec<String> {
        match self {
            AnnounceEntry::Url(url) => vec![url],
            AnnounceEntry::Tier(tier) => tier,
        }
    }
}

/// Assembles a [`Torrent`] record and its client-facing `.torrent` blob.
///
/// Attributes that are not supplied up front (`name`, `length`, `pieces`,
/// `info_hash`) are derived from the backing file the first time they are
/// read and memoized; building the same attribute twice never re-reads the
/// file.
#[derive(Debug)]
pub struct TorrentBuilder {
    path: PathBuf,
    piece_length: u32,
    name: Option<String>,
    length: Option<u64>,
    pieces: Option<Vec<u8>>,
    info_hash: Option<InfoHash>,
    announce_list: Vec<Vec<String>>,
    url_list: Vec<String>,
    nodes: Vec<(String, u16)>,
    private: bool,
    created_by: Option<String>,
    slicer: Option<FileSlicer>,
}

impl TorrentBuilder {
    /// Creates a builder for the file at `path` split into pieces of
    /// `piece_length` bytes.
    ///
    /// # Errors
    ///
    /// Will return `Error::InvalidPieceSize` if `piece_length` is zero.
    pub fn new(path: &Path, piece_length: u32) -> Result<TorrentBuilder, Error> {
        if piece_length == 0 {
            return Err(Error::InvalidPieceSize {
                location: Location::caller(),
            });
        }

        Ok(TorrentBuilder {
            path: path.to_owned(),
            piece_length,
            name: None,
            length: None,
            pieces: None,
            info_hash: None,
            announce_list: Vec::new(),
            url_list: Vec::new(),
            nodes: Vec::new(),
            private: false,
            created_by: None,
            slicer: None,
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_pieces(mut self, pieces: Vec<u8>) -> Self {
        self.pieces = Some(pieces);
        self
    }

    #[must_use]
    pub fn with_info_hash(mut self, info_hash: InfoHash) -> Self {
        self.info_hash = Some(info_hash);
        self
    }

    /// Sets the builder's own announce list. Caller-supplied tiers given to
    /// [`TorrentBuilder::torrent_blob`] are merged after these.
    #[must_use]
    pub fn with_announce_list(mut self, announce_list: Vec<AnnounceEntry>) -> Self {
        self.announce_list = announce_list.into_iter().map(AnnounceEntry::into_tier).collect();
        self
    }

    #[must_use]
    pub fn with_url_list(mut self, url_list: Vec<String>) -> Self {
        self.url_list = url_list;
        self
    }

    #[must_use]
    pub fn with_nodes(mut self, nodes: Vec<(String, u16)>) -> Self {
        self.nodes = nodes;
        self
    }

    #[must_use]
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    #[must_use]
    pub fn with_created_by(mut self, created_by: Option<String>) -> Self {
        self.created_by = created_by;
        self
    }

    #[must_use]
    pub fn piece_length(&self) -> u32 {
        self.piece_length
    }

    async fn slicer(&mut self) -> Result<&mut FileSlicer, Error> {
        if self.slicer.is_none() {
            self.slicer = Some(FileSlicer::open(&self.path).await?);
        }
        Ok(self.slicer.as_mut().expect("slicer was just opened"))
    }

    /// The total file length in bytes.
    ///
    /// # Errors
    ///
    /// Will return an error if the length was not supplied and the backing
    /// file cannot be read.
    pub async fn length(&mut self) -> Result<u64, Error> {
        if self.length.is_none() {
            self.length = Some(self.slicer().await?.size());
        }
        Ok(self.length.expect("length was just derived"))
    }

    /// The torrent name (the file's base name).
    ///
    /// # Errors
    ///
    /// Will return an error if the name was not supplied and the backing
    /// file cannot be read.
    pub async fn name(&mut self) -> Result<String, Error> {
        if self.name.is_none() {
            self.name = Some(self.slicer().await?.basename().to_owned());
        }
        Ok(self.name.clone().expect("name was just derived"))
    }

    /// The concatenated piece hashes.
    ///
    /// # Errors
    ///
    /// Will return an error if the pieces were not supplied and hashing the
    /// backing file fails.
    pub async fn pieces(&mut self) -> Result<&[u8], Error> {
        if self.pieces.is_none() {
            let piece_length = self.piece_length;
            self.pieces = Some(self.slicer().await?.hash_pieces(piece_length).await?);
        }
        Ok(self.pieces.as_deref().expect("pieces were just derived"))
    }

    /// The 20-byte infohash: the SHA-1 of the bencoded info dictionary
    /// `{length, name, piece length, pieces}`.
    ///
    /// # Errors
    ///
    /// Will return an error if a missing attribute cannot be derived from
    /// the backing file.
    pub async fn info_hash(&mut self) -> Result<InfoHash, Error> {
        if self.info_hash.is_none() {
            let info = self.info_dict(false).await?;
            let digest = Sha1::digest(info.encode());
            self.info_hash = Some(InfoHash::try_from(digest.as_slice()).expect("SHA-1 digests are 20 bytes"));
        }
        Ok(self.info_hash.expect("infohash was just derived"))
    }

    async fn info_dict(&mut self, include_private: bool) -> Result<Value, Error> {
        let length = self.length().await?;
        let name = self.name().await?;
        let piece_length = self.piece_length;
        let pieces = self.pieces().await?.to_vec();

        let mut info = ben_map! {
            "length" => ben_int!(i64::try_from(length).expect("file length fits in i64")),
            "name" => Value::from(name),
            "piece length" => ben_int!(i64::from(piece_length)),
            "pieces" => Value::from(pieces),
        };

        if include_private && self.private {
            if let Value::Dict(entries) = &mut info {
                entries.insert(b"private".to_vec(), ben_int!(1));
            }
        }

        Ok(info)
    }

    /// Merges the builder's own announce list with `trackers` (own tiers
    /// first, duplicates removed, order preserved).
    fn merged_announce_list(&self, trackers: &[AnnounceEntry]) -> Vec<Vec<String>> {
        let mut merged: Vec<Vec<String>> = Vec::new();
        let own = self.announce_list.iter().cloned();
        let given = trackers.iter().cloned().map(AnnounceEntry::into_tier);

        for tier in own.chain(given) {
            if !merged.contains(&tier) {
                merged.push(tier);
            }
        }

        merged
    }

    /// Builds the bencoded `.torrent` blob.
    ///
    /// The top-level dictionary carries `announce` (first URL of the first
    /// tier), `announce-list`, `info`, and `url-list` / `nodes` /
    /// `created by` when configured.
    ///
    /// # Errors
    ///
    /// Will return an error if a missing attribute cannot be derived from
    /// the backing file.
    pub async fn torrent_blob(&mut self, trackers: &[AnnounceEntry]) -> Result<Vec<u8>, Error> {
        let info = self.info_dict(true).await?;
        let announce_list = self.merged_announce_list(trackers);

        let mut entries = std::collections::BTreeMap::new();
        entries.insert(b"info".to_vec(), info);

        if let Some(first_url) = announce_list.first().and_then(|tier| tier.first()) {
            entries.insert(b"announce".to_vec(), Value::from(first_url.clone()));
            entries.insert(
                b"announce-list".to_vec(),
                Value::List(
                    announce_list
                        .iter()
                        .map(|tier| Value::List(tier.iter().map(|url| Value::from(url.clone())).collect()))
                        .collect(),
                ),
            );
        }

        if !self.url_list.is_empty() {
            entries.insert(
                b"url-list".to_vec(),
                Value::List(self.url_list.iter().map(|url| Value::from(url.clone())).collect()),
            );
        }

        if !self.nodes.is_empty() {
            entries.insert(
                b"nodes".to_vec(),
                Value::List(
                    self.nodes
                        .iter()
                        .map(|(host, port)| ben_list!(Value::from(host.clone()), ben_int!(i64::from(*port))))
                        .collect(),
                ),
            );
        }

        if let Some(created_by) = &self.created_by {
            entries.insert(b"created by".to_vec(), Value::from(created_by.clone()));
        }

        Ok(Value::Dict(entries).encode())
    }

    /// Reads a block out of a piece, validating the torrent geometry first:
    /// the piece must exist and the block must not cross the piece boundary.
    ///
    /// # Errors
    ///
    /// Will return `Error::BlockRead` if the geometry is violated, or an IO
    /// error if reading fails.
    pub async fn read_block(&mut self, piece_index: u64, block_begin: u32, length: u32) -> Result<Vec<u8>, Error> {
        let file_length = self.length().await?;
        let piece_count = file_length.div_ceil(u64::from(self.piece_length));

        if piece_index >= piece_count {
            return Err(Error::BlockRead {
                detail: format!("piece {piece_index} does not exist, the torrent has {piece_count} pieces"),
                location: Location::caller(),
            });
        }

        if u64::from(block_begin) + u64::from(length) > u64::from(self.piece_length) {
            return Err(Error::BlockRead {
                detail: format!(
                    "block [{block_begin}, {}) crosses the piece boundary {}",
                    u64::from(block_begin) + u64::from(length),
                    self.piece_length
                ),
                location: Location::caller(),
            });
        }

        let offset = piece_index * u64::from(self.piece_length) + u64::from(block_begin);
        self.slicer().await?.read_block(offset, length).await
    }

    /// Derives every remaining attribute and produces the stored record.
    ///
    /// # Errors
    ///
    /// Will return an error if a missing attribute cannot be derived from
    /// the backing file.
    pub async fn build(&mut self) -> Result<Torrent, Error> {
        let info_hash = self.info_hash().await?;
        let length = self.length().await?;
        let name = self.name().await?;
        let pieces = self.pieces().await?.to_vec();

        Ok(Torrent {
            info_hash,
            length,
            piece_length: self.piece_length,
            pieces,
            name,
            path: self.path.display().to_string(),
            private: self.private,
            announce_list: self.announce_list.clone(),
            nodes: self.nodes.clone(),
            url_list: self.url_list.clone(),
            created_by: self.created_by.clone(),
            status: Status::Active,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use bittrack_bencode::{decode, Value};
    use sha1::{Digest, Sha1};
    use tempfile::NamedTempFile;

    use super::{AnnounceEntry, TorrentBuilder};
    use crate::core::error::Error;

    fn file_with_content(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    fn builder_for(file: &NamedTempFile, piece_length: u32) -> TorrentBuilder {
        TorrentBuilder::new(file.path(), piece_length).unwrap()
    }

    #[test]
    fn it_should_reject_a_zero_piece_size() {
        let file = file_with_content(b"data");

        assert!(matches!(
            TorrentBuilder::new(file.path(), 0).unwrap_err(),
            Error::InvalidPieceSize { .. }
        ));
    }

    #[tokio::test]
    async fn it_should_derive_and_memoize_the_file_attributes() {
        let file = file_with_content(b"0123456789");
        let mut builder = builder_for(&file, 4);

        assert_eq!(builder.length().await.unwrap(), 10);
        assert_eq!(builder.pieces().await.unwrap().len(), 3 * 20);
        assert_eq!(
            builder.name().await.unwrap(),
            file.path().file_name().unwrap().to_str().unwrap()
        );

        // A second read returns the memoized values even if the file is gone.
        let path = file.path().to_owned();
        drop(file);
        assert!(!path.exists());
        assert_eq!(builder.length().await.unwrap(), 10);
        assert_eq!(builder.pieces().await.unwrap().len(), 3 * 20);
    }

    #[tokio::test]
    async fn it_should_use_supplied_attributes_instead_of_deriving_them() {
        let file = file_with_content(b"0123456789");
        let mut builder = builder_for(&file, 4)
            .with_name("custom-name".to_string())
            .with_length(999);

        assert_eq!(builder.name().await.unwrap(), "custom-name");
        assert_eq!(builder.length().await.unwrap(), 999);
    }

    #[tokio::test]
    async fn it_should_derive_the_info_hash_from_the_bencoded_info_dictionary() {
        let file = file_with_content(b"0123456789");
        let mut builder = builder_for(&file, 4);

        let name = builder.name().await.unwrap();
        let pieces = builder.pieces().await.unwrap().to_vec();

        let mut expected_info = Vec::new();
        expected_info.extend_from_slice(b"d6:lengthi10e4:name");
        expected_info.extend_from_slice(name.len().to_string().as_bytes());
        expected_info.push(b':');
        expected_info.extend_from_slice(name.as_bytes());
        expected_info.extend_from_slice(b"12:piece lengthi4e6:pieces60:");
        expected_info.extend_from_slice(&pieces);
        expected_info.push(b'e');

        let expected = Sha1::digest(&expected_info);

        assert_eq!(builder.info_hash().await.unwrap().bytes(), expected.as_slice());
    }

    #[tokio::test]
    async fn it_should_derive_the_same_info_hash_with_or_without_an_announce_list() {
        let file = file_with_content(b"identical content");

        let mut with_trackers = builder_for(&file, 16)
            .with_announce_list(vec![AnnounceEntry::Url("http://tracker.test/announce".to_string())]);
        let mut without_trackers = builder_for(&file, 16);

        assert_eq!(
            with_trackers.info_hash().await.unwrap(),
            without_trackers.info_hash().await.unwrap()
        );
    }

    #[tokio::test]
    async fn it_should_emit_a_torrent_blob_with_the_merged_announce_list() {
        let file = file_with_content(b"0123456789");
        let mut builder = builder_for(&file, 4).with_announce_list(vec![
            AnnounceEntry::Url("http://one.test/announce".to_string()),
            AnnounceEntry::Tier(vec!["http://two.test/announce".to_string()]),
        ]);

        let blob = builder
            .torrent_blob(&[
                AnnounceEntry::Url("http://one.test/announce".to_string()), // duplicate
                AnnounceEntry::Url("http://three.test/announce".to_string()),
            ])
            .await
            .unwrap();

        let value = decode(&blob).unwrap();

        assert_eq!(value.get(b"announce").unwrap().as_str(), Some("http://one.test/announce"));

        let tiers: Vec<Vec<String>> = value
            .get(b"announce-list")
            .unwrap()
            .as_list()
            .unwrap()
            .iter()
            .map(|tier| {
                tier.as_list()
                    .unwrap()
                    .iter()
                    .map(|url| url.as_str().unwrap().to_string())
                    .collect()
            })
            .collect();

        assert_eq!(
            tiers,
            vec![
                vec!["http://one.test/announce".to_string()],
                vec!["http://two.test/announce".to_string()],
                vec!["http://three.test/announce".to_string()],
            ]
        );
    }

    #[tokio::test]
    async fn it_should_emit_webseeds_and_the_private_flag_in_the_blob() {
        let file = file_with_content(b"0123456789");
        let mut builder = builder_for(&file, 4)
            .with_url_list(vec!["http://seed.test/file".to_string()])
            .with_private(true)
            .with_created_by(Some("bittrack test".to_string()));

        let blob = builder.torrent_blob(&[]).await.unwrap();
        let value = decode(&blob).unwrap();

        assert_eq!(
            value.get(b"url-list").unwrap().as_list().unwrap()[0].as_str(),
            Some("http://seed.test/file")
        );
        assert_eq!(value.get(b"info").unwrap().get(b"private").unwrap().as_integer(), Some(1));
        assert_eq!(value.get(b"created by").unwrap().as_str(), Some("bittrack test"));
        assert!(value.get(b"announce").is_none());
    }

    #[tokio::test]
    async fn it_should_leave_the_info_hash_unaffected_by_the_private_flag() {
        let file = file_with_content(b"0123456789");

        let mut private = builder_for(&file, 4).with_private(true);
        let mut public = builder_for(&file, 4);

        assert_eq!(private.info_hash().await.unwrap(), public.info_hash().await.unwrap());
    }

    #[tokio::test]
    async fn it_should_read_blocks_within_the_torrent_geometry() {
        let file = file_with_content(b"0123456789");
        let mut builder = builder_for(&file, 4);

        assert_eq!(builder.read_block(1, 1, 2).await.unwrap(), b"56".to_vec());
    }

    #[tokio::test]
    async fn it_should_fail_reading_a_block_outside_the_torrent_geometry() {
        let file = file_with_content(b"0123456789");
        let mut builder = builder_for(&file, 4);

        // Piece 3 does not exist (pieces 0..=2).
        assert!(matches!(
            builder.read_block(3, 0, 1).await.unwrap_err(),
            Error::BlockRead { .. }
        ));

        // The block crosses the piece boundary.
        assert!(matches!(
            builder.read_block(0, 2, 3).await.unwrap_err(),
            Error::BlockRead { .. }
        ));
    }

    #[tokio::test]
    async fn it_should_build_a_record_with_consistent_piece_geometry() {
        let file = file_with_content(&vec![7_u8; 1000]);
        let mut builder = builder_for(&file, 256);

        let torrent = builder.build().await.unwrap();

        assert_eq!(torrent.length, 1000);
        assert_eq!(torrent.piece_count(), 4);
        assert_eq!(torrent.pieces.len(), 4 * 20);
        assert_eq!(torrent.info_hash, builder.info_hash().await.unwrap());
    }
}
