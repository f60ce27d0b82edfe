//! The `publish` console command: turn a file into a tracked torrent.
use std::path::{Path, PathBuf};

use bittrack_configuration::Configuration;
use log::info;

use crate::core::error::Error;
use crate::core::torrent::builder::{AnnounceEntry, TorrentBuilder};
use crate::core::Tracker;

/// What to publish and how.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub file: PathBuf,
    pub piece_length: u32,
    /// Tracker announce URLs; each becomes its own tier.
    pub trackers: Vec<String>,
    /// Webseed URLs.
    pub webseeds: Vec<String>,
    pub private: bool,
}

/// Hashes the file, registers the torrent in the tracker database and
/// writes the `.torrent` blob next to the source file.
///
/// Returns the path of the written `.torrent` file.
///
/// # Errors
///
/// Will return an [`enum@Error`] if the piece size is invalid, the file
/// cannot be read or the record cannot be persisted.
pub async fn invoke(tracker: &Tracker, config: &Configuration, options: &PublishOptions) -> Result<PathBuf, Error> {
    let announce_list: Vec<AnnounceEntry> = options
        .trackers
        .iter()
        .cloned()
        .map(AnnounceEntry::Url)
        .collect();

    let mut builder = TorrentBuilder::new(&options.file, options.piece_length)?
        .with_announce_list(announce_list)
        .with_url_list(options.webseeds.clone())
        .with_private(options.private)
        .with_created_by(config.created_by.clone());

    let torrent = builder.build().await?;
    tracker.publish(&torrent).await?;

    let blob = builder.torrent_blob(&[]).await?;
    let output = torrent_file_path(&options.file);
    tokio::fs::write(&output, blob).await?;

    info!(
        "published {} ({} bytes, {} pieces) as {}",
        torrent.name,
        torrent.length,
        torrent.piece_count(),
        torrent.info_hash
    );

    Ok(output)
}

fn torrent_file_path(file: &Path) -> PathBuf {
    let mut name = file.file_name().unwrap_or_default().to_os_string();
    name.push(".torrent");
    file.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use bittrack_configuration::Configuration;
    use tempfile::TempDir;

    use super::{invoke, PublishOptions};
    use crate::core::Tracker;

    fn tracker_with_config(temp_dir: &TempDir) -> (Tracker, Configuration) {
        let mut config = Configuration::default();
        config.database.path = temp_dir.path().join("tracker.db").to_str().unwrap().to_string();
        config.created_by = Some("bittrack test".to_string());

        (Tracker::new(&config).unwrap(), config)
    }

    #[tokio::test]
    async fn it_should_publish_a_file_and_write_the_torrent_blob_next_to_it() {
        let temp_dir = TempDir::new().unwrap();
        let (tracker, config) = tracker_with_config(&temp_dir);

        let file_path = temp_dir.path().join("video.bin");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(&vec![1_u8; 2000]).unwrap();

        let options = PublishOptions {
            file: file_path.clone(),
            piece_length: 512,
            trackers: vec!["http://tracker.test/announce".to_string()],
            webseeds: vec![],
            private: false,
        };

        let output = invoke(&tracker, &config, &options).await.unwrap();

        assert_eq!(output, temp_dir.path().join("video.bin.torrent"));

        let blob = std::fs::read(&output).unwrap();
        let value = bittrack_bencode::decode(&blob).unwrap();

        assert_eq!(
            value.get(b"announce").unwrap().as_str(),
            Some("http://tracker.test/announce")
        );
        assert_eq!(value.get(b"created by").unwrap().as_str(), Some("bittrack test"));
        assert_eq!(value.get(b"info").unwrap().get(b"length").unwrap().as_integer(), Some(2000));

        // The torrent is registered and discoverable.
        let torrents = tracker.torrents().await.unwrap();
        assert_eq!(torrents.len(), 1);
        assert_eq!(torrents[0].1, 2000);
    }
}
