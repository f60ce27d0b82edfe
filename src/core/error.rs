//! Errors returned by the core tracker.
use std::panic::Location;

use thiserror::Error;

use super::databases;

/// Core tracker errors.
///
/// Database failures keep their own error type
/// ([`databases::error::Error`]) and are wrapped here when they cross into
/// the domain layer.
#[derive(Error, Debug)]
pub enum Error {
    /// The piece size of a torrent must be a positive number of bytes.
    #[error("piece size must be greater than zero in {location}")]
    InvalidPieceSize { location: &'static Location<'static> },

    /// A block read fell outside the file or the torrent geometry.
    #[error("block read out of bounds: {detail} in {location}")]
    BlockRead {
        detail: String,
        location: &'static Location<'static>,
    },

    /// A torrent attribute was requested that was neither supplied nor
    /// derivable from the backing file.
    #[error("torrent attribute `{attribute}` is not available in {location}")]
    AttributeNotAvailable {
        attribute: &'static str,
        location: &'static Location<'static>,
    },

    /// The announced or scraped torrent is not registered (or not active).
    #[error("torrent not found in {location}")]
    TorrentNotFound { location: &'static Location<'static> },

    /// A configuration value did not parse into its domain type.
    #[error("invalid configuration: {message} in {location}")]
    Configuration {
        message: String,
        location: &'static Location<'static>,
    },

    /// Reading the shared file failed.
    #[error("file access failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// The persistence layer failed.
    #[error("database failure: {source}")]
    Database {
        #[from]
        source: databases::error::Error,
    },
}
