//! Reading a shared file as fixed-size pieces.
use std::io::SeekFrom;
use std::panic::Location;
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::core::error::Error;

/// SHA-1 digest size; one digest per piece.
pub const PIECE_HASH_BYTES_LEN: usize = 20;

/// A file exposed as indexed fixed-size pieces.
///
/// The slicer owns the open file handle. Hashing reads the file
/// sequentially with a single piece-sized buffer, so peak memory is one
/// piece regardless of the file size.
#[derive(Debug)]
pub struct FileSlicer {
    file: File,
    path: PathBuf,
    basename: String,
    size: u64,
}

impl FileSlicer {
    /// Opens the file at `path`.
    ///
    /// # Errors
    ///
    /// Will return `Error::Io` if the file cannot be opened, or
    /// `Error::AttributeNotAvailable` if the path has no base name.
    pub async fn open(path: &Path) -> Result<FileSlicer, Error> {
        let file = File::open(path).await?;
        let size = file.metadata().await?.len();

        let basename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(Error::AttributeNotAvailable {
                attribute: "name",
                location: Location::caller(),
            })?
            .to_owned();

        Ok(FileSlicer {
            file,
            path: path.to_owned(),
            basename,
            size,
        })
    }

    /// Total file size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The file's base name.
    #[must_use]
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// The path the slicer was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads exactly `length` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Will return `Error::BlockRead` if the requested range runs past the
    /// end of the file, or `Error::Io` if the read itself fails.
    pub async fn read_block(&mut self, offset: u64, length: u32) -> Result<Vec<u8>, Error> {
        if offset + u64::from(length) > self.size {
            return Err(Error::BlockRead {
                detail: format!(
                    "range [{offset}, {}) runs past the file size {}",
                    offset + u64::from(length),
                    self.size
                ),
                location: Location::caller(),
            });
        }

        let mut block = vec![0u8; length as usize];
        self.file.seek(SeekFrom::Start(offset)).await?;
        self.file.read_exact(&mut block).await?;
        Ok(block)
    }

    /// Hashes every piece of the file and returns the concatenated 20-byte
    /// SHA-1 digests. Piece `k` covers the byte range
    /// `[k * piece_size, min((k + 1) * piece_size, size))`; the last piece
    /// may be short and is hashed over the short range.
    ///
    /// # Errors
    ///
    /// Will return `Error::InvalidPieceSize` if `piece_size` is zero, or
    /// `Error::Io` if reading fails.
    pub async fn hash_pieces(&mut self, piece_size: u32) -> Result<Vec<u8>, Error> {
        if piece_size == 0 {
            return Err(Error::InvalidPieceSize {
                location: Location::caller(),
            });
        }

        let mut pieces = Vec::with_capacity(
            usize::try_from(self.size.div_ceil(u64::from(piece_size))).unwrap_or_default() * PIECE_HASH_BYTES_LEN,
        );
        let mut buffer = vec![0u8; piece_size as usize];
        let mut position = 0u64;

        self.file.seek(SeekFrom::Start(0)).await?;

        while position < self.size {
            let remaining = self.size - position;
            let read_size = usize::try_from(remaining.min(u64::from(piece_size))).expect("piece size fits in usize");

            self.file.read_exact(&mut buffer[..read_size]).await?;

            let mut hasher = Sha1::new();
            hasher.update(&buffer[..read_size]);
            pieces.extend_from_slice(&hasher.finalize());

            position += read_size as u64;
        }

        Ok(pieces)
    }
}
