//! `Error` response for the HTTP tracker.
//!
//! From [BEP 03. The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html):
//!
//! _"If a tracker response has a key failure reason, then that maps to a
//! human readable string which explains why the query failed, and no other
//! keys are required."_
use bittrack_bencode::{ben_bytes, ben_map};

/// `Error` response for the HTTP tracker.
#[derive(Debug, PartialEq, Eq)]
pub struct Error {
    /// Human readable string which explains why the request failed.
    pub failure_reason: String,
}

impl Error {
    /// Returns the bencoded representation of the error.
    ///
    /// ```rust
    /// use bittrack::servers::http::v1::responses::error::Error;
    ///
    /// let err = Error {
    ///     failure_reason: "error message".to_owned(),
    /// };
    ///
    /// assert_eq!(err.body(), b"d14:failure reason13:error messagee".to_vec());
    /// ```
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        ben_map! {
            "failure reason" => ben_bytes!(self.failure_reason.clone()),
        }
        .encode()
    }
}

impl From<String> for Error {
    fn from(failure_reason: String) -> Self {
        Self { failure_reason }
    }
}
