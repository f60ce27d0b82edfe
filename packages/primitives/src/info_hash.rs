//! A `BitTorrent` v1 infohash.
//!
//! "The 20-byte sha1 hash of the bencoded form of the info value from the
//! metainfo file." It is the identity of a swarm: every announce and scrape
//! request carries one, and torrent records are keyed by it.
//!
//! Infohashes travel as raw bytes on the wire (percent-encoded in URLs) and
//! as 40-character hex strings everywhere humans see them.
use std::panic::Location;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// `BitTorrent` Info Hash v1.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct InfoHash(pub [u8; 20]);

pub const INFO_HASH_BYTES_LEN: usize = 20;

impl InfoHash {
    /// Returns the internal byte array.
    #[must_use]
    pub fn bytes(&self) -> [u8; 20] {
        self.0
    }

    /// Returns the infohash as a 40-character lowercase hex string.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for InfoHash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut chars = [0u8; 40];
        binascii::bin2hex(&self.0, &mut chars).expect("output buffer fits 20 bytes of hex");
        write!(f, "{}", std::str::from_utf8(&chars).expect("hex digits are ASCII"))
    }
}

impl std::str::FromStr for InfoHash {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 40 {
            return Err(ConversionError::InvalidHexLength {
                location: Location::caller(),
                len: s.len(),
            });
        }
        let mut hash = Self([0u8; INFO_HASH_BYTES_LEN]);
        binascii::hex2bin(s.as_bytes(), &mut hash.0).map_err(|_| ConversionError::InvalidHexDigit {
            location: Location::caller(),
        })?;
        Ok(hash)
    }
}

impl TryFrom<&[u8]> for InfoHash {
    type Error = ConversionError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != INFO_HASH_BYTES_LEN {
            return Err(ConversionError::InvalidByteLength {
                location: Location::caller(),
                len: bytes.len(),
            });
        }
        let mut hash = Self([0u8; INFO_HASH_BYTES_LEN]);
        hash.0.copy_from_slice(bytes);
        Ok(hash)
    }
}

impl TryFrom<Vec<u8>> for InfoHash {
    type Error = ConversionError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        InfoHash::try_from(bytes.as_slice())
    }
}

impl Serialize for InfoHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for InfoHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}

/// Error returned when a value cannot be converted into an [`InfoHash`].
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("infohash must be 20 bytes, got {len} in {location}")]
    InvalidByteLength {
        location: &'static Location<'static>,
        len: usize,
    },
    #[error("infohash hex string must be 40 characters, got {len} in {location}")]
    InvalidHexLength {
        location: &'static Location<'static>,
        len: usize,
    },
    #[error("infohash hex string contains a non-hex digit in {location}")]
    InvalidHexDigit { location: &'static Location<'static> },
}
