//! Percent decoding for infohashes and peer ids.
//!
//! Infohashes and peer ids are raw 20-byte values, percent-encoded like any
//! other URL parameter. Because they are usually not valid UTF-8 they must
//! be decoded straight to bytes, never through a string.
use bittrack_primitives::info_hash::{ConversionError, InfoHash};
use bittrack_primitives::peer::{self, IdConversionError};

/// Percent decodes a percent encoded infohash.
///
/// For example, the infohash `3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0`
/// travels as `%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0`.
///
/// # Errors
///
/// Will return an error if the decoded bytes are not exactly 20.
pub fn percent_decode_info_hash(raw_info_hash: &str) -> Result<InfoHash, ConversionError> {
    let bytes = percent_encoding::percent_decode_str(raw_info_hash).collect::<Vec<u8>>();
    InfoHash::try_from(bytes)
}

/// Percent decodes a percent encoded peer id.
///
/// # Errors
///
/// Will return an error if the decoded bytes are not exactly 20.
pub fn percent_decode_peer_id(raw_peer_id: &str) -> Result<peer::Id, IdConversionError> {
    let bytes = percent_encoding::percent_decode_str(raw_peer_id).collect::<Vec<u8>>();
    peer::Id::try_from(bytes)
}
