//! Bencode codec used across the Bittrack workspace.
//!
//! Bencode is the encoding `BitTorrent` uses for `.torrent` metadata and for
//! tracker responses. It has four kinds of values:
//!
//! - Integers: `i-42e`
//! - Byte strings: `4:spam` (length-prefixed, not necessarily UTF-8)
//! - Lists: `l4:spam4:eggse`
//! - Dictionaries: `d3:cow3:moo4:spam4:eggse`
//!
//! Dictionaries serialize with their keys in ascending byte order. That
//! ordering is what makes the SHA-1 of an encoded `info` dictionary (the
//! "infohash") stable, so the encoder enforces it structurally: [`Value`]
//! stores dictionary entries in a `BTreeMap`, which also makes duplicate keys
//! unrepresentable.
//!
//! Encoding cannot fail. Decoding is strict: the decoder rejects non-minimal
//! integers, truncated input, trailing bytes and dictionaries whose keys are
//! out of order or duplicated, so a decoded value always re-encodes to the
//! exact input bytes.
//!
//! ```rust
//! use bittrack_bencode::{ben_bytes, ben_map, decode, encode};
//!
//! let value = ben_map! {
//!     "spam" => ben_bytes!("eggs"),
//!     "cow" => ben_bytes!("moo"),
//! };
//!
//! let bytes = encode(&value);
//!
//! assert_eq!(bytes, b"d3:cow3:moo4:spam4:eggse".to_vec());
//! assert_eq!(decode(&bytes).unwrap(), value);
//! ```
#[macro_use]
mod macros;

pub mod decode;
pub mod encode;
pub mod value;

pub use decode::{decode, Error};
pub use encode::encode;
pub use value::Value;
