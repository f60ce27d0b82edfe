//! Builder macros for assembling bencode values in place.
//!
//! ```rust
//! use bittrack_bencode::{ben_bytes, ben_int, ben_list, ben_map};
//!
//! let response = ben_map! {
//!     "interval" => ben_int!(60),
//!     "peers" => ben_list!(ben_bytes!("...")),
//! };
//! ```

/// A bencode integer from an `i64` expression.
#[macro_export]
macro_rules! ben_int {
    ($int:expr) => {
        $crate::Value::Integer($int)
    };
}

/// A bencode byte string from anything convertible into `Vec<u8>`
/// (`&str`, `String`, `Vec<u8>`).
#[macro_export]
macro_rules! ben_bytes {
    ($bytes:expr) => {
        $crate::Value::Bytes(::std::convert::Into::into($bytes))
    };
}

/// A bencode list from zero or more values.
#[macro_export]
macro_rules! ben_list {
    ($($value:expr),* $(,)?) => {
        $crate::Value::List(vec![$($value),*])
    };
}

/// A bencode dictionary from `key => value` pairs.
///
/// Keys may be string literals or raw byte vectors; they are stored sorted by
/// unsigned byte comparison regardless of the order given here.
#[macro_export]
macro_rules! ben_map {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut entries = ::std::collections::BTreeMap::new();
        $(entries.insert($crate::value::into_key($key), $value);)*
        $crate::Value::Dict(entries)
    }};
}
