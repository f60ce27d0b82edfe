//! Bittrack is a `BitTorrent` tracker and torrent publisher for single-file
//! torrents.
//!
//! It does two things:
//!
//! - **Publish**: take a file, split it into pieces, hash them, derive the
//!   infohash and write the `.torrent` metadata blob clients consume, while
//!   registering the torrent in the tracker database.
//! - **Track**: serve the HTTP `announce` and `scrape` endpoints that
//!   clients poll to discover the other peers of a swarm and report their
//!   progress.
//!
//! The workspace splits along those seams:
//!
//! - [`core`]: the domain layer — torrent building, swarm state and the
//!   persistence port. Independent of the delivery layer.
//! - [`servers`]: the HTTP delivery layer (axum).
//! - `bittrack-bencode`, `bittrack-primitives`, `bittrack-clock`,
//!   `bittrack-configuration`: the workspace packages the crates above
//!   share.
pub mod app;
pub mod console;
pub mod core;
pub mod logging;
pub mod servers;

use bittrack_clock::clock;

/// This code needs to be copied into each crate.
/// Working version, for production.
#[cfg(not(test))]
pub type CurrentClock = clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
pub type CurrentClock = clock::Stopped;
