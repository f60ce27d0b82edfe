//! Parsing and validation of the tracker requests.
//!
//! Validation stops at the first failing check, and every failure carries
//! the exact human-readable message that goes back to the client as the
//! `failure reason`.
pub mod announce;
pub mod scrape;
