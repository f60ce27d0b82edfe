//! The HTTP tracker.
//!
//! The HTTP layer is a thin collaborator of the core tracker: it parses the
//! raw query string into a parameter mapping, resolves the client address,
//! and returns whatever bencoded bytes the core produced with a `200 OK`
//! and `Content-Type: text/plain`. Failures are bencoded too — clients
//! detect them by the `failure reason` key, not by the status code.
pub mod percent_encoding;
pub mod server;
pub mod v1;
