//! Delivery-agnostic request services.
//!
//! Each service takes the parsed parameter mapping plus the connection's
//! remote address and returns the bencoded response body. The HTTP
//! handlers are a thin shim over these functions, which is also what tests
//! drive: no HTTP needed.
pub mod announce;
pub mod scrape;
