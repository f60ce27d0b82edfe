//! Bencoded response bodies for the HTTP tracker.
//!
//! Every response, success or failure, is a bencoded body behind a
//! `200 OK`: clients detect failures by the presence of the
//! `failure reason` key.
pub mod announce;
pub mod error;
pub mod scrape;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Wraps a bencoded body into the HTTP response the protocol expects.
pub fn bencoded(body: Vec<u8>) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}
