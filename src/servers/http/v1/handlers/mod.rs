//! Axum handlers for the HTTP tracker endpoints.
pub mod announce;
pub mod scrape;
